//! Authenticated connection to a server.
//!
//! A [`Connector`] owns two transports, one per service endpoint, and the
//! user id returned by authentication. The id is fixed at construction and
//! sent with every data call.
//!
//! # Concurrency
//!
//! All operations take `&self` and `Connector` is `Send + Sync` whenever its
//! transport is. `HttpTransport` shares one internally synchronized
//! `reqwest::Client`, so a connector can be used from several tasks at
//! once (e.g. behind an `Arc`). There is no internal timeout or retry; wrap
//! calls in `tokio::time::timeout` for a deadline.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{load_config, ConnectionConfig};
use crate::error::{Error, Result};
use crate::rpc::{endpoint_url, HttpTransport, RpcError, Transport, COMMON_PATH, OBJECT_PATH};
use crate::value::Value;

/// Label for failures of the HTTP client shared by both endpoints.
const HTTP_CLIENT: &str = "http client";

/// Client for one user session on one database.
///
/// # Example
///
/// ```ignore
/// use odoo_connector::{Connector, Domain, SearchReadOptions};
///
/// let connector = Connector::new("https://erp.example.com", "admin", "api-key", "prod").await?;
/// let leads = connector
///     .search_read_records(
///         "crm.lead",
///         SearchReadOptions::new()
///             .with_fields(["id", "name"])
///             .with_domain(Domain::new().filter("type", "=", "lead"))
///             .with_limit(10),
///     )
///     .await?;
/// ```
pub struct Connector<T = HttpTransport> {
    url: String,
    username: String,
    api_key: String,
    db: String,
    uid: i64,
    common: T,
    object: T,
}

impl Connector<HttpTransport> {
    /// Connect and authenticate with explicit parameters.
    ///
    /// # Errors
    ///
    /// - `Error::Connection` if either endpoint URL is unusable or the HTTP
    ///   client cannot be built
    /// - `Error::Authentication` if the `authenticate` call fails
    /// - `Error::InvalidCredentials` if the server rejects the credentials
    pub async fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
        db: impl Into<String>,
    ) -> Result<Self> {
        Self::connect(ConnectionConfig::new(url, username, api_key, db)).await
    }

    /// Connect and authenticate using an already loaded configuration.
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        let common_url = endpoint_url(&config.url, COMMON_PATH)
            .map_err(|source| Error::Connection { endpoint: "common", source })?;
        let object_url = endpoint_url(&config.url, OBJECT_PATH)
            .map_err(|source| Error::Connection { endpoint: "object", source })?;

        // One client for both endpoints: same TLS setup and connection pool.
        // Connections are direct; proxy environment variables are ignored.
        let client = Client::builder().no_proxy().build().map_err(|e| Error::Connection {
            endpoint: HTTP_CLIENT,
            source: RpcError::Http(e),
        })?;

        let common = HttpTransport::new(client.clone(), common_url);
        let object = HttpTransport::new(client, object_url);
        Self::with_transports(config, common, object).await
    }

    /// Load the configuration file at `path`, then connect.
    ///
    /// Errors from loading and from connecting are returned unchanged.
    pub async fn from_config(path: impl AsRef<Path>) -> Result<Self> {
        let config = load_config(path)?;
        Self::connect(config).await
    }
}

impl<T: Transport> Connector<T> {
    /// Authenticate over the given transports.
    ///
    /// `common` must reach the session service and `object` the data
    /// service. This is how tests and custom transports plug in.
    pub async fn with_transports(config: ConnectionConfig, common: T, object: T) -> Result<Self> {
        let uid = authenticate(&common, &config).await?;
        info!(uid, db = %config.db, url = %config.url, "Successfully initialized connector");

        let ConnectionConfig {
            url,
            username,
            api_key,
            db,
        } = config;

        Ok(Self {
            url,
            username,
            api_key,
            db,
            uid,
            common,
            object,
        })
    }

    /// User id of the authenticated session. Always positive.
    pub fn uid(&self) -> i64 {
        self.uid
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn database(&self) -> &str {
        &self.db
    }

    /// Release both transports.
    ///
    /// Dropping the connector does the same; this only makes the end of
    /// its scope explicit.
    pub fn close(self) {
        let Self {
            uid,
            db,
            common,
            object,
            ..
        } = self;
        debug!(uid, db = %db, "Closing connector");
        drop(common);
        drop(object);
    }

    /// Call `execute_kw` on the data service.
    ///
    /// Arguments are `(db, uid, api_key, model, method, args[, kwargs])`;
    /// `kwargs` is appended only when present.
    pub(crate) async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Option<BTreeMap<String, Value>>,
    ) -> std::result::Result<Value, RpcError> {
        let mut params = vec![
            Value::from(self.db.as_str()),
            Value::Int(self.uid),
            Value::from(self.api_key.as_str()),
            Value::from(model),
            Value::from(method),
            Value::Array(args),
        ];
        if let Some(kwargs) = kwargs {
            params.push(Value::Struct(kwargs));
        }

        debug!(model, method, "Calling execute_kw");
        self.object.call("execute_kw", params).await
    }
}

impl<T> fmt::Debug for Connector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("db", &self.db)
            .field("uid", &self.uid)
            .finish_non_exhaustive()
    }
}

/// Run `authenticate` and extract a positive user id.
///
/// The server answers `false` (or `0`) for rejected credentials rather
/// than raising a fault.
async fn authenticate<T: Transport>(common: &T, config: &ConnectionConfig) -> Result<i64> {
    let params = vec![
        Value::from(config.db.as_str()),
        Value::from(config.username.as_str()),
        Value::from(config.api_key.as_str()),
        Value::Struct(BTreeMap::new()),
    ];

    let result = common
        .call("authenticate", params)
        .await
        .map_err(Error::Authentication)?;

    match result {
        Value::Int(uid) if uid > 0 => Ok(uid),
        Value::Int(_) | Value::Bool(false) => {
            warn!(db = %config.db, username = %config.username, "Authentication rejected");
            Err(Error::InvalidCredentials)
        }
        other => Err(Error::Authentication(RpcError::unexpected("int", &other))),
    }
}
