//! Record operations: search, create, update, delete and arbitrary model
//! methods, all routed through `execute_kw` on the data service.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::connector::Connector;
use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::rpc::{RpcError, Transport};
use crate::value::{Record, Value};

/// Parameters for [`Connector::search_read_records`].
///
/// `offset` and `limit` default to 0; the server reads a limit of 0 as
/// "no limit".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchReadOptions {
    /// Fields to read. Empty reads every field.
    pub fields: Vec<String>,
    /// Filter; `None` matches every record.
    pub domain: Option<Domain>,
    pub offset: i64,
    pub limit: i64,
    /// SQL-like ordering, e.g. `"create_date desc, id"`.
    pub order: String,
}

impl SearchReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    /// Positional and keyword arguments for `search_read`.
    fn into_call_args(self) -> (Vec<Value>, BTreeMap<String, Value>) {
        let domain = self.domain.unwrap_or_default();
        let args = vec![domain.to_value()];

        let kwargs = BTreeMap::from([
            ("fields".to_string(), Value::from(self.fields)),
            ("offset".to_string(), Value::Int(self.offset)),
            ("limit".to_string(), Value::Int(self.limit)),
            ("order".to_string(), Value::String(self.order)),
        ]);
        (args, kwargs)
    }
}

impl<T: Transport> Connector<T> {
    /// Search `model` and read the matching records.
    ///
    /// Records are returned exactly as the server sent them.
    ///
    /// # Errors
    ///
    /// Returns `Error::Query` if the call fails or the result is not a list
    /// of records.
    pub async fn search_read_records(
        &self,
        model: &str,
        options: SearchReadOptions,
    ) -> Result<Vec<Record>> {
        let query_error = |source| Error::Query {
            model: model.to_string(),
            source,
        };

        let (args, kwargs) = options.into_call_args();
        let result = self
            .execute_kw(model, "search_read", args, Some(kwargs))
            .await
            .map_err(query_error)?;

        let records = into_records(result).map_err(query_error)?;
        debug!(model, count = records.len(), "search_read returned records");
        Ok(records)
    }

    /// Create a record and return its id.
    ///
    /// # Errors
    ///
    /// Returns `Error::Create` if the call fails or no integer id comes back.
    pub async fn create_record(&self, model: &str, values: Record) -> Result<i64> {
        let create_error = |source| Error::Create {
            model: model.to_string(),
            source,
        };

        let result = self
            .execute_kw(model, "create", vec![Value::Struct(values)], None)
            .await
            .map_err(create_error)?;

        match result {
            Value::Int(id) => {
                debug!(model, id, "Created record");
                Ok(id)
            }
            other => Err(create_error(RpcError::unexpected("int", &other))),
        }
    }

    /// Write `values` to the record `id`.
    ///
    /// # Errors
    ///
    /// - `Error::Update` if the call fails
    /// - `Error::NotUpdated` if the server reports that nothing was written
    pub async fn update_record(&self, model: &str, id: i64, values: Record) -> Result<()> {
        let update_error = |source| Error::Update {
            model: model.to_string(),
            id,
            source,
        };

        let args = vec![Value::Array(vec![Value::Int(id)]), Value::Struct(values)];
        let result = self
            .execute_kw(model, "write", args, None)
            .await
            .map_err(update_error)?;

        match result {
            Value::Bool(true) => Ok(()),
            Value::Bool(false) => {
                warn!(model, id, "write reported no record updated");
                Err(Error::NotUpdated {
                    model: model.to_string(),
                    id,
                })
            }
            other => Err(update_error(RpcError::unexpected("boolean", &other))),
        }
    }

    /// Delete the record `id`.
    ///
    /// # Errors
    ///
    /// - `Error::Delete` if the call fails
    /// - `Error::NotDeleted` if the server reports that nothing was deleted
    pub async fn delete_record(&self, model: &str, id: i64) -> Result<()> {
        let delete_error = |source| Error::Delete {
            model: model.to_string(),
            id,
            source,
        };

        let args = vec![Value::Array(vec![Value::Int(id)])];
        let result = self
            .execute_kw(model, "unlink", args, None)
            .await
            .map_err(delete_error)?;

        match result {
            Value::Bool(true) => Ok(()),
            Value::Bool(false) => {
                warn!(model, id, "unlink reported no record deleted");
                Err(Error::NotDeleted {
                    model: model.to_string(),
                    id,
                })
            }
            other => Err(delete_error(RpcError::unexpected("boolean", &other))),
        }
    }

    /// Call any public method of `model`.
    ///
    /// `kwargs` is sent only when it is `Some`, so `Some(empty map)` and
    /// `None` produce different calls. The result is returned untouched.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let count = connector
    ///     .execute_method("crm.lead", "search_count", vec![Domain::new().into()], None)
    ///     .await?;
    /// ```
    pub async fn execute_method(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Option<Record>,
    ) -> Result<Value> {
        self.execute_kw(model, method, args, kwargs)
            .await
            .map_err(|source| Error::MethodExecution {
                model: model.to_string(),
                method: method.to_string(),
                source,
            })
    }
}

fn into_records(result: Value) -> std::result::Result<Vec<Record>, RpcError> {
    let items = match result {
        Value::Array(items) => items,
        other => return Err(RpcError::unexpected("array", &other)),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Struct(record) => Ok(record),
            other => Err(RpcError::unexpected("struct", &other)),
        })
        .collect()
}
