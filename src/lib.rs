//! Odoo XML-RPC connector.
//!
//! This library lets applications talk to an Odoo server over its external
//! XML-RPC API:
//!
//! - `config` - Connection parameters loaded from a JSON file
//! - `connector` - Authenticated session owning both service endpoints
//! - `records` - search_read / create / write / unlink / execute_kw
//! - `domain` - Prefix-notation filter expressions
//! - `rpc` - XML-RPC codec and HTTP transport
//!
//! # Usage
//!
//! ```ignore
//! use odoo_connector::{Connector, Domain, SearchReadOptions};
//!
//! let connector = Connector::from_config("config.json").await?;
//! let leads = connector
//!     .search_read_records(
//!         "crm.lead",
//!         SearchReadOptions::new()
//!             .with_fields(["id", "name", "email_from"])
//!             .with_domain(Domain::new().filter("stage_id.name", "=", "New"))
//!             .with_limit(10)
//!             .with_order("create_date desc"),
//!     )
//!     .await?;
//!
//! for lead in &leads {
//!     println!("Lead: {:?}", lead.get("name"));
//! }
//! ```

pub mod config;
pub mod connector;
pub mod domain;
pub mod error;
pub mod records;
pub mod rpc;
pub mod value;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{default_config_path, load_config, ConnectionConfig};
pub use connector::Connector;
pub use domain::{Domain, Term};
pub use error::{Error, ErrorKind, Result};
pub use records::SearchReadOptions;
pub use rpc::{HttpTransport, RpcError, Transport};
pub use value::{Record, Value};
