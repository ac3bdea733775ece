//! Crate error type.
//!
//! Every failure carries the model, field or endpoint that triggered it and
//! wraps the underlying cause. Operations whose server result is a boolean
//! (`write`, `unlink`) report a `false` result as its own variant, separate
//! from a failed call.

use std::path::PathBuf;

use thiserror::Error;

use crate::rpc::RpcError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad failure category, independent of the variant details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    Validation,
    Connection,
    Authentication,
    Query,
    Create,
    Update,
    Delete,
    MethodExecution,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required config field is empty or missing.
    #[error("{field} is required in config")]
    Validation { field: &'static str },

    #[error("failed to connect to {endpoint} endpoint: {source}")]
    Connection {
        endpoint: &'static str,
        #[source]
        source: RpcError,
    },

    #[error("authentication failed: {0}")]
    Authentication(#[source] RpcError),

    /// The server accepted the call but returned no user id.
    #[error("authentication failed: invalid credentials")]
    InvalidCredentials,

    #[error("search_read failed for model {model}: {source}")]
    Query {
        model: String,
        #[source]
        source: RpcError,
    },

    #[error("create failed for model {model}: {source}")]
    Create {
        model: String,
        #[source]
        source: RpcError,
    },

    #[error("update failed for model {model} with id {id}: {source}")]
    Update {
        model: String,
        id: i64,
        #[source]
        source: RpcError,
    },

    #[error("update failed for model {model} with id {id}: no record updated")]
    NotUpdated { model: String, id: i64 },

    #[error("delete failed for model {model} with id {id}: {source}")]
    Delete {
        model: String,
        id: i64,
        #[source]
        source: RpcError,
    },

    #[error("delete failed for model {model} with id {id}: no record deleted")]
    NotDeleted { model: String, id: i64 },

    #[error("method execution failed for {model}.{method}: {source}")]
    MethodExecution {
        model: String,
        method: String,
        #[source]
        source: RpcError,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Connection { .. } => ErrorKind::Connection,
            Error::Authentication(_) | Error::InvalidCredentials => ErrorKind::Authentication,
            Error::Query { .. } => ErrorKind::Query,
            Error::Create { .. } => ErrorKind::Create,
            Error::Update { .. } | Error::NotUpdated { .. } => ErrorKind::Update,
            Error::Delete { .. } | Error::NotDeleted { .. } => ErrorKind::Delete,
            Error::MethodExecution { .. } => ErrorKind::MethodExecution,
        }
    }

    /// The transport error behind this failure, if there is one.
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            Error::Connection { source, .. }
            | Error::Query { source, .. }
            | Error::Create { source, .. }
            | Error::Update { source, .. }
            | Error::Delete { source, .. }
            | Error::MethodExecution { source, .. } => Some(source),
            Error::Authentication(source) => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation { field: "url" };
        assert_eq!(err.to_string(), "url is required in config");

        let err = Error::NotUpdated {
            model: "res.partner".into(),
            id: 42,
        };
        assert_eq!(
            err.to_string(),
            "update failed for model res.partner with id 42: no record updated"
        );

        let err = Error::MethodExecution {
            model: "crm.lead".into(),
            method: "action_set_won".into(),
            source: RpcError::Protocol("bad".into()),
        };
        assert_eq!(
            err.to_string(),
            "method execution failed for crm.lead.action_set_won: Protocol error: bad"
        );
    }

    #[test]
    fn test_error_kind_groups_variants() {
        assert_eq!(Error::InvalidCredentials.kind(), ErrorKind::Authentication);
        assert_eq!(
            Error::NotDeleted {
                model: "m".into(),
                id: 1
            }
            .kind(),
            ErrorKind::Delete
        );
        assert!(Error::InvalidCredentials.rpc_error().is_none());
    }

    #[test]
    fn test_error_source_is_preserved() {
        use std::error::Error as _;

        let err = Error::Query {
            model: "crm.lead".into(),
            source: RpcError::Fault {
                code: 2,
                message: "Invalid field".into(),
            },
        };
        let source = err.source().expect("source should be set");
        assert_eq!(source.to_string(), "Server fault 2: Invalid field");
    }
}
