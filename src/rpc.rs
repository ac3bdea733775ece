//! XML-RPC plumbing for talking to the server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐        HTTP POST text/xml       ┌──────────────────────┐
//! │   Connector     │  ◄─────────────────────────────►│ /xmlrpc/2/common     │
//! │ (2 transports)  │       methodCall/Response       │ /xmlrpc/2/object     │
//! └─────────────────┘                                 └──────────────────────┘
//! ```
//!
//! The `common` service handles authentication; the `object` service
//! handles everything else through `execute_kw`.
//!
//! # Wire Format
//!
//! ```text
//! <?xml version="1.0"?>
//! <methodCall><methodName>authenticate</methodName>
//! <params><param><value><string>db</string></value></param>...</params>
//! </methodCall>
//! ```

mod codec;
mod transport;

pub use codec::{decode_response, encode_call};
pub use transport::{
    endpoint_url, HttpTransport, RpcError, Transport, COMMON_PATH, OBJECT_PATH,
};
