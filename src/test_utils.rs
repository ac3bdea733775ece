//! Test utilities and mock implementations.
//!
//! This module provides a scripted [`Transport`] for exercising the
//! connector without a running server.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::rpc::{RpcError, Transport};
use crate::value::Value;

/// A call captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Vec<Value>,
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<Value, RpcError>>,
    calls: Vec<RecordedCall>,
}

/// Mock transport that replays queued responses and records every call.
///
/// Clones share state, so a test can keep a handle after moving the
/// transport into a connector.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose first response is `value`.
    pub fn returning(value: impl Into<Value>) -> Self {
        let transport = Self::new();
        transport
            .state
            .try_lock()
            .expect("fresh mock is unlocked")
            .responses
            .push_back(Ok(value.into()));
        transport
    }

    pub async fn push_ok(&self, value: impl Into<Value>) {
        self.state.lock().await.responses.push_back(Ok(value.into()));
    }

    pub async fn push_err(&self, err: RpcError) {
        self.state.lock().await.responses.push_back(Err(err));
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn last_call(&self) -> RecordedCall {
        self.state
            .lock()
            .await
            .calls
            .last()
            .cloned()
            .expect("no calls recorded")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall {
            method: method.to_string(),
            params,
        });
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(RpcError::Protocol("no mock response queued".to_string())))
    }
}

/// Fault as the server would send it for a failing model method.
pub fn fault(message: &str) -> RpcError {
    RpcError::Fault {
        code: 1,
        message: message.to_string(),
    }
}
