//! Scripted in-memory transport.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::transport::Transport;
use crate::{Result, WxPayError};

/// A request captured by [`MockTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Target URL.
    pub url: String,
    /// XML body as sent.
    pub body: String,
    /// Whether the client certificate was asked for.
    pub use_client_cert: bool,
}

/// Transport that replays queued responses in order and records requests.
///
/// When the queue runs dry, calls fail with a transport error.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Create a transport with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: queue a response body.
    pub fn respond_with(self, body: impl Into<String>) -> Self {
        self.push_response(body);
        self
    }

    /// Builder-style: queue an error.
    pub fn fail_with(self, err: WxPayError) -> Self {
        self.push_error(err);
        self
    }

    /// Queue a response body.
    pub fn push_response(&self, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(body.into()));
    }

    /// Queue an error.
    pub fn push_error(&self, err: WxPayError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, url: &str, body: String, use_client_cert: bool) -> Result<String> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            body,
            use_client_cert,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(WxPayError::Transport("no scripted response left".into())))
    }
}
