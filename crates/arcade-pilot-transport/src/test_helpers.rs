//! A scripted in-memory [`Transport`] for tests in this and dependent crates.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::{HttpRequest, HttpResponse, Transport, TransportError};

/// Replays queued replies in order and records every request.
///
/// When the queue runs dry, `send` fails with a [`TransportError::Request`]
/// so a test that issues more calls than it scripted fails loudly.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a 2xx reply with a JSON body.
    pub fn push_json(&self, body: impl Into<String>) -> &Self {
        let body: String = body.into();
        lock(&self.replies).push_back(Ok(HttpResponse::json(body.into_bytes())));
        self
    }

    /// Queues a 2xx reply with a non-JSON body.
    pub fn push_text(&self, body: impl Into<String>) -> &Self {
        let body: String = body.into();
        lock(&self.replies).push_back(Ok(HttpResponse {
            status: crate::STATUS_OK,
            content_type: Some("text/plain".to_string()),
            body: body.into_bytes(),
        }));
        self
    }

    /// Queues a non-2xx reply.
    pub fn push_status(&self, status: u16, reason: &str) -> &Self {
        lock(&self.replies).push_back(Err(TransportError::Status {
            status,
            reason: reason.to_string(),
        }));
        self
    }

    /// Queues an arbitrary failure.
    pub fn push_error(&self, error: TransportError) -> &Self {
        lock(&self.replies).push_back(Err(error));
        self
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.sent).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.sent).len()
    }

    /// Replies still waiting to be consumed.
    pub fn pending_replies(&self) -> usize {
        lock(&self.replies).len()
    }
}

impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        lock(&self.sent).push(request);
        let next = lock(&self.replies).pop_front();
        next.unwrap_or_else(|| {
            Err(TransportError::Request("no scripted reply left".to_string()))
        })
    }
}
