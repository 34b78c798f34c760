//! Transport abstraction layer for arcade-pilot.
//!
//! Provides the [`Transport`] trait: "perform an HTTP request, return the
//! status and body". Everything above this crate talks to the backend
//! through it, so tests can swap the network for a scripted double.
//!
//! Successful responses are normalized: any 2xx becomes a logical status
//! of 200. Anything else is turned into [`TransportError::Status`].
//!
//! # Feature Flags
//!
//! - `http` (default) — real HTTP transport via `reqwest`
//! - `test-helpers` — [`test_helpers::ScriptedTransport`], an in-memory double

mod agents;
mod error;
#[cfg(feature = "http")]
mod http;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use agents::{USER_AGENTS, random_user_agent};
pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::{HttpTransport, HttpTransportBuilder};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The logical status every 2xx response is normalized to.
pub const STATUS_OK: u16 = 200;

/// HTTP verbs used against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// An outbound request, independent of any HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Request-specific headers. The transport adds its browser
    /// headers on top, and those win on a name clash.
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A body-less GET.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST carrying an already-encoded body.
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Adds a header, builder style.
    pub fn header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Looks up a header by name, ignoring ASCII case.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A normalized response: `status` is always [`STATUS_OK`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Normalizes a raw status line into a response or an error.
    ///
    /// 2xx is remapped to [`STATUS_OK`]; everything else fails with
    /// [`TransportError::Status`] carrying the original status and reason.
    pub fn normalize(
        status: u16,
        reason: &str,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Result<Self, TransportError> {
        if (200..300).contains(&status) {
            Ok(Self {
                status: STATUS_OK,
                content_type,
                body,
            })
        } else {
            Err(TransportError::Status {
                status,
                reason: reason.to_string(),
            })
        }
    }

    /// A normalized JSON response. Mostly useful for test doubles.
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: STATUS_OK,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    /// Whether the backend declared a JSON body.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }

    /// The body as (lossy) UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Headers every request carries so the backend sees a regular browser.
///
/// `origin` doubles as the `Referer`.
pub fn browser_headers(
    origin: &str,
    user_agent: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("Accept", "application/json".to_string()),
        ("Accept-Language", "en-US,en;q=0.9,id;q=0.8".to_string()),
        ("Content-Type", "application/json".to_string()),
        ("Sec-Fetch-Dest", "empty".to_string()),
        ("Sec-Fetch-Site", "cross-site".to_string()),
        ("Sec-Fetch-Mode", "cors".to_string()),
        ("Origin", origin.to_string()),
        ("Pragma", "no-cache".to_string()),
        ("Referer", origin.to_string()),
        ("User-Agent", user_agent.to_string()),
    ]
}

/// Performs HTTP requests against the backend.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one transport lives as long as its
///   account worker, which runs on any thread of the Tokio pool.
/// - The returned future is `Send` for the same reason.
pub trait Transport: Send + Sync + 'static {
    /// Sends the request and returns the normalized response.
    ///
    /// # Errors
    /// - [`TransportError::Status`] — the backend answered non-2xx
    /// - [`TransportError::Request`] — no response at all
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        T::send(self.as_ref(), request)
    }
}
