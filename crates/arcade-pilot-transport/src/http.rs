//! HTTP transport implementation using `reqwest`.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::{
    HttpRequest, HttpResponse, Method, Transport, TransportError,
    browser_headers, random_user_agent,
};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`Transport`] backed by a `reqwest` client.
///
/// One instance per account: it pins the account's user agent and,
/// when configured, its proxy.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    origin: String,
    user_agent: String,
}

impl HttpTransport {
    /// Creates a new builder.
    pub fn builder(origin: impl Into<String>) -> HttpTransportBuilder {
        HttpTransportBuilder::new(origin)
    }

    /// The user agent this transport presents.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn headers_for(
        &self,
        request: &HttpRequest,
    ) -> Result<HeaderMap, TransportError> {
        let browser = browser_headers(&self.origin, &self.user_agent);
        let pairs = request
            .headers
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .chain(browser.iter().map(|(n, v)| (*n, v.as_str())));

        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                TransportError::Build(format!("invalid header name {name}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                TransportError::Build(format!("invalid value for header {name}"))
            })?;
            // `insert` replaces, so browser headers override request ones.
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let headers = self.headers_for(&request)?;

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        }
        .headers(headers);

        if let Some(body) = request.body {
            tracing::debug!(body = %String::from_utf8_lossy(&body), "request body");
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?
            .to_vec();

        tracing::debug!(
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "response received"
        );

        HttpResponse::normalize(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            content_type,
            body,
        )
    }
}

/// Builder for [`HttpTransport`].
pub struct HttpTransportBuilder {
    origin: String,
    user_agent: Option<String>,
    proxy: Option<String>,
    timeout: Duration,
}

impl HttpTransportBuilder {
    fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            user_agent: None,
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Pins the user agent instead of picking a random one.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Routes every request through the given proxy URL.
    pub fn proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the transport.
    ///
    /// # Errors
    /// Returns [`TransportError::Build`] for an unparsable proxy URL or
    /// when the TLS backend cannot be initialised.
    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let mut client = reqwest::Client::builder().timeout(self.timeout);

        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| TransportError::Build(e.to_string()))?;
            // Rotating proxies commonly re-sign TLS.
            client = client.proxy(proxy).danger_accept_invalid_certs(true);
        }

        let client = client
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| random_user_agent().to_string());

        tracing::debug!(
            origin = %self.origin,
            proxied = self.proxy.is_some(),
            "HTTP transport ready"
        );

        Ok(HttpTransport {
            client,
            origin: self.origin,
            user_agent,
        })
    }
}
