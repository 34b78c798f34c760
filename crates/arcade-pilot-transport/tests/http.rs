//! Integration tests for the HTTP transport.
//!
//! These tests spin up a tiny HTTP/1.1 server on a random local port and
//! point a real `HttpTransport` at it, so status normalization and header
//! handling are checked over an actual socket.

#[cfg(feature = "http")]
mod http {
    use arcade_pilot_transport::{
        HttpRequest, HttpTransport, STATUS_OK, Transport, TransportError,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one request with the given status line, content type
    /// and body. Returns the address and a handle yielding the raw request.
    async fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have addr");

        let handle = tokio::spawn(async move {
            let (mut stream, _) =
                listener.accept().await.expect("should accept");
            let raw = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .await
                .expect("should write");
            stream.shutdown().await.ok();
            raw
        });

        (format!("http://{addr}"), handle)
    }

    /// Reads headers plus a `Content-Length` body.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.expect("should read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn transport(origin: &str) -> HttpTransport {
        HttpTransport::builder(origin)
            .user_agent("arcade-pilot-test/1.0")
            .build()
            .expect("should build")
    }

    #[tokio::test]
    async fn test_send_created_response_normalizes_to_ok() {
        let (url, server) =
            serve_once("201 Created", "application/json", r#"{"ok":true}"#).await;

        let res = transport("https://arcade.test")
            .send(HttpRequest::post(url, br#"{"id":1}"#.to_vec()))
            .await
            .expect("2xx should succeed");

        assert_eq!(res.status, STATUS_OK);
        assert!(res.is_json());
        assert_eq!(res.body, br#"{"ok":true}"#);
        let raw = server.await.expect("server task");
        assert!(raw.starts_with("POST / HTTP/1.1"));
        assert!(raw.ends_with(r#"{"id":1}"#));
    }

    #[tokio::test]
    async fn test_send_unauthorized_returns_status_error() {
        let (url, _server) =
            serve_once("401 Unauthorized", "application/json", "{}").await;

        let err = transport("https://arcade.test")
            .send(HttpRequest::get(url))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransportError::Status {
                status: 401,
                reason: "Unauthorized".into()
            }
        );
    }

    #[tokio::test]
    async fn test_send_plain_text_body_is_not_json() {
        let (url, _server) = serve_once("200 OK", "text/plain", "pong").await;

        let res = transport("https://arcade.test")
            .send(HttpRequest::get(url))
            .await
            .expect("should succeed");

        assert!(!res.is_json());
        assert_eq!(res.text(), "pong");
    }

    #[tokio::test]
    async fn test_send_browser_headers_override_request_headers() {
        let (url, server) = serve_once("200 OK", "application/json", "{}").await;

        transport("https://arcade.test")
            .send(
                HttpRequest::get(url)
                    .header("network", "SONIC")
                    .header("Pragma", "from-request"),
            )
            .await
            .expect("should succeed");

        let raw = server.await.expect("server task").to_ascii_lowercase();
        assert!(raw.contains("network: sonic"));
        assert!(raw.contains("pragma: no-cache"));
        assert!(!raw.contains("from-request"));
        assert!(raw.contains("user-agent: arcade-pilot-test/1.0"));
        assert!(raw.contains("origin: https://arcade.test"));
    }

    #[tokio::test]
    async fn test_send_unreachable_host_returns_request_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = transport("https://arcade.test")
            .send(HttpRequest::get(format!("http://{addr}")))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Request(_)));
    }

    #[test]
    fn test_build_rejects_invalid_proxy() {
        let result = HttpTransport::builder("https://arcade.test")
            .proxy(Some("::not a url::".into()))
            .build();
        assert!(matches!(result, Err(TransportError::Build(_))));
    }

    #[test]
    fn test_build_picks_random_user_agent_when_unset() {
        let t = HttpTransport::builder("https://arcade.test")
            .build()
            .expect("should build");
        assert!(
            arcade_pilot_transport::USER_AGENTS.contains(&t.user_agent())
        );
    }
}
