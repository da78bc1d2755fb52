use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::{ConfigTransport, TransportError};

/// Default transport: one plain GET per call.
///
/// The body is returned whatever the response status; deciding whether it
/// is a usable config is left to the decoder. No retries, no caching
/// headers and no timeout are added here; the underlying client's own
/// limits still apply.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Use an existing client, e.g. one with a proxy or custom TLS roots.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConfigTransport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        debug!("=== Config Request ===");
        debug!("URL: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        debug!("=== Config Response ===");
        debug!("Status: {}", status);

        if !status.is_success() {
            warn!("Config server responded with status {} for {}", status, url);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(format!("failed to read response body: {}", e)))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::ConfigReference;
    use crate::loader::{ConfigLoader, LoadError};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on a loopback port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            assert!(request.starts_with(b"GET /cfg.json "));

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        Url::parse(&format!("http://{}/cfg.json", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_get_returns_body() {
        let url = serve_once("HTTP/1.1 200 OK", r#"{"model":"m1"}"#).await;
        let body = HttpTransport::new().get(&url).await.unwrap();
        assert_eq!(body, br#"{"model":"m1"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_get_returns_body_of_error_status() {
        let url = serve_once("HTTP/1.1 404 Not Found", "missing").await;
        let body = HttpTransport::new().get(&url).await.unwrap();
        assert_eq!(body, b"missing".to_vec());
    }

    #[tokio::test]
    async fn test_error_page_is_parse_failure() {
        let url = serve_once("HTTP/1.1 404 Not Found", "<html>Not Found</html>").await;
        let loader = ConfigLoader::with_transport(Arc::new(HttpTransport::new()));

        let err = loader.load(ConfigReference::RemoteUrl(url)).await.unwrap_err();
        assert!(matches!(err, LoadError::ParseFailure { .. }), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_json_body_with_error_status_is_accepted() {
        let url = serve_once("HTTP/1.1 500 Internal Server Error", r#"{"model":"m1","config":{}}"#).await;
        let loader = ConfigLoader::with_transport(Arc::new(HttpTransport::new()));

        let config = loader.load(ConfigReference::RemoteUrl(url)).await.unwrap();
        assert_eq!(config.model(), &serde_json::json!("m1"));
    }

    #[tokio::test]
    async fn test_get_reports_connection_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/cfg.json", addr)).unwrap();
        let err = HttpTransport::new().get(&url).await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)), "got {:?}", err);
    }
}
