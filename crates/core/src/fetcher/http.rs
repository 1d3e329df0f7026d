//! `reqwest`-backed asset fetcher.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

use super::config::FetcherConfig;
use super::decorator::HostDecorators;
use super::error::FetchError;
use super::traits::AssetFetcher;
use crate::catalog::parse_absolute_url;
use crate::metrics;

/// Fetches assets over HTTP(S) with a bounded timeout and per-host decorators.
pub struct HttpFetcher {
    client: Client,
    decorators: HostDecorators,
}

impl HttpFetcher {
    /// Builds a fetcher, compiling the configured host rules.
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let decorators = HostDecorators::compile(&config.host_rules)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Configuration(e.to_string()))?;

        Ok(Self { client, decorators })
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(&FetcherConfig::default())
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = parse_absolute_url(url).ok_or_else(|| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(FetchError::UnsupportedScheme {
                    url: url.to_string(),
                    scheme: other.to_string(),
                })
            }
        }

        let host = parsed.host_str().unwrap_or_default();
        let headers = self.decorators.headers_for(host);
        debug!(url, decorated = !headers.is_empty(), "Fetching asset");

        let response = self
            .client
            .get(parsed)
            .headers(headers)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(body.to_vec())
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let start = Instant::now();
        let result = self.get(url).await;

        let label = if result.is_ok() { "success" } else { "failed" };
        metrics::FETCH_DURATION
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::HostRule;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves `response` to every connection and records the raw request heads.
    async fn serve(response: &'static [u8]) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    recorded
                        .lock()
                        .unwrap()
                        .push(String::from_utf8_lossy(&buf).to_string());
                    let _ = socket.write_all(response).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}", addr), requests)
    }

    const OK: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello";
    const NOT_FOUND: &[u8] =
        b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const UNAVAILABLE: &[u8] =
        b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

    #[tokio::test]
    async fn test_fetch_success() {
        let (base, requests) = serve(OK).await;
        let fetcher = HttpFetcher::with_defaults().unwrap();

        let body = fetcher.fetch(&format!("{}/a.jpg", base)).await.unwrap();
        assert_eq!(body, b"hello");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("GET /a.jpg HTTP/1.1"));
        assert!(requests[0].to_ascii_lowercase().contains("user-agent: reelsync/"));
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_permanent() {
        let (base, _) = serve(NOT_FOUND).await;
        let fetcher = HttpFetcher::with_defaults().unwrap();

        let err = fetcher.fetch(&format!("{}/missing.jpg", base)).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_retryable() {
        let (base, _) = serve(UNAVAILABLE).await;
        let fetcher = HttpFetcher::with_defaults().unwrap();

        let err = fetcher.fetch(&format!("{}/a.jpg", base)).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_applies_host_rule() {
        let (base, requests) = serve(OK).await;
        let config = FetcherConfig::default().with_host_rule(
            HostRule::new(r"^127\.0\.0\.1$")
                .with_cookie("session", "s3cret")
                .with_header("X-Mirror", "reelsync"),
        );
        let fetcher = HttpFetcher::new(&config).unwrap();

        fetcher.fetch(&format!("{}/a.jpg", base)).await.unwrap();

        let request = requests.lock().unwrap()[0].to_ascii_lowercase();
        assert!(request.contains("cookie: session=s3cret"));
        assert!(request.contains("x-mirror: reelsync"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url() {
        let fetcher = HttpFetcher::with_defaults().unwrap();

        let err = fetcher.fetch("not-a-url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));

        let err = fetcher.fetch("").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_unsupported_scheme() {
        let fetcher = HttpFetcher::with_defaults().unwrap();
        let err = fetcher.fetch("ftp://example.com/a.jpg").await.unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let fetcher = HttpFetcher::new(&FetcherConfig::default().with_timeout_secs(1)).unwrap();
        let err = fetcher
            .fetch(&format!("http://{}/slow.jpg", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_new_rejects_bad_host_rule() {
        let config = FetcherConfig::default().with_host_rule(HostRule::new("[z-a]"));
        assert!(matches!(
            HttpFetcher::new(&config),
            Err(FetchError::Configuration(_))
        ));
    }
}
