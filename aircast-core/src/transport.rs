use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::error::PipelineError;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Fetches a JSON document from the upstream service.
///
/// Transport failures and bodies that are not JSON are `Network` errors.
/// Judging whether the document means success is left to the caller.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, PipelineError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, PipelineError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "sending request");

        // reqwest errors carry the full URL, `appid` included.
        let res = self.http.get(&url).query(query).send().await.map_err(|err| {
            let err = err.without_url();
            warn!(%url, error = %err, "request failed");
            PipelineError::Network(format!("request to {path} failed: {err}"))
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            let err = err.without_url();
            PipelineError::Network(format!("failed to read response body from {path}: {err}"))
        })?;

        if !status.is_success() {
            warn!(%url, %status, body = %truncate_body(&body), "upstream returned non-success status");
        }

        serde_json::from_str(&body).map_err(|err| {
            PipelineError::Network(format!(
                "invalid JSON from {path} ({status}): {err}: {}",
                truncate_body(&body)
            ))
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Serves one canned HTTP response on a local port and returns its base URL.
    async fn serve_once(status_line: &'static str, content_type: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buf = vec![0_u8; 4096];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.expect("read request");
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write response");
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}")
    }

    /// Base URL of a port nothing listens on.
    async fn refused_base_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        format!("http://{addr}")
    }

    fn query_with_key() -> Vec<(&'static str, String)> {
        vec![("q", "Recife".to_string()), ("appid", "SECRET_KEY_123".to_string())]
    }

    #[tokio::test]
    async fn non_success_json_body_reaches_caller() {
        let base = serve_once(
            "401 Unauthorized",
            "application/json",
            r#"{"cod":401,"message":"Invalid API key"}"#,
        )
        .await;

        let value = HttpTransport::new(base)
            .get_json("/data/2.5/air_pollution", &query_with_key())
            .await
            .expect("JSON body is returned regardless of status");

        assert_eq!(value, json!({ "cod": 401, "message": "Invalid API key" }));
    }

    #[tokio::test]
    async fn html_body_is_network_error() {
        let base = serve_once("502 Bad Gateway", "text/html", "<html>bad gateway</html>").await;

        let err = HttpTransport::new(base)
            .get_json("/data/2.5/forecast", &query_with_key())
            .await
            .unwrap_err();

        match err {
            PipelineError::Network(detail) => {
                assert!(detail.contains("invalid JSON from /data/2.5/forecast"));
                assert!(detail.contains("502"));
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_network_error_without_api_key() {
        let transport = HttpTransport::new(refused_base_url().await);

        let err = transport.get_json("/geo/1.0/direct", &query_with_key()).await.unwrap_err();

        match err {
            PipelineError::Network(detail) => {
                assert!(detail.starts_with("request to /geo/1.0/direct failed"));
                assert!(!detail.contains("SECRET_KEY_123"), "key leaked: {detail}");
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("http://localhost:8080/");
        assert_eq!(transport.base_url(), "http://localhost:8080");
    }

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("{}"), "{}");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "µ".repeat(300);
        let out = truncate_body(&body);

        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }
}
