//! [`RegistryApi`] over the registry's JSON HTTP API.
//!
//! One `reqwest` request per call, no retries, and no client-side timeout:
//! a request that never completes keeps its caller waiting.
//!
//! # Failure reasons
//!
//! Non-2xx responses become [`RegistryError::Status`]. The reason is taken
//! from, in order of preference:
//!
//! 1. the JSON error envelope `{"error": {"code": ..., "message": ...}}`
//!    (or `{"error": "..."}`),
//! 2. the first line of a plain-text body (e.g. `Duplicate detected`); HTML
//!    error pages from proxies are skipped,
//! 3. the canonical status text (e.g. `Internal Server Error`),
//! 4. `Unknown error`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::RegistryApi;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, UNKNOWN_ERROR};
use crate::models::{Settings, Source, SourceDraft};

/// Error bodies are read up to this many bytes.
const MAX_ERROR_BODY: usize = 4 * 1024;

/// HTTP client for the registry API.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: Client,
    base: Url,
    prefix: Vec<String>,
}

impl HttpRegistryClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8081`) with
    /// the API mounted under `api_prefix` (e.g. `/api`).
    pub fn new(base_url: &str, api_prefix: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid registry base URL: {}", base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!(
                "Registry base URL must use http or https, got '{}'",
                base.scheme()
            );
        }

        let prefix = api_prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let client = Client::builder()
            .user_agent(concat!("srcreg/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base,
            prefix,
        })
    }

    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        Self::new(&config.base_url, &config.api_prefix)
    }

    /// Full URL for an API path. Each segment is percent-encoded on its own,
    /// so ids containing `/` or `?` stay a single segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| RegistryError::invalid("registry base URL cannot carry a path"))?;
            path.pop_if_empty();
            for p in &self.prefix {
                path.push(p);
            }
            for s in segments {
                path.push(s);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, RegistryError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "registry request");
        Ok(self.client.request(method, url))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RegistryError> {
        let resp = builder.send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "registry response");
        if status.is_success() {
            return Ok(resp);
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = read_error_body(resp).await;
        Err(RegistryError::status(
            status.as_u16(),
            failure_reason(status, content_type.as_deref(), &body),
        ))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, RegistryError> {
        let resp = self.send(builder).await?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| RegistryError::decode(e.to_string()))
    }
}

#[async_trait]
impl RegistryApi for HttpRegistryClient {
    async fn list_sources(&self) -> Result<Vec<Source>, RegistryError> {
        let req = self.request(Method::GET, &["sources"])?;
        self.send_json(req).await
    }

    async fn create_source(&self, draft: &SourceDraft) -> Result<Source, RegistryError> {
        let req = self.request(Method::POST, &["sources"])?.json(draft);
        self.send_json(req).await
    }

    async fn delete_source(&self, id: &str) -> Result<(), RegistryError> {
        let req = self.request(Method::DELETE, &["sources", id])?;
        self.send(req).await.map(|_| ())
    }

    async fn resync_source(&self, id: &str) -> Result<(), RegistryError> {
        let req = self.request(Method::POST, &["sources", id, "resync"])?;
        self.send(req).await.map(|_| ())
    }

    async fn get_settings(&self) -> Result<Settings, RegistryError> {
        let req = self.request(Method::GET, &["settings"])?;
        self.send_json(req).await
    }

    async fn update_settings(&self, settings: &Settings) -> Result<(), RegistryError> {
        let req = self.request(Method::PUT, &["settings"])?.json(settings);
        self.send(req).await.map(|_| ())
    }
}

async fn read_error_body(mut resp: Response) -> String {
    let mut buf = Vec::new();
    while buf.len() < MAX_ERROR_BODY {
        match resp.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            _ => break,
        }
    }
    buf.truncate(MAX_ERROR_BODY);
    String::from_utf8_lossy(&buf).into_owned()
}

/// A missing content type counts as plain text.
fn is_plain_text(content_type: Option<&str>) -> bool {
    content_type.map_or(true, |ct| {
        ct.trim_start().to_ascii_lowercase().starts_with("text/plain")
    })
}

/// Pick the most specific reason available for a failed response.
pub(crate) fn failure_reason(
    status: StatusCode,
    content_type: Option<&str>,
    body: &str,
) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let message = match &value["error"] {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Object(obj) => obj.get("message").and_then(|m| m.as_str()),
            _ => value["message"].as_str(),
        };
        if let Some(m) = message.map(str::trim).filter(|m| !m.is_empty()) {
            return m.to_string();
        }
    } else if is_plain_text(content_type) {
        if let Some(line) = body.lines().map(str::trim).find(|l| !l.is_empty()) {
            if !line.starts_with('<') {
                return line.to_string();
            }
        }
    }

    status
        .canonical_reason()
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_from_json_envelope() {
        let body = r#"{"error":{"code":"INTERNAL_ERROR","message":"db down"},"correlationId":"x"}"#;
        assert_eq!(
            failure_reason(
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("application/json"),
                body
            ),
            "db down"
        );
    }

    #[test]
    fn test_reason_from_string_error_field() {
        let body = r#"{"error":"not allowed"}"#;
        assert_eq!(failure_reason(StatusCode::FORBIDDEN, None, body), "not allowed");
    }

    #[test]
    fn test_reason_from_plain_text() {
        assert_eq!(
            failure_reason(
                StatusCode::CONFLICT,
                Some("text/plain; charset=utf-8"),
                "Duplicate detected\n"
            ),
            "Duplicate detected"
        );
    }

    #[test]
    fn test_reason_falls_back_to_status_text() {
        assert_eq!(
            failure_reason(StatusCode::SERVICE_UNAVAILABLE, None, ""),
            "Service Unavailable"
        );
        assert_eq!(failure_reason(StatusCode::NOT_FOUND, None, "{}"), "Not Found");
    }

    #[test]
    fn test_reason_unknown_for_nonstandard_status() {
        let status = StatusCode::from_u16(599).unwrap();
        assert_eq!(failure_reason(status, None, "  "), UNKNOWN_ERROR);
    }

    const NGINX_502: &str = "<html>\r\n<head><title>502 Bad Gateway</title></head>\r\n<body>\r\n<center><h1>502 Bad Gateway</h1></center>\r\n<hr><center>nginx</center>\r\n</body>\r\n</html>\r\n";

    #[test]
    fn test_html_error_page_uses_status_text() {
        assert_eq!(
            failure_reason(StatusCode::BAD_GATEWAY, Some("text/html"), NGINX_502),
            "Bad Gateway"
        );
        // Markup is skipped even when the proxy sends no content type.
        assert_eq!(
            failure_reason(StatusCode::BAD_GATEWAY, None, NGINX_502),
            "Bad Gateway"
        );
    }

    #[test]
    fn test_non_text_body_uses_status_text() {
        assert_eq!(
            failure_reason(
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("application/octet-stream"),
                "stack trace follows"
            ),
            "Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_error_body_read_is_capped() {
        let body = "x".repeat(MAX_ERROR_BODY * 4);
        let resp = Response::from(axum::http::Response::new(body));
        assert_eq!(read_error_body(resp).await.len(), MAX_ERROR_BODY);
    }

    #[test]
    fn test_endpoint_joins_prefix_and_encodes_ids() {
        let client = HttpRegistryClient::new("http://localhost:8081/", "/api").unwrap();
        assert_eq!(
            client.endpoint(&["sources"]).unwrap().as_str(),
            "http://localhost:8081/api/sources"
        );
        assert_eq!(
            client
                .endpoint(&["sources", "a/b c", "resync"])
                .unwrap()
                .as_str(),
            "http://localhost:8081/api/sources/a%2Fb%20c/resync"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = HttpRegistryClient::new("https://example.com/registry", "api/v1").unwrap();
        assert_eq!(
            client.endpoint(&["settings"]).unwrap().as_str(),
            "https://example.com/registry/api/v1/settings"
        );
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(HttpRegistryClient::new("ftp://example.com", "/api").is_err());
        assert!(HttpRegistryClient::new("localhost", "/api").is_err());
    }
}
