//! REST client for the marker API.
//!
//! `GET /api/markers`, `POST /api/markers` and `DELETE /api/markers/{id}`,
//! authenticated with a bearer token when one is available.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{RemoteResult, RemoteStore};
use crate::error::{ConfigError, RemoteError};
use crate::models::{MarkerId, NewMarker};
use crate::util::{compact_text, is_http_url, normalize_text_option};

#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    base_url: String,
    access_token: Option<String>,
    client: Client,
}

impl HttpRemoteStore {
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = Client::builder()
            .build()
            .map_err(|error| ConfigError::Invalid(format!("failed to build HTTP client: {error}")))?;
        Ok(Self {
            base_url,
            access_token: normalize_text_option(access_token),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn markers_url(&self) -> String {
        format!("{}/api/markers", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Accept", "application/json");
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl RemoteStore for HttpRemoteStore {
    async fn list(&self) -> RemoteResult<Value> {
        let response = self
            .authorize(self.client.get(self.markers_url()))
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response).await?;
        response.json::<Value>().await.map_err(map_transport_error)
    }

    async fn create(&self, marker: NewMarker) -> RemoteResult<Value> {
        let response = self
            .authorize(self.client.post(self.markers_url()))
            .json(&marker)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response).await?;
        response.json::<Value>().await.map_err(map_transport_error)
    }

    async fn delete(&self, id: &MarkerId) -> RemoteResult<()> {
        let url = format!(
            "{}/{}",
            self.markers_url(),
            urlencoding::encode(id.as_str())
        );
        let response = self
            .authorize(self.client.delete(url))
            .send()
            .await
            .map_err(map_transport_error)?;

        // Already gone is as good as deleted.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: reqwest::Response) -> RemoteResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(map_status(status, &body))
}

fn map_transport_error(error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        RemoteError::Timeout
    } else if error.is_connect() || error.is_request() {
        RemoteError::Network
    } else if error.is_decode() {
        RemoteError::InvalidResponse(error.to_string())
    } else {
        RemoteError::Other(error.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: Option<Value>,
    message: Option<String>,
    error: Option<String>,
}

fn map_status(status: StatusCode, body: &str) -> RemoteError {
    let message = parse_api_error(status, body);
    match status.as_u16() {
        401 | 403 => RemoteError::PermissionDenied,
        400 | 409 | 413 | 422 => RemoteError::Validation(message),
        408 => RemoteError::Timeout,
        429 | 500 | 502 | 503 | 504 => RemoteError::Unavailable,
        _ => RemoteError::Other(message),
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        let detail = payload.detail.map(|detail| match detail {
            Value::String(text) => text,
            other => other.to_string(),
        });
        if let Some(message) = payload.message.or(payload.error).or(detail) {
            return format!("{} ({})", compact_text(&message), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact_text(trimmed), status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> Result<String, ConfigError> {
    let base_url = normalize_text_option(Some(raw))
        .ok_or_else(|| ConfigError::Invalid("API base URL must not be empty".to_string()))?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::Invalid(
            "API base URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_requires_http_scheme_and_drops_trailing_slash() {
        let store = HttpRemoteStore::new("https://api.example.com/", None).unwrap();
        assert_eq!(store.base_url(), "https://api.example.com");
        assert_eq!(store.markers_url(), "https://api.example.com/api/markers");
        assert!(HttpRemoteStore::new("api.example.com", None).is_err());
        assert!(HttpRemoteStore::new("  ", None).is_err());
    }

    #[test]
    fn status_codes_map_to_error_kinds() {
        assert_eq!(
            map_status(StatusCode::FORBIDDEN, ""),
            RemoteError::PermissionDenied
        );
        assert_eq!(
            map_status(StatusCode::SERVICE_UNAVAILABLE, ""),
            RemoteError::Unavailable
        );
        assert_eq!(
            map_status(StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":"bad category"}"#),
            RemoteError::Validation("bad category (422)".to_string())
        );
        assert!(matches!(
            map_status(StatusCode::IM_A_TEAPOT, "short and stout"),
            RemoteError::Other(message) if message.contains("418")
        ));
    }

    #[test]
    fn api_error_falls_back_to_status_for_empty_body() {
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
    }
}
