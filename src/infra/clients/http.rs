//! Shared JSON-over-HTTP plumbing for the external service clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::HTTP_USER_AGENT;
use crate::domain::is_valid_company_id;
use crate::errors::{AppError, AppResult};

/// Build the reqwest client every external integration uses.
pub fn build_http_client(timeout_seconds: u64) -> AppResult<Client> {
    Client::builder()
        .user_agent(HTTP_USER_AGENT)
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))
}

/// Ensure a value can be interpolated into an upstream URL path.
pub fn path_segment(value: &str) -> AppResult<&str> {
    if is_valid_company_id(value) {
        Ok(value)
    } else {
        Err(AppError::bad_request("Invalid identifier"))
    }
}

/// JSON client bound to one external service.
#[derive(Clone)]
pub struct JsonClient {
    http: Client,
    base_url: String,
    service: &'static str,
}

impl std::fmt::Debug for JsonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl JsonClient {
    pub fn new(service: &'static str, http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self.send(self.http.get(self.url(path))).await?;
        self.decode(response).await
    }

    /// GET where an upstream 404 means "nothing there". Any other non-2xx
    /// status is still an upstream failure.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> AppResult<Option<T>> {
        let response = self.dispatch(self.http.get(self.url(path))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.check(response).await?;
        self.decode(response).await.map(Some)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.http.post(self.url(path)).json(body)).await?;
        self.decode(response).await
    }

    /// PUT whose response body is ignored.
    pub async fn put<B>(&self, path: &str, body: &B) -> AppResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.http.put(self.url(path)).json(body)).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = self.dispatch(request).await?;
        self.check(response).await
    }

    async fn dispatch(&self, request: RequestBuilder) -> AppResult<Response> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::upstream(format!("{} timed out: {}", self.service, e))
            } else {
                AppError::upstream(format!("{} request failed: {}", self.service, e))
            }
        })
    }

    async fn check(&self, response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            service = self.service,
            status = %status,
            body = %body,
            "Upstream returned an error"
        );
        Err(map_status(self.service, status))
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> AppResult<T> {
        response.json::<T>().await.map_err(|e| {
            AppError::upstream(format!("{} sent an unreadable response: {}", self.service, e))
        })
    }
}

/// Every non-2xx upstream status is reported to our caller as 502. Their
/// validation and throttling decisions are not ours to relay.
fn map_status(service: &str, status: StatusCode) -> AppError {
    AppError::upstream(format!("{} returned {}", service, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::NOT_FOUND,
            StatusCode::UNPROCESSABLE_ENTITY,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let error = map_status("agent", status);
            assert_eq!(error.status(), axum::http::StatusCode::BAD_GATEWAY, "{}", status);
            assert_eq!(error.code(), "UPSTREAM_ERROR");
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = JsonClient::new("agent", Client::new(), "http://agent.local/");
        assert_eq!(client.url("/chat"), "http://agent.local/chat");
    }

    #[test]
    fn test_path_segment() {
        assert!(path_segment("job_123-abc").is_ok());
        assert!(path_segment("../admin").is_err());
        assert!(path_segment("a/b").is_err());
    }
}
