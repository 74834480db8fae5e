//! Rate limiting middleware using Redis cache.

use axum::{
    extract::{ConnectInfo, FromRef, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::AppState;
use crate::config::{
    RATE_LIMIT_AUTH_REQUESTS, RATE_LIMIT_AUTH_WINDOW_SECONDS, RATE_LIMIT_REQUESTS,
    RATE_LIMIT_WINDOW_SECONDS,
};
use crate::errors::AppError;
use crate::infra::RateLimiter;

/// What the rate limit middlewares need from the application state.
#[derive(Clone)]
pub struct RateLimits {
    limiter: Arc<dyn RateLimiter>,
    trust_proxy_headers: bool,
}

impl RateLimits {
    pub fn new(limiter: Arc<dyn RateLimiter>, trust_proxy_headers: bool) -> Self {
        Self {
            limiter,
            trust_proxy_headers,
        }
    }
}

impl FromRef<AppState> for RateLimits {
    fn from_ref(state: &AppState) -> Self {
        state.rate_limits.clone()
    }
}

/// Client address from a proxy header, first hop wins.
fn forwarded_client(request: &Request) -> Option<String> {
    let forwarded = request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        request
            .headers()
            .get("X-Real-IP")
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded.or_else(real_ip).map(str::to_string)
}

/// Extract client identifier for rate limiting.
///
/// Proxy headers are client-controlled unless a proxy rewrites them, so
/// they are only read when `trust_proxy_headers` is set.
fn get_client_identifier(request: &Request, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(ip) = forwarded_client(request) {
            return ip;
        }
    }

    if let Some(connect_info) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip().to_string();
    }

    "unknown".to_string()
}

/// Count the request against `scope` and reject it once over `limit`.
async fn enforce(
    limits: &RateLimits,
    scope: &str,
    limit: u64,
    window_seconds: u64,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_id = get_client_identifier(&request, limits.trust_proxy_headers);
    let key = format!("{}:{}", scope, client_id);

    let window = match limits.limiter.check_rate_limit(&key, window_seconds).await {
        Ok(window) => window,
        Err(e) => {
            // Fail closed: deny when Redis is unavailable
            tracing::error!(error = %e, scope, "Rate limit check failed - denying request");
            return Err(AppError::RateLimited {
                retry_after: window_seconds,
            });
        }
    };

    if window.count > limit {
        tracing::warn!(client = %client_id, scope, count = window.count, "Rate limit exceeded");
        return Err(AppError::RateLimited {
            retry_after: window.resets_in,
        });
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));
    headers.insert(
        "X-RateLimit-Remaining",
        HeaderValue::from(limit.saturating_sub(window.count)),
    );
    headers.insert("X-RateLimit-Reset", HeaderValue::from(window.resets_in));

    Ok(response)
}

/// General rate limiting middleware.
/// Limits requests to RATE_LIMIT_REQUESTS per RATE_LIMIT_WINDOW_SECONDS.
pub async fn rate_limit_middleware(
    State(limits): State<RateLimits>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(
        &limits,
        "general",
        RATE_LIMIT_REQUESTS,
        RATE_LIMIT_WINDOW_SECONDS,
        request,
        next,
    )
    .await
}

/// Stricter rate limiting for authentication endpoints.
/// Limits requests to RATE_LIMIT_AUTH_REQUESTS per RATE_LIMIT_AUTH_WINDOW_SECONDS.
pub async fn rate_limit_auth_middleware(
    State(limits): State<RateLimits>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(
        &limits,
        "auth",
        RATE_LIMIT_AUTH_REQUESTS,
        RATE_LIMIT_AUTH_WINDOW_SECONDS,
        request,
        next,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header::RETRY_AFTER, StatusCode},
        middleware,
        routing::post,
        Router,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tower::ServiceExt;

    use crate::errors::AppResult;
    use crate::infra::RateLimitWindow;

    /// In-memory counter; every window lasts 30 more seconds.
    #[derive(Default)]
    struct CountingLimiter {
        hits: Mutex<HashMap<String, u64>>,
    }

    #[async_trait]
    impl RateLimiter for CountingLimiter {
        async fn check_rate_limit(
            &self,
            identifier: &str,
            _window_seconds: u64,
        ) -> AppResult<RateLimitWindow> {
            let mut hits = self.hits.lock().unwrap();
            let count = hits.entry(identifier.to_string()).or_insert(0);
            *count += 1;
            Ok(RateLimitWindow {
                count: *count,
                resets_in: 30,
            })
        }
    }

    struct BrokenLimiter;

    #[async_trait]
    impl RateLimiter for BrokenLimiter {
        async fn check_rate_limit(&self, _: &str, _: u64) -> AppResult<RateLimitWindow> {
            Err(AppError::internal("Cache error: connection refused"))
        }
    }

    fn auth_app(limiter: Arc<dyn RateLimiter>, trust_proxy_headers: bool) -> Router {
        let limits = RateLimits::new(limiter, trust_proxy_headers);
        Router::new()
            .route("/auth/login", post(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(
                limits,
                rate_limit_auth_middleware,
            ))
    }

    fn login_from(peer: &str, forwarded_for: Option<&str>) -> Request {
        let mut builder = Request::builder().method("POST").uri("/auth/login");
        if let Some(ip) = forwarded_for {
            builder = builder.header("X-Forwarded-For", ip);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        let addr: SocketAddr = format!("{}:40000", peer).parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    fn request_with(header: Option<(&str, &str)>) -> Request {
        let mut builder = Request::builder().uri("/");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_auth_limit_rejects_after_budget() {
        let app = auth_app(Arc::new(CountingLimiter::default()), false);

        for sent in 1..=RATE_LIMIT_AUTH_REQUESTS {
            let response = app
                .clone()
                .oneshot(login_from("203.0.113.7", None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers()["X-RateLimit-Limit"],
                RATE_LIMIT_AUTH_REQUESTS.to_string().as_str()
            );
            assert_eq!(
                response.headers()["X-RateLimit-Remaining"],
                (RATE_LIMIT_AUTH_REQUESTS - sent).to_string().as_str()
            );
            assert_eq!(response.headers()["X-RateLimit-Reset"], "30");
        }

        let response = app
            .oneshot(login_from("203.0.113.7", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "30");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "TOO_MANY_REQUESTS");
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_does_not_reset_budget() {
        let app = auth_app(Arc::new(CountingLimiter::default()), false);

        for n in 0..RATE_LIMIT_AUTH_REQUESTS {
            let spoofed = format!("198.51.100.{}", n);
            let response = app
                .clone()
                .oneshot(login_from("203.0.113.7", Some(spoofed.as_str())))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(login_from("203.0.113.7", Some("198.51.100.250")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_clients_are_counted_separately() {
        let app = auth_app(Arc::new(CountingLimiter::default()), false);

        for _ in 0..RATE_LIMIT_AUTH_REQUESTS {
            app.clone()
                .oneshot(login_from("203.0.113.7", None))
                .await
                .unwrap();
        }

        let other = app
            .oneshot(login_from("203.0.113.8", None))
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cache_failure_denies_request() {
        let app = auth_app(Arc::new(BrokenLimiter), false);

        let response = app
            .oneshot(login_from("203.0.113.7", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers()[RETRY_AFTER],
            RATE_LIMIT_AUTH_WINDOW_SECONDS.to_string().as_str()
        );
    }

    #[test]
    fn test_proxy_headers_ignored_by_default() {
        let mut req = request_with(Some(("X-Forwarded-For", "203.0.113.7")));
        let addr: SocketAddr = "192.0.2.1:5555".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(get_client_identifier(&req, false), "192.0.2.1");
    }

    #[test]
    fn test_forwarded_for_uses_first_hop_behind_proxy() {
        let req = request_with(Some(("X-Forwarded-For", "203.0.113.7, 10.0.0.1")));
        assert_eq!(get_client_identifier(&req, true), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback_behind_proxy() {
        let req = request_with(Some(("X-Real-IP", "198.51.100.4")));
        assert_eq!(get_client_identifier(&req, true), "198.51.100.4");
    }

    #[test]
    fn test_connect_info_when_proxy_sent_nothing() {
        let mut req = request_with(None);
        let addr: SocketAddr = "192.0.2.1:5555".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(get_client_identifier(&req, true), "192.0.2.1");
    }

    #[test]
    fn test_unknown_client() {
        assert_eq!(get_client_identifier(&request_with(None), false), "unknown");
    }
}
