//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_AGENT_API_URL, DEFAULT_APP_BASE_URL, DEFAULT_CHATBOT_API_URL, DEFAULT_DATABASE_URL,
    DEFAULT_GOOGLE_TOKENINFO_URL, DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_JWT_EXPIRATION_HOURS,
    DEFAULT_REDIS_URL, DEFAULT_SCRAPER_API_URL, DEFAULT_WIDGET_SCRIPT_URL, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    /// Public URL of the web app, used to build links in emails
    pub app_base_url: String,
    /// Script URL placed in the embed snippet
    pub widget_script_url: String,
    pub agent_api_url: String,
    pub scraper_api_url: String,
    pub chatbot_api_url: String,
    /// OAuth client id that Google ID tokens must be issued for
    pub google_client_id: Option<String>,
    pub google_tokeninfo_url: String,
    pub http_timeout_seconds: u64,
    /// Take client addresses from `X-Forwarded-For` / `X-Real-IP`. Only safe
    /// when a reverse proxy in front of us overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("app_base_url", &self.app_base_url)
            .field("widget_script_url", &self.widget_script_url)
            .field("agent_api_url", &self.agent_api_url)
            .field("scraper_api_url", &self.scraper_api_url)
            .field("chatbot_api_url", &self.chatbot_api_url)
            .field("google_client_id", &self.google_client_id)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let google_client_id = env::var("GOOGLE_CLIENT_ID")
            .ok()
            .filter(|id| !id.trim().is_empty());
        if google_client_id.is_none() {
            tracing::warn!("GOOGLE_CLIENT_ID not set, Google sign-in is disabled");
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS")
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            app_base_url: url_var("APP_BASE_URL", DEFAULT_APP_BASE_URL),
            widget_script_url: env::var("WIDGET_SCRIPT_URL")
                .unwrap_or_else(|_| DEFAULT_WIDGET_SCRIPT_URL.to_string()),
            agent_api_url: url_var("AGENT_API_URL", DEFAULT_AGENT_API_URL),
            scraper_api_url: url_var("SCRAPER_API_URL", DEFAULT_SCRAPER_API_URL),
            chatbot_api_url: url_var("CHATBOT_API_URL", DEFAULT_CHATBOT_API_URL),
            google_client_id,
            google_tokeninfo_url: env::var("GOOGLE_TOKENINFO_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_TOKENINFO_URL.to_string()),
            http_timeout_seconds: parse_var("HTTP_TIMEOUT_SECONDS")
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS),
            trust_proxy_headers: parse_var("TRUST_PROXY_HEADERS").unwrap_or(false),
        }
    }

    /// Configuration for tests: local defaults and a fixed secret.
    pub fn for_tests() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: "test-secret-key-for-testing-only-32chars".to_string(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            app_base_url: DEFAULT_APP_BASE_URL.to_string(),
            widget_script_url: DEFAULT_WIDGET_SCRIPT_URL.to_string(),
            agent_api_url: DEFAULT_AGENT_API_URL.to_string(),
            scraper_api_url: DEFAULT_SCRAPER_API_URL.to_string(),
            chatbot_api_url: DEFAULT_CHATBOT_API_URL.to_string(),
            google_client_id: Some("test-client-id.apps.googleusercontent.com".to_string()),
            google_tokeninfo_url: DEFAULT_GOOGLE_TOKENINFO_URL.to_string(),
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            trust_proxy_headers: false,
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Link the user follows to choose a new password.
    pub fn password_reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.app_base_url, token)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Base URLs are stored without a trailing slash so paths can be appended.
fn url_var(name: &str, default: &str) -> String {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::for_tests();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-secret-key"));
    }

    #[test]
    fn test_password_reset_link() {
        let config = Config::for_tests();
        assert_eq!(
            config.password_reset_link("abc.def"),
            "http://localhost:3001/reset-password?token=abc.def"
        );
    }
}
