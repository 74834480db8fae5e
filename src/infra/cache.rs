//! Redis cache implementation.
//!
//! Backs the per-client rate limits and the OTP resend cooldowns.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError, Script};

use crate::config::{Config, CACHE_PREFIX_OTP_COOLDOWN, CACHE_PREFIX_RATE_LIMIT};
use crate::errors::{AppError, AppResult};

/// Time-boxed "only once per window" guard.
#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Start a cooldown for `key`. Returns `None` when it was started and
    /// `Some(remaining_seconds)` when one is already running.
    async fn start_cooldown(&self, key: &str, seconds: u64) -> AppResult<Option<u64>>;
}

/// Hits counted in the current fixed window of one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub count: u64,
    /// Seconds until the window closes and the count starts over
    pub resets_in: u64,
}

/// Fixed-window request counter.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one request for `identifier` and report the window it fell in.
    async fn check_rate_limit(
        &self,
        identifier: &str,
        window_seconds: u64,
    ) -> AppResult<RateLimitWindow>;
}

/// INCR and EXPIRE run as one script so a counter can never be left without
/// a TTL. Keys that somehow lost theirs get it back on the next hit.
const RATE_LIMIT_LUA: &str = r"
local count = redis.call('INCR', KEYS[1])
local ttl = redis.call('TTL', KEYS[1])
if count == 1 or ttl < 0 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
    ttl = tonumber(ARGV[1])
end
return {count, ttl}
";

static RATE_LIMIT_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(RATE_LIMIT_LUA));

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }

    /// Round trip to Redis for health checks.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }
}

#[async_trait]
impl RateLimiter for Cache {
    async fn check_rate_limit(
        &self,
        identifier: &str,
        window_seconds: u64,
    ) -> AppResult<RateLimitWindow> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let (count, ttl): (i64, i64) = RATE_LIMIT_SCRIPT
            .key(&key)
            .arg(window_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(RateLimitWindow {
            count: count.max(0) as u64,
            resets_in: ttl.max(1) as u64,
        })
    }
}

#[async_trait]
impl CooldownStore for Cache {
    async fn start_cooldown(&self, key: &str, seconds: u64) -> AppResult<Option<u64>> {
        let key = format!("{}{}", CACHE_PREFIX_OTP_COOLDOWN, key);
        let mut conn = self.connection.clone();

        let started: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(seconds)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        if started.is_some() {
            return Ok(None);
        }

        let ttl: i64 = conn.ttl(&key).await.map_err(cache_error)?;
        // TTL can race with expiry; report at least one second
        Ok(Some(ttl.max(1) as u64))
    }
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
