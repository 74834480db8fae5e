//! Email verification codes and password reset tokens.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::{
    OTP_EXPIRATION_MINUTES, OTP_LENGTH, OTP_MAX_ATTEMPTS, RESET_TOKEN_EXPIRATION_MINUTES,
    RESET_TOKEN_SECRET_BYTES,
};

/// Generate a uniformly distributed six digit code.
pub fn generate_otp_code() -> String {
    const RANGE: u32 = 1_000_000;
    // Largest multiple of RANGE below u32::MAX; values above it are redrawn.
    const LIMIT: u32 = u32::MAX - (u32::MAX % RANGE);

    loop {
        let value = OsRng.next_u32();
        if value < LIMIT {
            return format!("{:0width$}", value % RANGE, width = OTP_LENGTH);
        }
    }
}

/// Whether a submitted code has the expected shape.
pub fn is_valid_otp_format(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Stored verification code
#[derive(Debug, Clone)]
pub struct OtpCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code_hash: String,
    pub purpose: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Why a stored code cannot take another guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpRejection {
    Consumed,
    TooManyAttempts,
    Expired,
}

impl OtpCode {
    pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::minutes(OTP_EXPIRATION_MINUTES)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    pub fn has_exceeded_max_attempts(&self) -> bool {
        self.attempts >= OTP_MAX_ATTEMPTS
    }

    /// Checked in this order before an attempt is spent on the code. The
    /// attempt budget itself is enforced by the store when reserving.
    pub fn rejection(&self) -> Option<OtpRejection> {
        if self.is_consumed() {
            Some(OtpRejection::Consumed)
        } else if self.has_exceeded_max_attempts() {
            Some(OtpRejection::TooManyAttempts)
        } else if self.is_expired() {
            Some(OtpRejection::Expired)
        } else {
            None
        }
    }

    pub fn remaining_attempts(&self) -> i32 {
        (OTP_MAX_ATTEMPTS - self.attempts).max(0)
    }
}

/// Stored password reset token
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::minutes(RESET_TOKEN_EXPIRATION_MINUTES)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_usable(&self) -> bool {
        !self.is_used() && !self.is_expired()
    }
}

/// Token handed to the user: `<record id>.<hex secret>`.
///
/// The id locates the stored row, the secret is verified against its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTokenValue {
    pub id: Uuid,
    pub secret: String,
}

impl ResetTokenValue {
    /// Create a token value with a random secret for a new record
    pub fn generate() -> Self {
        let mut bytes = [0u8; RESET_TOKEN_SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let secret = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        Self {
            id: Uuid::new_v4(),
            secret,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (id, secret) = value.trim().split_once('.')?;
        let id = Uuid::parse_str(id).ok()?;
        let expected_len = RESET_TOKEN_SECRET_BYTES * 2;
        if secret.len() != expected_len || !secret.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self {
            id,
            secret: secret.to_string(),
        })
    }
}

impl std::fmt::Display for ResetTokenValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.id, self.secret)
    }
}
