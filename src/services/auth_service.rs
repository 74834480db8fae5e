//! Authentication service - signup with email verification, password login,
//! password reset and Google sign-in.
//!
//! Accounts and their one-time secrets go through the Unit of Work; resend
//! cooldowns live in the cache and emails are handed to the mail queue.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    Config, OTP_MAX_ATTEMPTS, OTP_PURPOSE_EMAIL_VERIFICATION, OTP_RESEND_COOLDOWN_SECONDS,
    SECONDS_PER_HOUR, TOKEN_TYPE_BEARER,
};
use crate::domain::{
    generate_otp_code, hash_secret, is_valid_otp_format, normalize_email, verify_secret, OtpCode,
    OtpRejection, Password, PasswordResetToken, ResetTokenValue, User, UserResponse,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{CooldownStore, GoogleVerifier, TransactionContext, UnitOfWork};
use crate::jobs::{EmailJob, Mailer};
use crate::with_transaction;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub company_id: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register an account (or refresh a pending one) and email a code
    async fn signup(&self, name: String, email: String, password: String) -> AppResult<User>;

    /// Confirm the emailed code and sign the user in
    async fn verify_otp(&self, email: String, code: String) -> AppResult<TokenResponse>;

    /// Email a fresh code to a pending account
    async fn resend_otp(&self, email: String) -> AppResult<()>;

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Email a reset link. Succeeds whether or not the account exists.
    async fn forgot_password(&self, email: String) -> AppResult<()>;

    async fn reset_password(&self, token: String, password: String) -> AppResult<()>;

    async fn google_sign_in(&self, id_token: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    async fn current_user(&self, id: Uuid) -> AppResult<User>;
}

/// Generate JWT token for a user
fn generate_token(user: User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        company_id: user.company_id.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
        user: user.into(),
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

fn invalid_code() -> AppError {
    AppError::bad_request("Invalid or expired verification code")
}

fn invalid_reset_token() -> AppError {
    AppError::bad_request("Invalid or expired reset token")
}

fn rejection_error(rejection: OtpRejection) -> AppError {
    match rejection {
        OtpRejection::Consumed => invalid_code(),
        OtpRejection::TooManyAttempts => AppError::CodeLocked,
        OtpRejection::Expired => AppError::bad_request("Verification code has expired"),
    }
}

/// Name for a Google account that did not share one: the email's local part.
fn fallback_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// Replace any outstanding verification code of the user with `code_hash`.
async fn store_verification_code(
    tx: &TransactionContext<'_>,
    user_id: Uuid,
    code_hash: String,
) -> AppResult<()> {
    let otp_codes = tx.otp_codes();
    otp_codes
        .invalidate_all(user_id, OTP_PURPOSE_EMAIL_VERIFICATION)
        .await?;
    otp_codes
        .create(
            user_id,
            code_hash,
            OTP_PURPOSE_EMAIL_VERIFICATION,
            OtpCode::expiry_from(Utc::now()),
        )
        .await?;
    Ok(())
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    cooldowns: Arc<dyn CooldownStore>,
    mailer: Arc<dyn Mailer>,
    google: Arc<dyn GoogleVerifier>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(
        uow: Arc<U>,
        cooldowns: Arc<dyn CooldownStore>,
        mailer: Arc<dyn Mailer>,
        google: Arc<dyn GoogleVerifier>,
        config: Config,
    ) -> Self {
        Self {
            uow,
            cooldowns,
            mailer,
            google,
            config,
        }
    }

    /// Fail with 429 while a code was sent to this email recently.
    async fn enforce_resend_cooldown(&self, email: &str) -> AppResult<()> {
        match self
            .cooldowns
            .start_cooldown(email, OTP_RESEND_COOLDOWN_SECONDS)
            .await?
        {
            None => Ok(()),
            Some(retry_after) => Err(AppError::RateLimited { retry_after }),
        }
    }

    async fn mail_verification_code(&self, user: &User, code: &str) -> AppResult<()> {
        self.mailer
            .send(EmailJob::verification_code(&user.email, &user.name, code))
            .await?;

        tracing::info!(user_id = %user.id, "Verification code issued");
        Ok(())
    }

    async fn send_reset_link(&self, user: &User) -> AppResult<()> {
        let token = ResetTokenValue::generate();
        self.uow
            .reset_tokens()
            .create(
                token.id,
                user.id,
                hash_secret(&token.secret)?,
                PasswordResetToken::expiry_from(Utc::now()),
            )
            .await?;

        let link = self.config.password_reset_link(&token.to_string());
        self.mailer
            .send(EmailJob::password_reset(&user.email, &user.name, &link))
            .await?;

        tracing::info!(user_id = %user.id, "Password reset link issued");
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn signup(&self, name: String, email: String, password: String) -> AppResult<User> {
        let email = normalize_email(&email);
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }

        let existing = self.uow.users().find_by_email(&email).await?;
        if existing.as_ref().is_some_and(|u| u.email_verified) {
            return Err(AppError::conflict("Account"));
        }

        self.enforce_resend_cooldown(&email).await?;

        let password_hash = Password::new(&password)?.into_string();
        let code = generate_otp_code();
        let code_hash = hash_secret(&code)?;

        let user = with_transaction!(self.uow, |tx| {
            let users = tx.users();
            let user = match existing {
                Some(pending) => {
                    users
                        .update_registration(pending.id, name, password_hash)
                        .await?
                }
                None => users.create(User::new(email, name, password_hash)).await?,
            };
            store_verification_code(&tx, user.id, code_hash).await?;
            Ok::<_, AppError>(user)
        })?;

        self.mail_verification_code(&user, &code).await?;
        Ok(user)
    }

    async fn verify_otp(&self, email: String, code: String) -> AppResult<TokenResponse> {
        if !is_valid_otp_format(&code) {
            return Err(AppError::validation("Code must be 6 digits"));
        }

        let user = self
            .uow
            .users()
            .find_by_email(&normalize_email(&email))
            .await?
            .ok_or_else(invalid_code)?;

        if user.email_verified {
            return Err(AppError::bad_request("Email is already verified"));
        }

        let otp_codes = self.uow.otp_codes();
        let otp = otp_codes
            .latest_active(user.id, OTP_PURPOSE_EMAIL_VERIFICATION)
            .await?
            .ok_or_else(invalid_code)?;

        if let Some(rejection) = otp.rejection() {
            return Err(rejection_error(rejection));
        }

        // The attempt is spent before the comparison, so parallel guesses
        // cannot outrun the limit
        if !otp_codes.reserve_attempt(otp.id, OTP_MAX_ATTEMPTS).await? {
            return Err(AppError::CodeLocked);
        }

        if !verify_secret(&code, &otp.code_hash) {
            tracing::debug!(
                user_id = %user.id,
                remaining = otp.remaining_attempts() - 1,
                "Wrong verification code"
            );
            return Err(AppError::bad_request("Invalid verification code"));
        }

        let (user_id, otp_id) = (user.id, otp.id);
        let user = with_transaction!(self.uow, |tx| {
            if !tx.otp_codes().consume(otp_id).await? {
                return Err(invalid_code());
            }
            tx.users().mark_email_verified(user_id).await
        })?;
        tracing::info!(user_id = %user.id, "Email verified");

        generate_token(user, &self.config)
    }

    async fn resend_otp(&self, email: String) -> AppResult<()> {
        let email = normalize_email(&email);

        // Cooldown applies to unknown addresses too, so the response does not
        // reveal which emails have accounts
        self.enforce_resend_cooldown(&email).await?;

        let user = match self.uow.users().find_by_email(&email).await? {
            Some(user) if !user.email_verified => user,
            _ => return Ok(()),
        };

        let code = generate_otp_code();
        let code_hash = hash_secret(&code)?;
        let user_id = user.id;
        with_transaction!(self.uow, |tx| {
            store_verification_code(&tx, user_id, code_hash).await
        })?;

        self.mail_verification_code(&user, &code).await
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self
            .uow
            .users()
            .find_by_email(&normalize_email(&email))
            .await?;

        // Verify against a dummy hash for unknown accounts so timing does not
        // reveal which emails exist
        let stored = match user.as_ref().and_then(|u| u.password_hash.clone()) {
            Some(hash) => Password::from_hash(hash),
            None => Password::dummy(),
        };
        let password_valid = stored.verify(&password);

        let user = match user {
            Some(user) if user.has_password() && password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        if !user.email_verified {
            return Err(AppError::EmailNotVerified);
        }

        generate_token(user, &self.config)
    }

    async fn forgot_password(&self, email: String) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_email(&normalize_email(&email))
            .await?;

        if let Some(user) = user.filter(User::has_password) {
            if let Err(e) = self.send_reset_link(&user).await {
                tracing::error!(user_id = %user.id, "Failed to issue reset link: {}", e);
            }
        }

        Ok(())
    }

    async fn reset_password(&self, token: String, password: String) -> AppResult<()> {
        let value = ResetTokenValue::parse(&token).ok_or_else(invalid_reset_token)?;

        let stored = self
            .uow
            .reset_tokens()
            .find_by_id(value.id)
            .await?
            .filter(PasswordResetToken::is_usable)
            .ok_or_else(invalid_reset_token)?;

        if !verify_secret(&value.secret, &stored.token_hash) {
            return Err(invalid_reset_token());
        }

        let password_hash = Password::new(&password)?.into_string();

        let (token_id, user_id) = (stored.id, stored.user_id);
        let revoked = with_transaction!(self.uow, |tx| {
            let reset_tokens = tx.reset_tokens();
            if !reset_tokens.mark_used(token_id).await? {
                return Err(invalid_reset_token());
            }
            tx.users().update_password(user_id, password_hash).await?;
            reset_tokens.invalidate_for_user(user_id).await
        })?;

        tracing::info!(user_id = %user_id, revoked, "Password reset");
        Ok(())
    }

    async fn google_sign_in(&self, id_token: String) -> AppResult<TokenResponse> {
        let identity = self.google.verify_id_token(&id_token).await?;
        let users = self.uow.users();

        if let Some(user) = users.find_by_google_id(&identity.subject).await? {
            return generate_token(user, &self.config);
        }

        let email = normalize_email(&identity.email);
        let user = match users.find_by_email(&email).await? {
            Some(existing) if existing.google_id.is_some() => {
                // Same email, different Google subject
                tracing::warn!(user_id = %existing.id, "Account already linked to another Google identity");
                return Err(AppError::conflict("Google account link"));
            }
            Some(existing) => {
                tracing::info!(
                    user_id = %existing.id,
                    verified = existing.email_verified,
                    "Linking Google account"
                );
                let (user_id, was_verified, subject) =
                    (existing.id, existing.email_verified, identity.subject);
                with_transaction!(self.uow, |tx| {
                    if !was_verified {
                        // Whoever registered this address never proved they own it;
                        // their password and pending secrets must not survive the link
                        tx.users().clear_password(user_id).await?;
                        tx.otp_codes()
                            .invalidate_all(user_id, OTP_PURPOSE_EMAIL_VERIFICATION)
                            .await?;
                        tx.reset_tokens().invalidate_for_user(user_id).await?;
                    }
                    tx.users().link_google(user_id, subject).await
                })?
            }
            None => {
                let name = identity.name.unwrap_or_else(|| fallback_name(&email));
                users
                    .create(User::from_google(email, name, identity.subject))
                    .await?
            }
        };

        generate_token(user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn current_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verified_user() -> User {
        let mut user = User::new(
            "jane@example.com".into(),
            "Jane".into(),
            "hash".into(),
        );
        user.email_verified = true;
        user
    }

    #[test]
    fn test_token_round_trip() {
        let config = Config::for_tests();
        let user = verified_user();
        let company_id = user.company_id.clone();

        let token = generate_token(user, &config).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, config.jwt_expiration_hours * SECONDS_PER_HOUR);

        let claims = verify_token_internal(&token.access_token, &config).unwrap();
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.company_id, company_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let config = Config::for_tests();
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "jane@example.com".into(),
            company_id: "cmp_x".into(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };
        let forged = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"another-secret-key-that-is-32-chars-long"),
        )
        .unwrap();

        assert!(matches!(
            verify_token_internal(&forged, &config),
            Err(AppError::Jwt(_))
        ));
    }

    #[test]
    fn test_fallback_name() {
        assert_eq!(fallback_name("jane@example.com"), "jane");
    }
}
