//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::validation::validate_otp_code;
use crate::api::AppState;
use crate::config::{FORGOT_PASSWORD_MESSAGE, RESEND_OTP_MESSAGE};
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::services::TokenResponse;
use crate::types::MessageResponse;

/// Account signup request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Jane Owner")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "owner@acme.com")]
    pub email: String,
    /// Minimum 8 characters
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    #[schema(example = "SecurePass123!")]
    pub confirm_password: String,
}

/// Signup result: the pending account, awaiting its verification code
#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    #[schema(example = "Verification code sent to your email")]
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "owner@acme.com")]
    pub email: String,
    /// Six digit code from the verification email
    #[validate(custom(function = "validate_otp_code"))]
    #[schema(example = "042817")]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmailRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "owner@acme.com")]
    pub email: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "owner@acme.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    /// Token from the reset link
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(min_length = 8)]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GoogleSignInRequest {
    /// ID token returned by Google Identity Services
    #[validate(length(min = 1, message = "ID token is required"))]
    pub id_token: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/google", post(google_sign_in))
}

/// Create an account and email a verification code
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, verification code sent", body = SignupResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered"),
        (status = 429, description = "Code requested too recently")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let user = state
        .auth_service
        .signup(payload.name, payload.email, payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Verification code sent to your email".to_string(),
            user: user.into(),
        }),
    ))
}

/// Confirm the emailed code and sign in
#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    tag = "Authentication",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Email verified", body = TokenResponse),
        (status = 400, description = "Invalid or expired code"),
        (status = 429, description = "Code locked after too many attempts; request a new one")
    )
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyOtpRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .verify_otp(payload.email, payload.code)
        .await?;
    Ok(Json(token))
}

/// Send a new verification code
#[utoipa::path(
    post,
    path = "/auth/resend-otp",
    tag = "Authentication",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Code sent if the account is pending", body = MessageResponse),
        (status = 429, description = "Cooldown still running")
    )
)]
pub async fn resend_otp(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth_service.resend_otp(payload.email).await?;
    Ok(Json(MessageResponse::new(RESEND_OTP_MESSAGE)))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Email not verified")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;
    Ok(Json(token))
}

/// Email a password reset link
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "Authentication",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Same answer whether or not the account exists", body = MessageResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth_service.forgot_password(payload.email).await?;
    Ok(Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE)))
}

/// Choose a new password with a reset token
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid, used or expired token")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .reset_password(payload.token, payload.password)
        .await?;
    Ok(Json(MessageResponse::new("Password has been reset")))
}

/// Sign in with a Google ID token
#[utoipa::path(
    post,
    path = "/auth/google",
    tag = "Authentication",
    request_body = GoogleSignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, description = "Google email not verified"),
        (status = 401, description = "Token rejected"),
        (status = 409, description = "Email already linked to another Google account")
    )
)]
pub async fn google_sign_in(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GoogleSignInRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.auth_service.google_sign_in(payload.id_token).await?;
    Ok(Json(token))
}
