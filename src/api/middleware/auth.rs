//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::errors::AppError;

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    /// Company the user's chatbot and leads belong to
    pub company_id: String,
}

/// JWT authentication middleware.
///
/// Validates the bearer token from the Authorization header, then injects
/// the CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(bearer.token())?;

    let current_user = CurrentUser {
        id: claims.sub,
        email: claims.email,
        company_id: claims.company_id,
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
