use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::auth::AuthUser;
use crate::models::{ApiError, ErrorResponse};
use crate::services::auth_service::{get_auth_token, validate_jwt};
use crate::state::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Get the auth token from the request
    let token = get_auth_token(&req).map_err(|e| {
        debug!("Rejecting unauthenticated request: {}", e);
        ErrorResponse::reply(StatusCode::UNAUTHORIZED, e)
    })?;

    // 2. Validate the token
    let token_data = validate_jwt(&token, &state.config.secret_key).map_err(|e| {
        warn!("JWT validation failed: {}", e);
        ErrorResponse::reply(StatusCode::UNAUTHORIZED, "Token is invalid or has expired")
    })?;

    // 3. Extract the user id
    let user_id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| {
        warn!("JWT 'sub' claim is not a user id: {}", token_data.claims.sub);
        ErrorResponse::reply(StatusCode::UNAUTHORIZED, "Token is invalid or has expired")
    })?;

    // 4. Hand the caller to downstream handlers
    req.extensions_mut().insert(AuthUser { id: user_id });

    Ok(next.run(req).await)
}
