use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::{bad_request, location, not_found, store_failure};
use crate::auth::auth::{ensure_self, AuthUser};
use crate::dashboard::CountChange;
use crate::db::{NewUser, UserChanges, UserRecord};
use crate::models::{ApiError, ErrorResponse, LoginRequest, LoginResponse, User, UserPatchRequest, UserRequest};
use crate::services::auth_service::{hash_password, issue_jwt, verify_password};
use crate::state::AppState;

async fn load_user(state: &AppState, id: Uuid) -> Result<UserRecord, ApiError> {
    state
        .store
        .get_user(id)
        .await
        .map_err(|e| store_failure(e, "Failed to load user"))?
        .ok_or_else(|| not_found("user", id))
}

async fn hash(state: &AppState, password: String) -> Result<String, ApiError> {
    hash_password(password, state.config.bcrypt_cost)
        .await
        .map_err(|e| ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, e))
}

/// List all users, sorted by username
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .store
        .list_users()
        .await
        .map_err(|e| store_failure(e, "Failed to list users"))?;
    Ok(Json(users.into_iter().map(User::from).collect()))
}

/// Get one user
pub async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<User>, ApiError> {
    Ok(Json(load_user(&state, id).await?.into()))
}

/// Create a user account
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> Result<Response, ApiError> {
    request.validate().map_err(bad_request)?;

    let password_hash = hash(&state, request.password).await?;
    let record = state
        .store
        .insert_user(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
            img_profil: request.img_profil,
        })
        .await
        .map_err(|e| store_failure(e, "Failed to create user"))?;

    info!("User '{}' created with ID {}", record.username, record.id);
    state.notifier.counts_changed(CountChange::UserCreated);

    let user = User::from(record);
    Ok((StatusCode::CREATED, location(format!("/users/{}", user.id)), Json(user)).into_response())
}

/// Exchange username and password for a token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let unauthorized = || ErrorResponse::reply(StatusCode::UNAUTHORIZED, "Invalid username or password");

    let record = state
        .store
        .find_user_by_username(&request.username)
        .await
        .map_err(|e| store_failure(e, "Failed to load user"))?
        .ok_or_else(unauthorized)?;

    if !verify_password(request.password, record.password_hash).await {
        warn!("Failed login attempt for '{}'", request.username);
        return Err(unauthorized());
    }

    let token = issue_jwt(&record.id.to_string(), &state.config.secret_key, state.config.token_ttl_hours)
        .map_err(|e| {
            warn!("Failed to sign token for user {}: {}", record.id, e);
            ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, "Failed to issue token")
        })?;

    Ok(Json(LoginResponse { token }))
}

/// Replace a user's fields
pub async fn replace_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UserRequest>,
) -> Result<Json<User>, ApiError> {
    load_user(&state, id).await?;
    ensure_self(&caller, id, "modify")?;
    request.validate().map_err(bad_request)?;

    let changes = UserChanges {
        username: Some(request.username),
        email: Some(request.email),
        password_hash: Some(hash(&state, request.password).await?),
        img_profil: Some(request.img_profil),
    };
    update(&state, id, changes).await
}

/// Partially update a user
pub async fn patch_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UserPatchRequest>,
) -> Result<Json<User>, ApiError> {
    load_user(&state, id).await?;
    ensure_self(&caller, id, "modify")?;
    request.validate().map_err(bad_request)?;

    let password_hash = match request.password {
        Some(password) => Some(hash(&state, password).await?),
        None => None,
    };
    let changes = UserChanges {
        username: request.username,
        email: request.email,
        password_hash,
        img_profil: request.img_profil.map(Some),
    };
    update(&state, id, changes).await
}

async fn update(state: &AppState, id: Uuid, changes: UserChanges) -> Result<Json<User>, ApiError> {
    let record = state
        .store
        .update_user(id, changes)
        .await
        .map_err(|e| store_failure(e, "Failed to update user"))?
        .ok_or_else(|| not_found("user", id))?;
    Ok(Json(record.into()))
}

/// Delete the caller's own account
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    load_user(&state, id).await?;
    ensure_self(&caller, id, "delete")?;

    let deleted = state
        .store
        .delete_user(id)
        .await
        .map_err(|e| store_failure(e, "Failed to delete user"))?;
    if !deleted {
        return Err(not_found("user", id));
    }

    info!("User {} deleted", id);
    state.notifier.counts_changed(CountChange::UserDeleted);
    Ok(StatusCode::NO_CONTENT)
}
