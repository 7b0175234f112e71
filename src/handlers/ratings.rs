use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;
use uuid::Uuid;

use super::{bad_request, location, not_found, store_failure};
use crate::auth::auth::{ensure_owner, AuthUser};
use crate::dashboard::CountChange;
use crate::db::NewRating;
use crate::models::{ApiError, CreateRatingRequest, Rating};
use crate::state::AppState;

/// List all ratings, newest first
pub async fn list_ratings(State(state): State<AppState>) -> Result<Json<Vec<Rating>>, ApiError> {
    let ratings = state
        .store
        .list_ratings()
        .await
        .map_err(|e| store_failure(e, "Failed to list ratings"))?;
    Ok(Json(ratings))
}

pub async fn get_rating(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Rating>, ApiError> {
    let rating = state
        .store
        .get_rating(id)
        .await
        .map_err(|e| store_failure(e, "Failed to load rating"))?
        .ok_or_else(|| not_found("rating", id))?;
    Ok(Json(rating))
}

/// Rate an existing POI as the caller
pub async fn create_rating(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<CreateRatingRequest>,
) -> Result<Response, ApiError> {
    request.validate().map_err(bad_request)?;

    if state
        .store
        .get_poi(request.poi)
        .await
        .map_err(|e| store_failure(e, "Failed to load POI"))?
        .is_none()
    {
        return Err(not_found("POI", request.poi));
    }

    let rating = state
        .store
        .insert_rating(NewRating {
            posted_by: Some(caller.id),
            poi: Some(request.poi),
            value: request.value,
            comment: request.comment,
        })
        .await
        .map_err(|e| store_failure(e, "Failed to create rating"))?;

    info!("Rating {} ({}/5) created for POI {}", rating.id, rating.value, request.poi);
    state.notifier.counts_changed(CountChange::RatingCreated);

    Ok((StatusCode::CREATED, location(format!("/ratings/{}", rating.id)), Json(rating)).into_response())
}

/// Delete one of the caller's ratings
pub async fn delete_rating(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let rating = state
        .store
        .get_rating(id)
        .await
        .map_err(|e| store_failure(e, "Failed to load rating"))?
        .ok_or_else(|| not_found("rating", id))?;
    ensure_owner(&caller, rating.posted_by, "rating")?;

    let deleted = state
        .store
        .delete_rating(id)
        .await
        .map_err(|e| store_failure(e, "Failed to delete rating"))?;
    if !deleted {
        return Err(not_found("rating", id));
    }

    info!("Rating {} deleted", id);
    state.notifier.counts_changed(CountChange::RatingDeleted);
    Ok(StatusCode::NO_CONTENT)
}
