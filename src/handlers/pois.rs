use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;
use uuid::Uuid;

use super::{bad_request, location, not_found, store_failure};
use crate::auth::auth::{ensure_owner, AuthUser};
use crate::dashboard::CountChange;
use crate::db::{NewPoi, PoiChanges};
use crate::models::{
    ApiError, CreatePoiRequest, ErrorResponse, PatchPoiRequest, Poi, PoiPage, PoiPageQuery, PoiSummary,
    ReplacePoiRequest,
};
use crate::state::AppState;

async fn load_poi(state: &AppState, id: Uuid) -> Result<Poi, ApiError> {
    state
        .store
        .get_poi(id)
        .await
        .map_err(|e| store_failure(e, "Failed to load POI"))?
        .ok_or_else(|| not_found("POI", id))
}

/// Page through POIs, best rated first
pub async fn list_pois(
    State(state): State<AppState>,
    Query(query): Query<PoiPageQuery>,
) -> Result<Json<PoiPage>, ApiError> {
    let page = query.page();
    let page_size = query.page_size();

    let data = state
        .store
        .list_pois(page, page_size)
        .await
        .map_err(|e| store_failure(e, "Failed to list POIs"))?;
    let total = state
        .store
        .count_pois()
        .await
        .map_err(|e| store_failure(e, "Failed to count POIs"))?;

    Ok(Json(PoiPage {
        page,
        page_size,
        total,
        data,
    }))
}

/// Get one POI with its average rating
pub async fn get_poi(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PoiSummary>, ApiError> {
    let summary = state
        .store
        .get_poi_summary(id)
        .await
        .map_err(|e| store_failure(e, "Failed to load POI"))?
        .ok_or_else(|| not_found("POI", id))?;
    Ok(Json(summary))
}

/// Create a POI authored by the caller
pub async fn create_poi(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<CreatePoiRequest>,
) -> Result<Response, ApiError> {
    request.validate().map_err(bad_request)?;

    // The token may outlive its account
    if state
        .store
        .get_user(caller.id)
        .await
        .map_err(|e| store_failure(e, "Failed to load user"))?
        .is_none()
    {
        return Err(not_found("user", caller.id));
    }

    let poi = state
        .store
        .insert_poi(NewPoi {
            posted_by: caller.id,
            pos: request.pos,
            photos: request.photos,
            title: request.title,
            description: request.description,
            categorie: request.categorie,
        })
        .await
        .map_err(|e| store_failure(e, "Failed to create POI"))?;

    info!("POI '{}' created with ID {}", poi.title, poi.id);
    state.notifier.counts_changed(CountChange::PoiCreated);

    Ok((StatusCode::CREATED, location(format!("/pois/{}", poi.id)), Json(poi)).into_response())
}

/// Replace the editable fields of a POI
pub async fn replace_poi(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReplacePoiRequest>,
) -> Result<Json<Poi>, ApiError> {
    let poi = load_poi(&state, id).await?;
    ensure_owner(&caller, Some(poi.posted_by), "POI")?;
    request.validate().map_err(bad_request)?;

    let changes = PoiChanges {
        photos: Some(request.photos),
        title: Some(request.title),
        description: Some(request.description),
        categorie: Some(request.categorie),
    };
    update(&state, id, changes).await
}

/// Partially update a POI; its position cannot change
pub async fn patch_poi(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<PatchPoiRequest>,
) -> Result<Json<Poi>, ApiError> {
    let poi = load_poi(&state, id).await?;
    ensure_owner(&caller, Some(poi.posted_by), "POI")?;
    if request.pos.is_some() {
        return Err(ErrorResponse::reply(
            StatusCode::UNPROCESSABLE_ENTITY,
            "The position of a POI cannot be changed",
        ));
    }
    request.validate().map_err(bad_request)?;

    let changes = PoiChanges {
        photos: request.photos,
        title: request.title,
        description: request.description.map(Some),
        categorie: request.categorie.map(Some),
    };
    update(&state, id, changes).await
}

async fn update(state: &AppState, id: Uuid, changes: PoiChanges) -> Result<Json<Poi>, ApiError> {
    let poi = state
        .store
        .update_poi(id, changes)
        .await
        .map_err(|e| store_failure(e, "Failed to update POI"))?
        .ok_or_else(|| not_found("POI", id))?;
    Ok(Json(poi))
}

/// Delete a POI and its ratings
pub async fn delete_poi(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let poi = load_poi(&state, id).await?;
    ensure_owner(&caller, Some(poi.posted_by), "POI")?;

    let deleted = state
        .store
        .delete_poi(id)
        .await
        .map_err(|e| store_failure(e, "Failed to delete POI"))?;
    if !deleted {
        return Err(not_found("POI", id));
    }

    info!("POI {} deleted", id);
    state.notifier.counts_changed(CountChange::PoiDeleted);
    Ok(StatusCode::NO_CONTENT)
}
