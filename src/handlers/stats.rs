use axum::{extract::State, http::StatusCode, Json};

use super::store_failure;
use crate::dashboard::TotalsSnapshot;
use crate::models::ApiError;
use crate::state::AppState;

/// Current totals. The same values are pushed to every open dashboard, which
/// is how a freshly connected dashboard gets its first numbers.
pub async fn get_stats(State(state): State<AppState>) -> Result<(StatusCode, Json<TotalsSnapshot>), ApiError> {
    let snapshot = state
        .notifier
        .snapshot()
        .await
        .map_err(|e| store_failure(e, "Failed to count users, POIs and ratings"))?;
    state.notifier.publish(snapshot);
    Ok((StatusCode::OK, Json(snapshot)))
}
