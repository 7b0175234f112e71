use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::dashboard::socket::dashboard_ws;
use crate::handlers::*;
use crate::routes::auth_middleware::auth_middleware;
use crate::state::AppState;

/// Create API routes
pub fn create_api_routes(state: AppState) -> Router {
    let protected = Router::<AppState>::new()
        .route("/users/:id", put(replace_user).patch(patch_user).delete(delete_user))
        .route("/pois", post(create_poi))
        .route("/pois/:id", put(replace_poi).patch(patch_poi).delete(delete_poi))
        .route("/ratings", post(create_rating))
        .route("/ratings/:id", delete(delete_rating))
        .route("/diagnostics", get(diagnostics))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)); // Applies to all routes added above

    let public = Router::<AppState>::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/users", get(list_users).post(create_user))
        .route("/users/login", post(login))
        .route("/users/:id", get(get_user))
        .route("/pois", get(list_pois))
        .route("/pois/:id", get(get_poi))
        .route("/ratings", get(list_ratings))
        .route("/ratings/:id", get(get_rating))
        .route("/stats", get(get_stats))
        .route("/ws", get(dashboard_ws));

    public.merge(protected).with_state(state)
}
