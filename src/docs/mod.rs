use utoipa::OpenApi;
use crate::dashboard::TotalsSnapshot;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users sorted by username", body = [User])
    )
)]
#[allow(dead_code)]
pub async fn list_users_doc() {}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid user", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_user_doc() {}

/// Log in
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn login_doc() {}

/// Partially update the caller's account
#[utoipa::path(
    patch,
    path = "/users/{id}",
    request_body = UserPatchRequest,
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Not the caller's account", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn patch_user_doc() {}

/// Delete the caller's account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Not the caller's account", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn delete_user_doc() {}

/// Page through POIs, best rated first
#[utoipa::path(
    get,
    path = "/pois",
    params(PoiPageQuery),
    responses(
        (status = 200, description = "One page of POIs", body = PoiPage)
    )
)]
#[allow(dead_code)]
pub async fn list_pois_doc() {}

/// Get a POI with its average rating
#[utoipa::path(
    get,
    path = "/pois/{id}",
    params(("id" = String, Path, description = "POI id")),
    responses(
        (status = 200, description = "The POI", body = PoiSummary),
        (status = 404, description = "Unknown POI", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_poi_doc() {}

/// Create a POI
#[utoipa::path(
    post,
    path = "/pois",
    request_body = CreatePoiRequest,
    responses(
        (status = 201, description = "POI created", body = Poi),
        (status = 400, description = "Invalid POI", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn create_poi_doc() {}

/// Partially update a POI
#[utoipa::path(
    patch,
    path = "/pois/{id}",
    request_body = PatchPoiRequest,
    params(("id" = String, Path, description = "POI id")),
    responses(
        (status = 200, description = "POI updated", body = Poi),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 422, description = "Position cannot change", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn patch_poi_doc() {}

/// Replace the editable fields of a POI
#[utoipa::path(
    put,
    path = "/pois/{id}",
    request_body = ReplacePoiRequest,
    params(("id" = String, Path, description = "POI id")),
    responses(
        (status = 200, description = "POI updated", body = Poi),
        (status = 403, description = "Not the author", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn replace_poi_doc() {}

/// Delete a POI and its ratings
#[utoipa::path(
    delete,
    path = "/pois/{id}",
    params(("id" = String, Path, description = "POI id")),
    responses(
        (status = 204, description = "POI deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn delete_poi_doc() {}

/// List ratings
#[utoipa::path(
    get,
    path = "/ratings",
    responses(
        (status = 200, description = "All ratings, newest first", body = [Rating])
    )
)]
#[allow(dead_code)]
pub async fn list_ratings_doc() {}

/// Rate a POI
#[utoipa::path(
    post,
    path = "/ratings",
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating created", body = Rating),
        (status = 404, description = "Unknown POI", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn create_rating_doc() {}

/// Delete a rating
#[utoipa::path(
    delete,
    path = "/ratings/{id}",
    params(("id" = String, Path, description = "Rating id")),
    responses(
        (status = 204, description = "Rating deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn delete_rating_doc() {}

/// Current totals; also pushes them to every dashboard on `/ws`
#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Current totals", body = TotalsSnapshot)
    )
)]
#[allow(dead_code)]
pub async fn stats_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        list_users_doc,
        create_user_doc,
        login_doc,
        patch_user_doc,
        delete_user_doc,
        list_pois_doc,
        get_poi_doc,
        create_poi_doc,
        patch_poi_doc,
        replace_poi_doc,
        delete_poi_doc,
        list_ratings_doc,
        create_rating_doc,
        delete_rating_doc,
        stats_doc,
    ),
    components(
        schemas(
            HealthResponse, ErrorResponse, DiagnosticsResponse,
            User, UserRequest, UserPatchRequest, LoginRequest, LoginResponse,
            GeoPoint, Category, Poi, PoiSummary, PoiPage,
            CreatePoiRequest, ReplacePoiRequest, PatchPoiRequest,
            Rating, CreateRatingRequest, TotalsSnapshot
        )
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
