// SPDX-License-Identifier: GPL-3.0-or-later
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use cratedig_application::AppState;
use handlers::playlists::{
    create_playlist, CreatePlaylistRequest, CreatePlaylistResponse, ErrorResponse,
    ReleaseRequest, __path_create_playlist,
};
use middleware::auth::auth_middleware;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize, utoipa::ToSchema)]
struct HealthResponse {
    status: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn root() -> &'static str {
    "cratedig backend is running"
}

#[derive(OpenApi)]
#[openapi(
    paths(health, create_playlist),
    components(
        schemas(
            HealthResponse,
            CreatePlaylistRequest,
            CreatePlaylistResponse,
            ReleaseRequest,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "playlists", description = "Collection-to-playlist builds")
    ),
    info(
        title = "cratedig API",
        version = "0.1.0",
        description = "Turns a record collection export into a streaming playlist",
    )
)]
struct ApiDoc;

pub fn router(state: AppState) -> Router {
    info!(target: "api", "building router");

    let playlists = Router::new()
        .route("/create-playlist", post(create_playlist))
        .layer(axum_middleware::from_fn(auth_middleware));

    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(playlists)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
