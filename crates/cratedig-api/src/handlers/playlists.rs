use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use cratedig_application::{AppState, BuildError, CatalogError};
use cratedig_domain::{BearerToken, BuildReport, ReleaseRecord};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreatePlaylistQuery {
    /// Only report unmatched releases; no playlist is created.
    #[serde(default)]
    pub preview: bool,
}

/// One collection row, using the export's column names.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReleaseRequest {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Artist")]
    pub artist: String,
    #[serde(rename = "Released", default)]
    pub released: Option<String>,
}

impl From<ReleaseRequest> for ReleaseRecord {
    fn from(value: ReleaseRequest) -> Self {
        Self {
            title: value.title,
            artist: value.artist,
            release_year: value.released,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlaylistRequest {
    #[serde(default)]
    pub name: String,
    pub releases: Vec<ReleaseRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistResponse {
    pub playlist_url: Option<String>,
    pub added_tracks: usize,
    pub not_found: Vec<String>,
    pub track_fetch_failures: Vec<String>,
    pub matched_releases: usize,
    pub run_id: String,
    pub preview: bool,
}

impl From<BuildReport> for CreatePlaylistResponse {
    fn from(report: BuildReport) -> Self {
        Self {
            playlist_url: report.playlist_reference,
            added_tracks: report.added_track_count,
            not_found: report.unmatched_releases,
            track_fetch_failures: report.track_fetch_failures,
            matched_releases: report.matched_release_count,
            run_id: report.run_id.to_string(),
            preview: report.preview,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Build a playlist from collection rows, or preview which rows cannot be matched.
#[utoipa::path(
    post,
    path = "/create-playlist",
    params(CreatePlaylistQuery),
    request_body = CreatePlaylistRequest,
    responses(
        (status = 200, description = "Playlist built or preview computed", body = CreatePlaylistResponse),
        (status = 400, description = "Playlist name missing", body = ErrorResponse),
        (status = 401, description = "Missing or rejected bearer token", body = ErrorResponse),
        (status = 500, description = "Playlist could not be built", body = ErrorResponse)
    ),
    tag = "playlists"
)]
pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(credential): Extension<BearerToken>,
    Query(query): Query<CreatePlaylistQuery>,
    Json(request): Json<CreatePlaylistRequest>,
) -> impl IntoResponse {
    let records: Vec<ReleaseRecord> = request.releases.into_iter().map(Into::into).collect();
    info!(
        target: "api",
        releases = records.len(),
        preview = query.preview,
        "playlist build requested"
    );

    if query.preview {
        let report = state.coordinator.preview(&records, &credential).await;
        return (StatusCode::OK, Json(CreatePlaylistResponse::from(report))).into_response();
    }

    match state
        .coordinator
        .build(&records, &request.name, &credential)
        .await
    {
        Ok(report) => (StatusCode::OK, Json(CreatePlaylistResponse::from(report))).into_response(),
        Err(e) => build_error_response(e).into_response(),
    }
}

fn build_error_response(error: BuildError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, message) = match &error {
        BuildError::MissingPlaylistName => (StatusCode::BAD_REQUEST, "Playlist name is required"),
        BuildError::PlaylistCreation(CatalogError::Unauthorized(_))
        | BuildError::Upload(CatalogError::Unauthorized(_)) => {
            (StatusCode::UNAUTHORIZED, "Bearer token was rejected by Spotify")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Error creating playlist"),
    };

    if status.is_server_error() {
        error!(target: "api", error = %error, "playlist build failed");
    } else {
        info!(target: "api", error = %error, "playlist build rejected");
    }

    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
