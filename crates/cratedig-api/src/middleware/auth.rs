use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use cratedig_domain::BearerToken;
use tracing::debug;

use crate::handlers::playlists::ErrorResponse;

/// Requires `Authorization: Bearer <token>` and hands the token to handlers
/// as a request extension. The token is passed through to the catalog
/// untouched; validating it is the catalog's job.
pub async fn auth_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    match bearer_token(&headers) {
        Some(token) => {
            debug!(target: "auth", "bearer credential present");
            request.extensions_mut().insert(token);
            next.run(request).await
        }
        None => {
            debug!(target: "auth", "missing or malformed bearer credential");
            unauthorized().await.into_response()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<BearerToken> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    BearerToken::new(token)
}

/// Response for unauthorized requests
pub async fn unauthorized() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Missing or invalid bearer token".to_string(),
        }),
    )
}
