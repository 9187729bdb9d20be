// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpotifyError>;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Access token rejected: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded (retry after {retry_after_secs:?}s)")]
    RateLimitExceeded { retry_after_secs: Option<u64> },

    #[error("Rate limiter closed")]
    RateLimiterClosed,

    #[error("Invalid response from Spotify API: {0}")]
    InvalidResponse(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Too many tracks in one request: {0} (maximum is 100)")]
    TooManyTracks(usize),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
