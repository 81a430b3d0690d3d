//! Crate error types.
//!
//! `NavError` covers the tracking core; `ProviderError` covers the HTTP
//! collaborators (routing and place search) and folds into `NavError` via
//! `From`. Nothing here is fatal to a host application: every failure
//! degrades to "no route displayed" or "keep the last good route".

use thiserror::Error;

/// Top-level error type for the navigation core.
#[derive(Debug, Error)]
pub enum NavError {
    /// A GPS fix with non-finite or NaN coordinates. Callers ignore the fix;
    /// tracker state is unchanged.
    #[error("invalid GPS fix: coordinates are not finite")]
    InvalidFix,

    /// A path with fewer points than the operation needs.
    #[error("path needs at least two points")]
    InvalidPath,

    /// An encoded polyline that ends in the middle of a coordinate group.
    #[error("malformed polyline: input truncated at byte {0}")]
    MalformedInput(usize),

    /// A recalculated route that no longer matches the current destination.
    /// Dropped silently by callers; logged only.
    #[error("stale recalculation response discarded")]
    StaleRecalculation,

    /// Routing or place-search service failure.
    #[error("provider failure: {0}")]
    Provider(#[from] ProviderError),
}

/// Failures from the HTTP collaborators.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned status {status}: {message}")]
    Service { status: u16, message: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    /// The routing service answered but produced no route between the
    /// requested points.
    #[error("no route found")]
    NoRoute,
}

/// Shorthand result type for the crate.
pub type NavResult<T> = Result<T, NavError>;
