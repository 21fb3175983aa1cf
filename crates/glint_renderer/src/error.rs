//! Driver error types.

use thiserror::Error;

/// Errors from the worker service launch path.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("scene contains no geometry")]
    EmptyScene,

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to spawn supervisor thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Errors reported synchronously by the raytrace session.
///
/// Out-of-bounds contributions and stale-generation contributions are the
/// two tolerated drop cases and never surface here.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to start raytrace job")]
    SessionStartFailed(#[source] LaunchError),

    #[error("pixel ({x}, {y}) is outside the framebuffer")]
    InvalidCoordinate { x: i32, y: i32 },
}
