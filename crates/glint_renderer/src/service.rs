//! Contracts between the session and the raytrace worker service.
//!
//! The service itself is an external collaborator as far as the driver is
//! concerned; [`crate::ThreadedTraceService`] is the built-in
//! implementation the demo uses.

use std::sync::Arc;

use glint_core::Scene;
use glint_math::Camera;

use crate::error::LaunchError;
use crate::sink::OutputSink;
use crate::types::{PixelCoord, Resolution, Rgba};

/// A launched raytrace job.
pub trait TraceJob: Send + std::fmt::Debug {
    /// Request cooperative cancellation and block until quiesced.
    ///
    /// After this returns, no further contributions from this job's
    /// workers can arrive. Workers check the signal at a bounded interval
    /// (per scanline), never mid-pixel, so cancellation completes in
    /// bounded time. Idempotent.
    fn cancel(&mut self);

    /// True once every worker has drained.
    fn is_quiesced(&self) -> bool;
}

/// Asynchronous raytrace worker service.
pub trait TraceService: Send + Sync {
    /// Launch workers over the full extent, emitting through `sink`.
    ///
    /// The scene and camera are immutable snapshots for the lifetime of
    /// the job.
    fn launch(
        &self,
        scene: Arc<Scene>,
        camera: Camera,
        resolution: Resolution,
        sink: OutputSink,
    ) -> Result<Box<dyn TraceJob>, LaunchError>;

    /// Synchronously evaluate a single pixel on the calling thread.
    ///
    /// This is the interactive probe path; it runs to completion and is
    /// expected to be quick.
    fn trace_pixel(
        &self,
        scene: &Scene,
        camera: &Camera,
        resolution: Resolution,
        pixel: PixelCoord,
    ) -> Rgba;
}
