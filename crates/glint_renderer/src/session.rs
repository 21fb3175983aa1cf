//! Start/stop state machine around the raytrace worker service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glint_core::Scene;
use glint_math::Camera;

use crate::accum::PixelAccumulator;
use crate::error::SessionError;
use crate::service::{TraceJob, TraceService};
use crate::sink::OutputSink;
use crate::types::{Contribution, Generation, PixelCoord, Resolution};

/// Session lifecycle states.
///
/// `Stopping` only exists inside a `start`/`stop` call - both block until
/// the prior job has quiesced, so callers observe `Idle` or `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopping,
}

/// Exactly one asynchronous raytrace job at a time.
///
/// Starting a new session first terminates the previous one: the old
/// job's workers fully quiesce before the accumulator is touched, so one
/// snapshot never interleaves pixels from two generations. Each start
/// advances a generation counter; contributions from an older generation
/// are dropped at the sink.
pub struct RaytraceSession {
    service: Arc<dyn TraceService>,
    accumulator: Arc<PixelAccumulator>,
    live_generation: Arc<AtomicU64>,
    next_generation: Generation,
    job: Option<Box<dyn TraceJob>>,
    state: SessionState,
}

impl RaytraceSession {
    /// Create an idle session over the given service and accumulator.
    pub fn new(service: Arc<dyn TraceService>, accumulator: Arc<PixelAccumulator>) -> Self {
        Self {
            service,
            accumulator,
            live_generation: Arc::new(AtomicU64::new(0)),
            next_generation: 0,
            job: None,
            state: SessionState::Idle,
        }
    }

    /// Start a raytrace job for the given scene, camera and extent.
    ///
    /// A running session is stopped first and its workers quiesced. On
    /// launch failure the previous frame is restored, the session stays
    /// idle and the failed generation number is never reused.
    pub fn start(
        &mut self,
        scene: Arc<Scene>,
        camera: Camera,
        resolution: Resolution,
    ) -> Result<(), SessionError> {
        if resolution.is_empty() {
            return Err(SessionError::InvalidConfiguration(format!(
                "zero-area resolution {}x{}",
                resolution.width, resolution.height
            )));
        }

        self.stop();

        self.next_generation += 1;
        let generation = self.next_generation;
        let previous_generation = self.live_generation.load(Ordering::Acquire);

        // Swap in the new buffer before publishing the generation so the
        // first worker contribution already lands in zeroed storage.
        let previous = self.accumulator.replace(resolution);
        self.live_generation.store(generation, Ordering::Release);

        let sink = OutputSink::new(
            Arc::clone(&self.accumulator),
            Arc::clone(&self.live_generation),
            generation,
        );

        match self.service.launch(scene, camera, resolution, sink) {
            Ok(job) => {
                log::info!(
                    "raytrace generation {} running at {}x{}",
                    generation,
                    resolution.width,
                    resolution.height
                );
                self.job = Some(job);
                self.state = SessionState::Running;
                Ok(())
            }
            Err(source) => {
                // Keep the last presentable frame; anything the failed
                // launch already emitted is filtered out as stale.
                self.accumulator.restore(previous);
                self.live_generation
                    .store(previous_generation, Ordering::Release);
                self.state = SessionState::Idle;
                log::warn!("raytrace generation {} failed to launch: {}", generation, source);
                Err(SessionError::SessionStartFailed(source))
            }
        }
    }

    /// Stop the running job, blocking until its workers quiesce.
    ///
    /// No-op when already idle.
    pub fn stop(&mut self) {
        if let Some(mut job) = self.job.take() {
            self.state = SessionState::Stopping;
            job.cancel();
            debug_assert!(job.is_quiesced());
            log::debug!(
                "raytrace generation {} stopped",
                self.live_generation.load(Ordering::Acquire)
            );
        }
        self.state = SessionState::Idle;
    }

    /// Re-render a single pixel synchronously and blend it in.
    ///
    /// Probes reflect direct user intent to inspect the current frame, so
    /// the result is applied regardless of the live generation and may be
    /// issued while a session is running.
    pub fn probe(
        &self,
        scene: &Scene,
        camera: &Camera,
        pixel: PixelCoord,
    ) -> Result<Contribution, SessionError> {
        let resolution = self.accumulator.resolution();
        if !resolution.contains(pixel) {
            return Err(SessionError::InvalidCoordinate {
                x: pixel.x,
                y: pixel.y,
            });
        }

        let color = self.service.trace_pixel(scene, camera, resolution, pixel);
        let contribution = Contribution::new(pixel, color);
        self.accumulator.apply(contribution);
        Ok(contribution)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The generation whose contributions are currently accepted.
    pub fn generation(&self) -> Generation {
        self.live_generation.load(Ordering::Acquire)
    }

    /// True when no worker of the current job can still emit.
    pub fn is_quiesced(&self) -> bool {
        self.job.as_ref().map_or(true, |job| job.is_quiesced())
    }

    /// The accumulator this session renders into.
    pub fn accumulator(&self) -> &Arc<PixelAccumulator> {
        &self.accumulator
    }
}

impl Drop for RaytraceSession {
    fn drop(&mut self) {
        self.stop();
    }
}
