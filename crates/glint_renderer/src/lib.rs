//! Glint driver core - interactive tile-accumulation raytracing.
//!
//! Owns the floating-point pixel accumulation buffer, the start/stop
//! session state machine around an asynchronous raytrace worker service,
//! the generation-filtered output path workers blend through, the
//! synchronous single-pixel probe, and the presentation tick that copies
//! accumulated pixels into a display resource.

mod accum;
mod error;
mod pool;
mod present;
mod region;
mod service;
mod session;
mod sink;
mod trace;
mod types;

pub use accum::{Frame, FrameBuffer, PixelAccumulator};
pub use error::{LaunchError, SessionError};
pub use pool::ThreadedTraceService;
pub use present::{MemoryTarget, PresentError, PresentTarget, PresentationBridge};
pub use region::{generate_regions, Region, DEFAULT_REGION_SIZE};
pub use service::{TraceJob, TraceService};
pub use session::{RaytraceSession, SessionState};
pub use sink::OutputSink;
pub use trace::{
    integrator_for, AmbientOcclusionIntegrator, FresnelIntegrator, Integrator,
    NormalsIntegrator, PathTracingIntegrator,
};
pub use types::{blend, Contribution, Generation, PixelCoord, Resolution, Rgba};
