//! Worker-facing output path with stale-generation filtering.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::accum::PixelAccumulator;
use crate::types::{Contribution, Generation, PixelCoord, Rgba};

/// The callback contract between the worker service and the accumulator.
///
/// One sink is handed to the service at launch, tagged with the generation
/// that was live at that moment; workers clone it freely and call
/// [`OutputSink::emit`] from any thread in any pixel order. Contributions
/// whose generation no longer matches the session's published live
/// generation are silently dropped, so a slow-to-cancel worker can never
/// write stale pixels into a newer session's buffer.
#[derive(Clone)]
pub struct OutputSink {
    accumulator: Arc<PixelAccumulator>,
    live: Arc<AtomicU64>,
    generation: Generation,
}

impl OutputSink {
    pub(crate) fn new(
        accumulator: Arc<PixelAccumulator>,
        live: Arc<AtomicU64>,
        generation: Generation,
    ) -> Self {
        Self {
            accumulator,
            live,
            generation,
        }
    }

    /// The generation this sink was launched under.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Blend one worker contribution into the accumulator.
    ///
    /// Dropped without error when the sink's generation is stale or the
    /// pixel is out of bounds.
    pub fn emit(&self, pixel: PixelCoord, color: Rgba) {
        if self.live.load(Ordering::Acquire) != self.generation {
            return;
        }
        self.accumulator.apply(Contribution::new(pixel, color));
    }
}
