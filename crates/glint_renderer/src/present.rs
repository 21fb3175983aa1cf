//! Presentation tick: copy the accumulator into a display resource.

use std::sync::Arc;

use thiserror::Error;

use crate::accum::PixelAccumulator;
use crate::types::{Resolution, Rgba};

/// Errors raised while uploading a frame to a display resource.
#[derive(Error, Debug)]
pub enum PresentError {
    #[error("target is {target_width}x{target_height} but frame is {frame_width}x{frame_height}")]
    SizeMismatch {
        target_width: u32,
        target_height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("upload failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A display resource accepting full RGBA frame uploads.
///
/// The display side (GPU texture, window surface, file writer) lives
/// outside the driver; this is the one interface it must satisfy.
pub trait PresentTarget: Send {
    fn upload(&mut self, resolution: Resolution, pixels: &[Rgba]) -> Result<(), PresentError>;
}

/// Copies the accumulator's current contents to a display target once per
/// presentation tick.
///
/// `present` only snapshots - it never waits on the raytrace job, so a
/// slow worker cannot stall the display loop. Before any session has run
/// it uploads the accumulator's initial all-zero buffer.
pub struct PresentationBridge {
    accumulator: Arc<PixelAccumulator>,
    target: Box<dyn PresentTarget>,
}

impl PresentationBridge {
    /// Create a bridge from an accumulator to a display target.
    pub fn new(accumulator: Arc<PixelAccumulator>, target: Box<dyn PresentTarget>) -> Self {
        Self { accumulator, target }
    }

    /// Snapshot the accumulator and upload it to the target.
    pub fn present(&mut self) -> Result<(), PresentError> {
        let frame = self.accumulator.snapshot();
        self.target.upload(frame.resolution, &frame.pixels)
    }
}

/// In-memory RGBA32F display resource.
///
/// Holds the raw bytes a texture upload would receive; the demo viewer
/// uses a file-writing target instead, this one mostly serves tests and
/// embedders that blit elsewhere.
pub struct MemoryTarget {
    resolution: Resolution,
    bytes: Vec<u8>,
}

impl MemoryTarget {
    /// Create a target of fixed extent.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            bytes: vec![0; resolution.pixel_count() * std::mem::size_of::<Rgba>()],
        }
    }

    /// The most recently uploaded frame as raw RGBA32F bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl PresentTarget for MemoryTarget {
    fn upload(&mut self, resolution: Resolution, pixels: &[Rgba]) -> Result<(), PresentError> {
        if resolution != self.resolution {
            return Err(PresentError::SizeMismatch {
                target_width: self.resolution.width,
                target_height: self.resolution.height,
                frame_width: resolution.width,
                frame_height: resolution.height,
            });
        }
        self.bytes.clear();
        self.bytes.extend_from_slice(bytemuck::cast_slice(pixels));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Contribution, PixelCoord};

    #[test]
    fn test_present_before_any_session_is_all_zero() {
        let resolution = Resolution::new(2, 2);
        let accum = Arc::new(PixelAccumulator::new(resolution));
        let mut bridge =
            PresentationBridge::new(Arc::clone(&accum), Box::new(MemoryTarget::new(resolution)));
        bridge.present().unwrap();
    }

    #[test]
    fn test_uploaded_bytes_match_frame() {
        let resolution = Resolution::new(2, 1);
        let accum = Arc::new(PixelAccumulator::new(resolution));
        accum.apply(Contribution::new(
            PixelCoord::new(1, 0),
            Rgba::new(1.0, 0.5, 0.25, 1.0),
        ));

        let mut target = MemoryTarget::new(resolution);
        target.upload(resolution, &accum.snapshot().pixels).unwrap();

        let expected = [Rgba::ZERO, Rgba::new(1.0, 0.5, 0.25, 1.0)];
        let expected_bytes: &[u8] = bytemuck::cast_slice(&expected);
        assert_eq!(target.bytes(), expected_bytes);
    }

    #[test]
    fn test_size_mismatch_is_reported() {
        let accum = Arc::new(PixelAccumulator::new(Resolution::new(4, 4)));
        let mut bridge = PresentationBridge::new(
            accum,
            Box::new(MemoryTarget::new(Resolution::new(2, 2))),
        );
        assert!(matches!(
            bridge.present(),
            Err(PresentError::SizeMismatch { .. })
        ));
    }
}
