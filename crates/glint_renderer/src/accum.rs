//! Floating-point pixel accumulation buffer.
//!
//! Workers blend contributions in from arbitrary threads while the
//! presentation tick snapshots the whole buffer; locking is sharded per
//! scanline so parallel workers on different rows never contend, and an
//! outer reader-writer lock makes buffer replacement atomic with respect
//! to both.

use std::sync::{Mutex, RwLock};

use crate::types::{blend, Contribution, Resolution, Rgba};

/// One generation's backing store: a row-sharded RGBA grid.
pub struct FrameBuffer {
    resolution: Resolution,
    rows: Vec<Mutex<Box<[Rgba]>>>,
}

impl FrameBuffer {
    fn new(resolution: Resolution) -> Self {
        let width = resolution.width as usize;
        let rows = (0..resolution.height)
            .map(|_| Mutex::new(vec![Rgba::ZERO; width].into_boxed_slice()))
            .collect();
        Self { resolution, rows }
    }
}

/// A read-only copy of the accumulator contents, row-major.
#[derive(Clone, Debug)]
pub struct Frame {
    pub resolution: Resolution,
    pub pixels: Vec<Rgba>,
}

impl Frame {
    /// The pixel at (x, y). Panics on out-of-range coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        assert!(x < self.resolution.width && y < self.resolution.height);
        self.pixels[(y * self.resolution.width + x) as usize]
    }
}

/// Shared accumulation buffer for one raytrace target.
///
/// `apply` may be called concurrently from any number of worker threads;
/// a single pixel's RGBA quadruple never tears because every row is
/// guarded by its own mutex. `snapshot` and `replace` are serialized
/// against each other and against in-flight applies by the outer lock, so
/// a snapshot sees either the old buffer in full or the new buffer in
/// full, never a mix.
pub struct PixelAccumulator {
    inner: RwLock<FrameBuffer>,
}

impl PixelAccumulator {
    /// Create an accumulator with a zeroed buffer of the given extent.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            inner: RwLock::new(FrameBuffer::new(resolution)),
        }
    }

    /// The extent of the current buffer.
    pub fn resolution(&self) -> Resolution {
        self.inner.read().unwrap().resolution
    }

    /// Blend one contribution into the buffer.
    ///
    /// Coordinates outside the current extent are silently dropped; late
    /// contributions racing a resize are expected and harmless.
    pub fn apply(&self, contribution: Contribution) {
        let buffer = self.inner.read().unwrap();
        if !buffer.resolution.contains(contribution.pixel) {
            return;
        }
        let mut row = buffer.rows[contribution.pixel.y as usize].lock().unwrap();
        let pixel = &mut row[contribution.pixel.x as usize];
        *pixel = blend(*pixel, contribution.color);
    }

    /// Copy out the full buffer.
    ///
    /// Row locks are taken one at a time, so this never blocks behind more
    /// than one in-flight blend per row.
    pub fn snapshot(&self) -> Frame {
        let buffer = self.inner.read().unwrap();
        let mut pixels = Vec::with_capacity(buffer.resolution.pixel_count());
        for row in &buffer.rows {
            pixels.extend_from_slice(&row.lock().unwrap());
        }
        Frame {
            resolution: buffer.resolution,
            pixels,
        }
    }

    /// Swap in a fresh zeroed buffer, returning the previous one.
    ///
    /// The caller must have quiesced the previous generation's workers
    /// first; the returned buffer lets a failed session start roll back to
    /// the last presentable frame via [`PixelAccumulator::restore`].
    pub fn replace(&self, resolution: Resolution) -> FrameBuffer {
        let mut buffer = self.inner.write().unwrap();
        std::mem::replace(&mut *buffer, FrameBuffer::new(resolution))
    }

    /// Put a previously taken buffer back.
    pub fn restore(&self, previous: FrameBuffer) {
        *self.inner.write().unwrap() = previous;
    }

    /// Discard the current contents and reallocate at the given extent.
    pub fn reset(&self, resolution: Resolution) {
        drop(self.replace(resolution));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelCoord;
    use std::sync::Arc;

    fn rgba(r: f32, g: f32, b: f32, a: f32) -> Rgba {
        Rgba::new(r, g, b, a)
    }

    #[test]
    fn test_new_buffer_is_zero() {
        let accum = PixelAccumulator::new(Resolution::new(3, 2));
        let frame = accum.snapshot();
        assert_eq!(frame.pixels.len(), 6);
        assert!(frame.pixels.iter().all(|p| *p == Rgba::ZERO));
    }

    #[test]
    fn test_full_alpha_overwrites() {
        let accum = PixelAccumulator::new(Resolution::new(2, 2));
        let p = PixelCoord::new(1, 1);
        accum.apply(Contribution::new(p, rgba(1.0, 0.0, 0.0, 1.0)));
        accum.apply(Contribution::new(p, rgba(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(accum.snapshot().pixel(1, 1), rgba(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_zero_alpha_never_changes_pixel() {
        let accum = PixelAccumulator::new(Resolution::new(2, 2));
        let p = PixelCoord::new(0, 1);
        accum.apply(Contribution::new(p, rgba(0.3, 0.6, 0.9, 1.0)));
        accum.apply(Contribution::new(p, rgba(1.0, 1.0, 1.0, 0.0)));
        assert_eq!(accum.snapshot().pixel(0, 1), rgba(0.3, 0.6, 0.9, 1.0));
    }

    #[test]
    fn test_blend_matches_over_operator() {
        let accum = PixelAccumulator::new(Resolution::new(1, 1));
        let p = PixelCoord::new(0, 0);
        let first = rgba(0.2, 0.4, 0.6, 1.0);
        let second = rgba(1.0, 0.0, 0.0, 0.25);
        accum.apply(Contribution::new(p, first));
        accum.apply(Contribution::new(p, second));

        let rgb = first.truncate() * 0.75 + second.truncate() * 0.25;
        let got = accum.snapshot().pixel(0, 0);
        assert!((got - rgb.extend(1.0)).length() < 1e-6);
    }

    #[test]
    fn test_out_of_bounds_is_dropped() {
        let accum = PixelAccumulator::new(Resolution::new(2, 2));
        for pixel in [
            PixelCoord::new(2, 0),
            PixelCoord::new(0, 2),
            PixelCoord::new(-1, 0),
            PixelCoord::new(0, -7),
        ] {
            accum.apply(Contribution::new(pixel, rgba(1.0, 1.0, 1.0, 1.0)));
        }
        let frame = accum.snapshot();
        assert!(frame.pixels.iter().all(|p| *p == Rgba::ZERO));
    }

    #[test]
    fn test_replace_and_restore() {
        let accum = PixelAccumulator::new(Resolution::new(2, 2));
        accum.apply(Contribution::new(
            PixelCoord::new(0, 0),
            rgba(1.0, 0.5, 0.25, 1.0),
        ));

        let previous = accum.replace(Resolution::new(4, 4));
        assert_eq!(accum.resolution(), Resolution::new(4, 4));
        assert!(accum.snapshot().pixels.iter().all(|p| *p == Rgba::ZERO));

        accum.restore(previous);
        assert_eq!(accum.resolution(), Resolution::new(2, 2));
        assert_eq!(accum.snapshot().pixel(0, 0), rgba(1.0, 0.5, 0.25, 1.0));
    }

    #[test]
    fn test_accumulation_scenario() {
        // red at full weight, then green at half weight
        let accum = PixelAccumulator::new(Resolution::new(4, 4));
        let p = PixelCoord::new(0, 0);
        accum.apply(Contribution::new(p, rgba(1.0, 0.0, 0.0, 1.0)));
        accum.apply(Contribution::new(p, rgba(0.0, 1.0, 0.0, 0.5)));

        let frame = accum.snapshot();
        let got = frame.pixel(0, 0);
        assert!((got - rgba(0.5, 0.5, 0.0, 1.0)).length() < 1e-6);

        for y in 0..4 {
            for x in 0..4 {
                if (x, y) != (0, 0) {
                    assert_eq!(frame.pixel(x, y), Rgba::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_concurrent_disjoint_applies_are_order_independent() {
        let resolution = Resolution::new(16, 16);
        let concurrent = Arc::new(PixelAccumulator::new(resolution));

        std::thread::scope(|scope| {
            for worker in 0..4u32 {
                let accum = Arc::clone(&concurrent);
                scope.spawn(move || {
                    for y in 0..16 {
                        for x in (worker..16).step_by(4) {
                            let value = (x + y * 16) as f32 / 256.0;
                            accum.apply(Contribution::new(
                                PixelCoord::new(x as i32, y as i32),
                                rgba(value, value, value, 1.0),
                            ));
                        }
                    }
                });
            }
        });

        // Sequential reference
        let sequential = PixelAccumulator::new(resolution);
        for y in 0..16 {
            for x in 0..16 {
                let value = (x + y * 16) as f32 / 256.0;
                sequential.apply(Contribution::new(
                    PixelCoord::new(x as i32, y as i32),
                    rgba(value, value, value, 1.0),
                ));
            }
        }

        assert_eq!(concurrent.snapshot().pixels, sequential.snapshot().pixels);
    }

    #[test]
    fn test_concurrent_same_pixel_never_tears() {
        let accum = Arc::new(PixelAccumulator::new(Resolution::new(1, 1)));
        let a = rgba(1.0, 2.0, 3.0, 1.0);
        let b = rgba(4.0, 5.0, 6.0, 1.0);

        std::thread::scope(|scope| {
            for color in [a, b] {
                let accum = Arc::clone(&accum);
                scope.spawn(move || {
                    for _ in 0..1000 {
                        accum.apply(Contribution::new(PixelCoord::new(0, 0), color));
                    }
                });
            }
        });

        // With alpha = 1 every blend is a full overwrite, so the final
        // value must be exactly one of the two inputs - a mixed quadruple
        // would mean a torn write.
        let got = accum.snapshot().pixel(0, 0);
        assert!(got == a || got == b, "torn pixel: {:?}", got);
    }
}
