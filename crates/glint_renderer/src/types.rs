//! Value types shared across the driver.

use glint_math::Vec4;

/// RGBA color with the blend weight in the `w` channel.
pub type Rgba = Vec4;

/// Identifier distinguishing one session's worker output from a prior,
/// possibly still-draining, session. Monotonically increasing; never
/// reused, even after a failed start.
pub type Generation = u64;

/// Immutable framebuffer extent for the lifetime of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Create a new resolution.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True for zero-area extents, which are not valid session targets.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the coordinate addresses a pixel inside this extent.
    pub fn contains(&self, pixel: PixelCoord) -> bool {
        pixel.x >= 0
            && pixel.y >= 0
            && (pixel.x as u32) < self.width
            && (pixel.y as u32) < self.height
    }

    /// Width-to-height ratio.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Integer pixel coordinate.
///
/// Signed so that late or racing contributions computed against a stale
/// resolution stay representable; anything outside the current extent is
/// silently dropped by the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCoord {
    pub x: i32,
    pub y: i32,
}

impl PixelCoord {
    /// Create a new pixel coordinate.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One incremental color sample for a pixel.
///
/// Contributions are not idempotent: applying the same contribution twice
/// blends twice. The blend weight rides in `color.w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub pixel: PixelCoord,
    pub color: Rgba,
}

impl Contribution {
    /// Create a new contribution.
    pub fn new(pixel: PixelCoord, color: Rgba) -> Self {
        Self { pixel, color }
    }

    /// The blend weight of this contribution.
    pub fn alpha(&self) -> f32 {
        self.color.w
    }
}

/// "Over" alpha compositing with the weight taken from `src.w`.
///
/// Color channels blend as `dst * (1 - a) + src * a`; the stored alpha
/// composites as coverage, `dst.w * (1 - a) + a`, so a fully weighted
/// sample always leaves an opaque pixel behind.
#[inline]
pub fn blend(dst: Rgba, src: Rgba) -> Rgba {
    let a = src.w;
    let rgb = dst.truncate() * (1.0 - a) + src.truncate() * a;
    rgb.extend(dst.w * (1.0 - a) + a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_contains() {
        let res = Resolution::new(4, 3);
        assert!(res.contains(PixelCoord::new(0, 0)));
        assert!(res.contains(PixelCoord::new(3, 2)));
        assert!(!res.contains(PixelCoord::new(4, 0)));
        assert!(!res.contains(PixelCoord::new(0, 3)));
        assert!(!res.contains(PixelCoord::new(-1, 0)));
        assert!(!res.contains(PixelCoord::new(0, -1)));
    }

    #[test]
    fn test_resolution_empty() {
        assert!(Resolution::new(0, 10).is_empty());
        assert!(Resolution::new(10, 0).is_empty());
        assert!(!Resolution::new(1, 1).is_empty());
    }

    #[test]
    fn test_blend_endpoints() {
        let dst = Rgba::new(1.0, 0.0, 0.0, 1.0);

        // alpha = 1 fully overwrites
        let src = Rgba::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(blend(dst, src), src);

        // alpha = 0 leaves the destination untouched
        let src = Rgba::new(0.0, 1.0, 0.0, 0.0);
        assert_eq!(blend(dst, src), dst);
    }

    #[test]
    fn test_blend_formula() {
        let dst = Rgba::new(0.2, 0.4, 0.6, 0.8);
        let src = Rgba::new(1.0, 0.0, 0.5, 0.25);
        let out = blend(dst, src);

        let rgb = dst.truncate() * (1.0 - 0.25) + src.truncate() * 0.25;
        let alpha = 0.8 * (1.0 - 0.25) + 0.25;
        assert!((out - rgb.extend(alpha)).length() < 1e-6);
    }
}
