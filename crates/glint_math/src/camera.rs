//! Camera placement and primary ray generation.

use crate::{Ray, Vec3};

/// Unit direction from spherical coordinates.
///
/// `theta` is the polar angle measured up from the XZ plane, `phi` the
/// azimuth around the Y axis. Both are in radians.
pub fn from_spherical(theta: f32, phi: f32) -> Vec3 {
    let cos_theta = theta.cos();
    Vec3::new(cos_theta * phi.cos(), theta.sin(), cos_theta * phi.sin())
}

/// Pinhole camera generating viewport rays.
///
/// The camera is rebuilt for every raytrace session; its basis vectors are
/// cached at construction, so position/target changes require a new camera.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,

    // Cached basis (computed at construction)
    u: Vec3,
    v: Vec3,
    w: Vec3,
    half_width: f32,
    half_height: f32,
}

impl Camera {
    /// Create a camera at `position` looking at `target`.
    ///
    /// `fov_y` is the vertical field of view in radians.
    pub fn new(position: Vec3, target: Vec3, fov_y: f32, aspect: f32) -> Self {
        let up = Vec3::Y;
        let w = (position - target).normalize();
        let u = up.cross(w).normalize();
        let v = w.cross(u);
        let half_height = (fov_y * 0.5).tan();
        let half_width = half_height * aspect;

        Self {
            position,
            target,
            up,
            fov_y,
            aspect,
            u,
            v,
            w,
            half_width,
            half_height,
        }
    }

    /// Place the camera on a sphere around `look_point`.
    ///
    /// The eye lands at `distance * from_spherical(theta, phi) + offset`,
    /// looking at `look_point`. Angles are in radians.
    pub fn from_spherical(
        distance: f32,
        theta: f32,
        phi: f32,
        look_point: Vec3,
        offset: Vec3,
        fov_y: f32,
        aspect: f32,
    ) -> Self {
        let position = distance * from_spherical(theta, phi) + offset;
        Self::new(position, look_point, fov_y, aspect)
    }

    /// Generate the primary ray through viewport coordinates (x, y).
    ///
    /// Coordinates are in pixels with (0, 0) at the top-left; pass
    /// fractional values for sub-pixel jitter. The returned direction is
    /// normalized.
    pub fn primary_ray(&self, x: f32, y: f32, width: f32, height: f32) -> Ray {
        let sx = (2.0 * x / width - 1.0) * self.half_width;
        let sy = (1.0 - 2.0 * y / height) * self.half_height;
        let direction = (sx * self.u + sy * self.v - self.w).normalize();
        Ray::new(self.position, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_spherical_axes() {
        // theta = 0, phi = 0 lands on +X
        let d = from_spherical(0.0, 0.0);
        assert!((d - Vec3::X).length() < 1e-6);

        // theta = pi/2 lands on +Y regardless of phi
        let d = from_spherical(std::f32::consts::FRAC_PI_2, 1.2345);
        assert!((d - Vec3::Y).length() < 1e-6);

        // always unit length
        let d = from_spherical(0.7, -2.1);
        assert!((d.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_spherical_placement() {
        let look = Vec3::new(0.0, 1.0, 0.0);
        let offset = Vec3::new(0.0, 0.5, 0.0);
        let camera = Camera::from_spherical(
            2.0,
            0.0,
            0.0,
            look,
            offset,
            60.0_f32.to_radians(),
            1.0,
        );

        assert!((camera.position - Vec3::new(2.0, 0.5, 0.0)).length() < 1e-6);
        assert_eq!(camera.target, look);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::new(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            60.0_f32.to_radians(),
            16.0 / 9.0,
        );

        let ray = camera.primary_ray(320.0, 180.0, 640.0, 360.0);
        let expected = (camera.target - camera.position).normalize();
        assert!((ray.direction - expected).length() < 1e-5);
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn test_corner_rays_diverge() {
        let camera = Camera::new(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            60.0_f32.to_radians(),
            1.0,
        );

        let top_left = camera.primary_ray(0.0, 0.0, 100.0, 100.0);
        let bottom_right = camera.primary_ray(100.0, 100.0, 100.0, 100.0);

        assert!(top_left.direction.x < 0.0);
        assert!(top_left.direction.y > 0.0);
        assert!(bottom_right.direction.x > 0.0);
        assert!(bottom_right.direction.y < 0.0);
    }
}
