//! Ray/scene intersection for the built-in integrators.

use glint_core::Scene;
use glint_math::{Ray, Vec3};
use rand::distributions::{Distribution, Standard};
use rand::RngCore;

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    Standard.sample(rng)
}

/// Closest-hit record.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub albedo: Vec3,
    pub emissive: Vec3,
}

/// Find the nearest sphere intersection in `(t_min, t_max)`.
pub fn hit_scene(scene: &Scene, ray: &Ray, t_min: f32, t_max: f32) -> Option<Hit> {
    let mut closest = t_max;
    let mut hit = None;

    for sphere in &scene.spheres {
        let oc = sphere.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - sphere.radius * sphere.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            continue;
        }

        // Nearest root in the acceptable range
        let sqrtd = discriminant.sqrt();
        let mut root = (h - sqrtd) / a;
        if root <= t_min || root >= closest {
            root = (h + sqrtd) / a;
            if root <= t_min || root >= closest {
                continue;
            }
        }

        let point = ray.at(root);
        closest = root;
        hit = Some(Hit {
            t: root,
            point,
            normal: (point - sphere.center) / sphere.radius,
            albedo: sphere.material.albedo,
            emissive: sphere.material.emissive,
        });
    }

    hit
}

/// Uniform random direction on the unit sphere, by rejection.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let length_squared = candidate.length_squared();
        if length_squared > 1e-7 && length_squared <= 1.0 {
            return candidate / length_squared.sqrt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{Material, Sphere};
    use glint_math::Vec4;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene_with(spheres: &[Sphere]) -> Scene {
        let mut scene = Scene::new(Vec4::ONE);
        for sphere in spheres {
            scene.push(*sphere);
        }
        scene
    }

    #[test]
    fn test_hit_front_of_sphere() {
        let scene = scene_with(&[Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Material::diffuse(Vec3::ONE),
        )]);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = hit_scene(&scene, &ray, 1e-3, f32::INFINITY).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_miss() {
        let scene = scene_with(&[Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Material::diffuse(Vec3::ONE),
        )]);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(hit_scene(&scene, &ray, 1e-3, f32::INFINITY).is_none());
    }

    #[test]
    fn test_nearest_of_two() {
        let near = Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            0.5,
            Material::diffuse(Vec3::X),
        );
        let far = Sphere::new(
            Vec3::new(0.0, 0.0, -6.0),
            0.5,
            Material::diffuse(Vec3::Y),
        );
        let scene = scene_with(&[far, near]);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = hit_scene(&scene, &ray, 1e-3, f32::INFINITY).unwrap();
        assert_eq!(hit.albedo, Vec3::X);
    }

    #[test]
    fn test_t_min_skips_backward_hits() {
        let scene = scene_with(&[Sphere::new(
            Vec3::new(0.0, 0.0, 3.0),
            1.0,
            Material::diffuse(Vec3::ONE),
        )]);
        // Sphere is behind the ray
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(hit_scene(&scene, &ray, 1e-3, f32::INFINITY).is_none());
    }

    #[test]
    fn test_random_unit_vector_is_unit() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }
}
