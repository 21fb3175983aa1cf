//! Built-in per-pixel integrators.
//!
//! These are demo-grade shaders behind one small trait; the driver only
//! needs something that can turn a primary ray into radiance. Production
//! integrators would live behind the same seam.

mod intersect;

pub use intersect::{gen_f32, hit_scene, random_unit_vector, Hit};

use std::sync::Arc;

use glint_core::{IntegratorKind, RenderSettings, Scene};
use glint_math::{Ray, Vec3};
use rand::RngCore;

/// Fallback bounce budget when the config leaves `max-path-length` at 0.
const DEFAULT_PATH_LENGTH: u32 = 5;

/// Minimum hit distance, avoids self-intersection acne.
const RAY_EPSILON: f32 = 1e-3;

/// Evaluates the radiance arriving along one primary ray.
pub trait Integrator: Send + Sync {
    fn shade(&self, scene: &Scene, ray: &Ray, rng: &mut dyn RngCore) -> Vec3;
}

/// Build the integrator selected by the settings.
pub fn integrator_for(kind: IntegratorKind, settings: &RenderSettings) -> Arc<dyn Integrator> {
    match kind {
        IntegratorKind::PathTracing => Arc::new(PathTracingIntegrator {
            max_path_length: if settings.max_path_length == 0 {
                DEFAULT_PATH_LENGTH
            } else {
                settings.max_path_length
            },
            samples: settings.bsdf_samples.max(1),
        }),
        IntegratorKind::AmbientOcclusion => Arc::new(AmbientOcclusionIntegrator {
            samples: settings.light_samples.max(1),
        }),
        IntegratorKind::Normals => Arc::new(NormalsIntegrator),
        IntegratorKind::Fresnel => Arc::new(FresnelIntegrator),
    }
}

/// Monte Carlo path tracing with cosine-weighted diffuse bounces.
pub struct PathTracingIntegrator {
    /// Bounce budget per path
    pub max_path_length: u32,
    /// Independent paths averaged per shade call
    pub samples: u32,
}

impl PathTracingIntegrator {
    fn trace_path(&self, scene: &Scene, ray: &Ray, rng: &mut dyn RngCore) -> Vec3 {
        let mut radiance = Vec3::ZERO;
        let mut throughput = Vec3::ONE;
        let mut current = *ray;

        for _ in 0..self.max_path_length {
            let Some(hit) = hit_scene(scene, &current, RAY_EPSILON, f32::INFINITY) else {
                return radiance + throughput * scene.env_color.truncate();
            };

            radiance += throughput * hit.emissive;
            throughput *= hit.albedo;
            if throughput.max_element() <= 0.0 {
                break;
            }

            // Cosine-ish diffuse scatter around the surface normal
            let mut direction = hit.normal + random_unit_vector(rng);
            if direction.length_squared() < 1e-8 {
                direction = hit.normal;
            }
            current = Ray::new(hit.point, direction);
        }

        radiance
    }
}

impl Integrator for PathTracingIntegrator {
    fn shade(&self, scene: &Scene, ray: &Ray, rng: &mut dyn RngCore) -> Vec3 {
        let mut sum = Vec3::ZERO;
        for _ in 0..self.samples {
            sum += self.trace_path(scene, ray, rng);
        }
        sum / self.samples as f32
    }
}

/// Hemisphere visibility at the first hit.
pub struct AmbientOcclusionIntegrator {
    /// Occlusion rays per shading point
    pub samples: u32,
}

impl Integrator for AmbientOcclusionIntegrator {
    fn shade(&self, scene: &Scene, ray: &Ray, rng: &mut dyn RngCore) -> Vec3 {
        let Some(hit) = hit_scene(scene, ray, RAY_EPSILON, f32::INFINITY) else {
            return scene.env_color.truncate();
        };

        let mut open = 0u32;
        for _ in 0..self.samples {
            let direction = hit.normal + random_unit_vector(rng);
            let occlusion_ray = Ray::new(hit.point, direction);
            if hit_scene(scene, &occlusion_ray, RAY_EPSILON, f32::INFINITY).is_none() {
                open += 1;
            }
        }

        Vec3::splat(open as f32 / self.samples as f32)
    }
}

/// Surface normal visualization; misses shade black.
pub struct NormalsIntegrator;

impl Integrator for NormalsIntegrator {
    fn shade(&self, scene: &Scene, ray: &Ray, _rng: &mut dyn RngCore) -> Vec3 {
        match hit_scene(scene, ray, RAY_EPSILON, f32::INFINITY) {
            Some(hit) => (hit.normal + Vec3::ONE) * 0.5,
            None => Vec3::ZERO,
        }
    }
}

/// Schlick facing-ratio visualization.
pub struct FresnelIntegrator;

impl Integrator for FresnelIntegrator {
    fn shade(&self, scene: &Scene, ray: &Ray, _rng: &mut dyn RngCore) -> Vec3 {
        let Some(hit) = hit_scene(scene, ray, RAY_EPSILON, f32::INFINITY) else {
            return scene.env_color.truncate();
        };

        // r0 for an air/glass interface
        let r0 = 0.04;
        let cosine = hit.normal.dot(-ray.direction.normalize()).clamp(0.0, 1.0);
        let fresnel = r0 + (1.0 - r0) * (1.0 - cosine).powi(5);
        Vec3::splat(fresnel)
    }
}
