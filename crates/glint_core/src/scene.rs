//! Scene description for the raytrace driver.
//!
//! A `Scene` is treated as an immutable snapshot for the duration of one
//! raytrace session: the session holds an `Arc<Scene>` and workers only
//! read from it. Geometry is deliberately simple (analytic spheres) - the
//! driver does not own a scene graph or mesh loading.

use glint_math::{Vec3, Vec4};

/// Surface properties for a scene object.
#[derive(Clone, Copy, Debug)]
pub struct Material {
    /// Diffuse reflectance (RGB, 0-1)
    pub albedo: Vec3,
    /// Emitted radiance (RGB, zero for non-lights)
    pub emissive: Vec3,
}

impl Material {
    /// A diffuse material with the given albedo.
    pub fn diffuse(albedo: Vec3) -> Self {
        Self {
            albedo,
            emissive: Vec3::ZERO,
        }
    }

    /// A light-emitting material.
    pub fn emissive(emissive: Vec3) -> Self {
        Self {
            albedo: Vec3::ZERO,
            emissive,
        }
    }
}

/// An analytic sphere.
#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }
}

/// Immutable scene snapshot traced by the worker service.
#[derive(Clone, Debug)]
pub struct Scene {
    pub spheres: Vec<Sphere>,
    /// Color returned by rays that escape the scene (alpha unused by
    /// integrators, kept for config round-tripping)
    pub env_color: Vec4,
}

impl Scene {
    /// Create an empty scene with the given environment color.
    pub fn new(env_color: Vec4) -> Self {
        Self {
            spheres: Vec::new(),
            env_color,
        }
    }

    /// Add a sphere to the scene.
    pub fn push(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    /// True when the scene contains no geometry.
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// The scene the demo viewer renders: a ground sphere, three subjects
    /// and an overhead area light.
    pub fn demo(env_color: Vec4) -> Self {
        let mut scene = Scene::new(env_color);
        scene.push(Sphere::new(
            Vec3::new(0.0, -100.5, 0.0),
            100.0,
            Material::diffuse(Vec3::new(0.6, 0.6, 0.6)),
        ));
        scene.push(Sphere::new(
            Vec3::new(-1.1, 0.0, 0.0),
            0.5,
            Material::diffuse(Vec3::new(0.8, 0.3, 0.25)),
        ));
        scene.push(Sphere::new(
            Vec3::new(0.0, 0.0, 0.0),
            0.5,
            Material::diffuse(Vec3::new(0.3, 0.5, 0.8)),
        ));
        scene.push(Sphere::new(
            Vec3::new(1.1, 0.0, 0.0),
            0.5,
            Material::diffuse(Vec3::new(0.35, 0.7, 0.3)),
        ));
        scene.push(Sphere::new(
            Vec3::new(0.0, 2.2, 0.0),
            0.8,
            Material::emissive(Vec3::new(4.0, 4.0, 3.6)),
        ));
        scene
    }
}
