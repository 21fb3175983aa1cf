// Re-export glam for convenience
pub use glam::*;

// Glint math types
mod ray;
pub use ray::Ray;

mod camera;
pub use camera::{from_spherical, Camera};
