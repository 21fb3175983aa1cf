//! Glint Core - configuration and scene description for the raytrace driver.
//!
//! This crate provides:
//!
//! - **Configuration**: `RenderSettings`, a flat key-value dictionary read
//!   from JSON once per session, with `reference` file merging
//! - **Scene types**: the immutable `Scene` snapshot the worker service
//!   traces for the lifetime of one session

pub mod config;
pub mod scene;

// Re-export commonly used types
pub use config::{ConfigError, IntegratorKind, RenderSettings};
pub use scene::{Material, Scene, Sphere};
