//! Render configuration loaded from flat JSON dictionaries.
//!
//! Settings come from a single JSON object of kebab-case keys, read once
//! when a session is constructed. A `reference` key names a second config
//! file whose keys are merged over the top-level ones. Unknown keys are
//! ignored so configs can carry application-level entries the driver does
//! not consume.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while reading a config dictionary.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config root must be a JSON object")]
    NotAnObject,
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which per-pixel integrator the worker service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorKind {
    PathTracing,
    AmbientOcclusion,
    Normals,
    Fresnel,
}

impl IntegratorKind {
    /// Resolve an integrator name from the `integrator` config key.
    ///
    /// Unknown names fall back to path tracing with a logged warning.
    pub fn from_name(name: &str) -> Self {
        match name {
            "path-trace" => IntegratorKind::PathTracing,
            "ao" | "hack-ao" => IntegratorKind::AmbientOcclusion,
            "normals" => IntegratorKind::Normals,
            "fresnel" => IntegratorKind::Fresnel,
            other => {
                log::warn!("unknown integrator '{}', using path tracing", other);
                IntegratorKind::PathTracing
            }
        }
    }
}

/// Raytrace driver settings, a flat kebab-case key-value set.
///
/// Angles are stored in degrees as they appear in config files; callers
/// convert when building the camera.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderSettings {
    /// Accumulation passes per pixel
    pub rays_per_pixel: u32,
    /// Bounce budget for path tracing; 0 selects the built-in default
    pub max_path_length: u32,
    /// Square region edge length assigned to one worker at a time
    pub render_region_size: u32,
    /// Worker pool size; 0 = hardware core count
    pub threads: u32,
    /// Occlusion rays per shading point (ambient occlusion integrator)
    pub light_samples: u32,
    /// Independent scatter chains averaged per shade (path tracing)
    pub bsdf_samples: u32,
    /// Integrator name, resolved via [`IntegratorKind::from_name`]
    pub integrator: String,
    /// Environment color returned by escaping rays
    pub env_color: [f32; 4],
    /// Vertical field of view in degrees
    pub camera_fov: f32,
    /// Camera azimuth in degrees
    pub camera_phi: f32,
    /// Camera polar angle in degrees
    pub camera_theta: f32,
    /// Camera distance from the view point
    pub camera_distance: f32,
    /// Point the camera looks at
    pub camera_view_point: [f32; 3],
    /// Offset added to the spherical camera position
    pub camera_offset: [f32; 3],
    /// Name of a second config file merged over this one
    pub reference: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            rays_per_pixel: 32,
            max_path_length: 0,
            render_region_size: 32,
            threads: 0,
            light_samples: 1,
            bsdf_samples: 1,
            integrator: "path-trace".to_string(),
            env_color: [1.0, 1.0, 1.0, 1.0],
            camera_fov: 60.0,
            camera_phi: 0.0,
            camera_theta: 0.0,
            camera_distance: 3.0,
            camera_view_point: [0.0, 0.0, 0.0],
            camera_offset: [0.0, 0.0, 0.0],
            reference: None,
        }
    }
}

impl RenderSettings {
    /// Parse settings from a JSON object.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Parse settings from a JSON object plus a referenced config.
    ///
    /// Keys from the referenced file overwrite top-level keys.
    pub fn from_json_with_reference(text: &str, reference: &str) -> ConfigResult<Self> {
        let mut top: Value = serde_json::from_str(text)?;
        let referenced: Value = serde_json::from_str(reference)?;

        let (Some(top_map), Some(ref_map)) = (top.as_object_mut(), referenced.as_object()) else {
            return Err(ConfigError::NotAnObject);
        };
        for (key, value) in ref_map {
            top_map.insert(key.clone(), value.clone());
        }

        Ok(serde_json::from_value(top)?)
    }

    /// The integrator selected by these settings.
    pub fn integrator_kind(&self) -> IntegratorKind {
        IntegratorKind::from_name(&self.integrator)
    }
}
