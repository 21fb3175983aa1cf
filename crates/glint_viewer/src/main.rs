use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glint_core::{RenderSettings, Scene};
use glint_math::{Camera, Vec3, Vec4};
use glint_renderer::{
    integrator_for, PixelAccumulator, PixelCoord, PresentError, PresentTarget,
    PresentationBridge, RaytraceSession, Resolution, Rgba, ThreadedTraceService,
};

const DEFAULT_CONFIG: &str = "media/config/config.json";
const OUTPUT_FILE: &str = "glint.png";
const PRESENT_TICK: Duration = Duration::from_millis(500);
const MAX_RUNTIME: Duration = Duration::from_secs(120);

/// Display target that tonemaps the linear frame and writes it as a PNG.
struct PngTarget {
    path: PathBuf,
}

impl PngTarget {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Gamma 2.0 transfer for display.
fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

impl PresentTarget for PngTarget {
    fn upload(&mut self, resolution: Resolution, pixels: &[Rgba]) -> Result<(), PresentError> {
        let mut bytes = Vec::with_capacity(pixels.len() * 4);
        for pixel in pixels {
            bytes.push((255.0 * linear_to_gamma(pixel.x).clamp(0.0, 1.0)) as u8);
            bytes.push((255.0 * linear_to_gamma(pixel.y).clamp(0.0, 1.0)) as u8);
            bytes.push((255.0 * linear_to_gamma(pixel.z).clamp(0.0, 1.0)) as u8);
            bytes.push(255);
        }

        let image =
            image::RgbaImage::from_raw(resolution.width, resolution.height, bytes)
                .ok_or_else(|| std::io::Error::other("frame size mismatch"))?;
        image
            .save(&self.path)
            .map_err(|e| PresentError::Io(std::io::Error::other(e)))?;
        Ok(())
    }
}

/// Load settings, resolving a `reference` config next to the main file.
fn load_settings(path: &Path) -> Result<RenderSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let settings = RenderSettings::from_json(&text)?;

    let Some(reference) = &settings.reference else {
        return Ok(settings);
    };
    let reference_path = path.parent().unwrap_or(Path::new(".")).join(reference);
    let reference_text = std::fs::read_to_string(&reference_path)
        .with_context(|| format!("reading referenced config {}", reference_path.display()))?;
    Ok(RenderSettings::from_json_with_reference(
        &text,
        &reference_text,
    )?)
}

fn parse_resolution(arg: &str) -> Result<Resolution> {
    let (width, height) = arg
        .split_once('x')
        .context("resolution must look like 960x540")?;
    Ok(Resolution::new(width.parse()?, height.parse()?))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let resolution = match args.next() {
        Some(arg) => parse_resolution(&arg)?,
        None => Resolution::new(960, 540),
    };

    let settings = load_settings(Path::new(&config_path))?;
    log::info!(
        "Config {} -> {} integrator, {} rays per pixel",
        config_path,
        settings.integrator,
        settings.rays_per_pixel
    );

    let scene = Arc::new(Scene::demo(Vec4::from_array(settings.env_color)));
    let camera = Camera::from_spherical(
        settings.camera_distance,
        settings.camera_theta.to_radians(),
        settings.camera_phi.to_radians(),
        Vec3::from_array(settings.camera_view_point),
        Vec3::from_array(settings.camera_offset),
        settings.camera_fov.to_radians(),
        resolution.aspect(),
    );
    log::info!(
        "Camera position: {}, {}, {}",
        camera.position.x,
        camera.position.y,
        camera.position.z
    );

    let integrator = integrator_for(settings.integrator_kind(), &settings);
    let service = Arc::new(ThreadedTraceService::new(integrator, &settings)?);

    let accumulator = Arc::new(PixelAccumulator::new(resolution));
    let mut session = RaytraceSession::new(service, Arc::clone(&accumulator));
    session.start(Arc::clone(&scene), camera, resolution)?;

    let mut bridge = PresentationBridge::new(accumulator, Box::new(PngTarget::new(OUTPUT_FILE)));

    // Present on a fixed tick while the job refines the frame
    let started = Instant::now();
    while !session.is_quiesced() && started.elapsed() < MAX_RUNTIME {
        std::thread::sleep(PRESENT_TICK);
        bridge.present()?;
    }

    // Inspect the center pixel the way a viewer click would
    let center = PixelCoord::new(resolution.width as i32 / 2, resolution.height as i32 / 2);
    let contribution = session.probe(&scene, &camera, center)?;
    log::info!(
        "Probe at ({}, {}): {:.4}, {:.4}, {:.4}",
        center.x,
        center.y,
        contribution.color.x,
        contribution.color.y,
        contribution.color.z
    );

    bridge.present()?;
    session.stop();
    log::info!(
        "Wrote {} after {:.1}s",
        OUTPUT_FILE,
        started.elapsed().as_secs_f32()
    );
    Ok(())
}
