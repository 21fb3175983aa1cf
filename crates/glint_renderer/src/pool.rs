//! Built-in worker service: a rayon pool tracing center-out regions.
//!
//! Each region is owned by one worker task at a time. The worker shades
//! every pixel of its region once per accumulation pass and emits the
//! result with weight `1 / (pass + 1)`, so the blended buffer converges
//! to the running mean while earlier passes stay visible immediately.
//! Cancellation is cooperative: the flag is checked once per scanline,
//! never mid-pixel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use glint_core::{RenderSettings, Scene};
use glint_math::Camera;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::error::LaunchError;
use crate::region::{generate_regions, Region};
use crate::service::{TraceJob, TraceService};
use crate::sink::OutputSink;
use crate::trace::Integrator;
use crate::types::{PixelCoord, Resolution, Rgba};

/// Raytrace worker service backed by a dedicated rayon thread pool.
pub struct ThreadedTraceService {
    pool: Arc<rayon::ThreadPool>,
    integrator: Arc<dyn Integrator>,
    region_size: u32,
    passes: u32,
}

impl ThreadedTraceService {
    /// Build a service from settings, consumed once at construction.
    ///
    /// `threads = 0` sizes the pool to the hardware core count.
    pub fn new(
        integrator: Arc<dyn Integrator>,
        settings: &RenderSettings,
    ) -> Result<Self, LaunchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.threads as usize)
            .thread_name(|index| format!("glint-worker-{index}"))
            .build()?;

        Ok(Self {
            pool: Arc::new(pool),
            integrator,
            region_size: settings.render_region_size.max(1),
            passes: settings.rays_per_pixel.max(1),
        })
    }
}

impl TraceService for ThreadedTraceService {
    fn launch(
        &self,
        scene: Arc<Scene>,
        camera: Camera,
        resolution: Resolution,
        sink: OutputSink,
    ) -> Result<Box<dyn TraceJob>, LaunchError> {
        if scene.is_empty() {
            return Err(LaunchError::EmptyScene);
        }

        let regions = generate_regions(resolution, self.region_size);
        log::debug!(
            "launching {} regions x {} passes on {} workers",
            regions.len(),
            self.passes,
            self.pool.current_num_threads()
        );

        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let pool = Arc::clone(&self.pool);
        let integrator = Arc::clone(&self.integrator);
        let passes = self.passes;

        // The supervisor blocks on the pool so that joining it is the
        // quiescence point for the whole job.
        let supervisor = std::thread::Builder::new()
            .name("glint-raytrace".to_string())
            .spawn(move || {
                pool.install(|| {
                    regions.par_iter().for_each(|region| {
                        render_region(
                            region,
                            &scene,
                            &camera,
                            resolution,
                            passes,
                            &sink,
                            &flag,
                            integrator.as_ref(),
                        );
                    });
                });
            })?;

        Ok(Box::new(PoolJob {
            stop,
            supervisor: Some(supervisor),
        }))
    }

    fn trace_pixel(
        &self,
        scene: &Scene,
        camera: &Camera,
        resolution: Resolution,
        pixel: PixelCoord,
    ) -> Rgba {
        let mut rng = SmallRng::seed_from_u64(
            (pixel.x as u64).wrapping_shl(32) ^ pixel.y as u64 ^ 0x9e37_79b9,
        );
        let width = resolution.width as f32;
        let height = resolution.height as f32;

        let mut sum = glint_math::Vec3::ZERO;
        for _ in 0..self.passes {
            let jitter_x = rng.gen::<f32>();
            let jitter_y = rng.gen::<f32>();
            let ray = camera.primary_ray(
                pixel.x as f32 + jitter_x,
                pixel.y as f32 + jitter_y,
                width,
                height,
            );
            sum += self.integrator.shade(scene, &ray, &mut rng);
        }

        (sum / self.passes as f32).extend(1.0)
    }
}

/// Handle for a launched pool job.
#[derive(Debug)]
struct PoolJob {
    stop: Arc<AtomicBool>,
    supervisor: Option<JoinHandle<()>>,
}

impl TraceJob for PoolJob {
    fn cancel(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.supervisor.take() {
            let _ = handle.join();
        }
    }

    fn is_quiesced(&self) -> bool {
        self.supervisor
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }
}

impl Drop for PoolJob {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[allow(clippy::too_many_arguments)]
fn render_region(
    region: &Region,
    scene: &Scene,
    camera: &Camera,
    resolution: Resolution,
    passes: u32,
    sink: &OutputSink,
    stop: &AtomicBool,
    integrator: &dyn Integrator,
) {
    let mut rng =
        SmallRng::seed_from_u64((region.x as u64).wrapping_shl(32) | region.y as u64);
    let width = resolution.width as f32;
    let height = resolution.height as f32;

    for pass in 0..passes {
        let weight = 1.0 / (pass + 1) as f32;

        for local_y in 0..region.height {
            if stop.load(Ordering::Acquire) {
                return;
            }
            let y = region.y + local_y;

            for local_x in 0..region.width {
                let x = region.x + local_x;
                let jitter_x = rng.gen::<f32>();
                let jitter_y = rng.gen::<f32>();
                let ray = camera.primary_ray(
                    x as f32 + jitter_x,
                    y as f32 + jitter_y,
                    width,
                    height,
                );

                let color = integrator.shade(scene, &ray, &mut rng);
                sink.emit(PixelCoord::new(x as i32, y as i32), color.extend(weight));
            }
        }
    }
}
