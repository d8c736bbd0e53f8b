use std::path::PathBuf;
use std::process::ExitCode;

use ambient_field::config::AppConfig;
use ambient_field::driver::{
    AnimationDriver, CountingRenderer, CountingScheduler, ManualClock, TickOutcome,
};
use ambient_field::input::InputState;
use ambient_field::particles::ParticleField;
use ambient_field::quality::QualityTier;
use ambient_field::sprite;
use ambient_field::viewport::Viewport;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "ambient-field", about = "Animated particle-field backdrop")]
struct Cli {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    particles: Option<usize>,
    #[arg(long)]
    half_width: Option<f32>,
    #[arg(long, value_enum)]
    tier: Option<QualityTier>,
    /// Drive the loop without a window or GPU
    #[arg(long)]
    headless: bool,
    /// Ticks to run in headless mode
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// Simulated refresh rate in headless mode
    #[arg(long, default_value_t = 60.0)]
    fps: f32,
    /// Write the generated sprite to a PNG file and exit
    #[arg(long)]
    sprite_out: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Some(path) = &cli.sprite_out {
        return match sprite::generate().image().save(path) {
            Ok(()) => {
                log::info!("wrote sprite to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(err) => {
                log::error!("failed to write {}: {err}", path.display());
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let field = match config.build_field() {
        Ok(field) => field,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if cli.headless {
        run_headless(&config, field, cli.frames, cli.fps);
        return ExitCode::SUCCESS;
    }

    match ambient_field::app::run(config, field) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event loop failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, ambient_field::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(tier) = cli.tier {
        config.tier = Some(tier);
    }
    if let Some(particles) = cli.particles {
        config.field.particle_count = particles;
        config.tier = None;
    }
    if let Some(half_width) = cli.half_width {
        config.field.half_width = half_width;
    }
    Ok(config)
}

fn run_headless(config: &AppConfig, field: ParticleField, frames: u32, fps: f32) {
    let dt = 1.0 / fps.max(1.0);
    let viewport = Viewport::new(1280, 720, 1.0).with_max_pixel_density(config.max_pixel_density());
    let mut input = InputState::with_config(&config.motion);
    let mut driver = AnimationDriver::new(
        field,
        CountingRenderer::default(),
        ManualClock::default(),
        CountingScheduler::default(),
        config.motion,
    );

    log::info!(
        "headless run: {} frames @ {:.1}fps ({} particles)",
        frames,
        fps,
        driver.field().len()
    );

    driver.start();
    for frame in 0..frames {
        if !driver.scheduler_mut().take_pending() {
            break;
        }
        // Sweep the pointer across the window and scroll slowly down the page.
        let phase = frame as f32 / frames.max(1) as f32;
        input.on_pointer_move(phase * 1280.0, 360.0, 1280.0, 720.0);
        input.on_scroll(frame as f32 * 4.0);

        match driver.tick(&input, &viewport) {
            Ok(TickOutcome::Rendered(o)) if frame % fps.max(1.0) as u32 == 0 => {
                log::info!(
                    "t={:.2}s yaw={:.4} pitch={:.4}",
                    frame as f32 * dt,
                    o.yaw,
                    o.pitch
                );
            }
            Ok(_) => {}
            Err(err) => {
                log::error!("{err}");
                break;
            }
        }
        driver.clock_mut().advance(dt);
    }
    driver.stop();

    log::info!(
        "done: rendered={} releases={}",
        driver.renderer().renders(),
        driver.renderer().releases()
    );
}
