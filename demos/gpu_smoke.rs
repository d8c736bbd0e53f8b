use ambient_field::config::MotionConfig;
use ambient_field::driver::{AnimationDriver, CountingScheduler, ManualClock};
use ambient_field::input::InputState;
use ambient_field::particles::{ParticleField, PointStyle};
use ambient_field::sprite;
use ambient_field::surface::OffscreenRenderer;
use ambient_field::viewport::Viewport;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        log::error!("gpu_smoke failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let field = ParticleField::create(8_000, 12.5)?;
    let style = PointStyle {
        // Larger sprites so a small target still shows coverage.
        size: 0.4,
        ..PointStyle::default()
    };
    let renderer = OffscreenRenderer::new(&field, &sprite::generate(), style)?;
    let mut driver = AnimationDriver::new(
        field,
        renderer,
        ManualClock::default(),
        CountingScheduler::default(),
        MotionConfig::default(),
    );

    let viewport = Viewport::new(320, 180, 1.0);
    let mut input = InputState::new();
    input.on_pointer_move(240.0, 45.0, 320.0, 180.0);

    driver.start();
    for _ in 0..120 {
        driver.clock_mut().advance(1.0 / 60.0);
        driver.tick(&input, &viewport)?;
    }

    let (width, height, pixels) = driver.renderer().read_pixels()?;
    let lit = pixels.chunks_exact(4).filter(|px| px[3] > 0).count();
    log::info!(
        "gpu_smoke ok: frames={} target={}x{} lit_pixels={} orientation={:?}",
        driver.frames_rendered(),
        width,
        height,
        lit,
        driver.field().orientation()
    );

    driver.stop();
    Ok(())
}
