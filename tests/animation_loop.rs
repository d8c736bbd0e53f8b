use ambient_field::config::MotionConfig;
use ambient_field::driver::{
    AnimationDriver, CountingRenderer, CountingScheduler, DriverState, ManualClock, TickOutcome,
};
use ambient_field::input::InputState;
use ambient_field::particles::ParticleField;
use ambient_field::viewport::Viewport;

fn new_driver() -> AnimationDriver<CountingRenderer, ManualClock, CountingScheduler> {
    AnimationDriver::new(
        ParticleField::create(8_000, 12.5).unwrap(),
        CountingRenderer::default(),
        ManualClock::default(),
        CountingScheduler::default(),
        MotionConfig::default(),
    )
}

#[test]
fn yaw_increases_with_time_while_pitch_holds() {
    let mut driver = new_driver();
    let mut input = InputState::new();
    input.on_pointer_move(200.0, 100.0, 800.0, 600.0);
    input.on_scroll(300.0);
    let viewport = Viewport::new(800, 600, 1.0);

    driver.start();
    let mut orientations = Vec::new();
    for t in [0.0, 1.0, 2.0] {
        assert!(driver.scheduler_mut().take_pending());
        driver.clock_mut().set(t);
        match driver.tick(&input, &viewport).unwrap() {
            TickOutcome::Rendered(o) => orientations.push(o),
            TickOutcome::Idle => panic!("driver went idle at t={t}"),
        }
    }

    assert_eq!(orientations.len(), 3);
    assert!(orientations.windows(2).all(|w| w[1].yaw > w[0].yaw));
    assert!(orientations.iter().all(|o| o.pitch == orientations[0].pitch));
    assert!((orientations[1].yaw - orientations[0].yaw - 0.03).abs() < 1e-5);
    assert_eq!(driver.renderer().renders(), 3);
}

#[test]
fn scheduler_cycles_after_stop_render_nothing() {
    let mut driver = new_driver();
    let input = InputState::new();
    let viewport = Viewport::new(800, 600, 2.0);

    driver.start();
    let mut cycles = 0;
    while driver.scheduler_mut().take_pending() && cycles < 5 {
        driver.clock_mut().advance(1.0 / 60.0);
        driver.tick(&input, &viewport).unwrap();
        cycles += 1;
    }
    driver.stop();
    assert_eq!(driver.state(), DriverState::Stopped);
    let renders = driver.renderer().renders();

    for _ in 0..100 {
        driver.clock_mut().advance(1.0 / 60.0);
        assert_eq!(driver.tick(&input, &viewport).unwrap(), TickOutcome::Idle);
    }
    assert_eq!(driver.renderer().renders(), renders);
    assert_eq!(driver.renderer().releases(), 1);
}

#[test]
fn restart_after_stop_resumes_from_zero() {
    let mut driver = new_driver();
    let input = InputState::new();
    let viewport = Viewport::new(800, 600, 1.0);

    driver.start();
    driver.clock_mut().set(50.0);
    driver.tick(&input, &viewport).unwrap();
    driver.stop();

    driver.start();
    let outcome = driver.tick(&input, &viewport).unwrap();
    assert_eq!(outcome, TickOutcome::Rendered(Default::default()));
}
