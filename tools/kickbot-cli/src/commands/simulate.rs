//! Run the tracker against the simulated game.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use kickbot_common::clock::SessionClock;
use kickbot_common::config::AppConfig;
use kickbot_tracking_engine::backend::{
    ColorCentroidDetector, SceneConfig, SceneHandle, SceneStats, SyntheticScene,
    DEFAULT_BRIGHTNESS_THRESHOLD,
};
use kickbot_tracking_engine::{PublishedState, TrackingController, TrackingLoop, TrackingShared};
use kickbot_tracking_model::{FrameSize, Timings};

pub struct SimulateOptions {
    pub seconds: Option<f64>,
    pub report_ms: u64,
    pub json: bool,
    pub raw: bool,
    pub always_click: bool,
    pub no_smart_click: bool,
}

#[derive(Serialize)]
struct Report {
    elapsed_secs: f64,
    #[serde(flatten)]
    state: PublishedState,
    /// Stage timings of the same cycle as `state`.
    timings: Option<Timings>,
    scene: SceneStats,
}

pub async fn run(config: AppConfig, options: SimulateOptions) -> anyhow::Result<()> {
    config.validate()?;

    let scene_config = scene_config(&config);
    let scene = SyntheticScene::new(scene_config, config.capture.size);
    let scene_handle = scene.handle();
    let pointer = scene.pointer();

    let input = FrameSize::new(
        (config.capture.size.width / 2).max(1),
        (config.capture.size.height / 2).max(1),
    );
    let detector = ColorCentroidDetector::new(
        input,
        DEFAULT_BRIGHTNESS_THRESHOLD,
        scene_config.ball_coverage(),
    );

    let mut controls = config.controls;
    if options.raw {
        controls.use_predictor = false;
    }
    if options.always_click {
        controls.always_click = true;
    }
    if options.no_smart_click {
        controls.smart_click = false;
    }

    let shared = Arc::new(TrackingShared::new(
        config.parameters,
        controls,
        config.capture.region,
        config.engine.timings_capacity,
    ));
    let tracking = TrackingLoop::new(
        Box::new(scene),
        Box::new(detector),
        Box::new(pointer),
        shared.clone(),
    )
    .with_idle_sleep(Duration::from_millis(config.engine.idle_sleep_ms));

    if !options.json {
        println!("Simulating keep-up game");
        println!(
            "  Window: {}x{} at ({}, {})",
            scene_config.window.width,
            scene_config.window.height,
            scene_config.window_origin.top,
            scene_config.window_origin.left
        );
        println!("  Detector input: {}x{}", input.width, input.height);
        println!(
            "  Aim: {}",
            if controls.use_predictor {
                "predicted"
            } else {
                "raw"
            }
        );
        println!("Press Ctrl+C to stop...");
        println!();
    }

    let clock = SessionClock::start();
    tracing::info!(started = clock.epoch_wall(), "Simulation started");
    let controller = TrackingController::spawn(tracking)?;
    shared.set_running(true);

    let deadline = async {
        match options.seconds {
            Some(secs) => tokio::time::sleep(Duration::from_secs_f64(secs.max(0.0))).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut ticker = tokio::time::interval(Duration::from_millis(options.report_ms.max(10)));
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            _ = ticker.tick() => {
                print_report(&clock, &shared, &scene_handle, options.json)?;
                if controller.is_finished() {
                    break;
                }
            }
        }
    }

    shared.set_running(false);
    let cycles = tokio::task::spawn_blocking(move || controller.stop()).await??;

    print_summary(&clock, cycles, &shared, &scene_handle, options.json)?;
    Ok(())
}

/// Place the game window where the capture region points, and size the
/// ball to match the predictor's idea of it.
fn scene_config(config: &AppConfig) -> SceneConfig {
    let defaults = SceneConfig::default();
    let window = config.capture.size;
    let origin = config.capture.region;
    SceneConfig {
        screen: FrameSize::new(
            defaults
                .screen
                .width
                .max(origin.left.max(0) as u32 + window.width),
            defaults
                .screen
                .height
                .max(origin.top.max(0) as u32 + window.height),
        ),
        window_origin: origin,
        window,
        ball_radius: config.parameters.relative_ball_width * window.width as f32 / 2.0,
        ..defaults
    }
}

fn print_report(
    clock: &SessionClock,
    shared: &TrackingShared,
    scene: &SceneHandle,
    json: bool,
) -> anyhow::Result<()> {
    let state = shared.snapshot();
    let report = Report {
        elapsed_secs: clock.elapsed_secs(),
        state,
        timings: shared.timings().for_cycle(state.cycle).copied(),
        scene: scene.stats(),
    };

    if json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    let s = &report.state;
    let flag = |on: bool, c: char| if on { c } else { '-' };
    println!(
        "[{:7.2}s] cycle {:>6}  raw ({:.3}, {:.3}) p={:.2}  filtered ({:.3}, {:.3})  v ({:+.2}, {:+.2})  {}{}{}{}  frame {:>6}us  fwd {:>6}us  score {} (best {})",
        report.elapsed_secs,
        s.cycle,
        s.raw.x,
        s.raw.y,
        s.raw.confidence,
        s.filtered.x,
        s.filtered.y,
        s.velocity.x,
        s.velocity.y,
        flag(s.status.is_tracking, 'T'),
        flag(s.status.is_clicking, 'C'),
        flag(s.status.is_soft_trigger, 'S'),
        flag(s.status.is_hard_trigger, 'H'),
        s.frame.frame_us,
        report.timings.map_or(0, |t| t.forward_us()),
        report.scene.score,
        report.scene.high_score,
    );
    Ok(())
}

#[derive(Serialize)]
struct Summary {
    elapsed_secs: f64,
    cycles: u64,
    average_forward_us: Option<f64>,
    scene: SceneStats,
}

fn print_summary(
    clock: &SessionClock,
    cycles: u64,
    shared: &TrackingShared,
    scene: &SceneHandle,
    json: bool,
) -> anyhow::Result<()> {
    let summary = Summary {
        elapsed_secs: clock.elapsed_secs(),
        cycles,
        average_forward_us: shared.timings().average_forward_us(),
        scene: scene.stats(),
    };

    if json {
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    println!();
    println!("Simulation finished");
    println!("  Duration: {:.2}s", summary.elapsed_secs);
    println!("  Cycles: {}", summary.cycles);
    println!("  Bounces: {}", summary.scene.bounces);
    println!("  Drops: {}", summary.scene.drops);
    if let Some(avg) = summary.average_forward_us {
        println!("  Average forward time: {avg:.0}us");
    }
    println!(
        "  Clicks: {} ({} missed)",
        summary.scene.clicks, summary.scene.misses
    );
    println!("  High score: {}", summary.scene.high_score);
    Ok(())
}
