//! `simulate` command: drive the control loop with a synthetic workload.
//!
//! Publishes frame samples at a healthy rate, then a degraded rate, then
//! healthy again, printing every quality transition the controller
//! commits. Useful for eyeballing dwell behavior with real timing.

use std::error::Error;
use std::time::Duration;

use clap::Args;
use tracing::info;

use framewarden::app::{AppConfig, FramewardenApp};
use framewarden::sample::RawSample;

#[derive(Args)]
pub struct SimulateArgs {
    /// Seconds of healthy frame timing before the stall.
    #[arg(long, default_value_t = 3.0)]
    pub warmup_secs: f64,

    /// Seconds of degraded frame timing.
    #[arg(long, default_value_t = 8.0)]
    pub stall_secs: f64,

    /// Seconds of healthy frame timing after the stall.
    #[arg(long, default_value_t = 15.0)]
    pub recovery_secs: f64,

    /// Frame rate during healthy phases.
    #[arg(long, default_value_t = 60.0)]
    pub healthy_fps: f64,

    /// Frame rate during the stall.
    #[arg(long, default_value_t = 20.0)]
    pub degraded_fps: f64,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn Error>> {
    // Own a runtime so the memory probe can run alongside the workload.
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let app = FramewardenApp::start(AppConfig::default())?;

    println!(
        "tier: {}   starting level: {}",
        app.tier(),
        app.config_publisher().current().quality_level
    );

    let _sub = app.config_publisher().on_change(|config| {
        println!(
            "-> level {} (effects {}, particles {:.0}%, animations {})",
            config.quality_level,
            if config.effects_enabled { "on" } else { "off" },
            config.particle_density * 100.0,
            config.max_concurrent_animations
        );
    });

    run_phase(&app, "warmup", args.warmup_secs, args.healthy_fps);
    run_phase(&app, "stall", args.stall_secs, args.degraded_fps);
    run_phase(&app, "recovery", args.recovery_secs, args.healthy_fps);

    let metrics = app.hub().metrics();
    println!();
    println!(
        "samples: {} accepted, {} rejected   fps: {:.1}   memory: {:.1} MiB",
        metrics.samples_accepted,
        metrics.samples_rejected,
        metrics.fps,
        metrics.memory_usage_bytes as f64 / (1024.0 * 1024.0)
    );
    println!(
        "final level: {}",
        app.config_publisher().current().quality_level
    );

    app.shutdown();
    Ok(())
}

/// Publish frames at `fps` for `secs` seconds of wall time.
fn run_phase(app: &FramewardenApp, name: &str, secs: f64, fps: f64) {
    info!(phase = name, secs, fps, "Simulation phase");

    let hub = app.hub();
    let clock = app.clock();
    let frame_ms = 1000.0 / fps;
    let frames = (secs * fps).round() as u64;

    for _ in 0..frames {
        hub.publish(RawSample::frame(frame_ms, clock.now_ms()));
        std::thread::sleep(Duration::from_secs_f64(frame_ms / 1000.0));
    }
}
