//! `probe` command: classify the host and show the starting config.

use std::error::Error;

use clap::Args;
use serde::Serialize;

use framewarden::controller::{baseline_level, derive_config, QualityConfig};
use framewarden::profile::{classify, CapabilityTier, DeviceSignals, HostProbe, SignalSource};

#[derive(Args)]
pub struct ProbeArgs {
    /// Emit the report as JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ProbeReport {
    signals: DeviceSignals,
    tier: CapabilityTier,
    initial_config: QualityConfig,
}

pub fn run(args: ProbeArgs) -> Result<(), Box<dyn Error>> {
    let signals = HostProbe::new().signals();
    let tier = classify(&signals);
    let initial_config = derive_config(baseline_level(tier), tier);

    if args.json {
        let report = ProbeReport {
            signals,
            tier,
            initial_config,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Device signals");
    match signals.processors {
        Some(n) => println!("  processors:    {}", n),
        None => println!("  processors:    (not reported)"),
    }
    match signals.memory_gib {
        Some(gib) => println!("  memory:        {:.1} GiB", gib),
        None => println!("  memory:        (not reported)"),
    }
    println!();
    println!("Capability tier: {}", tier);
    println!();
    println!("Starting configuration");
    println!("  quality level:  {}", initial_config.quality_level);
    println!("  effects:        {}", if initial_config.effects_enabled { "enabled" } else { "disabled" });
    println!("  particles:      {:.0}%", initial_config.particle_density * 100.0);
    println!("  animations:     up to {}", initial_config.max_concurrent_animations);
    println!("  sampling rate:  {:.0}%", initial_config.sampling_rate * 100.0);

    Ok(())
}
