//! Racer Derby entry point
//!
//! Headless driver: seeds a rally, runs the main object through a waypoint
//! lap while the swarm ticks, and logs population metrics.
//!
//! Usage: `racer-derby [seed] [settings.json]`

use std::path::PathBuf;

use glam::Vec3;

use racer_derby::consts::SIM_DT;
use racer_derby::rally::{LogSink, Rally};
use racer_derby::settings::Settings;
use racer_derby::sim::CollisionPolicy;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    let settings_path = std::env::args().nth(2).map(PathBuf::from);
    let mut settings = Settings::load(settings_path.as_deref());

    // Headless there is no trigger layer feeding contact sets, so the
    // probabilistic policy stands in for it.
    if settings.collision_policy == CollisionPolicy::Contact {
        settings.collision_policy = CollisionPolicy::Probabilistic;
    }

    log::info!("racer derby starting, seed {seed}");

    let waypoints = vec![
        Vec3::new(120.0, 0.0, 0.0),
        Vec3::new(120.0, 0.0, 120.0),
        Vec3::new(0.0, 0.0, 120.0),
        Vec3::ZERO,
    ];
    let mut rally = match Rally::new(settings, seed, waypoints) {
        Ok(rally) => rally,
        Err(err) => {
            log::error!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    rally.start_run();
    let mut sink = LogSink;
    let mut culled = 0usize;
    for _ in 0..3600 {
        let report = rally.advance(SIM_DT, &mut sink);
        if report.removed > 0 {
            culled += report.removed;
            log::info!(
                "tick {}: {} collided, {} remain ({} pooled)",
                rally.sim.time_ticks,
                report.removed,
                report.survivors,
                rally.sim.pool.idle()
            );
        }
    }

    log::info!(
        "lap over: {} racers culled, {} still running, main object {}",
        culled,
        rally.sim.population(),
        if rally.main_object_in_play() {
            "intact"
        } else {
            "exploded"
        }
    );
}
