//! Racer Derby - a pooled swarm simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (racer updates, collision scan, waypoint follower)
//! - `pool`: Reuse-or-create object recycling
//! - `events`: Collision broadcast channel
//! - `rally`: Run orchestration wiring the pieces together
//! - `settings`: Tunables and validation

pub mod events;
pub mod pool;
pub mod rally;
pub mod settings;
pub mod sim;

pub use pool::{Handle, Pool};
pub use settings::{ConfigError, RacerKind, Settings};

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

/// Simulation constants
pub mod consts {
    /// Racer updates take their delta in milliseconds
    pub const MS_PER_SEC: f32 = 1000.0;
    /// Frame delta for the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Allowed main object speed band
    pub const MAIN_OBJECT_SPEED_MIN: f32 = 1.0;
    pub const MAIN_OBJECT_SPEED_MAX: f32 = 100.0;
}

/// Uniform point inside a sphere of `radius` around the origin
///
/// Rejection-sampled from the enclosing cube, so the distribution stays
/// uniform over the volume rather than clustering at the center.
pub fn point_in_sphere(rng: &mut Pcg32, radius: f32) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        if candidate.length_squared() <= 1.0 {
            return candidate * radius;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_point_in_sphere_within_radius() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let p = point_in_sphere(&mut rng, 100.0);
            assert!(p.length() <= 100.0 + 1e-3);
        }
    }
}
