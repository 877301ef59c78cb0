//! Racer entities and population state
//!
//! Everything the tick controller mutates lives here: the racer pool, the
//! active population, and the run's RNG.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::point_in_sphere;
use crate::pool::{Handle, Pool};
use crate::settings::{ConfigError, Settings};

/// A pooled simulation unit
///
/// Lifecycle is `Active -> Destroyed`; destroyed racers go straight back to
/// the pool and are invisible to the tick controller until re-dealt.
#[derive(Debug, Clone)]
pub struct Racer {
    /// Index into the settings' kind table
    pub kind: usize,
    pub pos: Vec3,
    alive: bool,
    collidable: bool,
    /// Handles currently overlapping this racer, rebuilt across updates
    touching: Vec<Handle>,
    /// Remaining busy window; updates inside it are ignored, not queued
    cooldown_ms: f32,
    /// Per-kind hit chance for the probabilistic policy
    pub collision_probability: f32,
}

impl Racer {
    pub fn new(kind: usize, collision_probability: f32) -> Self {
        Self {
            kind,
            pos: Vec3::ZERO,
            alive: true,
            collidable: true,
            touching: Vec::new(),
            cooldown_ms: 0.0,
            collision_probability,
        }
    }

    /// Re-arm a pooled instance at a fresh spawn point
    pub fn respawn(&mut self, pos: Vec3) {
        self.pos = pos;
        self.alive = true;
        self.collidable = true;
        self.touching.clear();
        self.cooldown_ms = 0.0;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn set_collidable(&mut self, collidable: bool) {
        self.collidable = collidable;
    }

    /// Record an overlap reported by the trigger layer
    pub fn record_contact(&mut self, other: Handle) {
        if !self.touching.contains(&other) {
            self.touching.push(other);
        }
    }

    /// Whether the trigger layer has reported `other` overlapping us
    pub fn touches(&self, other: Handle) -> bool {
        self.touching.contains(&other)
    }

    /// Advance the racer by `dt_ms`. Dead racers ignore the call; a racer
    /// still inside its busy window only burns the gate down. When the
    /// gate opens the racer drops its stale contacts, relocates to the
    /// `wander()` point, and re-arms the gate to `interval_ms`. Returns
    /// whether the update actually took effect.
    pub fn update(
        &mut self,
        dt_ms: f32,
        wander: impl FnOnce() -> Vec3,
        interval_ms: f32,
    ) -> bool {
        if !self.alive {
            return false;
        }
        if self.cooldown_ms > dt_ms {
            self.cooldown_ms -= dt_ms;
            return false;
        }
        self.cooldown_ms = interval_ms;
        self.touching.clear();
        self.pos = wander();
        true
    }

    /// Terminal: mark the racer dead. Destroying twice is a no-op.
    pub fn destroy(&mut self) {
        self.alive = false;
    }
}

/// Population state owned by the tick controller
pub struct SimState {
    pub settings: Settings,
    pub seed: u64,
    pub rng: Pcg32,
    pub pool: Pool<Racer>,
    /// Live handles, rebuilt each tick; never contains duplicates
    pub active: Vec<Handle>,
    pub time_ticks: u64,
}

impl SimState {
    /// Validate the settings and deal out the initial population
    pub fn new(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut state = Self {
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            pool: Pool::new(),
            active: Vec::new(),
            time_ticks: 0,
        };
        state.spawn_population();
        Ok(state)
    }

    /// Reclaim the current population and deal a fresh one. Released
    /// instances are reused before any new ones are constructed.
    pub fn spawn_population(&mut self) {
        let previous = std::mem::take(&mut self.active);
        self.pool.release_all(previous);

        for _ in 0..self.settings.initial_racers {
            let kind = self.rng.random_range(0..self.settings.kinds.len());
            let probability = self.settings.kinds[kind].collision_probability;
            let spawn = point_in_sphere(&mut self.rng, self.settings.spawn_radius);
            let handle = self.pool.acquire(
                || Racer::new(kind, probability),
                |racer| {
                    racer.kind = kind;
                    racer.collision_probability = probability;
                    racer.respawn(spawn);
                },
            );
            self.active.push(handle);
        }
        log::debug!(
            "population dealt: {} active, {} pooled",
            self.active.len(),
            self.pool.idle()
        );
    }

    /// Current population size
    pub fn population(&self) -> usize {
        self.active.len()
    }
}
