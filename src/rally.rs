//! Run orchestration
//!
//! Owns the population, the main object, and the collision broadcast
//! wiring: the trigger boundary publishes on the channel, a subscribed
//! latch remembers the first hit, and a run that finishes its lap with
//! the latch set ends in an explosion at the crash site.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;

use crate::events::{CollisionChannel, CollisionEvent, Subscription};
use crate::pool::Handle;
use crate::settings::{ConfigError, Settings};
use crate::sim::state::SimState;
use crate::sim::tick::{TickReport, tick};
use crate::sim::waypoint::{MainObject, StepOutcome};

/// Presentation boundary for terminal effects. Rendering and audio live
/// behind this seam.
pub trait EffectSink {
    /// The run ended in a crash at `at`
    fn explosion(&mut self, at: Vec3);
}

/// Sink that only logs; used headless and in tests
#[derive(Debug, Default)]
pub struct LogSink;

impl EffectSink for LogSink {
    fn explosion(&mut self, at: Vec3) {
        log::info!("explosion at ({:.1}, {:.1}, {:.1})", at.x, at.y, at.z);
    }
}

/// One simulation run: population + main object + collision latch
pub struct Rally {
    pub sim: SimState,
    pub main_object: MainObject,
    channel: CollisionChannel,
    collision_detected: Rc<Cell<bool>>,
    last_collider: Rc<Cell<Option<Handle>>>,
    main_object_removed: bool,
}

impl std::fmt::Debug for Rally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rally")
            .field("main_object", &self.main_object)
            .field("collision_detected", &self.collision_detected.get())
            .field("last_collider", &self.last_collider.get())
            .field("main_object_removed", &self.main_object_removed)
            .finish_non_exhaustive()
    }
}

impl Rally {
    /// Wire up a run. Fails fast on invalid settings or an empty waypoint
    /// list, which would otherwise leave the follower silently idle.
    pub fn new(settings: Settings, seed: u64, waypoints: Vec<Vec3>) -> Result<Self, ConfigError> {
        if waypoints.is_empty() {
            return Err(ConfigError::NoWaypoints);
        }
        let speed = settings.main_object_speed;
        let sim = SimState::new(settings, seed)?;
        let main_object = MainObject::new(Vec3::ZERO, speed, waypoints);

        let collision_detected = Rc::new(Cell::new(false));
        let last_collider = Rc::new(Cell::new(None));
        let mut channel = CollisionChannel::new();
        {
            let hit = Rc::clone(&collision_detected);
            let who = Rc::clone(&last_collider);
            channel.subscribe(move |event: &CollisionEvent| {
                hit.set(true);
                who.set(Some(event.collider));
                Subscription::Keep
            });
        }

        Ok(Self {
            sim,
            main_object,
            channel,
            collision_detected,
            last_collider,
            main_object_removed: false,
        })
    }

    /// Kick off the waypoint lap. No-op while a lap is in flight.
    pub fn start_run(&mut self) {
        self.main_object.start();
    }

    /// Trigger-boundary entry point: the physics layer reports the main
    /// object touching `collider`. Muted once the latch has flipped, to
    /// cut further callbacks from the same run.
    pub fn report_contact(&mut self, collider: Handle) {
        if !self.main_object.is_collidable() {
            return;
        }
        self.channel.publish(&CollisionEvent {
            collider,
            at: self.main_object.pos,
        });
        if self.collision_detected.get() {
            self.main_object.set_collidable(false);
        }
    }

    /// Advance one frame: population tick plus one follower step. When
    /// the final waypoint lands with the latch set, the crash effect
    /// fires once and the main object leaves play.
    pub fn advance(&mut self, dt_secs: f32, sink: &mut dyn EffectSink) -> TickReport {
        let report = tick(&mut self.sim, dt_secs);
        if self.main_object.step(dt_secs) == StepOutcome::Finished
            && self.collision_detected.get()
            && !self.main_object_removed
        {
            sink.explosion(self.main_object.pos);
            self.main_object_removed = true;
        }
        report
    }

    /// Re-initialize the run: cancel in-flight movement, restore the main
    /// object, clear the latch, and re-deal the population from the pool.
    pub fn reset(&mut self) {
        self.main_object.reset();
        self.main_object_removed = false;
        self.collision_detected.set(false);
        self.last_collider.set(None);
        self.sim.spawn_population();
        log::info!("rally reset: {} racers back on track", self.sim.population());
    }

    pub fn collision_detected(&self) -> bool {
        self.collision_detected.get()
    }

    pub fn last_collider(&self) -> Option<Handle> {
        self.last_collider.get()
    }

    pub fn main_object_in_play(&self) -> bool {
        !self.main_object_removed
    }

    /// Extra observers (presentation, metrics) hook in here
    pub fn channel_mut(&mut self) -> &mut CollisionChannel {
        &mut self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::waypoint::FollowerPhase;

    struct CountingSink {
        explosions: Vec<Vec3>,
    }

    impl CountingSink {
        fn new() -> Self {
            Self {
                explosions: Vec::new(),
            }
        }
    }

    impl EffectSink for CountingSink {
        fn explosion(&mut self, at: Vec3) {
            self.explosions.push(at);
        }
    }

    fn rally() -> Rally {
        let settings = Settings {
            initial_racers: 4,
            ..Default::default()
        };
        // One short leg the default speed finishes in a few frames.
        Rally::new(settings, 11, vec![Vec3::new(1.0, 0.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_empty_waypoints_fail_fast() {
        let result = Rally::new(Settings::default(), 1, Vec::new());
        assert_eq!(result.unwrap_err(), ConfigError::NoWaypoints);
    }

    #[test]
    fn test_contact_latches_and_mutes_collider() {
        let mut rally = rally();
        let racer = rally.sim.active[0];
        assert!(!rally.collision_detected());

        rally.report_contact(racer);
        assert!(rally.collision_detected());
        assert_eq!(rally.last_collider(), Some(racer));
        assert!(!rally.main_object.is_collidable());

        // Muted: a later contact cannot overwrite the latched collider.
        let other = rally.sim.active[1];
        rally.report_contact(other);
        assert_eq!(rally.last_collider(), Some(racer));
    }

    #[test]
    fn test_clean_run_ends_without_effect() {
        let mut rally = rally();
        let mut sink = CountingSink::new();
        rally.start_run();
        for _ in 0..600 {
            rally.advance(SIM_DT, &mut sink);
        }
        assert_eq!(rally.main_object.phase(), FollowerPhase::Idle);
        assert!(sink.explosions.is_empty());
        assert!(rally.main_object_in_play());
    }

    #[test]
    fn test_latched_run_explodes_once_at_final_waypoint() {
        let mut rally = rally();
        let mut sink = CountingSink::new();
        let racer = rally.sim.active[0];

        rally.start_run();
        rally.report_contact(racer);
        for _ in 0..600 {
            rally.advance(SIM_DT, &mut sink);
        }
        assert_eq!(sink.explosions, vec![Vec3::new(1.0, 0.0, 0.0)]);
        assert!(!rally.main_object_in_play());
    }

    #[test]
    fn test_extra_observers_see_contacts() {
        let mut rally = rally();
        let racer = rally.sim.active[0];

        let seen = Rc::new(Cell::new(0u32));
        {
            let seen = Rc::clone(&seen);
            rally.channel_mut().subscribe(move |_| {
                seen.set(seen.get() + 1);
                Subscription::Keep
            });
        }

        rally.report_contact(racer);
        assert_eq!(seen.get(), 1);
        // The mute bit keeps later contacts off the channel entirely.
        rally.report_contact(racer);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_reset_clears_latch_and_restores_run() {
        let mut rally = rally();
        let mut sink = CountingSink::new();
        let racer = rally.sim.active[0];

        rally.start_run();
        rally.report_contact(racer);
        rally.advance(SIM_DT, &mut sink);

        rally.reset();
        assert!(!rally.collision_detected());
        assert_eq!(rally.last_collider(), None);
        assert!(rally.main_object.is_collidable());
        assert_eq!(rally.main_object.pos, Vec3::ZERO);
        assert_eq!(rally.sim.population(), 4);
        assert!(rally.main_object_in_play());

        // A stale lap must not resume after the reset.
        let report = rally.advance(SIM_DT, &mut sink);
        assert_eq!(rally.main_object.pos, Vec3::ZERO);
        assert_eq!(report.survivors, 4);
    }
}
