//! Waypoint-following kinematics for the main object
//!
//! A single kinematic point that walks a fixed waypoint list at constant
//! speed. Each leg's final step is clamped to land exactly on the target;
//! higher speeds or lower frame rates would otherwise overshoot further.

use glam::Vec3;

/// Follower phase. `Moving` remembers which waypoint is in flight so a
/// resumed step continues the same leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerPhase {
    Idle,
    Moving { waypoint: usize },
}

/// Outcome of one `step` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not moving; nothing happened
    Idle,
    /// Still travelling toward a waypoint
    EnRoute,
    /// Landed on the final waypoint; the run is over
    Finished,
}

/// Kinematic point interpolating toward a sequence of waypoints
#[derive(Debug, Clone)]
pub struct MainObject {
    pub pos: Vec3,
    home: Vec3,
    speed: f32,
    waypoints: Vec<Vec3>,
    phase: FollowerPhase,
    collidable: bool,
}

impl MainObject {
    pub fn new(home: Vec3, speed: f32, waypoints: Vec<Vec3>) -> Self {
        Self {
            pos: home,
            home,
            speed,
            waypoints,
            phase: FollowerPhase::Idle,
            collidable: true,
        }
    }

    pub fn phase(&self) -> FollowerPhase {
        self.phase
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    /// The trigger-layer mute bit: a non-collidable main object raises no
    /// further contact events.
    pub fn set_collidable(&mut self, collidable: bool) {
        self.collidable = collidable;
    }

    /// Arm the run. A follower already in flight keeps its current leg;
    /// starting twice does not restart the lap.
    pub fn start(&mut self) {
        if self.phase == FollowerPhase::Idle && !self.waypoints.is_empty() {
            self.phase = FollowerPhase::Moving { waypoint: 0 };
        }
    }

    /// Cancel any in-flight leg and snap back to the home position with
    /// the collidable flag restored.
    pub fn reset(&mut self) {
        self.phase = FollowerPhase::Idle;
        self.pos = self.home;
        self.collidable = true;
    }

    /// Advance `speed * dt_secs` along the unit vector toward the current
    /// waypoint. When the remaining distance fits within this step's
    /// travel the position clamps onto the waypoint itself, so the
    /// follower never reports a position past the target.
    pub fn step(&mut self, dt_secs: f32) -> StepOutcome {
        let FollowerPhase::Moving { waypoint } = self.phase else {
            return StepOutcome::Idle;
        };
        let Some(&target) = self.waypoints.get(waypoint) else {
            self.phase = FollowerPhase::Idle;
            return StepOutcome::Finished;
        };

        let offset = target - self.pos;
        let distance = offset.length();
        let travel = self.speed * dt_secs;

        if travel >= distance {
            self.pos = target;
            if waypoint + 1 == self.waypoints.len() {
                self.phase = FollowerPhase::Idle;
                return StepOutcome::Finished;
            }
            self.phase = FollowerPhase::Moving {
                waypoint: waypoint + 1,
            };
        } else {
            self.pos += offset / distance * travel;
        }
        StepOutcome::EnRoute
    }
}
