//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;
pub mod waypoint;

pub use collision::CollisionPolicy;
pub use state::{Racer, SimState};
pub use tick::{TickReport, tick, tick_naive};
pub use waypoint::{FollowerPhase, MainObject, StepOutcome};
