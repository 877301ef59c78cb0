//! Per-tick population update, collision scan, and recycling
//!
//! The two scan variants share one observable contract: after a tick no
//! doomed racer remains active, every doomed racer went back to the pool
//! exactly once, and untouched racers keep their updated state.

use std::collections::BTreeSet;

use super::collision::pair_collides;
use super::state::SimState;
use crate::consts::MS_PER_SEC;
use crate::point_in_sphere;
use crate::pool::Handle;

/// What one tick did, for logging and assertions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Alive racers that received an update call
    pub updated: usize,
    /// Pair predicate evaluations performed by the scan
    pub pair_checks: u64,
    /// Racers destroyed and recycled this tick
    pub removed: usize,
    /// Population size after the rebuild
    pub survivors: usize,
}

#[derive(Clone, Copy)]
enum ScanKind {
    /// Unordered pairs i < j, each evaluated once
    Half,
    /// All ordered pairs i != j, each unordered pair evaluated twice
    Full,
}

/// Advance the simulation by `dt_secs` using the half scan
pub fn tick(state: &mut SimState, dt_secs: f32) -> TickReport {
    run_tick(state, dt_secs, ScanKind::Half)
}

/// Advance using the full N*(N-1) walk
///
/// Every unordered pair gets checked twice; the removal set makes the
/// second sighting harmless. Kept alongside `tick` so the two scans can
/// be compared.
pub fn tick_naive(state: &mut SimState, dt_secs: f32) -> TickReport {
    run_tick(state, dt_secs, ScanKind::Full)
}

fn run_tick(state: &mut SimState, dt_secs: f32, scan: ScanKind) -> TickReport {
    state.time_ticks += 1;
    let tick_no = state.time_ticks;
    let mut report = TickReport::default();

    let dt_ms = dt_secs * MS_PER_SEC;
    let SimState {
        settings,
        rng,
        pool,
        active,
        ..
    } = state;
    let interval_ms = settings.update_interval_secs * MS_PER_SEC;
    let radius = settings.spawn_radius;

    // Update phase: every alive racer gets the delta, gated or not.
    for &handle in active.iter() {
        if let Some(racer) = pool.get_mut(handle) {
            if racer.is_alive() {
                racer.update(dt_ms, || point_in_sphere(rng, radius), interval_ms);
                report.updated += 1;
            }
        }
    }

    // Collision phase: flagged racers land in a set, so a racer caught in
    // several pairs is still queued for removal only once.
    let mut doomed: BTreeSet<Handle> = BTreeSet::new();
    let mut check = |i: usize, j: usize, doomed: &mut BTreeSet<Handle>, checks: &mut u64| {
        *checks += 1;
        let (ha, hb) = (active[i], active[j]);
        if let (Some(a), Some(b)) = (pool.get(ha), pool.get(hb)) {
            if pair_collides(settings.collision_policy, (ha, a), (hb, b), rng) {
                doomed.insert(ha);
                doomed.insert(hb);
            }
        }
    };
    match scan {
        ScanKind::Half => {
            for i in 0..active.len() {
                for j in (i + 1)..active.len() {
                    check(i, j, &mut doomed, &mut report.pair_checks);
                }
            }
        }
        ScanKind::Full => {
            for i in 0..active.len() {
                for j in 0..active.len() {
                    if i != j {
                        check(i, j, &mut doomed, &mut report.pair_checks);
                    }
                }
            }
        }
    }

    // Removal phase: destroy then recycle, once per racer. The pool's
    // idempotent release backstops the set semantics.
    for &handle in &doomed {
        if let Some(racer) = pool.get_mut(handle) {
            racer.destroy();
            log::debug!(
                "{} #{} wrecked",
                settings.kinds[racer.kind].name,
                handle.index()
            );
        }
        pool.release(handle);
        report.removed += 1;
    }

    // Rebuild phase: survivors only.
    active.retain(|handle| !doomed.contains(handle));
    report.survivors = active.len();

    log::debug!(
        "tick {}: {} updated, {} pair checks, {} removed, {} remain",
        tick_no,
        report.updated,
        report.pair_checks,
        report.removed,
        report.survivors
    );
    report
}
