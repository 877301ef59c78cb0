//! Pairwise collision policies
//!
//! Two ways to judge a racer pair: the contact policy trusts the overlap
//! set fed in by the trigger layer, the probabilistic policy rolls against
//! the product of both racers' configured hit chances. One policy is
//! picked per deployment through the settings.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::Racer;
use crate::pool::Handle;

/// How a pair of racers is judged to have collided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Overlap reported by the trigger layer (the default)
    #[default]
    Contact,
    /// Random draw against the product of both racers' probabilities
    Probabilistic,
}

/// Evaluate one unordered pair under `policy`
///
/// Both sides must be collidable. The trigger layer only records the
/// entering body, so under the contact policy either side touching the
/// other counts.
pub fn pair_collides(
    policy: CollisionPolicy,
    (handle_a, a): (Handle, &Racer),
    (handle_b, b): (Handle, &Racer),
    rng: &mut Pcg32,
) -> bool {
    if !(a.is_collidable() && b.is_collidable()) {
        return false;
    }
    match policy {
        CollisionPolicy::Contact => a.touches(handle_b) || b.touches(handle_a),
        CollisionPolicy::Probabilistic => {
            let threshold = a.collision_probability * b.collision_probability;
            rng.random::<f32>() < threshold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Pool;
    use rand::SeedableRng;

    fn pair() -> (Pool<Racer>, Handle, Handle) {
        let mut pool = Pool::new();
        let a = pool.acquire(|| Racer::new(0, 1.0), |_| {});
        let b = pool.acquire(|| Racer::new(0, 1.0), |_| {});
        (pool, a, b)
    }

    #[test]
    fn test_contact_is_symmetric() {
        let (mut pool, a, b) = pair();
        let mut rng = Pcg32::seed_from_u64(0);

        // Only one side saw the trigger, as the contact layer reports it.
        pool.get_mut(a).unwrap().record_contact(b);

        let ra = pool.get(a).unwrap();
        let rb = pool.get(b).unwrap();
        assert!(pair_collides(CollisionPolicy::Contact, (a, ra), (b, rb), &mut rng));
        assert!(pair_collides(CollisionPolicy::Contact, (b, rb), (a, ra), &mut rng));
    }

    #[test]
    fn test_contact_requires_overlap() {
        let (pool, a, b) = pair();
        let mut rng = Pcg32::seed_from_u64(0);
        let ra = pool.get(a).unwrap();
        let rb = pool.get(b).unwrap();
        assert!(!pair_collides(CollisionPolicy::Contact, (a, ra), (b, rb), &mut rng));
    }

    #[test]
    fn test_non_collidable_side_never_collides() {
        let (mut pool, a, b) = pair();
        let mut rng = Pcg32::seed_from_u64(0);
        pool.get_mut(a).unwrap().record_contact(b);
        pool.get_mut(b).unwrap().set_collidable(false);

        let ra = pool.get(a).unwrap();
        let rb = pool.get(b).unwrap();
        assert!(!pair_collides(CollisionPolicy::Contact, (a, ra), (b, rb), &mut rng));
        // Probability 1.0 on both sides still cannot fire.
        assert!(!pair_collides(CollisionPolicy::Probabilistic, (a, ra), (b, rb), &mut rng));
    }

    #[test]
    fn test_probabilistic_extremes() {
        let (mut pool, a, b) = pair();
        let mut rng = Pcg32::seed_from_u64(0);

        // Both at 1.0: the draw in [0, 1) always lands under the product.
        {
            let ra = pool.get(a).unwrap();
            let rb = pool.get(b).unwrap();
            assert!(pair_collides(CollisionPolicy::Probabilistic, (a, ra), (b, rb), &mut rng));
        }

        // Zero on one side kills the product.
        pool.get_mut(a).unwrap().collision_probability = 0.0;
        let ra = pool.get(a).unwrap();
        let rb = pool.get(b).unwrap();
        for _ in 0..100 {
            assert!(!pair_collides(CollisionPolicy::Probabilistic, (a, ra), (b, rb), &mut rng));
        }
    }
}
