//! Explicit, seeded RNG owned by the agent (spec §9 design notes: replace
//! the reference's process-wide random source with one seeded from the
//! engine's deterministic tick counter, to keep replay determinism).

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct AgentRng {
    inner: ChaCha8Rng,
}

impl AgentRng {
    /// Seed from the engine's tick counter at agent construction time.
    pub fn from_tick(tick: u64) -> Self {
        AgentRng {
            inner: ChaCha8Rng::seed_from_u64(tick),
        }
    }

    pub fn inner_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = AgentRng::from_tick(42);
        let mut b = AgentRng::from_tick(42);
        let xs: Vec<u32> = (0..8).map(|_| a.inner_mut().gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.inner_mut().gen()).collect();
        assert_eq!(xs, ys);
    }
}
