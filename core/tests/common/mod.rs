//! Helpers shared by the integration tests.

use abtest_core::rng::RandomSource;
use std::collections::VecDeque;

/// Replays a fixed sequence of draws, clamped into the requested range.
/// Panics when the script runs dry so a test notices an unexpected draw.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    draws: VecDeque<i64>,
}

impl ScriptedRng {
    pub fn new(draws: impl IntoIterator<Item = i64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    #[allow(dead_code)]
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRng {
    fn uniform_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        let next = self
            .draws
            .pop_front()
            .expect("ScriptedRng exhausted: unexpected random draw");
        next.clamp(lo, hi)
    }
}
