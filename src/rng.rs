//! The narrow randomness boundary consumed by the engine.
//!
//! The engine never seeds or owns a generator. Bag draws, mother nature
//! placement and character selection all go through [`RandomSource`].

use rand::Rng;

/// A source of uniform random choices.
pub trait RandomSource {
    /// Returns an index uniformly drawn from `0..bound`. `bound` is never zero.
    fn draw_one(&mut self, bound: usize) -> usize;

    /// Returns `count` distinct indices drawn from `0..bound`, in draw order.
    /// `count` never exceeds `bound`.
    fn pick_distinct(&mut self, bound: usize, count: usize) -> Vec<usize>;
}

impl<R: Rng> RandomSource for R {
    fn draw_one(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }

    fn pick_distinct(&mut self, bound: usize, count: usize) -> Vec<usize> {
        rand::seq::index::sample(self, bound, count).into_vec()
    }
}
