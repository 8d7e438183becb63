use rand::rngs::StdRng;

use crate::config::ScoringWeights;
use crate::problem::instance::Instance;
use crate::problem::scoring;
use crate::problem::solution::Solution;

/// Small capability record dispatched by the local-search driver: how to
/// build a starting solution, how to generate candidate neighbours of the
/// current one, and how to score a candidate. Variants of this trait stand
/// in for the dynamic-dispatch "strategy" objects a garbage-collected port
/// would reach for; here each neighbourhood is its own concrete type.
///
/// `rng` is threaded through every call rather than owned by the
/// neighbourhood itself: rectangle generation, permutation, and annealing
/// all draw from the one PRNG the caller seeds.
pub trait Neighbourhood {
    fn start(&mut self, instance: &Instance, rng: &mut StdRng) -> Solution;

    /// Candidate neighbours of `current`, already restricted to the ones
    /// worth ranking (e.g. capped and pre-sorted by the neighbourhood
    /// itself, per its own contract).
    fn neighbours(&mut self, current: &Solution, rng: &mut StdRng) -> Vec<Solution>;

    /// Scores a candidate; higher is better. Neighbourhoods that track
    /// extra penalty state (the overlap neighbourhood's tolerance) override
    /// this instead of relying on the plain composite fitness.
    fn score(&self, solution: &Solution, weights: &ScoringWeights) -> f64 {
        scoring::fitness(&solution.bins, weights)
    }

    /// Called when the driver is about to stop because no neighbour scored
    /// an improvement. Returning `Some` forces the iteration budget to its
    /// maximum and supplies one final round's solution to continue from;
    /// returning `None` lets the driver stop. Only the overlap
    /// neighbourhood overrides this, to guarantee its tolerance anneals all
    /// the way to zero before the search gives up.
    fn on_stall(
        &mut self,
        _current: &Solution,
        _weights: &ScoringWeights,
        _rng: &mut StdRng,
    ) -> Option<Solution> {
        None
    }
}
