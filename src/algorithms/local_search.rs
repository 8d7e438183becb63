use log::info;
use rand::rngs::StdRng;

use super::traits::Neighbourhood;
use crate::config::ScoringWeights;
use crate::problem::instance::Instance;
use crate::problem::solution::Solution;

/// Iterative improvement loop: start from `neighbourhood.start`, and as long
/// as some neighbour scores strictly higher than the current solution,
/// accept the best-ranked one and repeat. The overlap neighbourhood is the
/// one exception: when the driver would otherwise stop, but the
/// neighbourhood reports it hasn't exhausted its iteration budget, force
/// one more round instead.
pub fn solve<N: Neighbourhood>(
    instance: &Instance,
    neighbourhood: &mut N,
    weights: &ScoringWeights,
    rng: &mut StdRng,
) -> Solution {
    let mut current = neighbourhood.start(instance, rng);
    let mut current_score = neighbourhood.score(&current, weights);
    let mut rounds = 0u32;

    loop {
        let candidates = neighbourhood.neighbours(&current, rng);
        let best = candidates
            .into_iter()
            .map(|c| {
                let s = neighbourhood.score(&c, weights);
                (s, c)
            })
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((score, candidate)) if score > current_score => {
                current = candidate;
                current_score = score;
                rounds += 1;
            }
            _ => match neighbourhood.on_stall(&current, weights, rng) {
                Some(forced) => {
                    current_score = neighbourhood.score(&forced, weights);
                    current = forced;
                    rounds += 1;
                }
                None => break,
            },
        }
    }

    info!("local search converged after {rounds} accepted rounds, {} bins", current.num_bins());
    current
}
