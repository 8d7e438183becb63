use log::info;
use rand::seq::IteratorRandom;
use rand::Rng;
use std::time::Instant;

use super::greedy::{self, GreedyStrategy};
use crate::config::PackConfig;
use crate::problem::bin::Bin;
use crate::problem::instance::Instance;
use crate::problem::solution::Solution;

/// Temperature-driven perturbation search over the bin list. The objective
/// is plain bin count (lower is better), distinct from the composite
/// fitness used by local search.
pub fn solve(instance: &Instance, config: &PackConfig, rng: &mut impl Rng) -> Solution {
    let start = Instant::now();
    let initial = greedy::solve(instance, GreedyStrategy::Area);
    let mut current = initial.bins;
    let mut current_score = current.len() as i64;

    // Seeded with the greedy starting point rather than left unset: this is
    // what guarantees simulated annealing never reports more bins than the
    // greedy solution it started from, even if every accepted perturbation
    // this run happens to be a worse, temperature-tolerated move.
    let mut best: Option<Vec<Bin>> = Some(current.clone());
    let mut best_score = current_score;

    let mut temperature = config.sim_anneal_initial_temp;
    let iterations = instance.num_rectangles();

    for _ in 0..iterations {
        if temperature < 1e-6 {
            break;
        }
        let candidate = perturb(&current, rng);
        let candidate_score = candidate.len() as i64;
        let delta = candidate_score - current_score;

        let accept = delta < 0 || rng.random::<f64>() < (-(delta as f64) / temperature).exp();
        if accept {
            current = candidate;
            current_score = candidate_score;
            if current_score < best_score {
                best_score = current_score;
                best = Some(current.clone());
            }
        }

        temperature *= config.sim_anneal_cooling_rate;
    }

    let result = best.unwrap_or(current);
    info!(
        "sim_anneal placed {} rectangles into {} bins in {:?} (started from {})",
        instance.num_rectangles(),
        result.len(),
        start.elapsed(),
        initial.num_bins()
    );
    Solution::new(result)
}

/// Clones the bin list, removes a random rectangle from a random non-empty
/// bin, possibly rotates it, and reinserts it via first-fit across all
/// bins. Reverts the rotation and retries once if the first attempt fails.
fn perturb(bins: &[Bin], rng: &mut impl Rng) -> Vec<Bin> {
    let mut cloned: Vec<Bin> = bins.iter().map(Bin::copy).collect();
    let Some(src_idx) = (0..cloned.len()).filter(|&i| !cloned[i].is_empty()).choose(rng) else {
        return cloned;
    };
    let Some(rect_id) = cloned[src_idx].rects().iter().map(|r| r.id).choose(rng) else {
        return cloned;
    };
    let mut rect = cloned[src_idx].remove(rect_id).expect("rect_id was drawn from this bin");
    if cloned[src_idx].is_empty() {
        cloned.remove(src_idx);
    }

    if rng.random::<f64>() < 0.5 {
        rect.rotate();
    }

    if !place_first_fit(&mut cloned, &mut rect) {
        rect.rotate();
        if !place_first_fit(&mut cloned, &mut rect) {
            // Neither orientation fit any existing bin; open a fresh one so
            // the perturbed solution always accounts for every rectangle.
            let side = bins.first().map(|b| b.side).unwrap_or(rect.width.max(rect.height));
            let mut fresh = Bin::new(side);
            fresh.place(&mut rect);
            cloned.push(fresh);
        }
    }

    cloned
}

fn place_first_fit(bins: &mut [Bin], rect: &mut crate::problem::rect::Rect) -> bool {
    bins.iter_mut().any(|b| b.place(rect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::rect::Rect;
    use rand::SeedableRng;

    fn instance(bin_side: u32, rects: Vec<(u32, u32)>) -> Instance {
        let rects = rects.into_iter().enumerate().map(|(i, (w, h))| Rect::new(i, w, h)).collect();
        Instance::new(bin_side, 1, bin_side, rects).unwrap()
    }

    #[test]
    fn never_worse_than_greedy_starting_point() {
        let instance = instance(10, vec![(4, 4), (4, 4), (3, 3), (6, 6), (2, 9), (7, 1), (5, 5)]);
        let greedy_sol = greedy::solve(&instance, GreedyStrategy::Area);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let config = PackConfig::default();
        let sa_sol = solve(&instance, &config, &mut rng);
        assert!(sa_sol.num_bins() <= greedy_sol.num_bins());
    }
}
