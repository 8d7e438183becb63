use rand::rngs::StdRng;
use rand::Rng;
use std::cmp::Ordering;

use super::traits::Neighbourhood;
use crate::config::ScoringWeights;
use crate::problem::bin::Bin;
use crate::problem::instance::Instance;
use crate::problem::rect::Rect;
use crate::problem::scoring;
use crate::problem::solution::Solution;

const CANDIDATES_PER_ROUND: usize = 20;
const PLACEMENT_ATTEMPTS: usize = 100;
const FRESH_BIN_UTILISATION_THRESHOLD: f64 = 0.8;
const TAU_EPSILON: f64 = 0.001;

/// Anneals an overlap tolerance `tau` from 1.0 down to 0.0 across `cap`
/// iterations. Starts from every rectangle crammed into a single bin via
/// `place_no_check` (fully overlapped) and gradually relocates the most
/// overlapping rectangles into other bins, tolerating any overlap below
/// `tau` as "good enough" along the way. Once `tau` reaches (approximately)
/// zero, a clean-up phase removes any rectangle still contributing overlap
/// and reinserts it via ordinary, overlap-free placement.
pub struct OverlapNeighbourhood {
    weights: ScoringWeights,
    overlap_penalty: f64,
    cap: u32,
    k: u32,
    tau: f64,
}

impl OverlapNeighbourhood {
    pub fn new(weights: ScoringWeights, overlap_penalty: f64, cap: u32) -> Self {
        Self { weights, overlap_penalty, cap: cap.max(1), k: 0, tau: 1.0 }
    }

    /// Picks the most-overlapping bin, pops its top-overlap rectangles
    /// (count = `ceil(|bin| / k)`), and re-places each into a randomly
    /// chosen different bin without an overlap check.
    fn anneal_candidate(k: u32, current: &Solution, rng: &mut StdRng) -> Solution {
        let mut bins = current.bins.clone();
        if bins.is_empty() {
            return Solution::new(bins);
        }

        let worst_idx = bins
            .iter()
            .enumerate()
            .max_by_key(|(_, b)| total_overlap(b))
            .map(|(i, _)| i)
            .unwrap_or(0);

        let side = bins[worst_idx].side;
        let mut ranked: Vec<(usize, u64)> = bins[worst_idx]
            .rects()
            .iter()
            .map(|r| (r.id, overlap_contribution(&bins[worst_idx], r.id)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let bin_len = bins[worst_idx].rects().len();
        let count = ((bin_len as f64) / (k.max(1) as f64)).ceil().max(1.0) as usize;

        let mut popped = Vec::with_capacity(count);
        for (id, _) in ranked.into_iter().take(count) {
            if let Some(rect) = bins[worst_idx].remove(id) {
                popped.push(rect);
            }
        }

        for mut rect in popped {
            let mut placed = false;
            for _ in 0..PLACEMENT_ATTEMPTS {
                if bins.len() <= 1 {
                    break;
                }
                let target = rng.random_range(0..bins.len());
                if target == worst_idx {
                    continue;
                }
                let area = bins[target].side as f64 * bins[target].side as f64;
                let projected = (area - bins[target].free_area() as f64 + rect.area() as f64) / area;
                if projected > FRESH_BIN_UTILISATION_THRESHOLD {
                    let mut fresh = Bin::new(side);
                    if fresh.place_relaxed(&mut rect, rng) {
                        bins.push(fresh);
                        placed = true;
                        break;
                    }
                    continue;
                }
                if bins[target].place_relaxed(&mut rect, rng) {
                    placed = true;
                    break;
                }
            }
            if !placed {
                let mut fresh = Bin::new(side);
                fresh.place_no_check(&mut rect);
                bins.push(fresh);
            }
        }

        bins.retain(|b| !b.is_empty());
        Solution::new(bins)
    }

    fn cleanup_candidate(current: &Solution) -> Solution {
        let mut bins = current.bins.clone();
        let mut problems = Vec::new();

        for bin in bins.iter_mut() {
            loop {
                if total_overlap(bin) == 0 {
                    break;
                }
                let worst = bin
                    .rects()
                    .iter()
                    .map(|r| (r.id, overlap_contribution(bin, r.id)))
                    .max_by_key(|&(_, c)| c)
                    .map(|(id, _)| id);
                let Some(id) = worst else { break };
                match bin.remove(id) {
                    Some(rect) => problems.push(rect),
                    None => break,
                }
            }
        }

        for mut rect in problems {
            if !place_first_fit(&mut bins, &mut rect) {
                let side = bins.first().map(|b| b.side).unwrap_or(rect.width.max(rect.height));
                let mut fresh = Bin::new(side);
                fresh.place(&mut rect);
                bins.push(fresh);
            }
        }

        bins.retain(|b| !b.is_empty());
        Solution::new(bins)
    }
}

fn place_first_fit(bins: &mut [Bin], rect: &mut Rect) -> bool {
    bins.iter_mut().any(|b| b.place(rect))
}

fn rect_overlap(a: &Rect, b: &Rect) -> u64 {
    let ow = a.right().min(b.right()).saturating_sub(a.x.max(b.x));
    let oh = a.top().min(b.top()).saturating_sub(a.y.max(b.y));
    ow as u64 * oh as u64
}

fn total_overlap(bin: &Bin) -> u64 {
    let rects = bin.rects();
    let mut total = 0u64;
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            total += rect_overlap(&rects[i], &rects[j]);
        }
    }
    total
}

fn overlap_contribution(bin: &Bin, rect_id: usize) -> u64 {
    let rects = bin.rects();
    let Some(target) = rects.iter().find(|r| r.id == rect_id) else {
        return 0;
    };
    rects.iter().filter(|r| r.id != rect_id).map(|r| rect_overlap(target, r)).sum()
}

impl Neighbourhood for OverlapNeighbourhood {
    /// Places every rectangle into a single bin via `place_no_check`
    /// (fully overlapped). If that bin reports zero free space (the
    /// unusual case where the combined rectangle area exactly fills it),
    /// the annealing phase is skipped by jumping `k` straight to `cap`.
    fn start(&mut self, instance: &Instance, _rng: &mut StdRng) -> Solution {
        let mut bin = Bin::new(instance.bin_side);
        for rect in &instance.rectangles {
            let mut r = *rect;
            bin.place_no_check(&mut r);
        }
        self.k = 0;
        self.tau = 1.0;
        if bin.free_area() == 0 {
            self.k = self.cap;
        }
        Solution::new(vec![bin])
    }

    fn neighbours(&mut self, current: &Solution, rng: &mut StdRng) -> Vec<Solution> {
        self.k += 1;
        self.tau = (1.0 - self.k as f64 / self.cap as f64).max(0.0);

        if self.tau > TAU_EPSILON {
            let k = self.k;
            let mut candidates = Vec::with_capacity(CANDIDATES_PER_ROUND);
            for _ in 0..CANDIDATES_PER_ROUND {
                candidates.push(Self::anneal_candidate(k, current, rng));
            }
            let weights = self.weights;
            let tau = self.tau;
            let penalty = self.overlap_penalty;
            candidates.sort_by(|a, b| {
                let sa = scored(a, &weights, tau, penalty);
                let sb = scored(b, &weights, tau, penalty);
                sb.partial_cmp(&sa).unwrap_or(Ordering::Equal)
            });
            candidates
        } else {
            vec![Self::cleanup_candidate(current)]
        }
    }

    fn score(&self, solution: &Solution, weights: &ScoringWeights) -> f64 {
        scored(solution, weights, self.tau, self.overlap_penalty)
    }

    /// The overlap neighbourhood must anneal `tau` all the way to zero
    /// before giving up: if the driver is about to stop early, force `k` to
    /// `cap` and run one more round (the clean-up phase) before reporting
    /// back whatever that round's best candidate is.
    fn on_stall(&mut self, current: &Solution, weights: &ScoringWeights, rng: &mut StdRng) -> Option<Solution> {
        if self.k >= self.cap {
            return None;
        }
        self.k = self.cap;
        let candidates = self.neighbours(current, rng);
        candidates
            .into_iter()
            .max_by(|a, b| self.score(a, weights).partial_cmp(&self.score(b, weights)).unwrap_or(Ordering::Equal))
    }
}

/// Composite fitness minus a large penalty for any same-bin pair whose
/// overlap ratio (overlap area over the larger rectangle's area) exceeds
/// `tau`.
fn scored(solution: &Solution, weights: &ScoringWeights, tau: f64, overlap_penalty: f64) -> f64 {
    let base = scoring::fitness(&solution.bins, weights);
    let mut penalty = 0.0;
    for bin in &solution.bins {
        let rects = bin.rects();
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                let overlap = rect_overlap(&rects[i], &rects[j]);
                if overlap == 0 {
                    continue;
                }
                let max_area = rects[i].area().max(rects[j].area()) as f64;
                if max_area == 0.0 {
                    continue;
                }
                let ratio = overlap as f64 / max_area;
                if ratio > tau {
                    penalty += (ratio - tau) * overlap_penalty;
                }
            }
        }
    }
    base - penalty
}
