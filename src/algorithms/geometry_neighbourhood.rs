use rand::rngs::StdRng;
use std::cmp::Ordering;

use super::traits::Neighbourhood;
use crate::config::ScoringWeights;
use crate::problem::bin::Bin;
use crate::problem::instance::Instance;
use crate::problem::scoring;
use crate::problem::solution::Solution;

const TOP_N: usize = 30;

/// Moves rectangles between bins to consolidate a worst-case one-rectangle-
/// per-bin start into fewer bins. Neighbours are generated by trying, for
/// every (target, source) bin pair with the source enumerated in reverse,
/// to first-fit every rectangle of the source into the target; each
/// successful move is recorded as a distinct candidate state.
pub struct GeometryNeighbourhood {
    weights: ScoringWeights,
}

impl GeometryNeighbourhood {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }
}

impl Neighbourhood for GeometryNeighbourhood {
    /// Each rectangle starts in its own fresh bin (the worst case, `N`
    /// bins), so that subsequent rounds only ever consolidate.
    fn start(&mut self, instance: &Instance, _rng: &mut StdRng) -> Solution {
        let bins = instance
            .rectangles
            .iter()
            .map(|rect| {
                let mut bin = Bin::new(instance.bin_side);
                let mut r = *rect;
                bin.place(&mut r);
                bin
            })
            .collect();
        Solution::new(bins)
    }

    /// Reverse-source ordering front-loads moves from the most recently
    /// opened bins, producing consolidations: a rectangle from a late bin
    /// is tried against every earlier target before an earlier bin's own
    /// rectangles are tried against later targets.
    fn neighbours(&mut self, current: &Solution, _rng: &mut StdRng) -> Vec<Solution> {
        let mut working = current.bins.clone();
        let mut neighbours = Vec::new();

        let mut target = 0usize;
        while target < working.len() {
            let mut source = working.len();
            while source > target + 1 {
                source -= 1;
                if source >= working.len() {
                    continue;
                }
                let ids: Vec<usize> = working[source].rects().iter().map(|r| r.id).collect();
                for id in ids {
                    if source >= working.len() {
                        break;
                    }
                    let Some(mut rect) = working[source].rects().iter().find(|r| r.id == id).copied() else {
                        continue;
                    };
                    if working[target].place(&mut rect) {
                        working[source].remove(id);
                        neighbours.push(Solution::new(working.clone()));
                    }
                }
                if source < working.len() && working[source].is_empty() {
                    working.remove(source);
                }
            }
            target += 1;
        }

        neighbours.sort_by(|a, b| {
            let sa = scoring::fitness(&a.bins, &self.weights);
            let sb = scoring::fitness(&b.bins, &self.weights);
            sb.partial_cmp(&sa).unwrap_or(Ordering::Equal)
        });
        neighbours.truncate(TOP_N);
        neighbours
    }
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
    fn start_places_every_rect_in_its_own_bin() {
        let instance = instance(10, vec![(3, 3), (4, 4), (5, 5)]);
        let mut n = GeometryNeighbourhood::new(ScoringWeights::default());
        let mut rng = StdRng::seed_from_u64(0);
        let solution = n.start(&instance, &mut rng);
        assert_eq!(solution.num_bins(), 3);
    }

    #[test]
    fn neighbours_consolidate_small_rects_into_fewer_bins() {
        let instance = instance(10, vec![(3, 3), (3, 3), (3, 3), (3, 3)]);
        let mut n = GeometryNeighbourhood::new(ScoringWeights::default());
        let mut rng = StdRng::seed_from_u64(0);
        let start = n.start(&instance, &mut rng);
        let neighbours = n.neighbours(&start, &mut rng);
        assert!(!neighbours.is_empty());
        assert!(neighbours.iter().any(|s| s.num_bins() < start.num_bins()));
    }
}
