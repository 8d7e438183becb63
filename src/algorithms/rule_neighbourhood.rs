use rand::rngs::StdRng;
use rand::Rng;

use super::traits::Neighbourhood;
use crate::config::ScoringWeights;
use crate::problem::bin::Bin;
use crate::problem::instance::Instance;
use crate::problem::rect::Rect;
use crate::problem::scoring;
use crate::problem::shelf_bin::ShelfBin;
use crate::problem::solution::Solution;

const RANDOM_SWAPS: usize = 10;

/// Maintains a rectangle ordering `pi` as its state and searches for a
/// better one by trying 4-section pairwise swaps plus a handful of random
/// adjacent-pair swaps, repacking from scratch with `ShelfBin` first-fit
/// each time.
pub struct RuleNeighbourhood {
    weights: ScoringWeights,
    order: Vec<Rect>,
}

impl RuleNeighbourhood {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights, order: Vec::new() }
    }

    fn pack_shelf(order: &[Rect], side: u32) -> Vec<Bin> {
        let mut shelves: Vec<ShelfBin> = Vec::new();
        for rect in order {
            let mut r = *rect;
            let placed = shelves.iter_mut().any(|shelf| shelf.place(&mut r));
            if !placed {
                let mut shelf = ShelfBin::new(side);
                shelf.place(&mut r);
                shelves.push(shelf);
            }
        }
        shelves
            .into_iter()
            .map(|shelf| Bin::from_placed_rects(side, shelf.rects().copied().collect()))
            .collect()
    }

}

impl Neighbourhood for RuleNeighbourhood {
    /// Starting order is area-descending, packed with `ShelfBin` first-fit
    /// (mirrors `RuleBasedNeighborhood.start`'s greedy-area seed).
    fn start(&mut self, instance: &Instance, _rng: &mut StdRng) -> Solution {
        let mut order = instance.rectangles.clone();
        order.sort_by_key(|r| std::cmp::Reverse(r.area()));
        let side = instance.bin_side;
        let bins = Self::pack_shelf(&order, side);
        self.order = order;
        Solution::new(bins)
    }

    fn neighbours(&mut self, current: &Solution, rng: &mut StdRng) -> Vec<Solution> {
        let side = current.bins.first().map(|b| b.side).unwrap_or(0);
        let len = self.order.len();
        let weights = self.weights;
        let mut best_order = self.order.clone();
        let mut best_bins = current.bins.clone();
        let mut best_score = scoring::fitness(&best_bins, &weights);

        let mut candidate_orders = Vec::new();

        // (a) 4-section pairwise swaps: swap the first and last element of
        // each quarter of the ordering.
        if len >= 2 {
            let section_len = (len / 4).max(1);
            for section in 0..4 {
                let start = section * section_len;
                let end = if section == 3 { len } else { (start + section_len).min(len) };
                if end.saturating_sub(start) < 2 {
                    continue;
                }
                let mut candidate = self.order.clone();
                candidate.swap(start, end - 1);
                candidate_orders.push(candidate);
            }
        }

        // (b) up to 10 random adjacent-pair swaps, each against a fresh
        // copy of the current ordering.
        if len >= 2 {
            for _ in 0..RANDOM_SWAPS {
                let i = rng.random_range(0..len - 1);
                let mut candidate = self.order.clone();
                candidate.swap(i, i + 1);
                candidate_orders.push(candidate);
            }
        }

        for order in candidate_orders {
            let bins = Self::pack_shelf(&order, side);
            let score = scoring::fitness(&bins, &weights);
            if score > best_score {
                best_score = score;
                best_bins = bins;
                best_order = order;
            }
        }

        self.order = best_order;
        vec![Solution::new(best_bins)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn instance(bin_side: u32, rects: Vec<(u32, u32)>) -> Instance {
        let rects = rects.into_iter().enumerate().map(|(i, (w, h))| Rect::new(i, w, h)).collect();
        Instance::new(bin_side, 1, bin_side, rects).unwrap()
    }

    #[test]
    fn start_orders_by_descending_area() {
        let instance = instance(10, vec![(1, 1), (9, 9), (4, 4)]);
        let mut n = RuleNeighbourhood::new(ScoringWeights::default());
        let mut rng = StdRng::seed_from_u64(0);
        n.start(&instance, &mut rng);
        let areas: Vec<u64> = n.order.iter().map(|r| r.area()).collect();
        let mut sorted = areas.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(areas, sorted);
    }

    #[test]
    fn neighbours_return_single_candidate() {
        let instance = instance(10, vec![(5, 5), (5, 5), (4, 4), (3, 3), (6, 2)]);
        let mut n = RuleNeighbourhood::new(ScoringWeights::default());
        let mut rng = StdRng::seed_from_u64(1);
        let start = n.start(&instance, &mut rng);
        let neighbours = n.neighbours(&start, &mut rng);
        assert_eq!(neighbours.len(), 1);
    }
}
