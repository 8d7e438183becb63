use log::{debug, info, warn};
use std::time::Instant;

use crate::problem::bin::Bin;
use crate::problem::instance::Instance;
use crate::problem::rect::Rect;
use crate::problem::shelf_bin::ShelfBin;
use crate::problem::solution::Solution;

/// Rectangle ordering strategies. Euclidean nearest-neighbour ordering
/// belongs only to the travelling-salesman demo and is out of scope here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GreedyStrategy {
    Area,
    Perimeter,
}

impl GreedyStrategy {
    fn order(&self, rects: &[Rect]) -> Vec<Rect> {
        let mut ordered = rects.to_vec();
        match self {
            GreedyStrategy::Area => ordered.sort_by_key(|r| std::cmp::Reverse(r.area())),
            GreedyStrategy::Perimeter => ordered.sort_by_key(|r| std::cmp::Reverse(r.perimeter())),
        }
        ordered
    }
}

/// Orders the instance's rectangles per `strategy`, then performs first-fit
/// placement: try every existing bin in order, opening a new bin at `(0,0)`
/// on failure. Terminates once every rectangle is placed.
pub fn solve(instance: &Instance, strategy: GreedyStrategy) -> Solution {
    let start = Instant::now();
    let ordered = strategy.order(&instance.rectangles);
    let mut bins: Vec<Bin> = Vec::new();

    for mut rect in ordered {
        if !place_first_fit(&mut bins, &mut rect) {
            let mut bin = Bin::new(instance.bin_side);
            if bin.place(&mut rect) {
                bins.push(bin);
            } else {
                // Unreachable for an `Instance` that passed validation (every
                // rectangle fits the bin side by construction), but a fresh
                // bin failing to admit a rectangle is the oversize_rectangle
                // error kind: skip it and keep going rather than silently
                // dropping it from the solution.
                warn!("rect {} ({}x{}) does not fit a fresh bin of side {}; skipping", rect.id, rect.width, rect.height, instance.bin_side);
            }
        }
    }

    info!(
        "greedy({:?}) placed {} rectangles into {} bins in {:?}",
        strategy,
        instance.num_rectangles(),
        bins.len(),
        start.elapsed()
    );
    Solution::new(bins)
}

/// `ShelfBin`-backed fast path: first-fit over existing shelf bins,
/// opening a new one on failure. Converted to ordinary `Bin`s at the end
/// so callers get the same `Solution` shape regardless of which packer
/// produced it. Used by the rule-based neighbourhood's repeated
/// re-packing rather than by `pack()`'s own greedy entry points.
pub fn solve_shelf(instance: &Instance, strategy: GreedyStrategy) -> Solution {
    let start = Instant::now();
    let ordered = strategy.order(&instance.rectangles);
    let mut shelf_bins: Vec<ShelfBin> = Vec::new();

    for mut rect in ordered {
        let placed = shelf_bins.iter_mut().any(|b| b.place(&mut rect));
        if !placed {
            let mut bin = ShelfBin::new(instance.bin_side);
            if bin.place(&mut rect) {
                shelf_bins.push(bin);
            } else {
                warn!("rect {} ({}x{}) does not fit a fresh shelf bin of side {}; skipping", rect.id, rect.width, rect.height, instance.bin_side);
            }
        }
    }

    let bins: Vec<Bin> = shelf_bins
        .into_iter()
        .map(|shelf| Bin::from_placed_rects(instance.bin_side, shelf.rects().copied().collect()))
        .collect();

    info!(
        "greedy_shelf({:?}) placed {} rectangles into {} bins in {:?}",
        strategy,
        instance.num_rectangles(),
        bins.len(),
        start.elapsed()
    );
    Solution::new(bins)
}

fn place_first_fit(bins: &mut [Bin], rect: &mut Rect) -> bool {
    for bin in bins.iter_mut() {
        if bin.place(rect) {
            debug!("placed rect {} in bin {}", rect.id, bin.id);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::rect::Rect as R;
    use crate::problem::solution::validate;

    fn instance(bin_side: u32, rects: Vec<(u32, u32)>) -> Instance {
        let rects = rects
            .into_iter()
            .enumerate()
            .map(|(i, (w, h))| R::new(i, w, h))
            .collect();
        Instance::new(bin_side, 1, bin_side, rects).unwrap()
    }

    #[test]
    fn single_full_size_rect_needs_one_bin() {
        let instance = instance(10, vec![(10, 10)]);
        let sol = solve(&instance, GreedyStrategy::Area);
        assert_eq!(sol.num_bins(), 1);
        assert_eq!((sol.bins[0].rects()[0].x, sol.bins[0].rects()[0].y), (0, 0));
    }

    #[test]
    fn four_six_by_six_need_four_bins_in_ten_side() {
        let instance = instance(10, vec![(6, 6), (6, 6), (6, 6), (6, 6)]);
        let sol = solve(&instance, GreedyStrategy::Area);
        assert_eq!(sol.num_bins(), 4);
        assert!(validate(&instance, &sol).is_empty());
    }

    #[test]
    fn four_five_by_five_fit_one_bin_in_quadrants() {
        let instance = instance(10, vec![(5, 5), (5, 5), (5, 5), (5, 5)]);
        let sol = solve(&instance, GreedyStrategy::Area);
        assert_eq!(sol.num_bins(), 1);
        assert!(validate(&instance, &sol).is_empty());
        let mut corners: Vec<(u32, u32)> = sol.bins[0].rects().iter().map(|r| (r.x, r.y)).collect();
        corners.sort_unstable();
        assert_eq!(corners, vec![(0, 0), (0, 5), (5, 0), (5, 5)]);
    }

    #[test]
    fn greedy_area_is_idempotent() {
        let instance = instance(10, vec![(3, 4), (5, 5), (2, 9), (7, 1)]);
        let a = solve(&instance, GreedyStrategy::Area);
        let b = solve(&instance, GreedyStrategy::Area);
        assert_eq!(a.num_bins(), b.num_bins());
        let mut a_layout: Vec<(usize, u32, u32)> =
            a.bins.iter().flat_map(|bin| bin.rects().iter().map(|r| (r.id, r.x, r.y))).collect();
        let mut b_layout: Vec<(usize, u32, u32)> =
            b.bins.iter().flat_map(|bin| bin.rects().iter().map(|r| (r.id, r.x, r.y))).collect();
        a_layout.sort_unstable();
        b_layout.sort_unstable();
        assert_eq!(a_layout, b_layout);
    }

    #[test]
    fn rotation_exercised_for_mixed_orientation_rects() {
        let instance = instance(10, vec![(7, 3), (3, 7), (3, 7), (7, 3)]);
        let sol = solve(&instance, GreedyStrategy::Area);
        assert_eq!(sol.num_bins(), 1);
        assert!(validate(&instance, &sol).is_empty());
    }

    #[test]
    fn three_five_by_five_need_three_bins_in_eight_side() {
        let instance = instance(8, vec![(5, 5), (5, 5), (5, 5)]);
        let sol = solve(&instance, GreedyStrategy::Area);
        assert_eq!(sol.num_bins(), 3);
    }

    #[test]
    fn shelf_fast_path_yields_a_valid_solution() {
        let instance = instance(10, vec![(4, 3), (4, 3), (6, 5), (2, 2)]);
        let sol = solve_shelf(&instance, GreedyStrategy::Area);
        assert!(validate(&instance, &sol).is_empty());
    }
}
