use log::info;
use rand::Rng;
use std::time::{Duration, Instant};

use super::greedy::{self, GreedyStrategy};
use crate::problem::bin::Bin;
use crate::problem::instance::Instance;
use crate::problem::rect::Rect;
use crate::problem::solution::Solution;

/// Depth-first search pruned by a greedy upper bound and a wall-clock
/// deadline. Branching is restricted to the first bin that admits the
/// current rectangle rather than exploring every open bin, trading
/// completeness for staying within the deadline on large instances.
pub struct Backtracking {
    deadline: Instant,
    upper_bound: usize,
    best_score: usize,
    best: Option<Vec<Bin>>,
}

impl Backtracking {
    pub fn new(instance: &Instance, max_time_s: f64) -> Self {
        let greedy_solution = greedy::solve(instance, GreedyStrategy::Area);
        Self {
            deadline: Instant::now() + Duration::from_secs_f64(max_time_s),
            upper_bound: greedy_solution.num_bins(),
            best_score: instance.num_rectangles().max(1),
            best: Some(greedy_solution.bins),
        }
    }

    pub fn run(mut self, instance: &Instance, rng: &mut impl Rng) -> Solution {
        let start = Instant::now();
        let rectangles = instance.get_rectangles_random(rng);
        let initial_bins = vec![Bin::new(instance.bin_side)];
        self.backtrack(&rectangles, 0, initial_bins);

        let result = self.best.expect("seeded with the greedy fallback at construction");
        info!(
            "backtracking placed {} rectangles into {} bins in {:?} (upper bound {})",
            instance.num_rectangles(),
            result.len(),
            start.elapsed(),
            self.upper_bound
        );
        Solution::new(result)
    }

    fn backtrack(&mut self, rectangles: &[Rect], index: usize, boxes: Vec<Bin>) {
        if boxes.len() >= self.upper_bound {
            return;
        }
        if Instant::now() >= self.deadline {
            return;
        }
        if index == rectangles.len() {
            if boxes.len() < self.best_score {
                self.best_score = boxes.len();
                self.best = Some(boxes);
            }
            return;
        }

        let rect = rectangles[index];
        for (bin_idx, bin) in boxes.iter().enumerate() {
            if let Some((x, y)) = find_anchor(bin, &rect) {
                let mut branch = boxes.clone();
                let mut placed_rect = rect;
                placed_rect.x = x;
                placed_rect.y = y;
                let placed = branch[bin_idx].place(&mut placed_rect);
                debug_assert!(placed, "find_anchor only returns anchors place() will accept");
                self.backtrack(rectangles, index + 1, branch);
                return;
            }
        }

        let mut new_boxes = boxes;
        let mut new_bin = Bin::new(new_boxes.first().map(|b| b.side).unwrap_or(rect.width.max(rect.height)));
        let mut rect_to_place = rect;
        if new_bin.place(&mut rect_to_place) {
            new_boxes.push(new_bin);
            self.backtrack(rectangles, index + 1, new_boxes);
        }
    }
}

/// Finds any anchor in `bin` that admits `rect`, trying both orientations.
/// Mirrors `Bin::can_place` without mutating the bin, since backtracking
/// needs to decide branching before committing to a placement.
fn find_anchor(bin: &Bin, rect: &Rect) -> Option<(u32, u32)> {
    for &(x, y) in bin.anchors() {
        if bin.can_place(rect, x, y) {
            return Some((x, y));
        }
        let mut rotated = *rect;
        rotated.rotate();
        if bin.can_place(&rotated, x, y) {
            return Some((x, y));
        }
    }
    None
}

pub fn solve(instance: &Instance, max_time_s: f64, rng: &mut impl Rng) -> Solution {
    Backtracking::new(instance, max_time_s).run(instance, rng)
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
    fn never_exceeds_greedy_upper_bound() {
        let instance = instance(10, vec![(6, 6), (6, 6), (6, 6), (6, 6)]);
        let greedy_sol = greedy::solve(&instance, GreedyStrategy::Area);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let sol = solve(&instance, 5.0, &mut rng);
        assert!(sol.num_bins() <= greedy_sol.num_bins());
    }

    #[test]
    fn finds_one_bin_solution_when_one_exists() {
        let instance = instance(10, vec![(5, 5), (5, 5), (5, 5), (5, 5)]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let sol = solve(&instance, 5.0, &mut rng);
        assert_eq!(sol.num_bins(), 1);
    }
}
