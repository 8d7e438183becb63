//! Pure, reentrant scoring functions over a solution's bin list. None of
//! these functions mutate their input or hold state between calls.

use super::bin::Bin;
use crate::config::ScoringWeights;

pub fn utilisation(bin: &Bin) -> f64 {
    let area = bin.side as f64 * bin.side as f64;
    if area == 0.0 {
        return 0.0;
    }
    (area - bin.free_area() as f64) / area
}

pub fn min_utilisation(bins: &[Bin]) -> f64 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().map(utilisation).fold(f64::INFINITY, f64::min)
}

fn bounding_box(bin: &Bin) -> Option<(u32, u32, u32, u32)> {
    let rects = bin.rects();
    if rects.is_empty() {
        return None;
    }
    let x_min = rects.iter().map(|r| r.x).min().unwrap();
    let y_min = rects.iter().map(|r| r.y).min().unwrap();
    let x_max = rects.iter().map(|r| r.right()).max().unwrap();
    let y_max = rects.iter().map(|r| r.top()).max().unwrap();
    Some((x_min, y_min, x_max, y_max))
}

/// Sum of rectangle areas divided by the area of their axis-aligned
/// bounding box; 0 if the bin holds no rectangles.
pub fn compactness(bin: &Bin) -> f64 {
    let Some((x_min, y_min, x_max, y_max)) = bounding_box(bin) else {
        return 0.0;
    };
    let bbox_area = (x_max - x_min) as f64 * (y_max - y_min) as f64;
    if bbox_area == 0.0 {
        return 0.0;
    }
    let total: u64 = bin.rects().iter().map(|r| r.area()).sum();
    total as f64 / bbox_area
}

pub fn average_compactness(bins: &[Bin]) -> f64 {
    mean(bins.iter().map(compactness))
}

/// Mean, over the bin's rectangles, of the fraction of a rectangle's four
/// edges flush with a bin edge.
pub fn contiguity(bin: &Bin) -> f64 {
    let rects = bin.rects();
    if rects.is_empty() {
        return 0.0;
    }
    let side = bin.side;
    let total: f64 = rects
        .iter()
        .map(|r| {
            let mut contacts = 0;
            if r.x == 0 {
                contacts += 1;
            }
            if r.y == 0 {
                contacts += 1;
            }
            if r.right() == side {
                contacts += 1;
            }
            if r.top() == side {
                contacts += 1;
            }
            contacts as f64 / 4.0
        })
        .sum();
    total / rects.len() as f64
}

pub fn average_contiguity(bins: &[Bin]) -> f64 {
    mean(bins.iter().map(contiguity))
}

/// `(bounding box area - sum of rectangle areas) / bounding box area`; 0 if
/// the bin holds no rectangles.
pub fn irregular_gap(bin: &Bin) -> f64 {
    let Some((x_min, y_min, x_max, y_max)) = bounding_box(bin) else {
        return 0.0;
    };
    let bbox_area = (x_max - x_min) as f64 * (y_max - y_min) as f64;
    if bbox_area == 0.0 {
        return 0.0;
    }
    let total: u64 = bin.rects().iter().map(|r| r.area()).sum();
    (bbox_area - total as f64) / bbox_area
}

pub fn average_irregular_gap(bins: &[Bin]) -> f64 {
    mean(bins.iter().map(irregular_gap))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Composite fitness: higher is better. `- W_nb*|bins| + W_mu*min_util +
/// W_cp*avg_compact - W_ig*avg_gap + W_ct*avg_contig`.
pub fn fitness(bins: &[Bin], weights: &ScoringWeights) -> f64 {
    -weights.w_num_bins * bins.len() as f64
        + weights.w_min_util * min_utilisation(bins)
        + weights.w_compactness * average_compactness(bins)
        - weights.w_irregular_gap * average_irregular_gap(bins)
        + weights.w_contiguity * average_contiguity(bins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::rect::Rect;

    #[test]
    fn empty_solution_has_zero_min_utilisation() {
        assert_eq!(min_utilisation(&[]), 0.0);
    }

    #[test]
    fn full_bin_has_utilisation_one() {
        let mut bin = Bin::new(4);
        let mut r = Rect::new(0, 4, 4);
        bin.place(&mut r);
        assert_eq!(utilisation(&bin), 1.0);
    }

    #[test]
    fn removing_an_empty_bin_increases_fitness() {
        let weights = ScoringWeights::default();
        let mut bin = Bin::new(10);
        let mut r = Rect::new(0, 5, 5);
        bin.place(&mut r);
        let with_empty = vec![bin.clone(), Bin::new(10)];
        let without_empty = vec![bin];
        assert!(fitness(&without_empty, &weights) > fitness(&with_empty, &weights));
    }

    #[test]
    fn contiguity_is_one_for_corner_rect_in_quadrant_layout() {
        let mut bin = Bin::new(10);
        let mut r = Rect::new(0, 5, 5);
        bin.place(&mut r);
        // Rect at (0,0): flush with left and bottom edges, not right/top.
        assert_eq!(contiguity(&bin), 0.5);
    }
}
