use serde::{Deserialize, Serialize};

use super::bin::Bin;
use super::instance::Instance;

/// An ordered list of bins; bin order is observable (scoring and the
/// geometry neighbourhood both examine the last bin / enumerate in reverse).
#[derive(Clone, Debug, Default)]
pub struct Solution {
    pub bins: Vec<Bin>,
}

impl Solution {
    pub fn new(bins: Vec<Bin>) -> Self {
        Self { bins }
    }

    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Reconstructs a `Solution` from its wire form for `validate`. Mirrors
    /// `Bin::from_placed_rects`: positions are trusted as given, not
    /// re-derived from the anchor/grid placement rules.
    pub fn from_wire(wire: &WireSolution) -> Self {
        let bins = wire
            .bins
            .iter()
            .map(|wb| {
                let rects = wb.rects.iter().map(|wr| super::rect::Rect::at(wr.id, wr.w, wr.h, wr.x, wr.y)).collect();
                Bin::from_placed_rects(wire.bin_side, rects)
            })
            .collect();
        Self::new(bins)
    }

    pub fn to_wire(&self) -> WireSolution {
        WireSolution {
            bin_side: self.bins.first().map(|b| b.side).unwrap_or(0),
            bins: self
                .bins
                .iter()
                .map(|b| WireBin {
                    rects: b
                        .rects()
                        .iter()
                        .map(|r| WireRect { id: r.id, x: r.x, y: r.y, w: r.width, h: r.height })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Serializable solution wire form, per the external interface contract:
/// bins listing their rectangles as `{id, x, y, w, h}`, with the bin side
/// echoed once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireSolution {
    pub bin_side: u32,
    pub bins: Vec<WireBin>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireBin {
    pub rects: Vec<WireRect>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireRect {
    pub id: usize,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// A single violation surfaced by [`validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    Overlap { bin_index: usize, a: usize, b: usize },
    OutOfBounds { bin_index: usize, rect: usize },
    RectangleMismatch,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Overlap { bin_index, a, b } => {
                write!(f, "bin {bin_index}: rectangles {a} and {b} overlap")
            }
            Violation::OutOfBounds { bin_index, rect } => {
                write!(f, "bin {bin_index}: rectangle {rect} lies outside the bin")
            }
            Violation::RectangleMismatch => {
                write!(f, "solution's rectangle multiset does not match the instance")
            }
        }
    }
}

/// Checks every testable property from the packing contract: no overlaps,
/// every rectangle within its bin, and rectangle conservation (the
/// multiset of (w,h) pairs modulo rotation matches the input).
pub fn validate(instance: &Instance, solution: &Solution) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (bi, bin) in solution.bins.iter().enumerate() {
        let rects = bin.rects();
        for r in rects {
            if r.x + r.width > bin.side || r.y + r.height > bin.side {
                violations.push(Violation::OutOfBounds { bin_index: bi, rect: r.id });
            }
        }
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                let (a, b) = (rects[i], rects[j]);
                let overlap_w = a.right().min(b.right()).saturating_sub(a.x.max(b.x));
                let overlap_h = a.top().min(b.top()).saturating_sub(a.y.max(b.y));
                if overlap_w > 0 && overlap_h > 0 {
                    violations.push(Violation::Overlap { bin_index: bi, a: a.id, b: b.id });
                }
            }
        }
    }

    let mut expected: Vec<(u32, u32)> = instance
        .rectangles
        .iter()
        .map(|r| {
            let (a, b) = (r.width, r.height);
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        })
        .collect();
    let mut actual: Vec<(u32, u32)> = solution
        .bins
        .iter()
        .flat_map(|b| b.rects().iter().copied())
        .map(|r| {
            let (a, b) = (r.width, r.height);
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        })
        .collect();
    expected.sort_unstable();
    actual.sort_unstable();
    if expected != actual {
        violations.push(Violation::RectangleMismatch);
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::rect::Rect;

    #[test]
    fn valid_single_bin_solution_has_no_violations() {
        let instance = Instance::new(10, 1, 10, vec![Rect::new(0, 10, 10)]).unwrap();
        let mut bin = Bin::new(10);
        let mut r = Rect::new(0, 10, 10);
        bin.place(&mut r);
        let solution = Solution::new(vec![bin]);
        assert!(validate(&instance, &solution).is_empty());
    }

    #[test]
    fn detects_rectangle_mismatch() {
        let instance = Instance::new(10, 1, 10, vec![Rect::new(0, 10, 10)]).unwrap();
        let solution = Solution::new(vec![]);
        let violations = validate(&instance, &solution);
        assert!(violations.contains(&Violation::RectangleMismatch));
    }
}
