use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::error::{PackError, Result};

/// An immutable packing problem: a bin side length and the rectangles to
/// place into bins of that side. Rectangles are generated once; algorithms
/// receive either the original order or a permutation of it but never
/// mutate the instance itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instance {
    pub bin_side: u32,
    pub min_dim: u32,
    pub max_dim: u32,
    pub rectangles: Vec<Rect>,
}

impl Instance {
    pub fn new(bin_side: u32, min_dim: u32, max_dim: u32, rectangles: Vec<Rect>) -> Result<Self> {
        let instance = Self { bin_side, min_dim, max_dim, rectangles };
        instance.validate()?;
        Ok(instance)
    }

    /// Rejects the instance before any search starts. L<1, min>max, or a
    /// rectangle too large for the bin are all structured errors; a
    /// rectangle that only *becomes* oversize mid-algorithm (not possible
    /// here, but relevant to callers building instances by hand) is instead
    /// skipped with a warning, per the oversize_rectangle error kind.
    pub fn validate(&self) -> Result<()> {
        if self.bin_side < 1 {
            return Err(PackError::InvalidInstance {
                reason: format!("bin_side must be >= 1, got {}", self.bin_side),
            });
        }
        if self.min_dim < 1 || self.min_dim > self.max_dim {
            return Err(PackError::InvalidInstance {
                reason: format!(
                    "min_dim ({}) must be >= 1 and <= max_dim ({})",
                    self.min_dim, self.max_dim
                ),
            });
        }
        if self.max_dim > self.bin_side {
            return Err(PackError::InvalidInstance {
                reason: format!(
                    "max_dim ({}) must be <= bin_side ({})",
                    self.max_dim, self.bin_side
                ),
            });
        }
        for r in &self.rectangles {
            if r.width < 1 || r.height < 1 {
                return Err(PackError::InvalidInstance {
                    reason: format!("rectangle {} has non-positive dimension", r.id),
                });
            }
            if r.width > self.bin_side || r.height > self.bin_side {
                return Err(PackError::InvalidInstance {
                    reason: format!(
                        "rectangle {} ({}x{}) does not fit in bin_side {}",
                        r.id, r.width, r.height, self.bin_side
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn num_rectangles(&self) -> usize {
        self.rectangles.len()
    }

    /// The rectangles in their original generation order.
    pub fn get_rectangles(&self) -> &[Rect] {
        &self.rectangles
    }

    /// A fresh permutation of the rectangles, drawn from the injected RNG.
    /// Used to diversify backtracking restarts.
    pub fn get_rectangles_random(&self, rng: &mut impl Rng) -> Vec<Rect> {
        let mut rects = self.rectangles.clone();
        rects.shuffle(rng);
        rects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_oversize_rectangle() {
        let rects = vec![Rect::new(0, 12, 4)];
        let err = Instance::new(10, 1, 10, rects).unwrap_err();
        assert!(matches!(err, PackError::InvalidInstance { .. }));
    }

    #[test]
    fn rejects_min_greater_than_max() {
        let err = Instance::new(10, 8, 4, vec![]).unwrap_err();
        assert!(matches!(err, PackError::InvalidInstance { .. }));
    }

    #[test]
    fn accepts_valid_instance() {
        let rects = vec![Rect::new(0, 5, 5), Rect::new(1, 3, 3)];
        assert!(Instance::new(10, 1, 10, rects).is_ok());
    }
}
