use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use rand::seq::IteratorRandom;
use rand::Rng;

use super::rect::Rect;

/// Grid cell size used by the spatial hash that restricts overlap queries
/// to rectangles sharing at least one cell with the candidate footprint.
const GRID_CELL: u32 = 2;

static NEXT_BIN_ID: AtomicU64 = AtomicU64::new(0);

/// An L x L bin that places rectangles at anchor points, rejecting overlap
/// via a spatial grid, and supports reversible placement (`place` / `remove`
/// restore each other's bookkeeping exactly).
#[derive(Clone, Debug)]
pub struct Bin {
    pub id: u64,
    pub side: u32,
    rects: Vec<Rect>,
    index_of: HashMap<usize, usize>,
    anchors: HashSet<(u32, u32)>,
    grid: HashMap<(u32, u32), Vec<usize>>,
    free: i64,
}

impl Bin {
    pub fn new(side: u32) -> Self {
        let mut anchors = HashSet::new();
        anchors.insert((0, 0));
        Self {
            id: NEXT_BIN_ID.fetch_add(1, Ordering::Relaxed),
            side,
            rects: Vec::new(),
            index_of: HashMap::new(),
            anchors,
            grid: HashMap::new(),
            free: side as i64 * side as i64,
        }
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn free_area(&self) -> i64 {
        self.free
    }

    pub fn anchors(&self) -> impl Iterator<Item = &(u32, u32)> {
        self.anchors.iter()
    }

    fn cells_for(&self, x: u32, y: u32, w: u32, h: u32) -> Vec<(u32, u32)> {
        let start_x = x / GRID_CELL;
        let start_y = y / GRID_CELL;
        let end_x = (x + w) / GRID_CELL;
        let end_y = (y + h) / GRID_CELL;
        let mut cells = Vec::with_capacity(((end_x - start_x + 1) * (end_y - start_y + 1)) as usize);
        for gx in start_x..=end_x {
            for gy in start_y..=end_y {
                cells.push((gx, gy));
            }
        }
        cells
    }

    /// Sum of intersection areas between the candidate footprint and every
    /// rectangle sharing at least one grid cell with it. Each candidate is
    /// visited at most once regardless of how many cells it shares.
    pub fn compute_overlap(&self, rect: &Rect, x: u32, y: u32) -> u64 {
        let mut total = 0u64;
        let mut checked = HashSet::new();
        for cell in self.cells_for(x, y, rect.width, rect.height) {
            let Some(ids) = self.grid.get(&cell) else { continue };
            for &id in ids {
                if !checked.insert(id) {
                    continue;
                }
                let placed = &self.rects[self.index_of[&id]];
                let ow = (placed.x + placed.width).min(x + rect.width).saturating_sub(placed.x.max(x));
                let oh = (placed.y + placed.height).min(y + rect.height).saturating_sub(placed.y.max(y));
                if ow > 0 && oh > 0 {
                    total += ow as u64 * oh as u64;
                }
            }
        }
        total
    }

    pub fn can_place(&self, rect: &Rect, x: u32, y: u32) -> bool {
        if x + rect.width > self.side || y + rect.height > self.side {
            return false;
        }
        self.compute_overlap(rect, x, y) == 0
    }

    /// Attempts to anchor `rect` at the first valid anchor, in ascending
    /// `x+y` order with a lexicographic tie-break, trying the 90°-rotated
    /// orientation at each anchor if the unrotated one doesn't fit. Mutates
    /// `rect` in place (position, and orientation if rotated) and returns
    /// true iff it was placed.
    pub fn place(&mut self, rect: &mut Rect) -> bool {
        if rect.area() as i64 > self.free {
            return false;
        }
        let mut anchors: Vec<(u32, u32)> = self.anchors.iter().copied().collect();
        anchors.sort_by_key(|&(x, y)| (x + y, x, y));

        for (x, y) in anchors {
            if self.can_place(rect, x, y) {
                self.commit(*rect, x, y);
                rect.x = x;
                rect.y = y;
                return true;
            }
            let mut rotated = *rect;
            rotated.rotate();
            if self.can_place(&rotated, x, y) {
                self.commit(rotated, x, y);
                *rect = rotated;
                rect.x = x;
                rect.y = y;
                return true;
            }
        }
        false
    }

    /// Picks an arbitrary anchor that at least fits within the bin bounds
    /// (no overlap check) and places there. Used only by the partial-overlap
    /// neighbourhood while annealing its overlap tolerance.
    pub fn place_relaxed(&mut self, rect: &mut Rect, rng: &mut impl Rng) -> bool {
        let mut candidates: Vec<(u32, u32)> = self
            .anchors
            .iter()
            .copied()
            .filter(|&(x, y)| x + rect.width <= self.side && y + rect.height <= self.side)
            .collect();
        // `anchors` is a `HashSet`, whose iteration order is randomized per
        // process by `RandomState`; sort into the same total order `place`
        // uses so the only randomness `choose` draws on is `rng`.
        candidates.sort_by_key(|&(x, y)| (x + y, x, y));
        let Some(&(x, y)) = candidates.iter().choose(rng) else {
            return false;
        };
        self.commit(*rect, x, y);
        rect.x = x;
        rect.y = y;
        true
    }

    /// Appends `rect` without updating anchors or the grid. Used only to
    /// seed the fully-overlapped starting solution for the partial-overlap
    /// neighbourhood.
    pub fn place_no_check(&mut self, rect: &mut Rect) {
        rect.x = 0;
        rect.y = 0;
        self.free -= rect.area() as i64;
        self.index_of.insert(rect.id, self.rects.len());
        self.rects.push(*rect);
    }

    fn commit(&mut self, rect: Rect, x: u32, y: u32) {
        let mut placed = rect;
        placed.x = x;
        placed.y = y;

        self.anchors.remove(&(x, y));
        if x + placed.width < self.side {
            self.anchors.insert((x + placed.width, y));
        }
        if y + placed.height < self.side {
            self.anchors.insert((x, y + placed.height));
        }

        for cell in self.cells_for(x, y, placed.width, placed.height) {
            self.grid.entry(cell).or_default().push(placed.id);
        }

        self.index_of.insert(placed.id, self.rects.len());
        self.rects.push(placed);
        self.free -= placed.area() as i64;
    }

    /// Removes `rect` (matched by id), restoring its own anchor and
    /// discarding the two anchors its placement derived, and returning the
    /// bin to the exact state `place` found it in.
    pub fn remove(&mut self, id: usize) -> Option<Rect> {
        let idx = self.index_of.remove(&id)?;
        let rect = self.rects.swap_remove(idx);
        if let Some(moved) = self.rects.get(idx) {
            self.index_of.insert(moved.id, idx);
        }

        for cell in self.cells_for(rect.x, rect.y, rect.width, rect.height) {
            if let Some(ids) = self.grid.get_mut(&cell) {
                ids.retain(|&i| i != id);
                if ids.is_empty() {
                    self.grid.remove(&cell);
                }
            }
        }

        self.anchors.insert((rect.x, rect.y));
        self.anchors.remove(&(rect.x + rect.width, rect.y));
        self.anchors.remove(&(rect.x, rect.y + rect.height));

        self.free += rect.area() as i64;
        Some(rect)
    }

    /// Deep clone producing an independent bin with duplicated rectangle
    /// instances and grid structure, preserving `id`. Equivalent to
    /// `Clone::clone`; kept as a named method to match the placement
    /// contract's vocabulary.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Builds a bin from rectangles that are already positioned, e.g. when
    /// converting a `ShelfBin` snapshot for scoring or wire output. Grid and
    /// free-area bookkeeping is reconstructed from the given positions, but
    /// the anchor set is left empty: a bin built this way is never used as
    /// a further placement target, only scored or serialized.
    pub fn from_placed_rects(side: u32, rects: Vec<Rect>) -> Self {
        let mut bin = Self::new(side);
        bin.anchors.clear();
        for rect in rects {
            for cell in bin.cells_for(rect.x, rect.y, rect.width, rect.height) {
                bin.grid.entry(cell).or_default().push(rect.id);
            }
            bin.index_of.insert(rect.id, bin.rects.len());
            bin.free -= rect.area() as i64;
            bin.rects.push(rect);
        }
        bin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_then_remove_restores_state() {
        let mut bin = Bin::new(10);
        let mut r1 = Rect::new(0, 4, 4);
        assert!(bin.place(&mut r1));
        let free_after_place = bin.free_area();
        let anchors_after_place: HashSet<_> = bin.anchors().copied().collect();

        let mut r2 = Rect::new(1, 3, 3);
        assert!(bin.place(&mut r2));
        bin.remove(r2.id).unwrap();

        assert_eq!(bin.free_area(), free_after_place);
        let anchors_after_remove: HashSet<_> = bin.anchors().copied().collect();
        assert_eq!(anchors_after_place, anchors_after_remove);
    }

    #[test]
    fn full_bin_refuses_oversize_area() {
        let mut bin = Bin::new(10);
        let mut big = Rect::new(0, 10, 10);
        assert!(bin.place(&mut big));
        let mut extra = Rect::new(1, 1, 1);
        assert!(!bin.place(&mut extra));
    }

    #[test]
    fn rotation_used_when_unrotated_does_not_fit() {
        let mut bin = Bin::new(10);
        let mut a = Rect::new(0, 10, 5);
        assert!(bin.place(&mut a));
        assert_eq!((a.x, a.y), (0, 0));

        let mut b = Rect::new(1, 5, 10);
        assert!(bin.place(&mut b));
        // Only fits rotated into the remaining (0,5)-(10,10) strip.
        assert_eq!((b.width, b.height), (10, 5));
        assert_eq!((b.x, b.y), (0, 5));
    }

    #[test]
    fn no_two_rects_overlap() {
        let mut bin = Bin::new(10);
        let mut rects: Vec<Rect> = (0..4).map(|i| Rect::new(i, 5, 5)).collect();
        for r in rects.iter_mut() {
            assert!(bin.place(r));
        }
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                let (a, b) = (rects[i], rects[j]);
                let overlap_w = a.right().min(b.right()).saturating_sub(a.x.max(b.x));
                let overlap_h = a.top().min(b.top()).saturating_sub(a.y.max(b.y));
                assert_eq!(overlap_w.min(overlap_h), 0, "rects {} and {} overlap", a.id, b.id);
            }
        }
    }
}
