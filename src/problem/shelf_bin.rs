use super::rect::Rect;

/// A horizontal strip spanning the bin width, used by the monotone shelf
/// packer. `gaps` partitions the horizontal span not yet occupied by a
/// rectangle on this shelf.
#[derive(Clone, Debug)]
pub struct Shelf {
    pub start_y: u32,
    pub height: u32,
    pub gaps: Vec<(u32, u32)>,
    pub rects: Vec<Rect>,
}

impl Shelf {
    fn new(start_y: u32, height: u32, side: u32) -> Self {
        Self { start_y, height, gaps: vec![(0, side)], rects: Vec::new() }
    }
}

/// A monotone shelf-packing alternative to the anchor-based [`super::bin::Bin`].
/// Shelves stack bottom-up with no vertical gaps; rectangles within a shelf
/// fill its horizontal span left to right. No removal bookkeeping is
/// required to keep packing correct, though `remove` is provided for
/// completeness.
#[derive(Clone, Debug)]
pub struct ShelfBin {
    pub side: u32,
    pub shelves: Vec<Shelf>,
    used_height: u32,
}

impl ShelfBin {
    pub fn new(side: u32) -> Self {
        Self { side, shelves: Vec::new(), used_height: 0 }
    }

    pub fn rects(&self) -> impl Iterator<Item = &Rect> {
        self.shelves.iter().flat_map(|s| s.rects.iter())
    }

    fn used_area(&self) -> u64 {
        self.rects().map(|r| r.area()).sum()
    }

    pub fn free_area(&self) -> i64 {
        self.side as i64 * self.side as i64 - self.used_area() as i64
    }

    /// Top-shelf-only placement: extends the current shelf if `rect` fits in
    /// its remaining span, otherwise opens a new shelf of height `rect.height`
    /// if there is room below the bin's top edge.
    pub fn place(&mut self, rect: &mut Rect) -> bool {
        if rect.width > self.side || rect.height > self.side {
            return false;
        }

        if let Some(shelf) = self.shelves.last_mut() {
            if let Some((gx, gw)) = shelf.gaps.first().copied() {
                if rect.width <= gw {
                    rect.x = gx;
                    rect.y = shelf.start_y;
                    shelf.rects.push(*rect);
                    if rect.width == gw {
                        shelf.gaps.remove(0);
                    } else {
                        shelf.gaps[0] = (gx + rect.width, gw - rect.width);
                    }
                    return true;
                }
            }
        }

        if self.used_height + rect.height <= self.side {
            let mut shelf = Shelf::new(self.used_height, rect.height, self.side);
            rect.x = 0;
            rect.y = shelf.start_y;
            shelf.rects.push(*rect);
            shelf.gaps[0] = (rect.width, self.side - rect.width);
            self.used_height += rect.height;
            self.shelves.push(shelf);
            return true;
        }

        false
    }

    /// Best-fit variant: searches every shelf tall enough for `rect` and
    /// places in the gap with the smallest leftover width, falling back to
    /// opening a new shelf when no existing shelf admits it.
    pub fn place_best_fit(&mut self, rect: &mut Rect) -> bool {
        if rect.width > self.side || rect.height > self.side {
            return false;
        }

        let mut best: Option<(usize, usize, u32)> = None; // (shelf idx, gap idx, leftover)
        for (si, shelf) in self.shelves.iter().enumerate() {
            if shelf.height < rect.height {
                continue;
            }
            for (gi, &(_, gw)) in shelf.gaps.iter().enumerate() {
                if gw >= rect.width {
                    let leftover = gw - rect.width;
                    let better = match best {
                        Some((_, _, best_leftover)) => leftover < best_leftover,
                        None => true,
                    };
                    if better {
                        best = Some((si, gi, leftover));
                    }
                }
            }
        }

        if let Some((si, gi, _)) = best {
            let shelf = &mut self.shelves[si];
            let (gx, gw) = shelf.gaps[gi];
            rect.x = gx;
            rect.y = shelf.start_y;
            shelf.rects.push(*rect);
            if rect.width == gw {
                shelf.gaps.remove(gi);
            } else {
                shelf.gaps[gi] = (gx + rect.width, gw - rect.width);
            }
            return true;
        }

        if self.used_height + rect.height <= self.side {
            let mut shelf = Shelf::new(self.used_height, rect.height, self.side);
            rect.x = 0;
            rect.y = shelf.start_y;
            shelf.rects.push(*rect);
            shelf.gaps[0] = (rect.width, self.side - rect.width);
            self.used_height += rect.height;
            self.shelves.push(shelf);
            return true;
        }

        false
    }

    /// Removes a rectangle by id, crediting its area back as free space.
    /// Its slot in the shelf's gap list is not reclaimed: shelf packing is
    /// monotone by design, so reopening a gap mid-shelf would require
    /// re-deriving contiguous free spans, which this packer does not need.
    pub fn remove(&mut self, id: usize) -> Option<Rect> {
        for shelf in self.shelves.iter_mut() {
            if let Some(pos) = shelf.rects.iter().position(|r| r.id == id) {
                return Some(shelf.rects.remove(pos));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_shelves_bottom_up() {
        let mut bin = ShelfBin::new(10);
        let mut a = Rect::new(0, 4, 3);
        let mut b = Rect::new(1, 4, 3);
        let mut c = Rect::new(2, 4, 5);
        assert!(bin.place(&mut a));
        assert!(bin.place(&mut b));
        assert!(bin.place(&mut c));
        assert_eq!((a.x, a.y), (0, 0));
        assert_eq!((b.x, b.y), (4, 0));
        assert_eq!((c.x, c.y), (0, 3));
    }

    #[test]
    fn refuses_when_bin_full_vertically() {
        let mut bin = ShelfBin::new(6);
        let mut a = Rect::new(0, 6, 3);
        let mut b = Rect::new(1, 6, 3);
        let mut c = Rect::new(2, 6, 3);
        assert!(bin.place(&mut a));
        assert!(bin.place(&mut b));
        assert!(!bin.place(&mut c));
    }

    #[test]
    fn never_exceeds_side_in_either_dimension() {
        let mut bin = ShelfBin::new(8);
        let mut r = Rect::new(0, 9, 2);
        assert!(!bin.place(&mut r));
    }
}
