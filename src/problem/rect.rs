use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with integer dimensions and a stable identity.
///
/// `id` is assigned once, at instance generation time, and survives cloning;
/// it is what lets the search compare rectangles across cloned candidate
/// solutions without relying on object identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl Rect {
    pub fn new(id: usize, width: u32, height: u32) -> Self {
        Self { id, width, height, x: 0, y: 0 }
    }

    pub fn at(id: usize, width: u32, height: u32, x: u32, y: u32) -> Self {
        Self { id, width, height, x, y }
    }

    /// Swaps width and height in place. Does not touch the anchor; placing
    /// a rotated rectangle at a valid anchor is the bin's responsibility.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn perimeter(&self) -> u64 {
        self.width as u64 + self.height as u64
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn top(&self) -> u32 {
        self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_swaps_dimensions_only() {
        let mut r = Rect::at(0, 3, 7, 5, 9);
        r.rotate();
        assert_eq!((r.width, r.height), (7, 3));
        assert_eq!((r.x, r.y), (5, 9));
    }

    #[test]
    fn area_and_perimeter() {
        let r = Rect::new(1, 4, 5);
        assert_eq!(r.area(), 20);
        assert_eq!(r.perimeter(), 9);
    }
}
