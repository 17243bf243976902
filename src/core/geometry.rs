use serde::{Deserialize, Serialize};

/// Axis-aligned box in page space, origin at the top-left corner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) * 0.5, (self.y0 + self.y1) * 0.5)
    }

    /// Half-open containment: points on the right/bottom edge are outside.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// The top-left quarter of a `width` x `height` page.
    pub fn top_left_quadrant(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width / 2.0, height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quadrant_of_letter_page() {
        let q = BBox::top_left_quadrant(612.0, 792.0);
        assert_eq!(q, BBox::new(0.0, 0.0, 306.0, 396.0));
        assert!(q.contains_point(10.0, 10.0));
        assert!(!q.contains_point(306.0, 10.0));
        assert!(!q.contains_point(10.0, 400.0));
    }

    #[test]
    fn center_of_box() {
        let b = BBox::new(0.0, 0.0, 10.0, 20.0);
        assert_eq!(b.center(), (5.0, 10.0));
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 20.0);
    }
}
