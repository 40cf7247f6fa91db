//! Geometry primitives shared by detectors, the reconciler, and the
//! redaction engine.
//!
//! Detector adapters produce floating-point corner boxes ([`RectF`]) that may
//! extend past the image; the reconciler clips them into the canonical
//! integer space ([`Rect`]) everything downstream operates in.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in clipped image space.
///
/// Always lies within the bounds of the image it was clipped against; a
/// rectangle with zero width or height is considered empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge, pixels.
    pub x: u32,
    /// Top edge, pixels.
    pub y: u32,
    /// Width, pixels.
    pub width: u32,
    /// Height, pixels.
    pub height: u32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the rectangle has zero area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Area in pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Expands the rectangle by `amount` pixels on every side, clamped to
    /// the image bounds.
    ///
    /// # Arguments
    ///
    /// * `amount` - Padding in pixels.
    /// * `img_width` - Image width to clamp against.
    /// * `img_height` - Image height to clamp against.
    pub fn pad(&self, amount: u32, img_width: u32, img_height: u32) -> Rect {
        let x = self.x.saturating_sub(amount);
        let y = self.y.saturating_sub(amount);
        let right = self.right().saturating_add(amount).min(img_width);
        let bottom = self.bottom().saturating_add(amount).min(img_height);
        Rect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }
}

/// A floating-point rectangle in corner form, as produced by detector
/// adapters before clipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl RectF {
    /// Creates a corner-form rectangle from top-left position and size.
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        RectF {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    /// Clips the rectangle to an image and converts to integer space.
    ///
    /// Corners are clamped into `[0, img_width] x [0, img_height]`, the
    /// top-left floored and the bottom-right ceiled so no detected pixel is
    /// lost. Rectangles entirely outside the image (or inverted) come back
    /// empty.
    pub fn clip(&self, img_width: u32, img_height: u32) -> Rect {
        let w = img_width as f32;
        let h = img_height as f32;
        let x1 = self.x1.clamp(0.0, w);
        let y1 = self.y1.clamp(0.0, h);
        let x2 = self.x2.clamp(0.0, w);
        let y2 = self.y2.clamp(0.0, h);
        if x2 <= x1 || y2 <= y1 {
            return Rect::new(0, 0, 0, 0);
        }
        let left = x1.floor() as u32;
        let top = y1.floor() as u32;
        let right = (x2.ceil() as u32).min(img_width);
        let bottom = (y2.ceil() as u32).min(img_height);
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Intersection-over-union of two clipped rectangles.
///
/// Degenerate (zero-area) rectangles always yield 0.0.
pub fn iou(a: &Rect, b: &Rect) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let ix1 = a.x.max(b.x);
    let iy1 = a.y.max(b.y);
    let ix2 = a.right().min(b.right());
    let iy2 = a.bottom().min(b.bottom());
    if ix2 <= ix1 || iy2 <= iy1 {
        return 0.0;
    }
    let inter = (ix2 - ix1) as f64 * (iy2 - iy1) as f64;
    let union = a.area() as f64 + b.area() as f64 - inter;
    if union <= 0.0 {
        return 0.0;
    }
    (inter / union) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_keeps_interior_rect() {
        let r = RectF::from_xywh(10.0, 20.0, 30.0, 40.0).clip(100, 100);
        assert_eq!(r, Rect::new(10, 20, 30, 40));
    }

    #[test]
    fn clip_truncates_overhang() {
        let r = RectF::from_xywh(-5.0, -5.0, 20.0, 20.0).clip(100, 100);
        assert_eq!(r, Rect::new(0, 0, 15, 15));

        let r = RectF::from_xywh(90.0, 90.0, 20.0, 20.0).clip(100, 100);
        assert_eq!(r, Rect::new(90, 90, 10, 10));
    }

    #[test]
    fn clip_outside_is_empty() {
        let r = RectF::from_xywh(200.0, 200.0, 10.0, 10.0).clip(100, 100);
        assert!(r.is_empty());

        let r = RectF::from_xywh(-50.0, -50.0, 20.0, 20.0).clip(100, 100);
        assert!(r.is_empty());
    }

    #[test]
    fn clip_inverted_is_empty() {
        let inverted = RectF {
            x1: 50.0,
            y1: 50.0,
            x2: 10.0,
            y2: 10.0,
        };
        assert!(inverted.clip(100, 100).is_empty());
    }

    #[test]
    fn pad_clamps_to_image() {
        let r = Rect::new(2, 2, 10, 10).pad(4, 100, 100);
        assert_eq!(r, Rect::new(0, 0, 16, 16));

        let r = Rect::new(90, 90, 10, 10).pad(4, 100, 100);
        assert_eq!(r, Rect::new(86, 86, 14, 14));
    }

    #[test]
    fn iou_identical_is_one() {
        let a = Rect::new(10, 10, 20, 20);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_disjoint_is_zero() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(50, 50, 10, 10);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn iou_partial_overlap() {
        // 10x10 squares offset by 5 in x: inter 50, union 150.
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 0, 10, 10);
        assert!((iou(&a, &b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn iou_degenerate_is_zero() {
        let a = Rect::new(0, 0, 0, 10);
        let b = Rect::new(0, 0, 10, 10);
        assert_eq!(iou(&a, &b), 0.0);
        assert_eq!(iou(&a, &a), 0.0);
    }
}
