//! 2D Geometry Primitives
//!
//! Corner-based rectangles and the single AABB overlap test used by the
//! whole simulation. Every entity stores its position as the top-left
//! corner; converting once at construction removes the half-size offset
//! bugs that creep in when corner-based and center-based conventions mix.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// 2D vector with `f32` components.
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component (pixels, +X points right)
    pub x: f32,
    /// Y component (pixels, +Y points down)
    pub y: f32,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Scale by a scalar.
    #[inline]
    pub fn scale(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// True iff both components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        self.scale(scalar)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Axis-aligned rectangle, positioned by its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle of the given size centered on a point.
    #[inline]
    pub fn centered_at(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    /// Left edge.
    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Top edge.
    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Horizontal center.
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Vertical center.
    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.center_y())
    }

    /// Move the rectangle in place.
    #[inline]
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// AABB overlap test. Touching edges do not count as an overlap.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// True iff the point lies inside the rectangle.
    #[inline]
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Shrink (or grow) around the center. Used for hitbox forgiveness.
    #[inline]
    pub fn scaled_about_center(&self, factor: f32) -> Rect {
        Rect::centered_at(self.center_x(), self.center_y(), self.w * factor, self.h * factor)
    }

    /// True iff all fields are finite. Malformed rectangles are skipped by
    /// the collision resolver instead of poisoning the tick.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 0.0, 10.0, 10.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);

        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_centered_at_round_trips() {
        let r = Rect::centered_at(50.0, 30.0, 20.0, 10.0);

        assert_eq!(r.x, 40.0);
        assert_eq!(r.y, 25.0);
        assert_eq!(r.center(), Vec2::new(50.0, 30.0));
    }

    #[test]
    fn test_scaled_about_center_keeps_center() {
        let r = Rect::new(10.0, 10.0, 40.0, 20.0);
        let s = r.scaled_about_center(0.5);

        assert_eq!(s.center(), r.center());
        assert_eq!(s.w, 20.0);
        assert_eq!(s.h, 10.0);
    }

    #[test]
    fn test_non_finite_detected() {
        let mut r = Rect::new(0.0, 0.0, 4.0, 4.0);
        assert!(r.is_finite());

        r.x = f32::NAN;
        assert!(!r.is_finite());
    }
}
