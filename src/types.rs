//! Strongly-typed numeric primitives for frame geometry (zero-cost newtypes).
//!
//! - Lengths are millimetres, angles are degrees; raw `f64` stays at the edges
//! - Trigonometry only through `Angle`, so degree/radian mixups cannot happen
//! - Pixel conversion only via `Scaler`

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Length in millimetres (the unit every geometry chart uses)
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Length(pub f64);

impl Length {
    pub const ZERO: Length = Length(0.0);

    /// Create a Length from millimetres (const-friendly, unchecked).
    /// Use `try_new` for user-provided values.
    #[inline]
    pub const fn mm(val: f64) -> Length {
        Length(val)
    }

    /// Create a Length with validation (rejects NaN/infinite)
    #[inline]
    pub fn try_new(val: f64) -> Result<Length, NumericError> {
        check_finite(val).map(Length)
    }

    /// Create a strictly positive Length with validation
    #[inline]
    pub fn try_positive(val: f64) -> Result<Length, NumericError> {
        let val = check_finite(val)?;
        if val == 0.0 {
            Err(NumericError::Zero)
        } else if val < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Length(val))
        }
    }

    /// Get the absolute value
    #[inline]
    pub fn abs(self) -> Length {
        Length(self.0.abs())
    }

    #[inline]
    pub fn min(self, other: Length) -> Length {
        Length(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Length) -> Length {
        Length(self.0.max(other.0))
    }

    /// Get the raw value (use sparingly, prefer typed operations)
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// Check if this length is finite (not NaN or infinite)
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Length {
    type Output = Length;
    fn add(self, rhs: Length) -> Length { Length(self.0 + rhs.0) }
}
impl Sub for Length {
    type Output = Length;
    fn sub(self, rhs: Length) -> Length { Length(self.0 - rhs.0) }
}
impl Mul<f64> for Length {
    type Output = Length;
    fn mul(self, rhs: f64) -> Length { Length(self.0 * rhs) }
}
impl Div<f64> for Length {
    type Output = Length;
    fn div(self, rhs: f64) -> Length { Length(self.0 / rhs) }
}

// NOTE: Length / Length is intentionally NOT implemented.
// Divisions in the solver go through explicit zero checks.

impl Neg for Length {
    type Output = Length;
    fn neg(self) -> Length { Length(-self.0) }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mm", self.0)
    }
}

/// Angle in degrees, measured from horizontal
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Angle(pub f64);

impl Angle {
    /// Create an Angle with validation (rejects NaN/infinite)
    #[inline]
    pub fn try_new(val: f64) -> Result<Angle, NumericError> {
        check_finite(val).map(Angle)
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    #[inline]
    pub fn sin(self) -> f64 {
        self.radians().sin()
    }

    /// True for angles strictly between 0° and 90°.
    #[inline]
    pub fn is_strictly_acute(self) -> bool {
        self.0 > 0.0 && self.0 < 90.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Convert millimetres → px with a given zoom factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scaler {
    pub px_per_mm: f64,
}

impl Scaler {
    /// Create a Scaler with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(px_per_mm: f64) -> Result<Self, NumericError> {
        let px_per_mm = check_finite(px_per_mm)?;
        if px_per_mm == 0.0 {
            Err(NumericError::Zero)
        } else if px_per_mm < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Scaler { px_per_mm })
        }
    }

    /// Convert a length in millimetres to raw f64 pixels (convenience for SVG output).
    #[inline]
    pub fn px(&self, l: Length) -> f64 {
        l.0 * self.px_per_mm
    }
}

/// Generic 2D point
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    pub fn new(x: T, y: T) -> Self { Point { x, y } }
}

impl Point<Length> {
    pub const ORIGIN: Point<Length> = Point { x: Length::ZERO, y: Length::ZERO };

    /// Calculate the midpoint between two points
    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }

    /// Point a fraction `t` of the way from `self` to `other`
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Self) -> Length {
        let d = other - self;
        Length(d.dx.0.hypot(d.dy.0))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox<T> {
    pub min: Point<T>,
    pub max: Point<T>,
}

impl BBox<Length> {
    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        BBox {
            min: Point { x: Length(f64::MAX), y: Length(f64::MAX) },
            max: Point { x: Length(f64::MIN), y: Length(f64::MIN) },
        }
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x.0 > self.max.x.0 || self.min.y.0 > self.max.y.0
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: Point<Length>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Expand to include a circle
    pub fn expand_circle(&mut self, center: Point<Length>, radius: Length) {
        let r = radius.abs();
        self.expand_point(center + Offset::new(-r, -r));
        self.expand_point(center + Offset::new(r, r));
    }

    /// Expand to include another box
    pub fn expand_box(&mut self, other: &BBox<Length>) {
        if !other.is_empty() {
            self.expand_point(other.min);
            self.expand_point(other.max);
        }
    }

    pub fn width(&self) -> Length { self.max.x - self.min.x }

    pub fn height(&self) -> Length { self.max.y - self.min.y }

    pub fn center(&self) -> Point<Length> {
        self.min.midpoint(self.max)
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl Default for BBox<Length> {
    fn default() -> Self {
        Self::new()
    }
}

/// A displacement/offset vector (not an absolute position)
/// Use this for translations; Point + Offset = Point
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Offset<T> {
    pub dx: T,
    pub dy: T,
}

impl<T> Offset<T> {
    pub fn new(dx: T, dy: T) -> Self {
        Offset { dx, dy }
    }
}

/// Add an offset to a point to get a new point
impl Add<Offset<Length>> for Point<Length> {
    type Output = Point<Length>;
    fn add(self, rhs: Offset<Length>) -> Point<Length> {
        Point {
            x: self.x + rhs.dx,
            y: self.y + rhs.dy,
        }
    }
}

/// Subtract an offset from a point to get a new point
impl Sub<Offset<Length>> for Point<Length> {
    type Output = Point<Length>;
    fn sub(self, rhs: Offset<Length>) -> Point<Length> {
        Point {
            x: self.x - rhs.dx,
            y: self.y - rhs.dy,
        }
    }
}

/// Subtract two points to get an offset
impl Sub<Point<Length>> for Point<Length> {
    type Output = Offset<Length>;
    fn sub(self, rhs: Point<Length>) -> Offset<Length> {
        Offset {
            dx: self.x - rhs.x,
            dy: self.y - rhs.y,
        }
    }
}

/// Convenient aliases
pub type PtMm = Point<Length>;
pub type OffsetMm = Offset<Length>;
pub type BoxMm = BBox<Length>;

/// Shorthand for a point from raw millimetre values
pub fn pmm(x: f64, y: f64) -> PtMm {
    Point::new(Length(x), Length(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Length tests ====================

    #[test]
    fn length_try_new_valid() {
        assert!(Length::try_new(1.0).is_ok());
        assert!(Length::try_new(0.0).is_ok());
        assert!(Length::try_new(-1.0).is_ok());
    }

    #[test]
    fn length_try_new_rejects_nan_and_infinity() {
        assert_eq!(Length::try_new(f64::NAN), Err(NumericError::NaN));
        assert_eq!(Length::try_new(f64::INFINITY), Err(NumericError::Infinite));
        assert_eq!(Length::try_new(f64::NEG_INFINITY), Err(NumericError::Infinite));
    }

    #[test]
    fn length_try_positive() {
        assert_eq!(Length::try_positive(410.0), Ok(Length(410.0)));
        assert_eq!(Length::try_positive(0.0), Err(NumericError::Zero));
        assert_eq!(Length::try_positive(-1.0), Err(NumericError::Negative));
        assert_eq!(Length::try_positive(f64::NAN), Err(NumericError::NaN));
    }

    #[test]
    fn length_arithmetic() {
        let a = Length(3.0);
        let b = Length(2.0);

        assert_eq!(a + b, Length(5.0));
        assert_eq!(a - b, Length(1.0));
        assert_eq!(a * 2.0, Length(6.0));
        assert_eq!(a / 2.0, Length(1.5));
        assert_eq!(-a, Length(-3.0));
    }

    #[test]
    fn length_display_has_unit() {
        assert_eq!(Length(543.0).to_string(), "543mm");
    }

    // ==================== Angle tests ====================

    #[test]
    fn angle_trig_uses_degrees() {
        assert!((Angle(30.0).sin() - 0.5).abs() < 1e-12);
        assert!((Angle(180.0).radians() - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn angle_strictly_acute_excludes_bounds() {
        assert!(Angle(73.5).is_strictly_acute());
        assert!(!Angle(0.0).is_strictly_acute());
        assert!(!Angle(90.0).is_strictly_acute());
        assert!(!Angle(-5.0).is_strictly_acute());
    }

    // ==================== Scaler tests ====================

    #[test]
    fn scaler_try_new_validates() {
        assert!(Scaler::try_new(0.5).is_ok());
        assert_eq!(Scaler::try_new(0.0), Err(NumericError::Zero));
        assert_eq!(Scaler::try_new(-1.0), Err(NumericError::Negative));
        assert_eq!(Scaler::try_new(f64::NAN), Err(NumericError::NaN));
        assert_eq!(Scaler::try_new(f64::INFINITY), Err(NumericError::Infinite));
    }

    #[test]
    fn scaler_converts_mm_to_px() {
        let scaler = Scaler::try_new(0.25).unwrap();
        assert_eq!(scaler.px(Length(1000.0)), 250.0);
    }

    // ==================== Point/Offset tests ====================

    #[test]
    fn point_offset_arithmetic() {
        let p = pmm(1.0, 2.0);
        let o = Offset::new(Length(3.0), Length(4.0));
        assert_eq!(p + o, pmm(4.0, 6.0));
        assert_eq!(p - o, pmm(-2.0, -2.0));
        assert_eq!(pmm(5.0, 7.0) - p, Offset::new(Length(4.0), Length(5.0)));
    }

    #[test]
    fn point_lerp_and_distance() {
        let a = pmm(0.0, 0.0);
        let b = pmm(30.0, 40.0);
        assert_eq!(a.distance(b), Length(50.0));
        assert_eq!(a.midpoint(b), pmm(15.0, 20.0));
        assert_eq!(a.lerp(b, 0.8), pmm(24.0, 32.0));
    }

    // ==================== BBox tests ====================

    #[test]
    fn bbox_new_is_empty() {
        assert!(BoxMm::new().is_empty());
    }

    #[test]
    fn bbox_expand_circle() {
        let mut bb = BoxMm::new();
        bb.expand_circle(pmm(0.0, 0.0), Length(340.0));
        bb.expand_point(pmm(500.0, 10.0));

        assert_eq!(bb.min, pmm(-340.0, -340.0));
        assert_eq!(bb.max, pmm(500.0, 340.0));
        assert_eq!(bb.width(), Length(840.0));
        assert_eq!(bb.height(), Length(680.0));
        assert_eq!(bb.center(), pmm(80.0, 0.0));
    }

    #[test]
    fn bbox_expand_box_ignores_empty() {
        let mut bb = BoxMm::new();
        bb.expand_box(&BoxMm::new());
        assert!(bb.is_empty());

        let mut other = BoxMm::new();
        other.expand_point(pmm(1.0, 2.0));
        bb.expand_box(&other);
        assert_eq!(bb.min, pmm(1.0, 2.0));
    }
}
