//! Immutable plane geometry in screen coordinates (y grows downward).

use crate::error::GeometryError;
use serde_derive::Serialize;
use std::ops::{Add, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

  /// Length of the vector from the origin to this point.
  pub fn length(self) -> f64 { self.x.hypot(self.y) }

  pub fn scale(self, factor: f64) -> Self { Self::new(self.x * factor, self.y * factor) }

  /// Rotates about the origin. Positive angles turn clockwise on screen.
  pub fn rotate(self, deg: f64) -> Self {
    let rad = -deg.to_radians();
    let (sin, cos) = rad.sin_cos();
    Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
  }

  pub fn with_y(self, f: impl FnOnce(f64) -> f64) -> Self { Self::new(self.x, f(self.y)) }
}

impl Add for Point {
  type Output = Point;
  fn add(self, rhs: Self) -> Self { Self::new(self.x + rhs.x, self.y + rhs.y) }
}

impl Sub for Point {
  type Output = Point;
  fn sub(self, rhs: Self) -> Self { Self::new(self.x - rhs.x, self.y - rhs.y) }
}

/// A directed segment. Rotation and scaling keep `start` fixed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector {
  pub start: Point,
  pub end: Point,
}

/// Unit vector along the text direction.
pub const EX: Vector = Vector::new(Point::new(0., 0.), Point::new(1., 0.));
/// Unit vector pointing up the screen.
pub const EY: Vector = Vector::new(Point::new(0., 0.), Point::new(0., -1.));

impl Vector {
  pub const fn new(start: Point, end: Point) -> Self { Self { start, end } }

  fn delta(&self) -> Point { self.end - self.start }

  pub fn length(&self) -> f64 { self.delta().length() }

  pub fn rotate(&self, deg: f64) -> Self {
    Self::new(self.start, self.start + self.delta().rotate(deg))
  }

  /// Unit-length vector with the same start and direction. A degenerate
  /// vector has no direction and is returned as is.
  pub fn normalize(&self) -> Self {
    let len = self.length();
    if len == 0. {
      return *self
    }
    Self::new(self.start, self.start + self.delta().scale(1. / len))
  }

  /// Moves both endpoints by the offset of `vec` (default: `self`),
  /// multiplied by `dist` if given.
  pub fn translate(&self, vec: Option<&Vector>, dist: Option<f64>) -> Self {
    let mut delta = vec.unwrap_or(self).delta();
    if let Some(dist) = dist {
      delta = delta.scale(dist)
    }
    Self::new(self.start + delta, self.end + delta)
  }

  /// Moves `dist` times this vector's own offset along itself.
  pub fn shift(&self, dist: f64) -> Self { self.translate(None, Some(dist)) }

  pub fn translate_to(&self, point: Point) -> Self {
    self.translate(Some(&Vector::new(self.start, point)), None)
  }

  pub fn scale(&self, factor: f64) -> Self {
    Self::new(self.start, self.start + self.delta().scale(factor))
  }

  pub fn add(&self, other: &Vector) -> Self { Self::new(self.start, self.end + other.delta()) }
}

/// An axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Boundary {
  pub min_x: f64,
  pub max_x: f64,
  pub min_y: f64,
  pub max_y: f64,
}

impl Boundary {
  pub const fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
    Self { min_x, max_x, min_y, max_y }
  }

  fn spanning(a: Point, b: Point) -> Self {
    Self::new(a.x.min(b.x), a.x.max(b.x), a.y.min(b.y), a.y.max(b.y))
  }

  pub fn from_points(points: &[Point]) -> Result<Self, GeometryError> {
    match points {
      [a, b, rest @ ..] => Ok(Self::spanning(*a, *b).add_points(rest)),
      _ => Err(GeometryError::InsufficientPoints { found: points.len() }),
    }
  }

  pub fn add_absolute_margin(&self, margin: f64) -> Self {
    Self::new(self.min_x - margin, self.max_x + margin, self.min_y - margin, self.max_y + margin)
  }

  /// Grows the box vertically by `dy` on both sides.
  pub fn grow_y(&self, dy: f64) -> Self {
    Self::new(self.min_x, self.max_x, self.min_y - dy, self.max_y + dy)
  }

  pub fn add_points(&self, points: &[Point]) -> Self {
    points.iter().fold(*self, |b, p| {
      Self::new(b.min_x.min(p.x), b.max_x.max(p.x), b.min_y.min(p.y), b.max_y.max(p.y))
    })
  }

  pub fn width(&self) -> f64 { self.max_x - self.min_x }
  pub fn height(&self) -> f64 { self.max_y - self.min_y }
  pub fn center_x(&self) -> f64 { (self.min_x + self.max_x) / 2. }
  pub fn center_y(&self) -> f64 { (self.min_y + self.max_y) / 2. }

  pub fn merge(&self, other: &Self) -> Self {
    Self::new(
      self.min_x.min(other.min_x),
      self.max_x.max(other.max_x),
      self.min_y.min(other.min_y),
      self.max_y.max(other.max_y),
    )
  }
}

/// Merges any number of boundaries; absent ones are skipped.
pub fn merge_all(bounds: impl IntoIterator<Item = Option<Boundary>>) -> Option<Boundary> {
  bounds.into_iter().fold(None, |acc, b| match (acc, b) {
    (Some(a), Some(b)) => Some(a.merge(&b)),
    (a, b) => a.or(b),
  })
}
