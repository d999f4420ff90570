//! Collision shapes and narrow-phase intersection
//!
//! Every body carries exactly one [`Shape`]. The set of shapes is closed, so pairwise
//! tests are an exhaustive `match` on both operands: adding a variant is a compile
//! error until every pairing is decided.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::vector_from_direction;

/// A positioned 2D collision shape
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Shape {
    /// No geometry; never intersects anything (gates, markers, particles)
    #[default]
    None,
    /// Solid circle
    Circle { center: DVec2, radius: f64 },
    /// Directed segment from `origin` to `origin + ray`
    Ray { origin: DVec2, ray: DVec2 },
}

impl Shape {
    pub fn circle(center: DVec2, radius: f64) -> Self {
        Shape::Circle { center, radius }
    }

    pub fn ray(origin: DVec2, ray: DVec2) -> Self {
        Shape::Ray { origin, ray }
    }

    /// Segment of `length` starting at `origin`, pointing along `facing`
    pub fn ray_from_facing(origin: DVec2, facing: f64, length: f64) -> Self {
        Shape::Ray {
            origin,
            ray: vector_from_direction(facing) * length,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Shape::None)
    }

    /// Anchor point (circle center / ray origin), if the shape has geometry
    pub fn location(&self) -> Option<DVec2> {
        match *self {
            Shape::None => None,
            Shape::Circle { center, .. } => Some(center),
            Shape::Ray { origin, .. } => Some(origin),
        }
    }

    /// Move the shape so its anchor sits at `pos`
    pub fn set_location(&mut self, pos: DVec2) {
        match self {
            Shape::None => {}
            Shape::Circle { center, .. } => *center = pos,
            Shape::Ray { origin, .. } => *origin = pos,
        }
    }

    /// Circle radius; `None` for other shapes
    pub fn radius(&self) -> Option<f64> {
        match *self {
            Shape::Circle { radius, .. } => Some(radius),
            _ => None,
        }
    }

    /// Narrow-phase test against another shape
    pub fn intersects(&self, other: &Shape) -> bool {
        match (*self, *other) {
            (Shape::None, _) | (_, Shape::None) => false,
            (
                Shape::Circle {
                    center: c1,
                    radius: r1,
                },
                Shape::Circle {
                    center: c2,
                    radius: r2,
                },
            ) => circle_circle(c1, r1, c2, r2),
            (Shape::Ray { origin, ray }, Shape::Circle { center, radius })
            | (Shape::Circle { center, radius }, Shape::Ray { origin, ray }) => {
                ray_circle(origin, ray, center, radius)
            }
            // Beams are instantaneous and pass through each other.
            (Shape::Ray { .. }, Shape::Ray { .. }) => false,
        }
    }
}

/// Free-function form of [`Shape::intersects`]
#[inline]
pub fn intersects(a: &Shape, b: &Shape) -> bool {
    a.intersects(b)
}

/// Circles touch when the squared center distance is at most the squared radius sum
#[inline]
pub fn circle_circle(c1: DVec2, r1: f64, c2: DVec2, r2: f64) -> bool {
    let reach = r1 + r2;
    c1.distance_squared(c2) <= reach * reach
}

/// Does the finite segment `origin..origin + ray` cross the circle?
///
/// Substitutes `origin + t * ray` into the circle equation and checks whether the
/// quadratic has a root with `t` in `[0, 1]`. A segment lying entirely inside the
/// circle has no root in range and does not count.
pub fn ray_circle(origin: DVec2, ray: DVec2, center: DVec2, radius: f64) -> bool {
    let f = origin - center;
    let a = ray.dot(ray);
    let c = f.dot(f) - radius * radius;

    if a == 0.0 {
        // Zero-length segment degenerates to a point-in-circle test.
        return c <= 0.0;
    }

    let b = 2.0 * f.dot(ray);
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return false;
    }

    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);
    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2)
}
