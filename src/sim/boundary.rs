//! Level containment
//!
//! The level owns the rule for keeping bodies in play; the world calls it once per
//! body per tick after integration.

use super::body::Body;
use crate::consts::BOUNDARY_PUSH_DIVISOR;

/// Containment test supplied by the surrounding level
pub trait Boundary {
    fn apply(&self, body: &mut Body);
}

/// No containment at all
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Boundary for Unbounded {
    fn apply(&self, _body: &mut Body) {}
}

/// Circular level centered on the origin.
///
/// A body outside `radius` is pushed back toward the center, harder the further out
/// it strays.
#[derive(Debug, Clone, Copy)]
pub struct CircularBoundary {
    pub radius: f64,
}

impl CircularBoundary {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Boundary for CircularBoundary {
    fn apply(&self, body: &mut Body) {
        let distance = body.position.length();
        if distance > self.radius {
            let outward = body.position / distance;
            body.push(-outward * (distance / BOUNDARY_PUSH_DIVISOR));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyId;
    use glam::DVec2;

    #[test]
    fn test_inside_untouched() {
        let boundary = CircularBoundary::new(100.0);
        let mut body = Body::new(BodyId(1), DVec2::new(50.0, 0.0), 0.0);
        boundary.apply(&mut body);
        assert_eq!(body.velocity, DVec2::ZERO);
    }

    #[test]
    fn test_outside_pushed_back() {
        let boundary = CircularBoundary::new(100.0);
        let mut body = Body::new(BodyId(1), DVec2::new(0.0, 200.0), 0.0).with_mass(1.0);
        boundary.apply(&mut body);
        // 200 / 100 toward the origin, divided by unit mass
        assert!((body.velocity.y + 2.0).abs() < 1e-12);
        assert_eq!(body.velocity.x, 0.0);

        let mut far = Body::new(BodyId(2), DVec2::new(1e6, 0.0), 0.0);
        Unbounded.apply(&mut far);
        assert_eq!(far.velocity, DVec2::ZERO);
    }
}
