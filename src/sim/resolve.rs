//! Collision response for bodies already known to overlap
//!
//! Velocities are split into a component along the line between the two centers (the
//! collision normal) and a perpendicular remainder. The normal components exchange
//! momentum by the 1-D elastic formula; the remainders are untouched. Overlapping
//! circles are then pushed apart so they do not stay stuck together.

use glam::DVec2;

use super::body::Body;

/// Post-collision speeds of a 1-D elastic collision
#[inline]
pub fn elastic_1d(u1: f64, m1: f64, u2: f64, m2: f64) -> (f64, f64) {
    let total = m1 + m2;
    let v1 = (u1 * (m1 - m2) + 2.0 * m2 * u2) / total;
    let v2 = (u2 * (m2 - m1) + 2.0 * m1 * u1) / total;
    (v1, v2)
}

/// What [`resolve`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Resolution {
    /// Velocities were exchanged along the normal
    pub impulse: bool,
    /// Distance each body was moved to undo overlap
    pub separation: f64,
}

/// Bounce `a` and `b` off each other and undo circle overlap.
///
/// `softening` scales the half-penetration each circle is pushed out by; values below
/// one leave a little overlap for the next tick and avoid jitter in piles.
/// Coincident centers, or a massless party, skip the impulse instead of producing NaN.
pub fn resolve(a: &mut Body, b: &mut Body, softening: f64) -> Resolution {
    let diff = a.position - b.position;
    let Some(normal) = diff.try_normalize() else {
        return Resolution::default();
    };

    let mut resolution = Resolution::default();

    if a.mass() > 0.0 && b.mass() > 0.0 {
        let ua = a.velocity.dot(normal);
        let ub = b.velocity.dot(normal);
        let (va, vb) = elastic_1d(ua, a.mass(), ub, b.mass());
        a.velocity += normal * (va - ua);
        b.velocity += normal * (vb - ub);
        resolution.impulse = true;
    }

    if let (Some(ra), Some(rb)) = (a.shape.radius(), b.shape.radius()) {
        let penetration = ra + rb - diff.length();
        if penetration > 0.0 {
            let push = 0.5 * penetration * softening;
            let adjust: DVec2 = normal * push;
            a.set_position(a.position + adjust);
            b.set_position(b.position - adjust);
            resolution.separation = push;
        }
    }

    resolution
}
