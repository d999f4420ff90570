//! Lost Core - collision and spatial indexing for a 2D arcade shooter
//!
//! Core modules:
//! - `sim`: Per-tick simulation (shapes, spatial indices, collision physics, staged updates)
//! - `settings`: Data-driven simulation tuning
//! - `error`: Errors for the fallible (configuration) surface

pub mod error;
pub mod settings;
pub mod sim;

pub use error::LostError;
pub use settings::{IndexKind, SimSettings};

use glam::DVec2;
use rand::Rng;

/// Simulation configuration constants
pub mod consts {
    /// Hard cap on body speed (units per tick)
    pub const PHYSICS_MAX_SPEED: f64 = 20.0;

    /// Default level radius; bodies beyond it get pushed back
    pub const LEVEL_RADIUS: f64 = 1000.0;
    /// Boundary push is `distance / BOUNDARY_PUSH_DIVISOR`
    pub const BOUNDARY_PUSH_DIVISOR: f64 = 100.0;

    /// Body defaults
    pub const DEFAULT_RADIUS: f64 = 10.0;
    pub const DEFAULT_MASS: f64 = 100.0;
    pub const DEFAULT_MOMENT: f64 = 20.0;
    pub const DEFAULT_HITS: i32 = 100;
    pub const DEFAULT_EFFECT_RANGE: f64 = 20.0;

    /// Fraction of half the penetration each body is pushed out per contact
    pub const OVERLAP_SOFTENING: f64 = 0.8;

    /// Frames between diagnostic log lines
    pub const STATS_INTERVAL: u64 = 99;
    /// Undrained events a world keeps before discarding the oldest
    pub const EVENT_CAPACITY: usize = 65_536;
}

/// Unit vector pointing along `angle` (radians)
#[inline]
pub fn vector_from_direction(angle: f64) -> DVec2 {
    DVec2::new(angle.cos(), angle.sin())
}

/// Angle (radians) of a vector, in (-π, π]
#[inline]
pub fn direction_from_vector(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}

/// Rotate `v` counter-clockwise by `theta` radians
#[inline]
pub fn rotate_vector(v: DVec2, theta: f64) -> DVec2 {
    let (sin, cos) = theta.sin_cos();
    DVec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Linear interpolation between two points
#[inline]
pub fn lerp_vector(from: DVec2, to: DVec2, amount: f64) -> DVec2 {
    from + (to - from) * amount
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(from: f64, to: f64, amount: f64) -> f64 {
    from + (to - from) * amount
}

/// Random point within a disk of radius `r` around the origin.
///
/// Distance is sampled uniformly (not area-uniform), so points cluster toward the
/// center the way level spawns expect.
pub fn point_within<R: Rng + ?Sized>(rng: &mut R, r: f64) -> DVec2 {
    let angle = rng.random::<f64>() * std::f64::consts::TAU;
    let distance = rng.random::<f64>() * r;
    vector_from_direction(angle) * distance
}

/// Random point in the annulus between `min` and `max` around the origin
pub fn point_between<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> DVec2 {
    let angle = rng.random::<f64>() * std::f64::consts::TAU;
    let distance = min + rng.random::<f64>() * (max - min);
    vector_from_direction(angle) * distance
}
