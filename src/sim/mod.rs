//! Deterministic simulation module
//!
//! Everything that moves lives here. Given the same settings and the same sequence of
//! staged operations, a world replays identically:
//! - Seeded RNG only
//! - Stable iteration order (by body id)
//! - No rendering or platform dependencies

pub mod body;
pub mod boundary;
pub mod index;
pub mod resolve;
pub mod shape;
pub mod world;

pub use body::{Body, BodyId, BodyKind, DeathEffect, ForceField, HitEffect, IdGenerator};
pub use boundary::{Boundary, CircularBoundary, Unbounded};
pub use index::{BruteForce, CollisionIndex, KdTree, MedianTree, SpatialIndex};
pub use resolve::{Resolution, elastic_1d, resolve};
pub use shape::Shape;
pub use world::{FrameStats, SimEvent, TickPhase, World};
