//! Simulated bodies
//!
//! A single [`Body`] record covers every kind of entity. What differs between a rock,
//! a shot and a gate is data (shape, mass, flags, hit/death effects), not a subtype.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::shape::Shape;
use crate::consts::*;

/// Stable identity of a body. Never reused; ordering drives canonical pair checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic identity source, owned by a world for its whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identity
    pub fn next_id(&mut self) -> BodyId {
        let id = BodyId(self.next);
        self.next += 1;
        id
    }
}

/// Coarse category tag, for game logic reading events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    #[default]
    Generic,
    Ship,
    Shot,
    Rock,
    Hazard,
    Gate,
    Resource,
    Particle,
}

/// What a body does to itself and the other party when their shapes touch
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HitEffect {
    /// Damage dealt to the other body
    pub damage: i32,
    /// Drop own hit points to zero on contact (shots, rockets)
    pub dies_on_hit: bool,
}

/// What happens when the body is removed at a flush
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DeathEffect {
    #[default]
    None,
    /// Keep spawning fragments while a roll stays under `chance`.
    /// Fragments inherit a random fraction of the body's velocity.
    Scatter { chance: f64, radius: f64, mass: f64 },
}

/// Proximity push applied to neighbors within `radius`.
///
/// Positive strength repels, negative attracts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceField {
    pub radius: f64,
    pub strength: f64,
}

impl ForceField {
    /// Force this field exerts on something at `target` when centered on `origin`
    pub fn force_on(&self, origin: DVec2, target: DVec2) -> DVec2 {
        let separation = target - origin;
        let distance_sq = separation.length_squared();
        let radius_sq = self.radius * self.radius;
        if distance_sq >= radius_sq {
            return DVec2::ZERO;
        }
        separation.normalize_or_zero() * ((radius_sq - distance_sq) / 100.0) * self.strength
    }
}

/// One simulated entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    id: BodyId,
    pub kind: BodyKind,

    pub position: DVec2,
    /// Position at the start of the last tick (render interpolation only)
    pub prev_position: DVec2,
    pub facing: f64,
    pub prev_facing: f64,
    pub velocity: DVec2,
    pub angular_velocity: f64,

    mass: f64,
    moment: f64,
    /// Per-tick velocity multiplier
    pub drag: f64,
    /// Per-tick angular velocity multiplier
    pub angular_drag: f64,

    pub hits: i32,
    pub max_hits: i32,
    /// Invulnerable bodies ignore damage
    pub vulnerable: bool,

    pub shape: Shape,
    /// How far away this body needs to look for interactions
    pub effect_range: f64,
    /// Shots can hit this body
    pub shootable: bool,
    /// Collisions bounce this body
    pub impactable: bool,
    /// Only interacts with shootable bodies
    pub shootable_targets_only: bool,
    /// Velocity is zeroed after every tick
    pub anchored: bool,

    pub on_hit: HitEffect,
    pub on_death: DeathEffect,
    pub field: Option<ForceField>,
    /// Ticks left before the body expires
    pub lifetime: Option<u32>,
}

impl Body {
    /// Generic circular body with stock physical properties
    pub fn new(id: BodyId, position: DVec2, facing: f64) -> Self {
        Self {
            id,
            kind: BodyKind::Generic,
            position,
            prev_position: position,
            facing,
            prev_facing: facing,
            velocity: DVec2::ZERO,
            angular_velocity: 0.0,
            mass: DEFAULT_MASS,
            moment: DEFAULT_MOMENT,
            drag: 1.0,
            angular_drag: 1.0,
            hits: DEFAULT_HITS,
            max_hits: DEFAULT_HITS,
            vulnerable: true,
            shape: Shape::circle(position, DEFAULT_RADIUS),
            effect_range: DEFAULT_EFFECT_RANGE,
            shootable: true,
            impactable: true,
            shootable_targets_only: false,
            anchored: false,
            on_hit: HitEffect::default(),
            on_death: DeathEffect::None,
            field: None,
            lifetime: None,
        }
    }

    /// Small destructible rock that sometimes leaves resources behind
    pub fn rock(id: BodyId, position: DVec2) -> Self {
        Self::new(id, position, 0.0)
            .with_kind(BodyKind::Rock)
            .with_mass(10.0)
            .with_hits(1)
            .with_death_effect(DeathEffect::Scatter {
                chance: 0.3,
                radius: 5.0,
                mass: 10.0,
            })
    }

    /// Projectile that dies on contact, damaging only shootable targets
    pub fn shot(
        id: BodyId,
        position: DVec2,
        facing: f64,
        speed: f64,
        damage: i32,
        lifetime: u32,
    ) -> Self {
        let mut shot = Self::new(id, position, facing)
            .with_kind(BodyKind::Shot)
            .with_shape(Shape::circle(position, 3.0))
            .with_mass(5.0)
            .with_hits(1)
            .with_lifetime(lifetime)
            .with_hit_effect(HitEffect {
                damage,
                dies_on_hit: true,
            });
        shot.velocity = crate::vector_from_direction(facing) * speed;
        shot.shootable = false;
        shot.impactable = false;
        shot.shootable_targets_only = true;
        shot
    }

    /// Instantaneous beam: a ray of `length` along `facing`.
    ///
    /// Hits everything it crosses on its first tick of contact and then dies; a beam
    /// that touches nothing fades after a couple of ticks.
    pub fn beam(id: BodyId, origin: DVec2, facing: f64, length: f64, damage: i32) -> Self {
        Self::shot(id, origin, facing, 0.0, damage, 2)
            .with_shape(Shape::ray_from_facing(origin, facing, length))
            .with_effect_range(length)
    }

    /// Immobile, indestructible marker that nothing collides with
    pub fn gate(id: BodyId, position: DVec2) -> Self {
        let mut gate = Self::new(id, position, 0.0)
            .with_kind(BodyKind::Gate)
            .with_shape(Shape::None)
            .with_mass(1_000_000.0);
        gate.angular_velocity = -0.01;
        gate.vulnerable = false;
        gate.anchored = true;
        gate
    }

    /// Heavy spinning hazard that pushes (or pulls) anything close and hurts on contact
    pub fn fan(id: BodyId, position: DVec2, strength: f64) -> Self {
        let mut fan = Self::new(id, position, 0.0)
            .with_kind(BodyKind::Hazard)
            .with_mass(1000.0)
            .with_hits(150)
            .with_field(ForceField {
                radius: 100.0,
                strength,
            })
            .with_hit_effect(HitEffect {
                damage: 2,
                dies_on_hit: false,
            });
        fan.angular_velocity = 0.5;
        fan.effect_range = 100.0;
        fan
    }

    /// Cosmetic body: no mass, no shape, fades after `life` ticks
    pub fn particle(id: BodyId, position: DVec2, velocity: DVec2, life: u32) -> Self {
        let mut particle = Self::new(id, position, 0.0)
            .with_kind(BodyKind::Particle)
            .with_shape(Shape::None)
            .with_mass(0.0)
            .with_moment(0.0)
            .with_lifetime(life);
        particle.velocity = velocity;
        particle.shootable = false;
        particle.impactable = false;
        particle.effect_range = 0.0;
        particle
    }

    // === Builders ===

    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self.shape.set_location(self.position);
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.set_mass(mass);
        self
    }

    pub fn with_moment(mut self, moment: f64) -> Self {
        self.set_moment(moment);
        self
    }

    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_hits(mut self, hits: i32) -> Self {
        self.hits = hits;
        self.max_hits = hits;
        self
    }

    pub fn with_effect_range(mut self, range: f64) -> Self {
        self.effect_range = range;
        self
    }

    pub fn with_hit_effect(mut self, effect: HitEffect) -> Self {
        self.on_hit = effect;
        self
    }

    pub fn with_death_effect(mut self, effect: DeathEffect) -> Self {
        self.on_death = effect;
        self
    }

    pub fn with_field(mut self, field: ForceField) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_lifetime(mut self, ticks: u32) -> Self {
        self.lifetime = Some(ticks);
        self
    }

    // === Accessors ===

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn moment(&self) -> f64 {
        self.moment
    }

    /// Panics on a negative or non-finite mass
    pub fn set_mass(&mut self, mass: f64) {
        assert!(
            mass.is_finite() && mass >= 0.0,
            "body {} given invalid mass {mass}",
            self.id
        );
        self.mass = mass;
    }

    /// Panics on a negative or non-finite moment of inertia
    pub fn set_moment(&mut self, moment: f64) {
        assert!(
            moment.is_finite() && moment >= 0.0,
            "body {} given invalid moment {moment}",
            self.id
        );
        self.moment = moment;
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn is_dead(&self) -> bool {
        self.hits <= 0
    }

    /// Move the body and its shape together
    pub fn set_position(&mut self, position: DVec2) {
        self.position = position;
        self.shape.set_location(position);
    }

    /// Bring the shape back in line with the body position
    pub fn sync_shape(&mut self) {
        self.shape.set_location(self.position);
    }

    /// Would this body take part in an interaction with `other`?
    pub fn accepts(&self, other: &Body) -> bool {
        !self.shootable_targets_only || other.shootable
    }

    /// Nothing to collide with and nothing to reach: left out of the broad phase
    pub fn is_inert(&self) -> bool {
        self.shape.is_none() && self.field.is_none() && self.effect_range <= 0.0
    }

    // === Hooks ===

    /// Apply an impulse; massless bodies ignore it
    pub fn push(&mut self, force: DVec2) {
        if self.mass > 0.0 {
            self.velocity += force / self.mass;
        }
    }

    /// Apply an angular impulse; bodies without a moment ignore it
    pub fn rotate(&mut self, torque: f64) {
        if self.moment > 0.0 {
            self.angular_velocity += torque / self.moment;
        }
    }

    /// Scale both velocities by the body's drag multipliers
    pub fn apply_drag(&mut self) {
        self.velocity *= self.drag;
        self.angular_velocity *= self.angular_drag;
    }

    /// Cap linear speed at `max`
    pub fn clamp_velocity(&mut self, max: f64) {
        self.velocity = self.velocity.clamp_length_max(max);
    }

    pub fn damage(&mut self, amount: i32) {
        if self.vulnerable {
            self.hits = self.hits.saturating_sub(amount);
        }
    }

    pub fn heal(&mut self, amount: i32) {
        self.hits = self.hits.saturating_add(amount).min(self.max_hits);
    }

    /// Mark for removal at the end of this tick
    pub fn kill(&mut self) {
        self.hits = 0;
    }
}
