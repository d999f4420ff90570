//! The world: staged body lifecycle and the per-tick collision pipeline
//!
//! Every tick runs to completion in four phases:
//! 1. `FlushPending`: staged deaths are removed (death effects fire), staged births join
//! 2. `RebuildIndex`: the spatial index is rebuilt over live positions
//! 3. `PerBodyUpdate`: broad phase, narrow phase, response, integration per body
//! 4. `Done`: frame counter and diagnostics
//!
//! Each pair is tested at most once per tick. The lower id tests it when its own
//! query covers the other body; otherwise the higher id does, provided its longer
//! reach found the pair. Queries and that coverage check both use positions as they
//! were at the rebuild.
//!
//! Game logic never splices the live list directly. Births and deaths discovered
//! mid-tick go into the staging queue and take effect at the next flush, so iteration
//! and the freshly built index always agree on who is alive.

use std::collections::{BTreeSet, VecDeque};

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::{Body, BodyId, BodyKind, DeathEffect, IdGenerator};
use super::boundary::{Boundary, CircularBoundary};
use super::index::{CollisionIndex, SpatialIndex, valid_radius};
use super::resolve::resolve;
use super::shape::Shape;
use crate::settings::{IndexKind, SimSettings};

/// Upper bound on fragments one death can produce
pub const MAX_FRAGMENTS: usize = 16;

/// Which part of the tick the world is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    FlushPending,
    RebuildIndex,
    PerBodyUpdate,
    Done,
}

/// Something game logic may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Body joined the live set
    Spawned { id: BodyId, kind: BodyKind },
    /// Body left the live set after its death effect ran
    Died {
        id: BodyId,
        kind: BodyKind,
        position: DVec2,
        velocity: DVec2,
    },
    /// Shapes of `a` and `b` touched this tick (`a < b`)
    Collided { a: BodyId, b: BodyId },
}

/// Counters for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub live: usize,
    pub spawned: usize,
    pub died: usize,
    /// Broad-phase results, self matches included
    pub candidates: usize,
    /// Pairs that passed the narrow phase
    pub contacts: usize,
    /// Contacts that exchanged momentum
    pub impulses: usize,
}

/// Pending change to the live set
#[derive(Debug)]
enum Staged {
    Add(Body),
    Kill(BodyId),
}

/// A body as the index saw it at the latest rebuild
#[derive(Debug, Clone, Copy)]
struct Reach {
    position: DVec2,
    /// Query radius; `None` for inert bodies, which are neither indexed nor queried
    range: Option<f64>,
}

impl Reach {
    /// Would this body's query have returned `other`?
    fn covers(&self, other: &Reach) -> bool {
        match self.range {
            Some(range) if valid_radius(range) => {
                other.position.distance_squared(self.position) <= range * range
            }
            _ => false,
        }
    }
}

/// Undrained events, oldest dropped first once `capacity` is reached
#[derive(Debug)]
struct EventLog {
    events: VecDeque<SimEvent>,
    capacity: usize,
    dropped: u64,
}

impl EventLog {
    fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity,
            dropped: 0,
        }
    }

    fn push(&mut self, event: SimEvent) {
        if self.events.len() >= self.capacity {
            if self.events.pop_front().is_none() {
                return;
            }
            if self.dropped == 0 {
                log::warn!(
                    "Event buffer full ({} events); dropping oldest until drained",
                    self.capacity
                );
            }
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    fn drain(&mut self) -> Vec<SimEvent> {
        self.dropped = 0;
        self.events.drain(..).collect()
    }
}

/// Live bodies, their staging queue and the index over them
pub struct World {
    settings: SimSettings,
    /// Sorted by id
    bodies: Vec<Body>,
    staged: Vec<Staged>,
    index: CollisionIndex,
    /// Per live slot, as of the latest rebuild
    snapshot: Vec<Reach>,
    ids: IdGenerator,
    rng: Pcg32,
    boundary: Box<dyn Boundary>,
    events: EventLog,
    frame: u64,
    phase: TickPhase,
    last_stats: FrameStats,
}

impl World {
    pub fn new(settings: SimSettings) -> Self {
        let boundary = Box::new(CircularBoundary::new(settings.level_radius));
        let rng = Pcg32::seed_from_u64(settings.seed);
        let events = EventLog::new(settings.event_capacity);
        Self {
            settings,
            bodies: Vec::new(),
            staged: Vec::new(),
            index: CollisionIndex::default(),
            snapshot: Vec::new(),
            ids: IdGenerator::new(),
            rng,
            boundary,
            events,
            frame: 0,
            phase: TickPhase::Done,
            last_stats: FrameStats::default(),
        }
    }

    /// Replace the level containment rule
    pub fn with_boundary(mut self, boundary: Box<dyn Boundary>) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn set_boundary(&mut self, boundary: Box<dyn Boundary>) {
        self.boundary = boundary;
    }

    /// Allocate an identity for a body about to be created
    pub fn next_id(&mut self) -> BodyId {
        self.ids.next_id()
    }

    /// Stage a body; it becomes live at the next flush
    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = body.id();
        self.staged.push(Staged::Add(body));
        id
    }

    pub fn add_bodies(&mut self, bodies: impl IntoIterator<Item = Body>) {
        self.staged.extend(bodies.into_iter().map(Staged::Add));
    }

    /// Stage a death; the body is removed at the next flush.
    ///
    /// Killing a body that is still waiting to be added cancels the addition.
    pub fn kill_body(&mut self, id: BodyId) {
        self.staged.push(Staged::Kill(id));
    }

    /// Ids of live bodies within `radius` of `point`, as indexed at the start of the
    /// latest tick
    pub fn query_within(&self, point: DVec2, radius: f64) -> Vec<BodyId> {
        self.index
            .query_within(point, radius)
            .into_iter()
            .filter_map(|slot| self.bodies.get(slot).map(Body::id))
            .collect()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        let slot = self.slot_of(id)?;
        Some(&self.bodies[slot])
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let slot = self.slot_of(id)?;
        Some(&mut self.bodies[slot])
    }

    /// Live bodies in id order
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Staged operations not yet applied
    pub fn pending_len(&self) -> usize {
        self.staged.len()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn phase(&self) -> TickPhase {
        self.phase
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn index_kind(&self) -> IndexKind {
        self.settings.index
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Take every event produced since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    /// Events discarded because the buffer filled up since the last drain
    pub fn events_dropped(&self) -> u64 {
        self.events.dropped
    }

    /// Advance the simulation by one tick.
    ///
    /// Events accumulate until [`World::drain_events`] is called. At most
    /// `settings.event_capacity` are kept; past that the oldest are discarded.
    pub fn tick(&mut self) -> FrameStats {
        let mut stats = FrameStats::default();

        self.phase = TickPhase::FlushPending;
        self.flush(&mut stats);

        self.phase = TickPhase::RebuildIndex;
        self.rebuild_index();

        self.phase = TickPhase::PerBodyUpdate;
        self.update_bodies(&mut stats);

        self.phase = TickPhase::Done;
        self.frame += 1;
        stats.frame = self.frame;
        stats.live = self.bodies.len();
        self.report(&stats);
        self.last_stats = stats;
        stats
    }

    fn slot_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, Body::id).ok()
    }

    /// Apply the staging queue: deaths first, then births (fragments included)
    fn flush(&mut self, stats: &mut FrameStats) {
        let mut kills = BTreeSet::new();
        let mut adds = Vec::new();
        for op in self.staged.drain(..) {
            match op {
                Staged::Add(body) => adds.push(body),
                Staged::Kill(id) => {
                    kills.insert(id);
                }
            }
        }

        // A kill beats a pending add: the body never becomes live.
        adds.retain(|body| {
            let cancelled = kills.remove(&body.id());
            if cancelled {
                log::debug!("body {} killed before it spawned; dropping", body.id());
            }
            !cancelled
        });

        let (dead, alive): (Vec<Body>, Vec<Body>) = std::mem::take(&mut self.bodies)
            .into_iter()
            .partition(|body| kills.contains(&body.id()));
        self.bodies = alive;

        if dead.len() < kills.len() {
            for id in kills.iter().filter(|id| !dead.iter().any(|b| b.id() == **id)) {
                log::debug!("kill for unknown body {id} ignored");
            }
        }

        for body in &dead {
            self.run_death_effect(body, &mut adds);
            self.events.push(SimEvent::Died {
                id: body.id(),
                kind: body.kind,
                position: body.position,
                velocity: body.velocity,
            });
        }
        stats.died = dead.len();

        let mut seen = BTreeSet::new();
        for body in &adds {
            let id = body.id();
            assert!(seen.insert(id), "body {id} staged for addition twice");
            assert!(self.slot_of(id).is_none(), "body {id} added while already live");
        }
        stats.spawned = adds.len();

        for body in adds {
            self.events.push(SimEvent::Spawned {
                id: body.id(),
                kind: body.kind,
            });
            self.bodies.push(body);
        }
        self.bodies.sort_by_key(Body::id);
    }

    fn run_death_effect(&mut self, body: &Body, spawned: &mut Vec<Body>) {
        match body.on_death {
            DeathEffect::None => {}
            DeathEffect::Scatter {
                chance,
                radius,
                mass,
            } => {
                let mut count = 0;
                while count < MAX_FRAGMENTS && self.rng.random::<f64>() < chance {
                    let vel = DVec2::new(
                        (self.rng.random::<f64>() - 0.5) * body.velocity.x,
                        (self.rng.random::<f64>() - 0.5) * body.velocity.y,
                    );
                    let fragment = Body::new(self.ids.next_id(), body.position, 0.0)
                        .with_kind(BodyKind::Resource)
                        .with_shape(Shape::circle(body.position, radius))
                        .with_mass(mass)
                        .with_velocity(vel);
                    spawned.push(fragment);
                    count += 1;
                }
            }
        }
    }

    fn rebuild_index(&mut self) {
        self.snapshot.clear();
        self.snapshot.extend(self.bodies.iter().map(|b| Reach {
            position: b.position,
            range: (!b.is_inert()).then_some(b.effect_range),
        }));

        let items = self
            .snapshot
            .iter()
            .enumerate()
            .filter(|(_, reach)| reach.range.is_some())
            .map(|(slot, reach)| (reach.position, slot));
        self.index = CollisionIndex::build_items(self.settings.index, items, &mut self.rng);
    }

    fn update_bodies(&mut self, stats: &mut FrameStats) {
        let softening = self.settings.overlap_softening;
        let max_speed = self.settings.max_speed;
        let mut neighbors = Vec::new();

        for i in 0..self.bodies.len() {
            let reach = self.snapshot[i];
            let (id, field) = {
                let body = &mut self.bodies[i];
                body.prev_position = body.position;
                body.prev_facing = body.facing;
                (body.id(), body.field)
            };

            neighbors.clear();
            if let Some(range) = reach.range {
                self.index.query_within_into(reach.position, range, &mut neighbors);
            }
            stats.candidates += neighbors.len();

            for &j in &neighbors {
                if j == i {
                    continue;
                }

                if let Some(field) = field {
                    let (source, target) = pair_mut(&mut self.bodies, i, j);
                    if !target.anchored {
                        target.push(field.force_on(source.position, target.position));
                    }
                }

                // Already tested by the lower id
                if self.bodies[j].id() < id && self.snapshot[j].covers(&reach) {
                    continue;
                }

                let (a, b) = pair_mut(&mut self.bodies, i, j);
                if !(a.accepts(b) && b.accepts(a)) || !a.shape.intersects(&b.shape) {
                    continue;
                }

                stats.contacts += 1;
                if a.impactable && b.impactable && resolve(a, b, softening).impulse {
                    stats.impulses += 1;
                }
                apply_hit(a, b);
                apply_hit(b, a);
                let (lo, hi) = if a.id() < b.id() {
                    (a.id(), b.id())
                } else {
                    (b.id(), a.id())
                };
                self.events.push(SimEvent::Collided { a: lo, b: hi });
            }

            integrate(&mut self.bodies[i], max_speed, self.boundary.as_ref());
        }

        // A body can still be hit after its own update, so deaths are collected last.
        self.staged.extend(
            self.bodies
                .iter()
                .filter(|b| b.is_dead())
                .map(|b| Staged::Kill(b.id())),
        );
    }

    fn report(&self, stats: &FrameStats) {
        let interval = self.settings.stats_interval;
        if interval > 0 && self.frame % interval == 0 {
            log::info!(
                "Frame: {} bodies: {} pending: {} candidates: {} contacts: {} impulses: {} index: {}",
                stats.frame,
                stats.live,
                self.staged.len(),
                stats.candidates,
                stats.contacts,
                stats.impulses,
                self.settings.index.as_str()
            );
        }
    }
}

/// Run `source`'s hit effect against `target`
fn apply_hit(source: &mut Body, target: &mut Body) {
    let effect = source.on_hit;
    if effect.damage != 0 {
        target.damage(effect.damage);
    }
    if effect.dies_on_hit {
        source.kill();
    }
}

/// Advance one body by a tick: lifetime, drag, motion, speed clamp, containment
fn integrate(body: &mut Body, max_speed: f64, boundary: &dyn Boundary) {
    if let Some(ticks) = body.lifetime.as_mut() {
        *ticks = ticks.saturating_sub(1);
        if *ticks == 0 {
            body.kill();
        }
    }

    body.apply_drag();
    body.position += body.velocity;
    body.facing += body.angular_velocity;
    body.clamp_velocity(max_speed);
    boundary.apply(body);
    if body.anchored {
        body.velocity = DVec2::ZERO;
    }
    body.sync_shape();
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "pair_mut needs two distinct slots");
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}
