#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative aquarium state and the command interpreter that mutates it.
//!
//! The tank owns every live entity (eggs, decorations, fish, food flakes) and
//! the school registry, and is only ever mutated through [`apply`]. Each
//! command produces zero or more [`Event`]s describing what actually changed;
//! systems and adapters consume those events and never reach into the tank
//! directly. Read access goes through the [`query`] module.
//!
//! Ticking happens inside [`Command::Tick`]: the clock advances, school
//! leaders are stepped once for the frame, then eggs, decorations, fish and
//! flakes are integrated in that order so fish always steer against the
//! leader state of the current frame.

use std::f32::consts::TAU;

use glam::Vec2;

use aquarium_core::{
    bounds::swim_bounds,
    school::SchoolId,
    snapshot::{
        DecorSnapshot, EggSnapshot, FishSnapshot, FlakeSnapshot, NextIds, SchoolMembership,
        TankSnapshot,
    },
    tank::{TankDimensions, TankEnvironment},
    Command, DecorId, DecorKind, EggId, EggKind, Event, FishId, FlakeId, FlakePhase, FlakeRemoval,
    SaleError, VisualMode, EGG_SHRINK_SECS, FLAKE_LIFETIME_SECS, HATCH_MIN_SECS, HATCH_SPAN_SECS,
    LIFT_DISTANCE, LIFT_SECS, SETTLE_SECS, STARTING_COINS,
};
use aquarium_system_motion::{FormationSlot, MotionKind, MotionState};
use aquarium_system_schooling::SchoolRegistry;

/// Default tank width in world units, used until the first resize arrives.
pub const DEFAULT_WIDTH: f32 = 16.0;

/// Default tank height in world units, used until the first resize arrives.
pub const DEFAULT_HEIGHT: f32 = 9.0;

/// Seed for the tank's deterministic generator and all school leaders.
const WORLD_SEED: u64 = 0x5eed_cafe_f00d_0001;

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// School every schooling fish joins; the tank runs a single formation.
const HOME_SCHOOL: SchoolId = SchoolId::new(0);

/// Visual radius of an egg, used for landing and clamping.
const EGG_RADIUS: f32 = 0.18;
/// Downward acceleration applied to a falling egg.
const EGG_SINK_ACCEL: f32 = 2.6;
/// Terminal sink speed of a falling egg.
const EGG_MAX_SINK_SPEED: f32 = 1.4;
/// Fraction of the egg radius buried below the sand line at rest.
const EGG_SINK_FACTOR: f32 = 0.35;

/// Downward acceleration applied to a falling decoration.
const DECOR_GRAVITY: f32 = 3.2;
/// Terminal fall speed of a decoration.
const DECOR_MAX_FALL: f32 = 2.2;
/// Horizontal speed retained when a decoration bounces off a wall.
const DECOR_WALL_RESTITUTION: f32 = 0.55;
/// Per-second exponential decay of a falling decoration's horizontal drift.
const DECOR_DRIFT_DRAG: f32 = 0.9;
/// Fraction of the decoration's half height buried below the sand at rest.
const DECOR_SINK_FACTOR: f32 = 0.45;

/// Height above the water surface purchased items are released from.
const SPAWN_DROP_HEIGHT: f32 = 0.4;

/// Descent speed of a flake above the water surface.
const FLAKE_FALL_SPEED: f32 = 1.2;
/// Descent speed of a waterlogged flake.
const FLAKE_SINK_SPEED: f32 = 0.25;
/// Largest horizontal drift speed assigned to a new flake.
const FLAKE_DRIFT_MAX: f32 = 0.2;
/// Seconds of life a flake floats at the surface before waterlogging.
const FLAKE_FLOAT_SECS: f32 = 3.0;

/// Authoritative simulation state of one aquarium.
#[derive(Clone, Debug)]
pub struct Tank {
    dimensions: TankDimensions,
    environment: TankEnvironment,
    visual_mode: VisualMode,
    coins: u32,
    elapsed: f32,
    tick_index: u64,
    rng_state: u64,
    next_egg: u32,
    next_fish: u32,
    next_decor: u32,
    next_flake: u32,
    eggs: Vec<Egg>,
    decor: Vec<Decoration>,
    fish: Vec<Fish>,
    flakes: Vec<FoodFlake>,
    schools: SchoolRegistry,
}

#[derive(Clone, Copy, Debug)]
struct Egg {
    id: EggId,
    kind: EggKind,
    position: Vec2,
    velocity: Vec2,
    landed: bool,
    age: f32,
    hatch_at: f32,
    did_hatch: bool,
    shrink_left: f32,
}

#[derive(Clone, Copy, Debug)]
struct Decoration {
    id: DecorId,
    kind: DecorKind,
    position: Vec2,
    velocity: Vec2,
    landed: bool,
    dragging: bool,
}

#[derive(Clone, Copy, Debug)]
struct Fish {
    id: FishId,
    kind: EggKind,
    motion: MotionState,
    born_elapsed: f32,
    grow_dur: f32,
    half_extents: Vec2,
    footprint_measured: bool,
    lift_from_y: f32,
    lift_started: f32,
    lift_done: bool,
    settle_until: f32,
    matured_announced: bool,
    school: Option<SchoolMembership>,
}

impl Fish {
    fn age(&self, elapsed: f32) -> f32 {
        (elapsed - self.born_elapsed).max(0.0)
    }

    fn is_adult(&self, elapsed: f32) -> bool {
        self.age(elapsed) >= self.grow_dur
    }
}

#[derive(Clone, Copy, Debug)]
struct FoodFlake {
    id: FlakeId,
    position: Vec2,
    velocity: Vec2,
    phase: FlakePhase,
    lifetime_left: f32,
}

impl Tank {
    /// Creates an empty tank at the default dimensions with the starting
    /// coin balance.
    #[must_use]
    pub fn new() -> Self {
        let dimensions = TankDimensions::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
        Self {
            dimensions,
            environment: TankEnvironment::from_dimensions(dimensions),
            visual_mode: VisualMode::Prototype,
            coins: STARTING_COINS,
            elapsed: 0.0,
            tick_index: 0,
            rng_state: WORLD_SEED,
            next_egg: 0,
            next_fish: 0,
            next_decor: 0,
            next_flake: 0,
            eggs: Vec::new(),
            decor: Vec::new(),
            fish: Vec::new(),
            flakes: Vec::new(),
            schools: SchoolRegistry::new(WORLD_SEED),
        }
    }

    /// Captures the complete simulation state.
    ///
    /// The capture carries every lifecycle flag, so a tank rebuilt from it
    /// never re-fires hatches, lifts or maturity announcements.
    #[must_use]
    pub fn snapshot(&self) -> TankSnapshot {
        TankSnapshot {
            dimensions: self.dimensions,
            coins: self.coins,
            visual_mode: self.visual_mode,
            elapsed: self.elapsed,
            tick_index: self.tick_index,
            rng_state: self.rng_state,
            next_ids: NextIds {
                egg: self.next_egg,
                fish: self.next_fish,
                decor: self.next_decor,
                flake: self.next_flake,
            },
            eggs: self
                .eggs
                .iter()
                .map(|egg| EggSnapshot {
                    id: egg.id,
                    kind: egg.kind,
                    position: egg.position,
                    velocity: egg.velocity,
                    landed: egg.landed,
                    age: egg.age,
                    hatch_at: egg.hatch_at,
                    did_hatch: egg.did_hatch,
                    shrink_left: egg.shrink_left,
                })
                .collect(),
            decor: self
                .decor
                .iter()
                .map(|decoration| DecorSnapshot {
                    id: decoration.id,
                    kind: decoration.kind,
                    position: decoration.position,
                    velocity: decoration.velocity,
                    landed: decoration.landed,
                    dragging: decoration.dragging,
                })
                .collect(),
            fish: self
                .fish
                .iter()
                .map(|fish| FishSnapshot {
                    id: fish.id,
                    kind: fish.kind,
                    motion: fish.motion.to_snapshot(),
                    born_elapsed: fish.born_elapsed,
                    grow_dur: fish.grow_dur,
                    half_extents: fish.half_extents,
                    footprint_measured: fish.footprint_measured,
                    lift_from_y: fish.lift_from_y,
                    lift_started: fish.lift_started,
                    lift_done: fish.lift_done,
                    settle_until: fish.settle_until,
                    matured_announced: fish.matured_announced,
                    school: fish.school,
                })
                .collect(),
            flakes: self
                .flakes
                .iter()
                .map(|flake| FlakeSnapshot {
                    id: flake.id,
                    position: flake.position,
                    velocity: flake.velocity,
                    phase: flake.phase,
                    lifetime_left: flake.lifetime_left,
                })
                .collect(),
            leaders: self.schools.to_snapshots(),
        }
    }

    /// Rebuilds a tank from a capture, fitting it to the provided
    /// dimensions.
    ///
    /// When the dimensions differ from the captured ones, every position is
    /// rescaled by the ratio of the new height to the captured height and
    /// then re-clamped into the rebuilt bounds. Ages, timers and lifecycle
    /// flags restore verbatim.
    #[must_use]
    pub fn from_snapshot(snapshot: TankSnapshot, dimensions: TankDimensions) -> Self {
        let mut tank = Self {
            dimensions: snapshot.dimensions,
            environment: TankEnvironment::from_dimensions(snapshot.dimensions),
            visual_mode: snapshot.visual_mode,
            coins: snapshot.coins,
            elapsed: snapshot.elapsed,
            tick_index: snapshot.tick_index,
            rng_state: snapshot.rng_state,
            next_egg: snapshot.next_ids.egg,
            next_fish: snapshot.next_ids.fish,
            next_decor: snapshot.next_ids.decor,
            next_flake: snapshot.next_ids.flake,
            eggs: snapshot
                .eggs
                .iter()
                .map(|egg| Egg {
                    id: egg.id,
                    kind: egg.kind,
                    position: egg.position,
                    velocity: egg.velocity,
                    landed: egg.landed,
                    age: egg.age,
                    hatch_at: egg.hatch_at,
                    did_hatch: egg.did_hatch,
                    shrink_left: egg.shrink_left,
                })
                .collect(),
            decor: snapshot
                .decor
                .iter()
                .map(|decoration| Decoration {
                    id: decoration.id,
                    kind: decoration.kind,
                    position: decoration.position,
                    velocity: decoration.velocity,
                    landed: decoration.landed,
                    dragging: decoration.dragging,
                })
                .collect(),
            fish: snapshot
                .fish
                .iter()
                .map(|fish| Fish {
                    id: fish.id,
                    kind: fish.kind,
                    motion: MotionState::from_snapshot(&fish.motion),
                    born_elapsed: fish.born_elapsed,
                    grow_dur: fish.grow_dur,
                    half_extents: fish.half_extents,
                    footprint_measured: fish.footprint_measured,
                    lift_from_y: fish.lift_from_y,
                    lift_started: fish.lift_started,
                    lift_done: fish.lift_done,
                    settle_until: fish.settle_until,
                    matured_announced: fish.matured_announced,
                    school: fish.school,
                })
                .collect(),
            flakes: snapshot
                .flakes
                .iter()
                .map(|flake| FoodFlake {
                    id: flake.id,
                    position: flake.position,
                    velocity: flake.velocity,
                    phase: flake.phase,
                    lifetime_left: flake.lifetime_left,
                })
                .collect(),
            schools: SchoolRegistry::from_snapshots(WORLD_SEED, &snapshot.leaders),
        };
        if dimensions.is_valid() && dimensions != snapshot.dimensions {
            tank.resize(dimensions);
        }
        tank
    }

    fn next_random(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }

    /// Uniform value in `[0, 1)` from the tank's deterministic generator.
    fn random_unit(&mut self) -> f32 {
        let bits = (self.next_random() >> 40) as u32;
        bits as f32 / (1u64 << 24) as f32
    }

    /// Random horizontal drop position, inset from the walls so released
    /// items never start touching the frame.
    fn random_drop_x(&mut self) -> f32 {
        let inset = (self.environment.water_width() * 0.08).min(0.5);
        let left = self.environment.inner_left() + inset;
        let right = self.environment.inner_right() - inset;
        left + self.random_unit() * (right - left).max(0.0)
    }

    fn resize(&mut self, dimensions: TankDimensions) {
        let scale = dimensions.height() / self.dimensions.height();
        self.dimensions = dimensions;
        self.environment = TankEnvironment::from_dimensions(dimensions);
        let env = self.environment;

        for egg in &mut self.eggs {
            egg.position *= scale;
            egg.position.x = egg.position.x.clamp(
                env.inner_left() + EGG_RADIUS,
                env.inner_right() - EGG_RADIUS,
            );
            if egg.landed {
                egg.position.y = env.sand_top_y() + EGG_RADIUS * EGG_SINK_FACTOR;
            }
        }

        for decoration in &mut self.decor {
            let half = decoration.kind.half_extents();
            decoration.position *= scale;
            decoration.position.x = decoration
                .position
                .x
                .clamp(env.inner_left() + half.x, env.inner_right() - half.x);
            if decoration.landed {
                decoration.position.y = env.sand_top_y() + half.y * DECOR_SINK_FACTOR;
            }
        }

        for fish in &mut self.fish {
            let kind = MotionKind::for_egg(fish.kind);
            let bounds = swim_bounds(&env, fish.half_extents, kind.margins());
            fish.motion.position = bounds.clamp(fish.motion.position * scale);
            fish.lift_from_y *= scale;
        }

        for flake in &mut self.flakes {
            flake.position *= scale;
            flake.position.x = flake
                .position
                .x
                .clamp(env.inner_left(), env.inner_right());
            if flake.phase == FlakePhase::Floating {
                flake.position.y = env.inner_top();
            }
        }

        self.schools.rescale_and_clamp(scale, &env);
    }

    fn tick(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        self.elapsed += dt;
        self.tick_index += 1;
        let env = self.environment;
        self.schools
            .tick_all(self.tick_index, dt, self.elapsed, &env);
        self.tick_eggs(dt, out_events);
        self.tick_decor(dt, out_events);
        self.tick_fish(dt);
        self.announce_maturity(out_events);
        self.tick_flakes(dt, out_events);
    }

    fn tick_eggs(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let env = self.environment;
        for egg in &mut self.eggs {
            egg.age += dt;
            if !egg.landed {
                egg.velocity.y = (egg.velocity.y - EGG_SINK_ACCEL * dt).max(-EGG_MAX_SINK_SPEED);
                egg.position.y += egg.velocity.y * dt;
                let rest_y = env.sand_top_y() + EGG_RADIUS * EGG_SINK_FACTOR;
                if egg.position.y <= rest_y {
                    egg.position.y = rest_y;
                    egg.velocity = Vec2::ZERO;
                    egg.landed = true;
                    out_events.push(Event::EggLanded { egg: egg.id });
                }
            }
            // A falling egg keeps incubating but may not hatch until it rests
            // on the sand, however long the descent takes.
            if egg.landed && !egg.did_hatch && egg.age >= egg.hatch_at {
                egg.did_hatch = true;
                egg.shrink_left = EGG_SHRINK_SECS;
                out_events.push(Event::EggHatched {
                    egg: egg.id,
                    kind: egg.kind,
                    position: egg.position,
                });
            } else if egg.did_hatch {
                egg.shrink_left = (egg.shrink_left - dt).max(0.0);
            }
        }
        self.eggs.retain(|egg| {
            if egg.did_hatch && egg.shrink_left <= 0.0 {
                out_events.push(Event::EggRemoved { egg: egg.id });
                false
            } else {
                true
            }
        });
    }

    fn tick_decor(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let env = self.environment;
        for decoration in &mut self.decor {
            if decoration.dragging || decoration.landed {
                continue;
            }
            decoration.velocity.y = (decoration.velocity.y - DECOR_GRAVITY * dt).max(-DECOR_MAX_FALL);
            decoration.velocity.x *= (-DECOR_DRIFT_DRAG * dt).exp();
            decoration.position += decoration.velocity * dt;

            let half = decoration.kind.half_extents();
            let left = env.inner_left() + half.x;
            let right = env.inner_right() - half.x;
            if decoration.position.x < left {
                decoration.position.x = left;
                decoration.velocity.x = -decoration.velocity.x * DECOR_WALL_RESTITUTION;
            } else if decoration.position.x > right {
                decoration.position.x = right;
                decoration.velocity.x = -decoration.velocity.x * DECOR_WALL_RESTITUTION;
            }

            let rest_y = env.sand_top_y() + half.y * DECOR_SINK_FACTOR;
            if decoration.position.y <= rest_y {
                decoration.position.y = rest_y;
                decoration.velocity = Vec2::ZERO;
                decoration.landed = true;
                out_events.push(Event::DecorLanded {
                    decor: decoration.id,
                });
            }
        }
    }

    fn tick_fish(&mut self, dt: f32) {
        let env = self.environment;
        let elapsed = self.elapsed;
        let schools = &self.schools;
        for fish in self.fish.iter_mut() {
            let kind = MotionKind::for_egg(fish.kind);
            let bounds = swim_bounds(&env, fish.half_extents, kind.margins());

            if !fish.lift_done {
                // Post-hatch lift: cubic ease-out away from the sand, with
                // ordinary locomotion suppressed until it completes.
                let t = ((elapsed - fish.lift_started) / LIFT_SECS).clamp(0.0, 1.0);
                let eased = 1.0 - (1.0 - t).powi(3);
                let lifted = fish.lift_from_y + LIFT_DISTANCE * eased;
                fish.motion.position.y = lifted.min(bounds.y_max);
                if t >= 1.0 {
                    fish.lift_done = true;
                    fish.settle_until = elapsed + SETTLE_SECS;
                }
                continue;
            }
            if elapsed < fish.settle_until {
                continue;
            }

            let slot = fish.school.as_ref().and_then(|membership| {
                schools.leader(membership.school).map(|leader| FormationSlot {
                    leader,
                    member_index: membership.member_index,
                })
            });
            aquarium_system_motion::advance(&mut fish.motion, kind, &bounds, slot, dt, elapsed);
        }
    }

    fn announce_maturity(&mut self, out_events: &mut Vec<Event>) {
        let elapsed = self.elapsed;
        for fish in &mut self.fish {
            if !fish.matured_announced && fish.is_adult(elapsed) {
                fish.matured_announced = true;
                out_events.push(Event::FishMatured { fish: fish.id });
            }
        }
    }

    fn tick_flakes(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let env = self.environment;
        let surface = env.inner_top();
        for flake in &mut self.flakes {
            flake.lifetime_left -= dt;
            match flake.phase {
                FlakePhase::Falling => {
                    flake.position += flake.velocity * dt;
                    if flake.position.y <= surface {
                        flake.position.y = surface;
                        flake.velocity.y = 0.0;
                        flake.phase = FlakePhase::Floating;
                    }
                }
                FlakePhase::Floating => {
                    flake.position.x += flake.velocity.x * dt;
                    reflect_drift(flake, &env);
                    if flake.lifetime_left <= FLAKE_LIFETIME_SECS - FLAKE_FLOAT_SECS {
                        flake.velocity = Vec2::new(flake.velocity.x * 0.5, -FLAKE_SINK_SPEED);
                        flake.phase = FlakePhase::Sinking;
                    }
                }
                FlakePhase::Sinking => {
                    flake.position += flake.velocity * dt;
                    reflect_drift(flake, &env);
                }
            }
        }
        let sand = env.sand_top_y();
        self.flakes.retain(|flake| {
            if flake.lifetime_left <= 0.0 {
                out_events.push(Event::FlakeRemoved {
                    flake: flake.id,
                    cause: FlakeRemoval::Expired,
                });
                false
            } else if flake.phase == FlakePhase::Sinking && flake.position.y <= sand {
                out_events.push(Event::FlakeRemoved {
                    flake: flake.id,
                    cause: FlakeRemoval::Buried,
                });
                false
            } else {
                true
            }
        });
    }

    fn purchase_egg(&mut self, kind: EggKind, out_events: &mut Vec<Event>) {
        let cost = kind.cost();
        if self.coins < cost {
            out_events.push(Event::PurchaseRejected {
                cost,
                coins: self.coins,
            });
            return;
        }
        self.coins -= cost;
        let id = EggId::new(self.next_egg);
        self.next_egg += 1;
        let position = Vec2::new(
            self.random_drop_x(),
            self.environment.inner_top() + SPAWN_DROP_HEIGHT,
        );
        let hatch_at = HATCH_MIN_SECS + self.random_unit() * HATCH_SPAN_SECS;
        self.eggs.push(Egg {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            landed: false,
            age: 0.0,
            hatch_at,
            did_hatch: false,
            shrink_left: 0.0,
        });
        out_events.push(Event::EggPurchased {
            egg: id,
            kind,
            position,
        });
        out_events.push(Event::CoinsChanged { coins: self.coins });
    }

    fn purchase_decor(&mut self, kind: DecorKind, out_events: &mut Vec<Event>) {
        let cost = kind.cost();
        if self.coins < cost {
            out_events.push(Event::PurchaseRejected {
                cost,
                coins: self.coins,
            });
            return;
        }
        self.coins -= cost;
        let id = DecorId::new(self.next_decor);
        self.next_decor += 1;
        let position = Vec2::new(
            self.random_drop_x(),
            self.environment.inner_top() + SPAWN_DROP_HEIGHT,
        );
        let drift = (self.random_unit() - 0.5) * 0.6;
        self.decor.push(Decoration {
            id,
            kind,
            position,
            velocity: Vec2::new(drift, 0.0),
            landed: false,
            dragging: false,
        });
        out_events.push(Event::DecorPurchased {
            decor: id,
            kind,
            position,
        });
        out_events.push(Event::CoinsChanged { coins: self.coins });
    }

    fn spawn_fish(&mut self, kind: EggKind, position: Vec2, out_events: &mut Vec<Event>) {
        let id = FishId::new(self.next_fish);
        self.next_fish += 1;
        let motion_kind = MotionKind::for_egg(kind);
        let half_extents = kind.placeholder_half_extents();
        let bounds = swim_bounds(&self.environment, half_extents, motion_kind.margins());
        let phase = self.random_unit() * TAU;
        let start = Vec2::new(position.x.clamp(bounds.x_min, bounds.x_max), position.y);
        let school = if kind == EggKind::Schooling {
            let member_index = self
                .schools
                .register(HOME_SCHOOL, &self.environment, self.elapsed);
            Some(SchoolMembership {
                school: HOME_SCHOOL,
                member_index,
            })
        } else {
            None
        };
        self.fish.push(Fish {
            id,
            kind,
            motion: MotionState::new(start, phase),
            born_elapsed: self.elapsed,
            grow_dur: kind.grow_duration_secs(),
            half_extents,
            footprint_measured: false,
            lift_from_y: start.y,
            lift_started: self.elapsed,
            lift_done: false,
            settle_until: 0.0,
            matured_announced: false,
            school,
        });
        out_events.push(Event::FishSpawned {
            fish: id,
            kind,
            position: start,
        });
    }

    fn sell_fish(&mut self, id: FishId, out_events: &mut Vec<Event>) {
        let Some(index) = self.fish.iter().position(|fish| fish.id == id) else {
            out_events.push(Event::SaleRejected {
                fish: id,
                reason: SaleError::UnknownFish,
            });
            return;
        };
        if !self.fish[index].is_adult(self.elapsed) {
            out_events.push(Event::SaleRejected {
                fish: id,
                reason: SaleError::StillGrowing,
            });
            return;
        }
        let fish = self.fish.remove(index);
        if let Some(membership) = fish.school {
            self.schools.unregister(membership.school);
        }
        let price = fish.kind.sell_price();
        self.coins += price;
        out_events.push(Event::FishSold { fish: id, price });
        out_events.push(Event::CoinsChanged { coins: self.coins });
    }

    fn drop_food(&mut self, x: f32, out_events: &mut Vec<Event>) {
        let id = FlakeId::new(self.next_flake);
        self.next_flake += 1;
        let clamped_x = x.clamp(
            self.environment.inner_left() + 0.1,
            self.environment.inner_right() - 0.1,
        );
        let drift = (self.random_unit() - 0.5) * 2.0 * FLAKE_DRIFT_MAX;
        self.flakes.push(FoodFlake {
            id,
            position: Vec2::new(clamped_x, self.environment.inner_top() + SPAWN_DROP_HEIGHT),
            velocity: Vec2::new(drift, -FLAKE_FALL_SPEED),
            phase: FlakePhase::Falling,
            lifetime_left: FLAKE_LIFETIME_SECS,
        });
        out_events.push(Event::FlakeDropped { flake: id });
    }

    fn consume_flake(&mut self, id: FlakeId, out_events: &mut Vec<Event>) {
        let before = self.flakes.len();
        self.flakes.retain(|flake| flake.id != id);
        if self.flakes.len() < before {
            out_events.push(Event::FlakeRemoved {
                flake: id,
                cause: FlakeRemoval::Eaten,
            });
        }
    }

    fn correct_footprint(&mut self, id: FishId, half_extents: Vec2) {
        if half_extents.x <= 0.0 || half_extents.y <= 0.0 {
            return;
        }
        let env = self.environment;
        if let Some(fish) = self.fish.iter_mut().find(|fish| fish.id == id) {
            if fish.footprint_measured {
                return;
            }
            fish.half_extents = half_extents;
            fish.footprint_measured = true;
            let kind = MotionKind::for_egg(fish.kind);
            let bounds = swim_bounds(&env, half_extents, kind.margins());
            fish.motion.position = bounds.clamp(fish.motion.position);
        }
    }
}

impl Default for Tank {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounces a flake's horizontal drift off the inner walls.
fn reflect_drift(flake: &mut FoodFlake, env: &TankEnvironment) {
    if flake.position.x < env.inner_left() {
        flake.position.x = env.inner_left();
        flake.velocity.x = flake.velocity.x.abs();
    } else if flake.position.x > env.inner_right() {
        flake.position.x = env.inner_right();
        flake.velocity.x = -flake.velocity.x.abs();
    }
}

/// Applies a command to the tank, appending the resulting events.
pub fn apply(tank: &mut Tank, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTank { dimensions } => {
            if dimensions.is_valid() {
                tank.resize(dimensions);
                out_events.push(Event::TankResized { dimensions });
            }
        }
        Command::Tick { dt } => {
            let seconds = dt.as_secs_f32();
            if seconds > 0.0 {
                tank.tick(seconds, out_events);
            }
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::PurchaseEgg { kind } => tank.purchase_egg(kind, out_events),
        Command::PurchaseDecor { kind } => tank.purchase_decor(kind, out_events),
        Command::SpawnFish { kind, position } => tank.spawn_fish(kind, position, out_events),
        Command::SellFish { fish } => tank.sell_fish(fish, out_events),
        Command::DropFood { x } => tank.drop_food(x, out_events),
        Command::ConsumeFlake { flake } => tank.consume_flake(flake, out_events),
        Command::BeginDecorDrag { decor } => {
            if let Some(decoration) = tank.decor.iter_mut().find(|d| d.id == decor) {
                decoration.dragging = true;
                decoration.velocity = Vec2::ZERO;
            }
        }
        Command::DragDecorTo { decor, position } => {
            let env = tank.environment;
            if let Some(decoration) = tank
                .decor
                .iter_mut()
                .find(|d| d.id == decor && d.dragging)
            {
                let half = decoration.kind.half_extents();
                decoration.position = Vec2::new(
                    position
                        .x
                        .clamp(env.inner_left() + half.x, env.inner_right() - half.x),
                    position
                        .y
                        .clamp(env.inner_bottom() + half.y, env.sand_top_y()),
                );
            }
        }
        Command::EndDecorDrag { decor } => {
            if let Some(decoration) = tank
                .decor
                .iter_mut()
                .find(|d| d.id == decor && d.dragging)
            {
                decoration.dragging = false;
                decoration.landed = true;
                decoration.velocity = Vec2::ZERO;
            }
        }
        Command::SetVisualMode { mode } => {
            if tank.visual_mode != mode {
                tank.visual_mode = mode;
                out_events.push(Event::VisualModeChanged { mode });
            }
        }
        Command::CorrectFootprint { fish, half_extents } => {
            tank.correct_footprint(fish, half_extents);
        }
    }
}

pub mod query {
    //! Read-only views over the tank for rendering and user interfaces.

    use glam::Vec2;

    use aquarium_core::{
        bounds::swim_bounds,
        school::{LeaderState, SchoolId},
        tank::{TankDimensions, TankEnvironment},
        DecorId, DecorKind, EggId, EggKind, Facing, FishId, FlakeId, FlakePhase, VisualMode,
        EGG_SHRINK_SECS,
    };
    use aquarium_system_motion::{procedural_wiggle, rendered_position, MotionKind, WiggleOffsets};

    use crate::Tank;

    /// Current coin balance.
    #[must_use]
    pub fn coins(tank: &Tank) -> u32 {
        tank.coins
    }

    /// Water rectangle and sand geometry derived from the dimensions.
    #[must_use]
    pub fn environment(tank: &Tank) -> TankEnvironment {
        tank.environment
    }

    /// Dimensions the tank currently simulates under.
    #[must_use]
    pub fn dimensions(tank: &Tank) -> TankDimensions {
        tank.dimensions
    }

    /// Active visual mode.
    #[must_use]
    pub fn visual_mode(tank: &Tank) -> VisualMode {
        tank.visual_mode
    }

    /// Simulation clock in seconds.
    #[must_use]
    pub fn elapsed(tank: &Tank) -> f32 {
        tank.elapsed
    }

    /// Drawable state of one fish for the current frame.
    #[derive(Clone, Copy, Debug)]
    pub struct FishSprite {
        /// Identifier of the fish.
        pub id: FishId,
        /// Egg kind the fish hatched from.
        pub kind: EggKind,
        /// Species name shown to the player.
        pub display_name: &'static str,
        /// Rendered position, bob included, clamped to the swim band.
        pub position: Vec2,
        /// Horizontal facing for sprite mirroring.
        pub facing: Facing,
        /// Growth-derived visual scale in `[juvenile, 1]`.
        pub scale: f32,
        /// Half extents of the unscaled sprite.
        pub half_extents: Vec2,
        /// Seconds since the fish hatched.
        pub age: f32,
        /// Whether the fish reached its growth duration.
        pub adult: bool,
        /// Procedural swim wiggle for detailed rendering.
        pub wiggle: WiggleOffsets,
    }

    /// Drawable fish, one entry per live fish.
    #[must_use]
    pub fn fish_view(tank: &Tank) -> Vec<FishSprite> {
        tank.fish
            .iter()
            .map(|fish| {
                let kind = MotionKind::for_egg(fish.kind);
                let bounds = swim_bounds(&tank.environment, fish.half_extents, kind.margins());
                let position = if fish.lift_done {
                    rendered_position(&fish.motion, kind, &bounds, tank.elapsed)
                } else {
                    fish.motion.position
                };
                let age = fish.age(tank.elapsed);
                let fraction = if fish.grow_dur > 0.0 {
                    (age / fish.grow_dur).min(1.0)
                } else {
                    1.0
                };
                FishSprite {
                    id: fish.id,
                    kind: fish.kind,
                    display_name: fish.kind.display_name(),
                    position,
                    facing: fish.motion.facing,
                    scale: aquarium_core::growth_scale(fraction),
                    half_extents: fish.half_extents,
                    age,
                    adult: fish.is_adult(tank.elapsed),
                    wiggle: procedural_wiggle(fish.motion.phase, tank.elapsed),
                }
            })
            .collect()
    }

    /// Drawable state of one egg for the current frame.
    #[derive(Clone, Copy, Debug)]
    pub struct EggSprite {
        /// Identifier of the egg.
        pub id: EggId,
        /// Kind of the egg.
        pub kind: EggKind,
        /// Current position.
        pub position: Vec2,
        /// Whether the egg rests on the sand.
        pub landed: bool,
        /// Incubation wobble angle in radians.
        pub wobble: f32,
        /// Visual scale; shrinks to zero after the hatch.
        pub scale: f32,
    }

    /// Drawable eggs, one entry per live egg.
    #[must_use]
    pub fn egg_view(tank: &Tank) -> Vec<EggSprite> {
        tank.eggs
            .iter()
            .map(|egg| {
                let wobble = if egg.landed && !egg.did_hatch {
                    (egg.age * 6.0).sin() * 0.12
                } else {
                    0.0
                };
                let scale = if egg.did_hatch {
                    (egg.shrink_left / EGG_SHRINK_SECS).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                EggSprite {
                    id: egg.id,
                    kind: egg.kind,
                    position: egg.position,
                    landed: egg.landed,
                    wobble,
                    scale,
                }
            })
            .collect()
    }

    /// Drawable state of one decoration.
    #[derive(Clone, Copy, Debug)]
    pub struct DecorSprite {
        /// Identifier of the decoration.
        pub id: DecorId,
        /// Kind of the decoration.
        pub kind: DecorKind,
        /// Current position.
        pub position: Vec2,
        /// Half extents of the sprite.
        pub half_extents: Vec2,
        /// Whether the decoration rests on the sand.
        pub landed: bool,
        /// Whether the pointer is dragging the decoration.
        pub dragging: bool,
    }

    /// Drawable decorations, one entry per placed decoration.
    #[must_use]
    pub fn decor_view(tank: &Tank) -> Vec<DecorSprite> {
        tank.decor
            .iter()
            .map(|decoration| DecorSprite {
                id: decoration.id,
                kind: decoration.kind,
                position: decoration.position,
                half_extents: decoration.kind.half_extents(),
                landed: decoration.landed,
                dragging: decoration.dragging,
            })
            .collect()
    }

    /// Drawable state of one food flake.
    #[derive(Clone, Copy, Debug)]
    pub struct FlakeSprite {
        /// Identifier of the flake.
        pub id: FlakeId,
        /// Current position.
        pub position: Vec2,
        /// Current descent phase.
        pub phase: FlakePhase,
    }

    /// Drawable flakes, one entry per live flake.
    #[must_use]
    pub fn flake_view(tank: &Tank) -> Vec<FlakeSprite> {
        tank.flakes
            .iter()
            .map(|flake| FlakeSprite {
                id: flake.id,
                position: flake.position,
                phase: flake.phase,
            })
            .collect()
    }

    /// One row of the sell panel.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SellListing {
        /// Identifier of the listed fish.
        pub id: FishId,
        /// Egg kind the fish hatched from.
        pub kind: EggKind,
        /// Species name shown to the player.
        pub display_name: &'static str,
        /// Coins paid out if the fish is sold.
        pub price: u32,
        /// Whether the sale would currently be accepted.
        pub adult: bool,
    }

    /// Sell-panel listing covering every live fish.
    ///
    /// Juveniles appear with `adult` false so interfaces can show them
    /// disabled; the tank rejects their sale regardless.
    #[must_use]
    pub fn sell_listings(tank: &Tank) -> Vec<SellListing> {
        tank.fish
            .iter()
            .map(|fish| SellListing {
                id: fish.id,
                kind: fish.kind,
                display_name: fish.kind.display_name(),
                price: fish.kind.sell_price(),
                adult: fish.is_adult(tank.elapsed),
            })
            .collect()
    }

    /// Identifier of the flake closest to the given point, if any exist.
    #[must_use]
    pub fn nearest_flake(tank: &Tank, point: Vec2) -> Option<FlakeId> {
        tank.flakes
            .iter()
            .min_by(|a, b| {
                let da = a.position.distance_squared(point);
                let db = b.position.distance_squared(point);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|flake| flake.id)
    }

    /// Current state of a school's leader, if the school is live.
    #[must_use]
    pub fn school_leader(tank: &Tank, school: SchoolId) -> Option<LeaderState> {
        tank.schools.leader(school).copied()
    }

    /// Number of times a school's leader has been advanced.
    #[must_use]
    pub fn school_tick_count(tank: &Tank, school: SchoolId) -> u64 {
        tank.schools.tick_count(school)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;

    use aquarium_core::{
        bounds::swim_bounds, tank::TankDimensions, Command, DecorKind, EggKind, Event, FishId,
        FlakePhase, FlakeRemoval, SaleError, STARTING_COINS,
    };
    use aquarium_system_motion::MotionKind;

    use crate::{apply, query, Tank};

    fn tick(tank: &mut Tank, seconds: f32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            tank,
            Command::Tick {
                dt: Duration::from_secs_f32(seconds),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn unaffordable_purchase_is_rejected_without_side_effects() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(
            &mut tank,
            Command::PurchaseEgg {
                kind: EggKind::Mythical,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PurchaseRejected {
                cost: 150,
                coins: STARTING_COINS,
            }]
        );
        assert_eq!(query::coins(&tank), STARTING_COINS);
        assert!(query::egg_view(&tank).is_empty());
    }

    #[test]
    fn purchased_egg_falls_and_lands_on_the_sand() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(
            &mut tank,
            Command::PurchaseEgg {
                kind: EggKind::Basic,
            },
            &mut events,
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EggPurchased { .. })));

        let mut landed = false;
        for _ in 0..400 {
            if tick(&mut tank, 0.05)
                .iter()
                .any(|event| matches!(event, Event::EggLanded { .. }))
            {
                landed = true;
                break;
            }
        }
        assert!(landed);
        let eggs = query::egg_view(&tank);
        assert_eq!(eggs.len(), 1);
        assert!(eggs[0].landed);
        let env = query::environment(&tank);
        assert!(eggs[0].position.y > env.inner_bottom());
        assert!(eggs[0].position.y < env.sand_top_y() + 0.2);
    }

    #[test]
    fn purchased_decoration_lands_and_stays_inside_the_walls() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(
            &mut tank,
            Command::PurchaseDecor {
                kind: DecorKind::Castle,
            },
            &mut events,
        );
        assert_eq!(query::coins(&tank), STARTING_COINS - 30);

        let mut landed = false;
        for _ in 0..400 {
            if tick(&mut tank, 0.05)
                .iter()
                .any(|event| matches!(event, Event::DecorLanded { .. }))
            {
                landed = true;
                break;
            }
        }
        assert!(landed);
        let decor = query::decor_view(&tank);
        let env = query::environment(&tank);
        assert_eq!(decor.len(), 1);
        assert!(decor[0].position.x - decor[0].half_extents.x >= env.inner_left() - 1e-4);
        assert!(decor[0].position.x + decor[0].half_extents.x <= env.inner_right() + 1e-4);
    }

    #[test]
    fn dragged_decoration_clamps_to_the_sand_region() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(
            &mut tank,
            Command::PurchaseDecor {
                kind: DecorKind::Rock,
            },
            &mut events,
        );
        let id = query::decor_view(&tank)[0].id;
        apply(&mut tank, Command::BeginDecorDrag { decor: id }, &mut events);
        apply(
            &mut tank,
            Command::DragDecorTo {
                decor: id,
                position: Vec2::new(100.0, 100.0),
            },
            &mut events,
        );
        apply(&mut tank, Command::EndDecorDrag { decor: id }, &mut events);

        let decor = query::decor_view(&tank)[0];
        let env = query::environment(&tank);
        assert!(decor.position.x + decor.half_extents.x <= env.inner_right() + 1e-4);
        assert!(decor.position.y <= env.sand_top_y() + 1e-4);
        assert!(decor.landed);
        assert!(!decor.dragging);
    }

    #[test]
    fn footprint_correction_applies_once_and_reclamps() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(
            &mut tank,
            Command::SpawnFish {
                kind: EggKind::Basic,
                position: Vec2::new(0.0, -3.0),
            },
            &mut events,
        );
        let id = query::fish_view(&tank)[0].id;

        let measured = Vec2::new(0.6, 0.3);
        apply(
            &mut tank,
            Command::CorrectFootprint {
                fish: id,
                half_extents: measured,
            },
            &mut events,
        );
        assert_eq!(query::fish_view(&tank)[0].half_extents, measured);

        // A second measurement must not displace the merged footprint.
        apply(
            &mut tank,
            Command::CorrectFootprint {
                fish: id,
                half_extents: Vec2::new(2.0, 2.0),
            },
            &mut events,
        );
        assert_eq!(query::fish_view(&tank)[0].half_extents, measured);
    }

    #[test]
    fn fish_lift_ends_in_the_swim_band_and_motion_resumes() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        let env = query::environment(&tank);
        apply(
            &mut tank,
            Command::SpawnFish {
                kind: EggKind::Basic,
                position: Vec2::new(0.0, env.sand_top_y()),
            },
            &mut events,
        );

        // Lift plus settle window.
        for _ in 0..60 {
            let _ = tick(&mut tank, 0.05);
        }
        let before = query::fish_view(&tank)[0].position;
        for _ in 0..20 {
            let _ = tick(&mut tank, 0.05);
        }
        let after = query::fish_view(&tank)[0].position;
        assert!((after.x - before.x).abs() > 1e-3, "patrol never resumed");

        let fish = query::fish_view(&tank)[0];
        let bounds = swim_bounds(
            &query::environment(&tank),
            fish.half_extents,
            MotionKind::for_egg(fish.kind).margins(),
        );
        assert!(bounds.contains(fish.position));
    }

    #[test]
    fn sale_of_a_juvenile_is_rejected() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(
            &mut tank,
            Command::SpawnFish {
                kind: EggKind::Basic,
                position: Vec2::new(0.0, -2.0),
            },
            &mut events,
        );
        let id = query::fish_view(&tank)[0].id;
        let _ = tick(&mut tank, 0.1);

        events.clear();
        apply(&mut tank, Command::SellFish { fish: id }, &mut events);
        assert_eq!(
            events,
            vec![Event::SaleRejected {
                fish: id,
                reason: SaleError::StillGrowing,
            }]
        );
        assert_eq!(query::coins(&tank), STARTING_COINS);
    }

    #[test]
    fn sale_of_an_unknown_fish_is_rejected() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        let ghost = FishId::new(99);
        apply(&mut tank, Command::SellFish { fish: ghost }, &mut events);
        assert_eq!(
            events,
            vec![Event::SaleRejected {
                fish: ghost,
                reason: SaleError::UnknownFish,
            }]
        );
    }

    #[test]
    fn dropped_flake_floats_then_sinks_then_is_buried() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(&mut tank, Command::DropFood { x: 0.0 }, &mut events);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::FlakeDropped { .. })));

        let mut saw_floating = false;
        let mut saw_sinking = false;
        let mut removal = None;
        for _ in 0..600 {
            let frame = tick(&mut tank, 0.05);
            if let Some(flake) = query::flake_view(&tank).first() {
                match flake.phase {
                    FlakePhase::Floating => saw_floating = true,
                    FlakePhase::Sinking => saw_sinking = true,
                    FlakePhase::Falling => {}
                }
            }
            if let Some(Event::FlakeRemoved { cause, .. }) = frame
                .iter()
                .find(|event| matches!(event, Event::FlakeRemoved { .. }))
            {
                removal = Some(*cause);
                break;
            }
        }
        assert!(saw_floating);
        assert!(saw_sinking);
        assert!(matches!(
            removal,
            Some(FlakeRemoval::Buried) | Some(FlakeRemoval::Expired)
        ));
        assert!(query::flake_view(&tank).is_empty());
    }

    #[test]
    fn consumed_flake_is_removed_with_the_eaten_cause() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(&mut tank, Command::DropFood { x: 1.0 }, &mut events);
        let id = query::flake_view(&tank)[0].id;

        events.clear();
        apply(&mut tank, Command::ConsumeFlake { flake: id }, &mut events);
        assert_eq!(
            events,
            vec![Event::FlakeRemoved {
                flake: id,
                cause: FlakeRemoval::Eaten,
            }]
        );
        assert!(query::flake_view(&tank).is_empty());
    }

    #[test]
    fn nearest_flake_picks_the_closest() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(&mut tank, Command::DropFood { x: -3.0 }, &mut events);
        apply(&mut tank, Command::DropFood { x: 3.0 }, &mut events);
        let flakes = query::flake_view(&tank);
        let near_right = query::nearest_flake(&tank, Vec2::new(3.0, 0.0));
        let right = flakes
            .iter()
            .max_by(|a, b| a.position.x.total_cmp(&b.position.x))
            .map(|flake| flake.id);
        assert_eq!(near_right, right);
    }

    #[test]
    fn visual_mode_change_announces_once() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(
            &mut tank,
            Command::SetVisualMode {
                mode: aquarium_core::VisualMode::Detailed,
            },
            &mut events,
        );
        apply(
            &mut tank,
            Command::SetVisualMode {
                mode: aquarium_core::VisualMode::Detailed,
            },
            &mut events,
        );
        let changes = events
            .iter()
            .filter(|event| matches!(event, Event::VisualModeChanged { .. }))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn invalid_resize_is_ignored() {
        let mut tank = Tank::new();
        let mut events = Vec::new();
        apply(
            &mut tank,
            Command::ConfigureTank {
                dimensions: TankDimensions::new(0.0, -2.0),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::dimensions(&tank), TankDimensions::new(16.0, 9.0));
    }
}
