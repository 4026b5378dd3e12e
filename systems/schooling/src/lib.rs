#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! School coordinator simulating one shared leader per school identifier.
//!
//! The registry is an explicit object owned by the running simulation, never
//! a process-wide global, so multiple tanks and tests can coexist. Leaders
//! are created lazily on first member registration and torn down when the
//! last member leaves. Only [`SchoolRegistry::tick_all`] mutates leader
//! state; member fish read it through [`SchoolRegistry::leader`].

use std::collections::BTreeMap;

use glam::Vec2;

use aquarium_core::{
    school::{LeaderState, SchoolId},
    snapshot::LeaderSnapshot,
    tank::TankEnvironment,
};
use aquarium_system_motion::steering::{seek_step, SeekParams};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Shortest interval before a leader picks a new target, in seconds.
pub const RETARGET_MIN_SECS: f32 = 2.8;

/// Width of the randomized retarget window added on top of the minimum.
pub const RETARGET_SPAN_SECS: f32 = 2.4;

/// Distance at which a leader counts as having arrived at its target.
const ARRIVAL_EPSILON: f32 = 0.15;

/// Clearance kept between leader targets and the water rectangle edges.
const TARGET_INSET: f32 = 0.3;

/// Explicit per-simulation registry of school leaders.
#[derive(Clone, Debug)]
pub struct SchoolRegistry {
    leaders: BTreeMap<SchoolId, Leader>,
    seed: u64,
}

#[derive(Clone, Debug)]
struct Leader {
    state: LeaderState,
    retarget_at: f32,
    members: u32,
    rng_state: u64,
    last_tick: Option<u64>,
    tick_count: u64,
}

impl SchoolRegistry {
    /// Creates an empty registry seeded for deterministic target selection.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            leaders: BTreeMap::new(),
            seed,
        }
    }

    /// Registers a member with a school, creating the leader on first use.
    ///
    /// Returns the stable formation index assigned to the member.
    pub fn register(&mut self, school: SchoolId, env: &TankEnvironment, elapsed: f32) -> u32 {
        let seed = self.seed;
        let leader = self.leaders.entry(school).or_insert_with(|| {
            let mut rng_state = seed ^ (u64::from(school.get()).wrapping_mul(RNG_MULTIPLIER));
            let position = random_water_point(&mut rng_state, env);
            let target = random_water_point(&mut rng_state, env);
            Leader {
                state: LeaderState {
                    position,
                    velocity: Vec2::ZERO,
                    target,
                },
                retarget_at: elapsed + RETARGET_MIN_SECS + next_unit(&mut rng_state) * RETARGET_SPAN_SECS,
                members: 0,
                rng_state,
                last_tick: None,
                tick_count: 0,
            }
        });

        let index = leader.members;
        leader.members += 1;
        index
    }

    /// Removes a member from a school.
    ///
    /// The leader is dropped when its last member leaves, so retained state
    /// stays bounded by the set of live schools.
    pub fn unregister(&mut self, school: SchoolId) {
        let empty = match self.leaders.get_mut(&school) {
            Some(leader) => {
                leader.members = leader.members.saturating_sub(1);
                leader.members == 0
            }
            None => false,
        };
        if empty {
            let _ = self.leaders.remove(&school);
        }
    }

    /// Advances every leader one step, at most once per frame.
    ///
    /// Callers may invoke this from multiple member update paths; the frame
    /// stamp makes repeated calls within one frame idempotent so formation
    /// math stays stable regardless of member count.
    pub fn tick_all(&mut self, frame: u64, dt: f32, elapsed: f32, env: &TankEnvironment) {
        for leader in self.leaders.values_mut() {
            if leader.last_tick == Some(frame) {
                continue;
            }
            leader.last_tick = Some(frame);
            leader.tick_count += 1;

            let arrived =
                (leader.state.target - leader.state.position).length() < ARRIVAL_EPSILON;
            if arrived || elapsed >= leader.retarget_at {
                leader.state.target = random_water_point(&mut leader.rng_state, env);
                leader.retarget_at =
                    elapsed + RETARGET_MIN_SECS + next_unit(&mut leader.rng_state) * RETARGET_SPAN_SECS;
            }

            leader.state.velocity = seek_step(
                leader.state.position,
                leader.state.velocity,
                leader.state.target,
                SeekParams::leader(),
                dt,
            );
            leader.state.position += leader.state.velocity * dt;
            leader.state.position = env.clamp_to_water(leader.state.position);
        }
    }

    /// Read-only access to a school's leader record.
    #[must_use]
    pub fn leader(&self, school: SchoolId) -> Option<&LeaderState> {
        self.leaders.get(&school).map(|leader| &leader.state)
    }

    /// Number of members registered with a school.
    #[must_use]
    pub fn member_count(&self, school: SchoolId) -> u32 {
        self.leaders.get(&school).map_or(0, |leader| leader.members)
    }

    /// Number of times a school's leader has been advanced.
    ///
    /// Exposed so tests can verify the once-per-frame guarantee.
    #[must_use]
    pub fn tick_count(&self, school: SchoolId) -> u64 {
        self.leaders
            .get(&school)
            .map_or(0, |leader| leader.tick_count)
    }

    /// Number of live schools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.leaders.len()
    }

    /// Reports whether no schools are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaders.is_empty()
    }

    /// Rescales every leader after a tank resize, then re-clamps.
    ///
    /// Positions and targets scale proportionally to the change in tank
    /// height so the formation keeps its relative on-screen placement.
    pub fn rescale_and_clamp(&mut self, scale: f32, env: &TankEnvironment) {
        for leader in self.leaders.values_mut() {
            leader.state.position = env.clamp_to_water(leader.state.position * scale);
            leader.state.target = env.clamp_to_water(leader.state.target * scale);
        }
    }

    /// Captures every leader into its plain snapshot form.
    #[must_use]
    pub fn to_snapshots(&self) -> Vec<LeaderSnapshot> {
        self.leaders
            .iter()
            .map(|(school, leader)| LeaderSnapshot {
                school: *school,
                position: leader.state.position,
                velocity: leader.state.velocity,
                target: leader.state.target,
                retarget_at: leader.retarget_at,
                members: leader.members,
                rng_state: leader.rng_state,
            })
            .collect()
    }

    /// Rebuilds a registry from captured leader snapshots.
    #[must_use]
    pub fn from_snapshots(seed: u64, snapshots: &[LeaderSnapshot]) -> Self {
        let mut registry = Self::new(seed);
        for snapshot in snapshots {
            let _ = registry.leaders.insert(
                snapshot.school,
                Leader {
                    state: LeaderState {
                        position: snapshot.position,
                        velocity: snapshot.velocity,
                        target: snapshot.target,
                    },
                    retarget_at: snapshot.retarget_at,
                    members: snapshot.members,
                    rng_state: snapshot.rng_state,
                    last_tick: None,
                    tick_count: 0,
                },
            );
        }
        registry
    }
}

fn next_random(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(RNG_MULTIPLIER).wrapping_add(RNG_INCREMENT);
    *state
}

fn next_unit(state: &mut u64) -> f32 {
    (next_random(state) >> 40) as f32 / (1u64 << 24) as f32
}

fn random_water_point(state: &mut u64, env: &TankEnvironment) -> Vec2 {
    let x_min = env.inner_left() + TARGET_INSET;
    let x_max = env.inner_right() - TARGET_INSET;
    let y_min = env.sand_top_y() + TARGET_INSET;
    let y_max = env.inner_top() - TARGET_INSET;

    let x = if x_max > x_min {
        x_min + next_unit(state) * (x_max - x_min)
    } else {
        (env.inner_left() + env.inner_right()) / 2.0
    };
    let y = if y_max > y_min {
        y_min + next_unit(state) * (y_max - y_min)
    } else {
        (env.sand_top_y() + env.inner_top()) / 2.0
    };
    Vec2::new(x, y)
}
