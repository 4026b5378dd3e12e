#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-kind motion profiles for every swimming entity.
//!
//! Each fish kind is a distinct named behavior over the same contract:
//! [`advance`] moves a [`MotionState`] one step subject to a
//! [`SwimBounds`] rectangle. The shared primitives are patrol (reverse on
//! wall contact with a debounced direction change), bob (sinusoidal offset
//! applied to the rendered position only), drift/swerve (a second sinusoid
//! with a distinct period perturbing the logical path), and formation
//! steering relative to a school leader.

pub mod steering;

use glam::Vec2;

use aquarium_core::{
    bounds::{MarginSpec, SwimBounds},
    school::LeaderState,
    snapshot::MotionSnapshot,
    EggKind, Facing,
};
use steering::{seek_step, SeekParams};

/// Seconds a mover refuses to reverse again after a direction change.
///
/// Prevents an entity sitting exactly on a boundary from flipping every
/// frame.
pub const FLIP_COOLDOWN_SECS: f32 = 0.15;

/// Distance a formation member trails behind the leader per rank.
const TRAIL_GAP: f32 = 0.45;

/// Perpendicular spread between formation columns.
const LATERAL_SPREAD: f32 = 0.3;

/// Amplitude of the independent vertical bob applied to member targets.
const MEMBER_BOB_AMPLITUDE: f32 = 0.06;

/// Rate of the independent vertical bob applied to member targets.
const MEMBER_BOB_RATE: f32 = 2.4;

/// Motion behavior selected by an explicit kind tag.
///
/// Kind-specific data lives in the parameter tables below rather than in
/// optional fields probed at call sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionKind {
    /// Plain horizontal patrol with a light bob.
    Basic,
    /// Formation steering relative to a school leader.
    Schooling,
    /// Brisk patrol with a pronounced secondary swerve.
    Tropical,
    /// Slow patrol with a deep bob, confined below mid-water.
    Reef,
    /// Barely-moving drift with a long-period swerve.
    Ornamental,
    /// Bottom-band patrol just above the sand.
    DeepSea,
    /// Fast, wide-ranging patrol with a large swerve.
    Mythical,
}

impl MotionKind {
    /// Selects the motion profile for a hatched egg kind.
    #[must_use]
    pub const fn for_egg(kind: EggKind) -> Self {
        match kind {
            EggKind::Basic => Self::Basic,
            EggKind::Schooling => Self::Schooling,
            EggKind::Tropical => Self::Tropical,
            EggKind::Reef => Self::Reef,
            EggKind::Ornamental => Self::Ornamental,
            EggKind::DeepSea => Self::DeepSea,
            EggKind::Mythical => Self::Mythical,
        }
    }

    /// Tuning constants for this kind.
    #[must_use]
    pub const fn params(self) -> MotionParams {
        match self {
            Self::Basic => MotionParams {
                patrol_speed: 0.8,
                bob_amplitude: 0.08,
                bob_rate: 2.0,
                swerve_amplitude: 0.0,
                swerve_rate: 0.0,
                facing_deadband: 0.0,
                facing_confirm_secs: 0.0,
            },
            Self::Schooling => MotionParams {
                patrol_speed: 0.9,
                bob_amplitude: 0.05,
                bob_rate: 2.6,
                swerve_amplitude: 0.0,
                swerve_rate: 0.0,
                facing_deadband: 0.12,
                facing_confirm_secs: 0.25,
            },
            Self::Tropical => MotionParams {
                patrol_speed: 1.1,
                bob_amplitude: 0.07,
                bob_rate: 2.6,
                swerve_amplitude: 0.25,
                swerve_rate: 0.6,
                facing_deadband: 0.0,
                facing_confirm_secs: 0.0,
            },
            Self::Reef => MotionParams {
                patrol_speed: 0.45,
                bob_amplitude: 0.18,
                bob_rate: 1.4,
                swerve_amplitude: 0.0,
                swerve_rate: 0.0,
                facing_deadband: 0.0,
                facing_confirm_secs: 0.0,
            },
            Self::Ornamental => MotionParams {
                patrol_speed: 0.25,
                bob_amplitude: 0.12,
                bob_rate: 1.1,
                swerve_amplitude: 0.2,
                swerve_rate: 0.35,
                facing_deadband: 0.0,
                facing_confirm_secs: 0.0,
            },
            Self::DeepSea => MotionParams {
                patrol_speed: 0.5,
                bob_amplitude: 0.05,
                bob_rate: 1.8,
                swerve_amplitude: 0.0,
                swerve_rate: 0.0,
                facing_deadband: 0.0,
                facing_confirm_secs: 0.0,
            },
            Self::Mythical => MotionParams {
                patrol_speed: 1.6,
                bob_amplitude: 0.1,
                bob_rate: 2.2,
                swerve_amplitude: 0.45,
                swerve_rate: 0.5,
                facing_deadband: 0.0,
                facing_confirm_secs: 0.0,
            },
        }
    }

    /// Margin fractions feeding the bounds calculator for this kind.
    #[must_use]
    pub const fn margins(self) -> MarginSpec {
        match self {
            Self::Basic | Self::Schooling | Self::Tropical => MarginSpec::open_water(),
            Self::Reef => MarginSpec {
                side_fraction: 0.015,
                side_floor: 0.08,
                ceiling_fraction: 0.55,
                top_buffer: 0.2,
                bottom_fraction: 0.01,
                bottom_floor: 0.05,
            },
            Self::Ornamental => MarginSpec {
                side_fraction: 0.02,
                side_floor: 0.1,
                ceiling_fraction: 0.8,
                top_buffer: 0.2,
                bottom_fraction: 0.02,
                bottom_floor: 0.08,
            },
            Self::DeepSea => MarginSpec {
                side_fraction: 0.01,
                side_floor: 0.05,
                ceiling_fraction: 0.38,
                top_buffer: 0.3,
                bottom_fraction: 0.005,
                bottom_floor: 0.03,
            },
            Self::Mythical => MarginSpec {
                side_fraction: 0.005,
                side_floor: 0.05,
                ceiling_fraction: 0.9,
                top_buffer: 0.12,
                bottom_fraction: 0.01,
                bottom_floor: 0.05,
            },
        }
    }
}

/// Tuning constants shared by the patrol/bob/swerve primitives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    /// Constant horizontal patrol speed in world units per second.
    pub patrol_speed: f32,
    /// Amplitude of the rendered-only vertical bob.
    pub bob_amplitude: f32,
    /// Angular rate of the rendered-only vertical bob.
    pub bob_rate: f32,
    /// Amplitude of the logical-path swerve sinusoid.
    pub swerve_amplitude: f32,
    /// Angular rate of the logical-path swerve sinusoid.
    pub swerve_rate: f32,
    /// Horizontal speed below which facing is left unchanged.
    pub facing_deadband: f32,
    /// Seconds a new facing must hold its sign before the flip is applied.
    pub facing_confirm_secs: f32,
}

/// Mutable motion state carried by every swimming entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionState {
    /// Logical position in world units.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Current visual facing.
    pub facing: Facing,
    /// Per-instance oscillator seed decorrelating bob and swerve phases.
    pub phase: f32,
    /// Seconds remaining on the direction-change cooldown.
    pub flip_cooldown: f32,
    /// Seconds the pending facing has held its sign.
    pub facing_hold: f32,
    /// Facing awaiting sign confirmation, if any.
    pub pending_facing: Option<Facing>,
}

impl MotionState {
    /// Creates a fresh motion state at the provided position.
    #[must_use]
    pub const fn new(position: Vec2, phase: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            phase,
            flip_cooldown: 0.0,
            facing_hold: 0.0,
            pending_facing: None,
        }
    }

    /// Captures the state into its plain snapshot form.
    #[must_use]
    pub const fn to_snapshot(&self) -> MotionSnapshot {
        MotionSnapshot {
            position: self.position,
            velocity: self.velocity,
            facing: self.facing,
            phase: self.phase,
            flip_cooldown: self.flip_cooldown,
            facing_hold: self.facing_hold,
            pending_facing: self.pending_facing,
        }
    }

    /// Rebuilds a state from its snapshot form.
    #[must_use]
    pub const fn from_snapshot(snapshot: &MotionSnapshot) -> Self {
        Self {
            position: snapshot.position,
            velocity: snapshot.velocity,
            facing: snapshot.facing,
            phase: snapshot.phase,
            flip_cooldown: snapshot.flip_cooldown,
            facing_hold: snapshot.facing_hold,
            pending_facing: snapshot.pending_facing,
        }
    }
}

/// Formation slot occupied by a schooling fish.
#[derive(Clone, Copy, Debug)]
pub struct FormationSlot<'a> {
    /// Shared leader record the member steers relative to.
    pub leader: &'a LeaderState,
    /// Stable formation index assigned at registration.
    pub member_index: u32,
}

/// Advances a motion state one step.
///
/// Schooling fish steer toward their formation slot when a leader is
/// provided and patrol like a basic fish until one exists. All other kinds
/// patrol with their kind-specific bob and swerve.
pub fn advance(
    state: &mut MotionState,
    kind: MotionKind,
    bounds: &SwimBounds,
    slot: Option<FormationSlot<'_>>,
    dt: f32,
    elapsed: f32,
) {
    let params = kind.params();
    match (kind, slot) {
        (MotionKind::Schooling, Some(slot)) => {
            advance_member(state, &params, slot, bounds, dt, elapsed);
        }
        _ => advance_patrol(state, &params, bounds, dt, elapsed),
    }
}

/// Rendered position for the current frame: logical position plus the bob
/// offset, clamped so the bob can never push the visual outside the band.
#[must_use]
pub fn rendered_position(
    state: &MotionState,
    kind: MotionKind,
    bounds: &SwimBounds,
    elapsed: f32,
) -> Vec2 {
    let params = kind.params();
    let bob = (elapsed * params.bob_rate + state.phase).sin() * params.bob_amplitude;
    bounds.clamp(Vec2::new(state.position.x, state.position.y + bob))
}

fn advance_patrol(
    state: &mut MotionState,
    params: &MotionParams,
    bounds: &SwimBounds,
    dt: f32,
    elapsed: f32,
) {
    state.flip_cooldown = (state.flip_cooldown - dt).max(0.0);

    if state.velocity.x.abs() < 1e-6 {
        let sign = match state.facing {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        };
        state.velocity.x = params.patrol_speed * sign;
    }

    state.position.x += state.velocity.x * dt;

    if state.position.x >= bounds.x_max && state.velocity.x > 0.0 {
        state.position.x = bounds.x_max;
        if state.flip_cooldown <= 0.0 {
            state.velocity.x = -params.patrol_speed;
            state.flip_cooldown = FLIP_COOLDOWN_SECS;
        }
    } else if state.position.x <= bounds.x_min && state.velocity.x < 0.0 {
        state.position.x = bounds.x_min;
        if state.flip_cooldown <= 0.0 {
            state.velocity.x = params.patrol_speed;
            state.flip_cooldown = FLIP_COOLDOWN_SECS;
        }
    }

    if params.swerve_amplitude > 0.0 {
        let angle = elapsed * params.swerve_rate + state.phase;
        state.velocity.y = params.swerve_amplitude * params.swerve_rate * angle.cos();
        state.position.y += state.velocity.y * dt;
    }
    state.position.y = state.position.y.clamp(bounds.y_min, bounds.y_max);

    update_facing(state, params, dt);
}

fn advance_member(
    state: &mut MotionState,
    params: &MotionParams,
    slot: FormationSlot<'_>,
    bounds: &SwimBounds,
    dt: f32,
    elapsed: f32,
) {
    state.flip_cooldown = (state.flip_cooldown - dt).max(0.0);

    let target = formation_target(slot, state.phase, elapsed);
    state.velocity = seek_step(
        state.position,
        state.velocity,
        target,
        SeekParams::member(),
        dt,
    );
    state.position += state.velocity * dt;
    state.position = bounds.clamp(state.position);

    update_facing(state, params, dt);
}

/// Point in the formation a member steers toward.
///
/// Members trail the leader along its heading, staggered by rank, spread to
/// alternating sides perpendicular to the heading, and bob independently.
#[must_use]
pub fn formation_target(slot: FormationSlot<'_>, phase: f32, elapsed: f32) -> Vec2 {
    let heading = slot.leader.heading();
    let perpendicular = Vec2::new(-heading.y, heading.x);

    let rank = (slot.member_index + 1) as f32;
    let side = if slot.member_index % 2 == 0 { 1.0 } else { -1.0 };
    let column = (slot.member_index / 2 + 1) as f32;

    let mut target = slot.leader.position - heading * (TRAIL_GAP * rank)
        + perpendicular * (LATERAL_SPREAD * column * side);
    target.y += (elapsed * MEMBER_BOB_RATE + phase).sin() * MEMBER_BOB_AMPLITUDE;
    target
}

fn update_facing(state: &mut MotionState, params: &MotionParams, dt: f32) {
    let candidate = Facing::from_velocity_x(state.velocity.x, params.facing_deadband);

    match candidate {
        None => {
            state.pending_facing = None;
            state.facing_hold = 0.0;
        }
        Some(candidate) if candidate == state.facing => {
            state.pending_facing = None;
            state.facing_hold = 0.0;
        }
        Some(candidate) => {
            if params.facing_confirm_secs <= 0.0 {
                state.facing = candidate;
                state.pending_facing = None;
                state.facing_hold = 0.0;
            } else if state.pending_facing == Some(candidate) {
                state.facing_hold += dt;
                if state.facing_hold >= params.facing_confirm_secs {
                    state.facing = candidate;
                    state.pending_facing = None;
                    state.facing_hold = 0.0;
                }
            } else {
                state.pending_facing = Some(candidate);
                state.facing_hold = 0.0;
            }
        }
    }
}

/// Multi-axis rotation offsets for renderers lacking a baked swim clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WiggleOffsets {
    /// Rotation offset around the lateral axis, in radians.
    pub pitch: f32,
    /// Rotation offset around the vertical axis, in radians.
    pub yaw: f32,
    /// Rotation offset around the forward axis, in radians.
    pub roll: f32,
}

/// Procedural wiggle fallback, independent of translation.
///
/// Each axis uses a distinct rate so the combined motion never settles into
/// a visible loop.
#[must_use]
pub fn procedural_wiggle(phase: f32, elapsed: f32) -> WiggleOffsets {
    WiggleOffsets {
        pitch: (elapsed * 3.1 + phase).sin() * 0.06,
        yaw: (elapsed * 4.7 + phase * 1.3).sin() * 0.18,
        roll: (elapsed * 2.3 + phase * 0.7).sin() * 0.04,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        advance, formation_target, procedural_wiggle, rendered_position, FormationSlot,
        MotionKind, MotionState,
    };
    use aquarium_core::{bounds::SwimBounds, school::LeaderState, Facing};
    use glam::Vec2;

    fn band() -> SwimBounds {
        SwimBounds {
            x_min: -3.0,
            x_max: 3.0,
            y_min: -1.0,
            y_max: 1.0,
        }
    }

    #[test]
    fn patrol_reverses_at_right_wall() {
        let bounds = band();
        let mut state = MotionState::new(Vec2::new(2.95, 0.0), 0.0);
        for _ in 0..20 {
            advance(&mut state, MotionKind::Basic, &bounds, None, 0.05, 0.0);
        }
        assert!(state.velocity.x < 0.0);
        assert!(state.position.x <= bounds.x_max);
        assert_eq!(state.facing, Facing::Left);
    }

    #[test]
    fn boundary_flips_are_debounced() {
        let bounds = band();
        let mut state = MotionState::new(Vec2::new(bounds.x_max, 0.0), 0.0);
        state.velocity.x = 0.8;

        let mut flips = 0;
        for frame in 0..5 {
            // Pin the entity to the wall so every frame re-tests the flip.
            state.position.x = bounds.x_max;
            if state.velocity.x < 0.0 {
                state.velocity.x = -state.velocity.x;
            }
            let sign_before = state.velocity.x.signum();
            advance(
                &mut state,
                MotionKind::Basic,
                &bounds,
                None,
                0.01,
                frame as f32 * 0.01,
            );
            if state.velocity.x.signum() != sign_before {
                flips += 1;
            }
        }
        assert!(flips <= 1, "expected at most one flip, saw {flips}");
    }

    #[test]
    fn bob_never_escapes_band() {
        let bounds = SwimBounds {
            x_min: -3.0,
            x_max: 3.0,
            y_min: -0.05,
            y_max: 0.05,
        };
        let state = MotionState::new(Vec2::new(0.0, 0.05), 1.3);
        for step in 0..100 {
            let rendered = rendered_position(&state, MotionKind::Reef, &bounds, step as f32 * 0.1);
            assert!(rendered.y >= bounds.y_min && rendered.y <= bounds.y_max);
        }
    }

    #[test]
    fn swerve_stays_inside_band() {
        let bounds = band();
        let mut state = MotionState::new(Vec2::new(0.0, 0.9), 0.4);
        for step in 0..400 {
            advance(
                &mut state,
                MotionKind::Mythical,
                &bounds,
                None,
                0.05,
                step as f32 * 0.05,
            );
            assert!(bounds.contains(state.position));
        }
    }

    #[test]
    fn member_trails_behind_leader() {
        let leader = LeaderState {
            position: Vec2::new(1.0, 0.0),
            velocity: Vec2::new(1.0, 0.0),
            target: Vec2::new(3.0, 0.0),
        };
        let slot = FormationSlot {
            leader: &leader,
            member_index: 0,
        };
        let target = formation_target(slot, 0.0, 0.0);
        assert!(target.x < leader.position.x);
    }

    #[test]
    fn members_spread_to_alternating_sides() {
        let leader = LeaderState {
            position: Vec2::ZERO,
            velocity: Vec2::new(1.0, 0.0),
            target: Vec2::new(3.0, 0.0),
        };
        let first = formation_target(
            FormationSlot {
                leader: &leader,
                member_index: 0,
            },
            0.0,
            0.0,
        );
        let second = formation_target(
            FormationSlot {
                leader: &leader,
                member_index: 1,
            },
            0.0,
            0.0,
        );
        assert!(first.y * second.y < 0.0, "expected opposite sides");
    }

    #[test]
    fn schooling_facing_requires_held_sign() {
        let bounds = band();
        let leader = LeaderState {
            position: Vec2::new(-2.0, 0.0),
            velocity: Vec2::new(-1.0, 0.0),
            target: Vec2::new(-2.5, 0.0),
        };
        let mut state = MotionState::new(Vec2::new(2.0, 0.0), 0.0);
        state.velocity = Vec2::new(0.5, 0.0);

        let slot = FormationSlot {
            leader: &leader,
            member_index: 0,
        };
        advance(&mut state, MotionKind::Schooling, &bounds, Some(slot), 0.05, 0.0);
        // One frame of leftward pull must not flip the facing yet.
        assert_eq!(state.facing, Facing::Right);

        for step in 1..40 {
            advance(
                &mut state,
                MotionKind::Schooling,
                &bounds,
                Some(slot),
                0.05,
                step as f32 * 0.05,
            );
        }
        assert_eq!(state.facing, Facing::Left);
    }

    #[test]
    fn schooling_without_leader_falls_back_to_patrol() {
        let bounds = band();
        let mut state = MotionState::new(Vec2::ZERO, 0.0);
        advance(&mut state, MotionKind::Schooling, &bounds, None, 0.1, 0.0);
        assert!(state.velocity.x.abs() > 0.0);
    }

    #[test]
    fn wiggle_axes_use_distinct_periods() {
        let early = procedural_wiggle(0.0, 0.25);
        let late = procedural_wiggle(0.0, 0.75);
        assert_ne!(early, late);
        assert!(early.yaw.abs() <= 0.18 + f32::EPSILON);
    }
}
