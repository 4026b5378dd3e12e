//! Plain serializable captures of every entity's physical and lifecycle
//! state.
//!
//! A snapshot is sufficient to rebuild the whole tank after its visual
//! representations are destroyed (mode toggle, resize) with zero loss of
//! simulation state. Restoring never resets ages and never re-fires hatch or
//! lift sequences; the lifecycle flags carried here gate those exactly-once
//! transitions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    school::SchoolId, tank::TankDimensions, DecorId, DecorKind, EggId, EggKind, Facing, FishId,
    FlakeId, FlakePhase, VisualMode,
};

/// Complete capture of the tank's simulation state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TankSnapshot {
    /// Dimensions the captured positions are valid under.
    pub dimensions: TankDimensions,
    /// Coin balance at capture time.
    pub coins: u32,
    /// Visual mode active at capture time.
    pub visual_mode: VisualMode,
    /// Simulation clock at capture time, in seconds.
    pub elapsed: f32,
    /// Frame counter at capture time.
    pub tick_index: u64,
    /// Deterministic generator state at capture time.
    pub rng_state: u64,
    /// Next identifier values so restored tanks never reuse ids.
    pub next_ids: NextIds,
    /// Captured eggs.
    pub eggs: Vec<EggSnapshot>,
    /// Captured decorations.
    pub decor: Vec<DecorSnapshot>,
    /// Captured fish.
    pub fish: Vec<FishSnapshot>,
    /// Captured food flakes.
    pub flakes: Vec<FlakeSnapshot>,
    /// Captured school leaders.
    pub leaders: Vec<LeaderSnapshot>,
}

/// Identifier allocation counters carried across a rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextIds {
    /// Next egg identifier value.
    pub egg: u32,
    /// Next fish identifier value.
    pub fish: u32,
    /// Next decoration identifier value.
    pub decor: u32,
    /// Next flake identifier value.
    pub flake: u32,
}

/// Captured physical and lifecycle state of one egg.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EggSnapshot {
    /// Identifier of the captured egg.
    pub id: EggId,
    /// Kind of the captured egg.
    pub kind: EggKind,
    /// Position at capture time.
    pub position: Vec2,
    /// Velocity at capture time.
    pub velocity: Vec2,
    /// Whether the egg had settled onto the sand.
    pub landed: bool,
    /// Seconds since the egg was purchased.
    pub age: f32,
    /// Randomized incubation threshold assigned at purchase.
    pub hatch_at: f32,
    /// Whether the hatch event already fired.
    pub did_hatch: bool,
    /// Seconds remaining in the post-hatch shrink-out.
    pub shrink_left: f32,
}

/// Captured physical state of one decoration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorSnapshot {
    /// Identifier of the captured decoration.
    pub id: DecorId,
    /// Kind of the captured decoration.
    pub kind: DecorKind,
    /// Position at capture time.
    pub position: Vec2,
    /// Velocity at capture time.
    pub velocity: Vec2,
    /// Whether the decoration had settled onto the sand.
    pub landed: bool,
    /// Whether the pointer was dragging the decoration.
    pub dragging: bool,
}

/// Captured motion-profile state shared by every fish kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionSnapshot {
    /// Logical position at capture time.
    pub position: Vec2,
    /// Velocity at capture time.
    pub velocity: Vec2,
    /// Visual facing at capture time.
    pub facing: Facing,
    /// Per-instance oscillator seed.
    pub phase: f32,
    /// Seconds remaining on the direction-change cooldown.
    pub flip_cooldown: f32,
    /// Seconds the pending facing has held its sign.
    pub facing_hold: f32,
    /// Facing awaiting sign confirmation, if any.
    pub pending_facing: Option<Facing>,
}

/// Captured physical and lifecycle state of one fish.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FishSnapshot {
    /// Identifier of the captured fish.
    pub id: FishId,
    /// Egg kind the fish hatched from.
    pub kind: EggKind,
    /// Captured motion-profile state.
    pub motion: MotionSnapshot,
    /// Simulation clock value at which the fish was born.
    pub born_elapsed: f32,
    /// Seconds the fish needs to reach adult size.
    pub grow_dur: f32,
    /// Half extents in use at capture time.
    pub half_extents: Vec2,
    /// Whether a measured footprint replaced the placeholder extents.
    pub footprint_measured: bool,
    /// Y coordinate the post-hatch lift started from.
    pub lift_from_y: f32,
    /// Simulation clock value at which the lift started.
    pub lift_started: f32,
    /// Whether the post-hatch lift completed.
    pub lift_done: bool,
    /// Simulation clock value until which ordinary motion stays suppressed.
    pub settle_until: f32,
    /// Whether the maturity event already fired.
    pub matured_announced: bool,
    /// School membership, if the fish is a schooling kind.
    pub school: Option<SchoolMembership>,
}

/// Formation slot a schooling fish occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolMembership {
    /// School the fish belongs to.
    pub school: SchoolId,
    /// Stable formation index assigned at registration.
    pub member_index: u32,
}

/// Captured physical state of one food flake.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlakeSnapshot {
    /// Identifier of the captured flake.
    pub id: FlakeId,
    /// Position at capture time.
    pub position: Vec2,
    /// Velocity at capture time.
    pub velocity: Vec2,
    /// Descent phase at capture time.
    pub phase: FlakePhase,
    /// Seconds of lifetime remaining.
    pub lifetime_left: f32,
}

/// Captured state of one school leader.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderSnapshot {
    /// School the leader belongs to.
    pub school: SchoolId,
    /// Leader position at capture time.
    pub position: Vec2,
    /// Leader velocity at capture time.
    pub velocity: Vec2,
    /// Target the leader was seeking.
    pub target: Vec2,
    /// Simulation clock value at which the leader retargets.
    pub retarget_at: f32,
    /// Registered member count at capture time.
    pub members: u32,
    /// Deterministic generator state used for target selection.
    pub rng_state: u64,
}

#[cfg(test)]
mod tests {
    use super::{
        DecorSnapshot, EggSnapshot, FishSnapshot, FlakeSnapshot, LeaderSnapshot, MotionSnapshot,
        NextIds, SchoolMembership, TankSnapshot,
    };
    use crate::{
        school::SchoolId, tank::TankDimensions, DecorId, DecorKind, EggId, EggKind, Facing, FishId,
        FlakeId, FlakePhase, VisualMode,
    };
    use glam::Vec2;

    fn sample_snapshot() -> TankSnapshot {
        TankSnapshot {
            dimensions: TankDimensions::new(16.0, 9.0),
            coins: 42,
            visual_mode: VisualMode::Detailed,
            elapsed: 12.5,
            tick_index: 750,
            rng_state: 0x1234_5678,
            next_ids: NextIds {
                egg: 3,
                fish: 2,
                decor: 1,
                flake: 5,
            },
            eggs: vec![EggSnapshot {
                id: EggId::new(2),
                kind: EggKind::Tropical,
                position: Vec2::new(1.0, -2.0),
                velocity: Vec2::ZERO,
                landed: true,
                age: 4.5,
                hatch_at: 9.2,
                did_hatch: false,
                shrink_left: 0.0,
            }],
            decor: vec![DecorSnapshot {
                id: DecorId::new(0),
                kind: DecorKind::Castle,
                position: Vec2::new(-3.0, -2.6),
                velocity: Vec2::ZERO,
                landed: true,
                dragging: false,
            }],
            fish: vec![FishSnapshot {
                id: FishId::new(1),
                kind: EggKind::Schooling,
                motion: MotionSnapshot {
                    position: Vec2::new(2.0, 0.5),
                    velocity: Vec2::new(-0.8, 0.1),
                    facing: Facing::Left,
                    phase: 3.7,
                    flip_cooldown: 0.05,
                    facing_hold: 0.1,
                    pending_facing: Some(Facing::Right),
                },
                born_elapsed: 5.0,
                grow_dur: 20.0,
                half_extents: Vec2::new(0.35, 0.2),
                footprint_measured: false,
                lift_from_y: -2.5,
                lift_started: 5.0,
                lift_done: true,
                settle_until: 7.8,
                matured_announced: false,
                school: Some(SchoolMembership {
                    school: SchoolId::new(0),
                    member_index: 2,
                }),
            }],
            flakes: vec![FlakeSnapshot {
                id: FlakeId::new(4),
                position: Vec2::new(0.0, 3.0),
                velocity: Vec2::new(0.0, -0.4),
                phase: FlakePhase::Sinking,
                lifetime_left: 6.0,
            }],
            leaders: vec![LeaderSnapshot {
                school: SchoolId::new(0),
                position: Vec2::new(1.5, 0.2),
                velocity: Vec2::new(0.9, -0.1),
                target: Vec2::new(-2.0, 1.0),
                retarget_at: 15.4,
                members: 3,
                rng_state: 99,
            }],
        }
    }

    #[test]
    fn tank_snapshot_round_trips_through_bincode() {
        let snapshot = sample_snapshot();
        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: TankSnapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
    }
}
