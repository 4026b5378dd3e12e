#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the aquarium engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative tank, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the tank executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

pub mod bounds;
pub mod school;
pub mod snapshot;
pub mod tank;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tank::TankDimensions;

/// Coin balance granted to a fresh tank before any purchase.
pub const STARTING_COINS: u32 = 30;

/// Multiplier applied to an egg's purchase cost when the grown fish is sold.
pub const SELL_MARKUP: f32 = 1.12;

/// Minimum coin payout for selling any fully grown fish.
pub const MIN_SELL_PRICE: u32 = 5;

/// Earliest possible incubation time before an egg hatches, in seconds.
pub const HATCH_MIN_SECS: f32 = 7.5;

/// Width of the randomized incubation window added on top of [`HATCH_MIN_SECS`].
pub const HATCH_SPAN_SECS: f32 = 5.0;

/// Duration of the post-hatch shrink-and-fade animation, in seconds.
pub const EGG_SHRINK_SECS: f32 = 0.26;

/// Duration of the post-hatch upward lift animation, in seconds.
pub const LIFT_SECS: f32 = 2.2;

/// Vertical distance covered by the post-hatch lift, in world units.
pub const LIFT_DISTANCE: f32 = 0.9;

/// Length of the settle window after the lift completes, in seconds.
pub const SETTLE_SECS: f32 = 0.6;

/// Visual scale of a freshly hatched fish relative to its adult size.
pub const JUVENILE_SCALE: f32 = 0.35;

/// Lifetime of a dropped food flake before it dissolves, in seconds.
pub const FLAKE_LIFETIME_SECS: f32 = 14.0;

/// Kinds of eggs available in the shop, ordered from cheapest to rarest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EggKind {
    /// Free starter egg that grows into a plain patrolling fish.
    Basic,
    /// Hatches into a fish that swims in formation behind a school leader.
    Schooling,
    /// Brightly colored fish with a pronounced secondary swerve.
    Tropical,
    /// Slow swimmer that bobs deeply near the reef band.
    Reef,
    /// Ornamental drifter that barely patrols at all.
    Ornamental,
    /// Bottom dweller confined to the band just above the sand.
    DeepSea,
    /// Rarest kind; fast, wide-ranging, and slow to mature.
    Mythical,
}

impl EggKind {
    /// Every egg kind in shop order.
    pub const ALL: [EggKind; 7] = [
        EggKind::Basic,
        EggKind::Schooling,
        EggKind::Tropical,
        EggKind::Reef,
        EggKind::Ornamental,
        EggKind::DeepSea,
        EggKind::Mythical,
    ];

    /// Purchase cost in coins.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Basic => 0,
            Self::Schooling => 10,
            Self::Tropical => 25,
            Self::Reef => 40,
            Self::Ornamental => 60,
            Self::DeepSea => 90,
            Self::Mythical => 150,
        }
    }

    /// Seconds a hatched fish needs to reach its adult size.
    #[must_use]
    pub const fn grow_duration_secs(self) -> f32 {
        match self {
            Self::Basic => 10.0,
            Self::Schooling => 20.0,
            Self::Tropical => 45.0,
            Self::Reef => 75.0,
            Self::Ornamental => 120.0,
            Self::DeepSea => 200.0,
            Self::Mythical => 300.0,
        }
    }

    /// Coins paid out when a fully grown fish of this kind is sold.
    ///
    /// The payout is the purchase cost marked up by [`SELL_MARKUP`], rounded
    /// up, and never less than [`MIN_SELL_PRICE`].
    #[must_use]
    pub fn sell_price(self) -> u32 {
        let marked_up = (self.cost() as f32 * SELL_MARKUP).ceil() as u32;
        marked_up.max(MIN_SELL_PRICE)
    }

    /// Human-readable name shown in shop and sell listings.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Basic => "Minnow",
            Self::Schooling => "Silver Darter",
            Self::Tropical => "Sunfin Tetra",
            Self::Reef => "Reef Grazer",
            Self::Ornamental => "Veiltail",
            Self::DeepSea => "Lanternjaw",
            Self::Mythical => "Moonwhisker Koi",
        }
    }

    /// Conservative half extents used until a measured footprint arrives.
    ///
    /// Rendering backends may report the true footprint later via
    /// [`Command::CorrectFootprint`]; until then bounds math uses this
    /// deliberately generous placeholder.
    #[must_use]
    pub const fn placeholder_half_extents(self) -> Vec2 {
        match self {
            Self::Basic | Self::Schooling => Vec2::new(0.35, 0.2),
            Self::Tropical | Self::Ornamental => Vec2::new(0.4, 0.25),
            Self::Reef | Self::DeepSea => Vec2::new(0.5, 0.3),
            Self::Mythical => Vec2::new(0.65, 0.35),
        }
    }
}

/// Kinds of decorations available in the shop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DecorKind {
    /// Swaying kelp strand.
    Kelp,
    /// Plain rock.
    Rock,
    /// Branching coral piece.
    Coral,
    /// Weathered driftwood.
    Driftwood,
    /// Spiral shell.
    Shell,
    /// Miniature castle.
    Castle,
}

impl DecorKind {
    /// Every decoration kind in shop order.
    pub const ALL: [DecorKind; 6] = [
        DecorKind::Kelp,
        DecorKind::Rock,
        DecorKind::Coral,
        DecorKind::Driftwood,
        DecorKind::Shell,
        DecorKind::Castle,
    ];

    /// Purchase cost in coins.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Kelp => 5,
            Self::Rock => 8,
            Self::Coral => 12,
            Self::Driftwood => 15,
            Self::Shell => 18,
            Self::Castle => 30,
        }
    }

    /// Half extents used for wall bounces and sand landing.
    #[must_use]
    pub const fn half_extents(self) -> Vec2 {
        match self {
            Self::Kelp => Vec2::new(0.2, 0.6),
            Self::Rock => Vec2::new(0.35, 0.25),
            Self::Coral => Vec2::new(0.3, 0.35),
            Self::Driftwood => Vec2::new(0.55, 0.25),
            Self::Shell => Vec2::new(0.2, 0.15),
            Self::Castle => Vec2::new(0.45, 0.5),
        }
    }
}

/// Visual fidelity the scene is currently rendered at.
///
/// Toggling the mode tears down and rebuilds every visual representation;
/// simulation state survives through the snapshot/restore protocol and is
/// never touched by the toggle itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualMode {
    /// Cheap placeholder visuals built from primitive shapes.
    Prototype,
    /// Full detailed visuals backed by loaded model assets.
    Detailed,
}

impl VisualMode {
    /// Returns the opposite mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Prototype => Self::Detailed,
            Self::Detailed => Self::Prototype,
        }
    }
}

/// Horizontal orientation of a swimming entity's visual representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Facing toward decreasing x.
    Left,
    /// Facing toward increasing x.
    Right,
}

impl Facing {
    /// Derives a facing from the sign of a horizontal velocity component.
    ///
    /// Returns `None` when the component is too small to be meaningful.
    #[must_use]
    pub fn from_velocity_x(vx: f32, deadband: f32) -> Option<Self> {
        if vx > deadband {
            Some(Self::Right)
        } else if vx < -deadband {
            Some(Self::Left)
        } else {
            None
        }
    }
}

/// Phase of a food flake's descent through the water column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlakePhase {
    /// Dropping through the air toward the water surface.
    Falling,
    /// Drifting along the surface before waterlogging.
    Floating,
    /// Sinking through the water toward the sand.
    Sinking,
}

/// Unique identifier assigned to an egg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EggId(u32);

impl EggId {
    /// Creates a new egg identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a fish.
///
/// Identifiers are allocated from a monotonic counter and never reused; they
/// are the sole cross-reference key used when selling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FishId(u32);

impl FishId {
    /// Creates a new fish identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a decoration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecorId(u32);

impl DecorId {
    /// Creates a new decoration identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a food flake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlakeId(u32);

impl FlakeId {
    /// Creates a new flake identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible tank mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resizes the tank, rescaling and re-clamping every entity position.
    ConfigureTank {
        /// New tank dimensions in world units.
        dimensions: TankDimensions,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests purchase of an egg, deducting its cost from the balance.
    PurchaseEgg {
        /// Kind of egg to purchase.
        kind: EggKind,
    },
    /// Requests purchase of a decoration, deducting its cost from the balance.
    PurchaseDecor {
        /// Kind of decoration to purchase.
        kind: DecorKind,
    },
    /// Creates a fish at the provided position.
    ///
    /// Only the hatchery system may emit this command, in response to an
    /// [`Event::EggHatched`]; it is the sole mechanism that creates a fish.
    SpawnFish {
        /// Egg kind the fish hatched from.
        kind: EggKind,
        /// Hatch position the lift animation starts from.
        position: Vec2,
    },
    /// Requests the sale of a fully grown fish.
    SellFish {
        /// Identifier of the fish offered for sale.
        fish: FishId,
    },
    /// Drops a food flake into the tank above the water surface.
    DropFood {
        /// Horizontal drop position in world units.
        x: f32,
    },
    /// Removes a flake that was eaten by a fish.
    ConsumeFlake {
        /// Identifier of the consumed flake.
        flake: FlakeId,
    },
    /// Suspends physics for a decoration while the pointer drags it.
    BeginDecorDrag {
        /// Identifier of the decoration being dragged.
        decor: DecorId,
    },
    /// Moves a dragged decoration, clamped to the water rectangle and sand.
    DragDecorTo {
        /// Identifier of the decoration being dragged.
        decor: DecorId,
        /// Requested position before clamping.
        position: Vec2,
    },
    /// Drops a dragged decoration, resuming the landed state in place.
    EndDecorDrag {
        /// Identifier of the decoration being released.
        decor: DecorId,
    },
    /// Switches between prototype and detailed visuals.
    SetVisualMode {
        /// Mode the scene should activate.
        mode: VisualMode,
    },
    /// Applies a measured visual footprint to a fish.
    ///
    /// Sent when an asynchronous asset load completes. The simulated position
    /// stays authoritative; only the extents are merged, after which bounds
    /// are recomputed and the position re-clamped.
    CorrectFootprint {
        /// Identifier of the fish whose footprint was measured.
        fish: FishId,
        /// Measured half extents in world units.
        half_extents: Vec2,
    },
}

/// Events broadcast by the tank after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the tank was resized.
    TankResized {
        /// Dimensions that became active after the resize.
        dimensions: TankDimensions,
    },
    /// Confirms that an egg was purchased and released into the water.
    EggPurchased {
        /// Identifier assigned to the new egg.
        egg: EggId,
        /// Kind of egg that was purchased.
        kind: EggKind,
        /// Position the egg starts falling from.
        position: Vec2,
    },
    /// Confirms that a decoration was purchased and released into the water.
    DecorPurchased {
        /// Identifier assigned to the new decoration.
        decor: DecorId,
        /// Kind of decoration that was purchased.
        kind: DecorKind,
        /// Position the decoration starts falling from.
        position: Vec2,
    },
    /// Reports that a purchase request was rejected.
    PurchaseRejected {
        /// Cost of the requested item.
        cost: u32,
        /// Balance available at the time of the request.
        coins: u32,
    },
    /// Confirms that an egg settled onto the sand.
    EggLanded {
        /// Identifier of the egg that landed.
        egg: EggId,
    },
    /// Announces that an egg's incubation completed. Fires exactly once per egg.
    EggHatched {
        /// Identifier of the hatched egg.
        egg: EggId,
        /// Kind of egg that hatched.
        kind: EggKind,
        /// Position of the egg at the moment of hatching.
        position: Vec2,
    },
    /// Confirms that a hatched egg finished its shrink-out and was removed.
    EggRemoved {
        /// Identifier of the removed egg.
        egg: EggId,
    },
    /// Confirms that a fish was created by the hatchery.
    FishSpawned {
        /// Identifier assigned to the new fish.
        fish: FishId,
        /// Egg kind the fish hatched from.
        kind: EggKind,
        /// Position the fish lifts away from.
        position: Vec2,
    },
    /// Announces that a fish's age first reached its growth duration.
    FishMatured {
        /// Identifier of the newly adult fish.
        fish: FishId,
    },
    /// Confirms that a fish was sold and removed from the tank.
    FishSold {
        /// Identifier of the sold fish.
        fish: FishId,
        /// Coins paid out for the sale.
        price: u32,
    },
    /// Reports that a sale request was rejected.
    SaleRejected {
        /// Identifier of the fish offered for sale.
        fish: FishId,
        /// Specific reason the sale failed.
        reason: SaleError,
    },
    /// Confirms that a decoration settled onto the sand.
    DecorLanded {
        /// Identifier of the decoration that landed.
        decor: DecorId,
    },
    /// Confirms that a food flake entered the tank.
    FlakeDropped {
        /// Identifier assigned to the new flake.
        flake: FlakeId,
    },
    /// Confirms that a food flake left the tank.
    FlakeRemoved {
        /// Identifier of the removed flake.
        flake: FlakeId,
        /// What caused the removal.
        cause: FlakeRemoval,
    },
    /// Announces that the visual mode changed.
    VisualModeChanged {
        /// Mode that became active.
        mode: VisualMode,
    },
    /// Reports the coin balance after it changed.
    CoinsChanged {
        /// Balance after the change.
        coins: u32,
    },
}

/// Reasons a fish sale request may be rejected by the tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleError {
    /// No fish with the provided identifier exists.
    UnknownFish,
    /// The fish has not yet reached its growth duration.
    StillGrowing,
}

/// Reasons a food flake may have been removed from the tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlakeRemoval {
    /// The flake's lifetime expired.
    Expired,
    /// A fish consumed the flake.
    Eaten,
    /// The flake sank below the sand line.
    Buried,
}

/// Normalized growth fraction smoothed with a cubic smoothstep.
///
/// Input is clamped to `[0, 1]`; the output eases in and out so the visual
/// scale change reads naturally at both ends of the growth timeline.
#[must_use]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Interpolated visual scale for a fish at the given growth fraction.
///
/// Returns [`JUVENILE_SCALE`] at fraction 0 and exactly 1.0 at fraction 1.
#[must_use]
pub fn growth_scale(fraction: f32) -> f32 {
    JUVENILE_SCALE + (1.0 - JUVENILE_SCALE) * smoothstep(fraction)
}
