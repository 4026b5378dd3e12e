//! Shared school-leader record read by schooling fish.
//!
//! One leader exists per school identifier. The schooling coordinator is the
//! only writer; member fish read the leader's position and velocity to derive
//! their formation targets. Single-writer discipline keeps formation math
//! independent of member update order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier grouping fish into one school.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchoolId(u32);

impl SchoolId {
    /// Creates a new school identifier with the provided numeric value.
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

/// Physical state of a school's virtual leader.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderState {
    /// Current leader position in world units.
    pub position: Vec2,
    /// Current leader velocity in world units per second.
    pub velocity: Vec2,
    /// Point inside the water rectangle the leader is seeking.
    pub target: Vec2,
}

impl LeaderState {
    /// Unit heading of the leader.
    ///
    /// Substitutes a unit +x heading when the velocity is too short to
    /// normalize, so formation math never divides by zero.
    #[must_use]
    pub fn heading(&self) -> Vec2 {
        let length = self.velocity.length();
        if length <= 1e-4 {
            Vec2::X
        } else {
            self.velocity / length
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LeaderState, SchoolId};
    use glam::Vec2;

    #[test]
    fn school_id_round_trips_through_bincode() {
        let id = SchoolId::new(7);
        let bytes = bincode::serialize(&id).expect("serialize");
        let restored: SchoolId = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, id);
    }

    #[test]
    fn degenerate_velocity_substitutes_default_heading() {
        let leader = LeaderState {
            position: Vec2::ZERO,
            velocity: Vec2::new(0.0, 1e-6),
            target: Vec2::ZERO,
        };
        assert_eq!(leader.heading(), Vec2::X);
    }

    #[test]
    fn heading_normalizes_nonzero_velocity() {
        let leader = LeaderState {
            position: Vec2::ZERO,
            velocity: Vec2::new(0.0, -3.0),
            target: Vec2::ZERO,
        };
        assert_eq!(leader.heading(), Vec2::new(0.0, -1.0));
    }
}
