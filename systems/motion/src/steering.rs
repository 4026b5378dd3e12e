//! Seek-steer-damp-clamp primitive shared by school leaders and members.

use glam::Vec2;

/// Radius around a target inside which the desired speed ramps down.
pub const ARRIVAL_RADIUS: f32 = 0.55;

/// Tuning for one seek-steered mover.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeekParams {
    /// Speed the mover aims for in open water.
    pub desired_speed: f32,
    /// Largest acceleration magnitude applied per second.
    pub max_accel: f32,
    /// Hard cap on the resulting speed.
    pub max_speed: f32,
    /// Exponential damping rate applied to the velocity each step.
    pub damping: f32,
}

impl SeekParams {
    /// Tuning used by school leaders.
    #[must_use]
    pub const fn leader() -> Self {
        Self {
            desired_speed: 1.1,
            max_accel: 2.4,
            max_speed: 1.4,
            damping: 0.35,
        }
    }

    /// Tuning used by formation members trailing a leader.
    #[must_use]
    pub const fn member() -> Self {
        Self {
            desired_speed: 1.3,
            max_accel: 3.2,
            max_speed: 1.7,
            damping: 0.45,
        }
    }
}

/// Advances a velocity one step toward the target.
///
/// Desired velocity is `normalize(target - position) * desired_speed`, with
/// the speed scaled down inside [`ARRIVAL_RADIUS`] so arrivals damp instead
/// of overshooting. The steering acceleration is clamped to `max_accel`, the
/// velocity is exponentially damped, then clamped to `max_speed`. A
/// degenerate direction substitutes a unit +x heading.
#[must_use]
pub fn seek_step(position: Vec2, velocity: Vec2, target: Vec2, params: SeekParams, dt: f32) -> Vec2 {
    let to_target = target - position;
    let distance = to_target.length();

    let speed = if distance < ARRIVAL_RADIUS {
        params.desired_speed * (distance / ARRIVAL_RADIUS)
    } else {
        params.desired_speed
    };

    let direction = if distance <= 1e-5 {
        Vec2::X
    } else {
        to_target / distance
    };

    let desired = direction * speed;
    let steering = clamp_length(desired - velocity, params.max_accel);
    let mut next = velocity + steering * dt;
    next *= (-params.damping * dt).exp();
    clamp_length(next, params.max_speed)
}

/// Clamps a vector to the provided maximum length.
#[must_use]
pub fn clamp_length(vector: Vec2, max_length: f32) -> Vec2 {
    let length = vector.length();
    if length > max_length && length > 1e-6 {
        vector * (max_length / length)
    } else {
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_length, seek_step, SeekParams, ARRIVAL_RADIUS};
    use glam::Vec2;

    #[test]
    fn seek_accelerates_toward_distant_target() {
        let velocity = seek_step(
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::new(5.0, 0.0),
            SeekParams::leader(),
            0.1,
        );
        assert!(velocity.x > 0.0);
        assert!(velocity.y.abs() < 1e-6);
    }

    #[test]
    fn arrival_radius_scales_speed_down() {
        let params = SeekParams::leader();
        let far = seek_step(Vec2::ZERO, Vec2::ZERO, Vec2::new(5.0, 0.0), params, 0.1);
        let near = seek_step(
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::new(ARRIVAL_RADIUS * 0.2, 0.0),
            params,
            0.1,
        );
        assert!(near.length() < far.length());
    }

    #[test]
    fn degenerate_target_substitutes_default_heading() {
        let velocity = seek_step(Vec2::ZERO, Vec2::ZERO, Vec2::ZERO, SeekParams::leader(), 0.1);
        assert!(velocity.x >= 0.0);
        assert!(velocity.y.abs() < 1e-6);
        assert!(velocity.is_finite());
    }

    #[test]
    fn speed_never_exceeds_cap() {
        let params = SeekParams::member();
        let mut velocity = Vec2::ZERO;
        for _ in 0..200 {
            velocity = seek_step(Vec2::ZERO, velocity, Vec2::new(100.0, 0.0), params, 0.1);
        }
        assert!(velocity.length() <= params.max_speed + 1e-4);
    }

    #[test]
    fn clamp_length_preserves_short_vectors() {
        let short = Vec2::new(0.1, 0.2);
        assert_eq!(clamp_length(short, 1.0), short);
        assert!((clamp_length(Vec2::new(3.0, 4.0), 1.0).length() - 1.0).abs() < 1e-5);
    }
}
