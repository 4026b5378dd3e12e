//! Allowed-rectangle math for moving entities.
//!
//! Every mover derives an entity-class-specific rectangle from the tank
//! environment, its own half extents, and kind-specific margin fractions.
//! The rectangle is recomputed whenever the tank is resized or a measured
//! footprint replaces the placeholder extents.

use glam::Vec2;

use crate::tank::TankEnvironment;

/// Smallest vertical band a mover is ever confined to, in world units.
///
/// When margins and extents would invert the band ordering, a band of this
/// height is re-centered on the midpoint instead of leaving `y_min > y_max`.
pub const MIN_BAND_HEIGHT: f32 = 0.2;

/// Kind-specific margin fractions feeding the bounds calculator.
///
/// Side and bottom margins resolve to `max(fraction * dimension, floor)` so
/// very small and very large tanks both stay usable. The vertical ceiling is
/// the lesser of `ceiling_fraction` of tank height (measured from the bottom)
/// and the water surface minus `top_buffer`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarginSpec {
    /// Fraction of tank width kept clear of each side wall.
    pub side_fraction: f32,
    /// Absolute floor for the side margin in world units.
    pub side_floor: f32,
    /// Fraction of tank height the ceiling may reach, measured from the bottom.
    pub ceiling_fraction: f32,
    /// Clearance kept below the water surface in world units.
    pub top_buffer: f32,
    /// Fraction of tank height kept clear above the sand line.
    pub bottom_fraction: f32,
    /// Absolute floor for the bottom margin in world units.
    pub bottom_floor: f32,
}

impl MarginSpec {
    /// Margins that allow the full water column above the sand.
    #[must_use]
    pub const fn open_water() -> Self {
        Self {
            side_fraction: 0.01,
            side_floor: 0.05,
            ceiling_fraction: 0.95,
            top_buffer: 0.15,
            bottom_fraction: 0.01,
            bottom_floor: 0.05,
        }
    }
}

/// Axis-aligned rectangle a mover's position must stay inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwimBounds {
    /// Smallest allowed x coordinate.
    pub x_min: f32,
    /// Largest allowed x coordinate.
    pub x_max: f32,
    /// Smallest allowed y coordinate.
    pub y_min: f32,
    /// Largest allowed y coordinate.
    pub y_max: f32,
}

impl SwimBounds {
    /// Clamps a position to the rectangle.
    #[must_use]
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.clamp(self.x_min, self.x_max),
            position.y.clamp(self.y_min, self.y_max),
        )
    }

    /// Reports whether a position lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= self.x_min
            && position.x <= self.x_max
            && position.y >= self.y_min
            && position.y <= self.y_max
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// Derives the allowed rectangle for a mover.
#[must_use]
pub fn swim_bounds(env: &TankEnvironment, half_extents: Vec2, margins: MarginSpec) -> SwimBounds {
    let width = env.dimensions().width();
    let height = env.dimensions().height();

    let side = (margins.side_fraction * width).max(margins.side_floor);
    let mut x_min = env.inner_left() + side + half_extents.x;
    let mut x_max = env.inner_right() - side - half_extents.x;
    if x_min > x_max {
        let mid = (env.inner_left() + env.inner_right()) / 2.0;
        x_min = mid;
        x_max = mid;
    }

    let bottom = (margins.bottom_fraction * height).max(margins.bottom_floor);
    let y_min = env.sand_top_y() + bottom + half_extents.y;

    let geometric_ceiling = -height / 2.0 + height * margins.ceiling_fraction;
    let surface_ceiling = env.inner_top() - margins.top_buffer;
    let y_max = geometric_ceiling.min(surface_ceiling) - half_extents.y;

    if y_max >= y_min + MIN_BAND_HEIGHT {
        SwimBounds {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    } else {
        let mid = (y_min + y_max) / 2.0;
        SwimBounds {
            x_min,
            x_max,
            y_min: mid - MIN_BAND_HEIGHT / 2.0,
            y_max: mid + MIN_BAND_HEIGHT / 2.0,
        }
    }
}
