//! Tank dimensions and the derived water rectangle every bounds
//! computation reads from.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fraction of the smaller tank dimension taken up by the glass frame.
pub const FRAME_FRACTION: f32 = 0.035;

/// Fraction of the smaller tank dimension inset between frame and water.
pub const INSET_FRACTION: f32 = 0.02;

/// Fraction of the tank height between the bottom and the top of the sand bed.
pub const SAND_FRACTION: f32 = 0.22;

/// Tank extents in world units, centered on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TankDimensions {
    width: f32,
    height: f32,
}

impl TankDimensions {
    /// Creates a new dimension pair.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Total tank width in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Total tank height in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Smaller of the two dimensions, used for proportional frame math.
    #[must_use]
    pub fn min_extent(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Reports whether both dimensions are positive and finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// Derived inner-water rectangle and sand line for a set of dimensions.
///
/// Recomputed on every resize and mode toggle; never persisted. For valid
/// dimensions the invariants `inner_left < inner_right`,
/// `inner_bottom < inner_top` and `sand_top_y > inner_bottom` always hold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TankEnvironment {
    dimensions: TankDimensions,
    frame_thickness: f32,
    inner_left: f32,
    inner_right: f32,
    inner_top: f32,
    inner_bottom: f32,
    sand_top_y: f32,
}

impl TankEnvironment {
    /// Derives the water rectangle from the provided dimensions.
    #[must_use]
    pub fn from_dimensions(dimensions: TankDimensions) -> Self {
        let frame_thickness = FRAME_FRACTION * dimensions.min_extent();
        let inset = frame_thickness + INSET_FRACTION * dimensions.min_extent();
        let half_width = dimensions.width() / 2.0;
        let half_height = dimensions.height() / 2.0;

        Self {
            dimensions,
            frame_thickness,
            inner_left: -half_width + inset,
            inner_right: half_width - inset,
            inner_top: half_height - inset,
            inner_bottom: -half_height + inset,
            sand_top_y: -half_height + dimensions.height() * SAND_FRACTION,
        }
    }

    /// Dimensions the rectangle was derived from.
    #[must_use]
    pub const fn dimensions(&self) -> TankDimensions {
        self.dimensions
    }

    /// Thickness of the glass frame in world units.
    #[must_use]
    pub const fn frame_thickness(&self) -> f32 {
        self.frame_thickness
    }

    /// Left edge of the water rectangle.
    #[must_use]
    pub const fn inner_left(&self) -> f32 {
        self.inner_left
    }

    /// Right edge of the water rectangle.
    #[must_use]
    pub const fn inner_right(&self) -> f32 {
        self.inner_right
    }

    /// Top edge of the water rectangle (the water surface).
    #[must_use]
    pub const fn inner_top(&self) -> f32 {
        self.inner_top
    }

    /// Bottom edge of the water rectangle.
    #[must_use]
    pub const fn inner_bottom(&self) -> f32 {
        self.inner_bottom
    }

    /// Y coordinate separating the sand bed from open water.
    #[must_use]
    pub const fn sand_top_y(&self) -> f32 {
        self.sand_top_y
    }

    /// Width of the water rectangle.
    #[must_use]
    pub fn water_width(&self) -> f32 {
        self.inner_right - self.inner_left
    }

    /// Height of the open-water column between sand and surface.
    #[must_use]
    pub fn water_column_height(&self) -> f32 {
        self.inner_top - self.sand_top_y
    }

    /// Reports whether a point lies inside the water rectangle.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.inner_left
            && point.x <= self.inner_right
            && point.y >= self.inner_bottom
            && point.y <= self.inner_top
    }

    /// Clamps a point to the water rectangle.
    #[must_use]
    pub fn clamp_to_water(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.inner_left, self.inner_right),
            point.y.clamp(self.inner_bottom, self.inner_top),
        )
    }
}
