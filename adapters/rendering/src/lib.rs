#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for aquarium adapters.
//!
//! Backends consume a [`Presentation`] describing the whole scene in world
//! units and are free to rasterize it however they like. The simulation stays
//! authoritative: backends report what they measured (pointer positions,
//! sprite footprints after an asset load) through [`FrameInput`] and never
//! mutate tank state themselves.

use anyhow::Result as AnyResult;
use glam::Vec2;

use aquarium_core::{
    tank::TankEnvironment, DecorId, DecorKind, EggId, EggKind, Facing, FishId, FlakeId, FlakePhase,
    VisualMode,
};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Water fill behind every sprite.
pub const WATER_COLOR: Color = Color::from_rgb_u8(24, 68, 110);
/// Sand strip along the tank floor.
pub const SAND_COLOR: Color = Color::from_rgb_u8(194, 168, 116);
/// Outer frame surrounding the water rectangle.
pub const FRAME_COLOR: Color = Color::from_rgb_u8(52, 46, 40);

/// Flat placeholder color for a fish kind in prototype mode.
#[must_use]
pub const fn fish_color(kind: EggKind) -> Color {
    match kind {
        EggKind::Basic => Color::from_rgb_u8(214, 120, 54),
        EggKind::Schooling => Color::from_rgb_u8(168, 196, 220),
        EggKind::Tropical => Color::from_rgb_u8(240, 190, 60),
        EggKind::Reef => Color::from_rgb_u8(110, 190, 130),
        EggKind::Ornamental => Color::from_rgb_u8(226, 148, 190),
        EggKind::DeepSea => Color::from_rgb_u8(90, 84, 140),
        EggKind::Mythical => Color::from_rgb_u8(190, 210, 240),
    }
}

/// Flat placeholder color for a decoration kind in prototype mode.
#[must_use]
pub const fn decor_color(kind: DecorKind) -> Color {
    match kind {
        DecorKind::Kelp => Color::from_rgb_u8(56, 130, 70),
        DecorKind::Rock => Color::from_rgb_u8(120, 118, 112),
        DecorKind::Coral => Color::from_rgb_u8(230, 110, 96),
        DecorKind::Driftwood => Color::from_rgb_u8(130, 100, 70),
        DecorKind::Shell => Color::from_rgb_u8(232, 222, 200),
        DecorKind::Castle => Color::from_rgb_u8(156, 156, 170),
    }
}

/// Measured half extents reported by a backend after an asset load.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FootprintMeasurement {
    /// Fish whose detailed sprite finished loading.
    pub fish: FishId,
    /// Measured half extents in world units.
    pub half_extents: Vec2,
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a visual-mode toggle press on this frame.
    pub mode_toggle: bool,
    /// Pointer position expressed in world units, if the pointer is over the tank.
    pub cursor_world_space: Option<Vec2>,
    /// Whether the adapter detected a food drop request on this frame.
    pub feed_action: bool,
    /// Whether the adapter detected the start of a decoration drag.
    pub drag_begin: bool,
    /// Whether the adapter detected the end of a decoration drag.
    pub drag_end: bool,
    /// Sprite footprints the backend measured since the previous frame.
    pub measured_footprints: Vec<FootprintMeasurement>,
}

/// Mapping between world units and backend pixels.
///
/// The world origin sits at the center of the tank; screen space grows
/// rightward and downward from the top-left corner, so the vertical axis
/// flips during conversion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Horizontal extent of the drawable surface in pixels.
    pub width_px: f32,
    /// Vertical extent of the drawable surface in pixels.
    pub height_px: f32,
    pixels_per_unit: f32,
}

impl Viewport {
    /// Creates a viewport, validating the world-to-pixel scale.
    ///
    /// # Errors
    ///
    /// Returns [`RenderingError::InvalidScale`] when `pixels_per_unit` is not
    /// a positive finite number.
    pub fn new(width_px: f32, height_px: f32, pixels_per_unit: f32) -> Result<Self, RenderingError> {
        if !pixels_per_unit.is_finite() || pixels_per_unit <= 0.0 {
            return Err(RenderingError::InvalidScale { pixels_per_unit });
        }
        Ok(Self {
            width_px,
            height_px,
            pixels_per_unit,
        })
    }

    /// Validated world-to-pixel scale.
    #[must_use]
    pub const fn pixels_per_unit(&self) -> f32 {
        self.pixels_per_unit
    }

    /// Converts a world-space position to screen pixels.
    #[must_use]
    pub fn world_to_screen(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            self.width_px / 2.0 + position.x * self.pixels_per_unit,
            self.height_px / 2.0 - position.y * self.pixels_per_unit,
        )
    }

    /// Converts a screen-pixel position back to world space.
    #[must_use]
    pub fn screen_to_world(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            (position.x - self.width_px / 2.0) / self.pixels_per_unit,
            (self.height_px / 2.0 - position.y) / self.pixels_per_unit,
        )
    }

    /// Largest scale that fits the given tank dimensions inside the surface.
    #[must_use]
    pub fn fit_scale(width_px: f32, height_px: f32, tank_width: f32, tank_height: f32) -> f32 {
        (width_px / tank_width).min(height_px / tank_height)
    }
}

/// Static geometry of the tank: frame, water rectangle and sand strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TankPresentation {
    /// Full tank width in world units.
    pub width: f32,
    /// Full tank height in world units.
    pub height: f32,
    /// Thickness of the outer frame in world units.
    pub frame_thickness: f32,
    /// Left edge of the water rectangle.
    pub inner_left: f32,
    /// Right edge of the water rectangle.
    pub inner_right: f32,
    /// Top edge of the water rectangle.
    pub inner_top: f32,
    /// Bottom edge of the water rectangle.
    pub inner_bottom: f32,
    /// Top of the sand strip.
    pub sand_top_y: f32,
    /// Water fill color.
    pub water_color: Color,
    /// Sand strip color.
    pub sand_color: Color,
    /// Frame color.
    pub frame_color: Color,
}

impl TankPresentation {
    /// Builds the tank geometry from the simulated environment.
    #[must_use]
    pub fn from_environment(env: &TankEnvironment) -> Self {
        Self {
            width: env.dimensions().width(),
            height: env.dimensions().height(),
            frame_thickness: env.frame_thickness(),
            inner_left: env.inner_left(),
            inner_right: env.inner_right(),
            inner_top: env.inner_top(),
            inner_bottom: env.inner_bottom(),
            sand_top_y: env.sand_top_y(),
            water_color: WATER_COLOR,
            sand_color: SAND_COLOR,
            frame_color: FRAME_COLOR,
        }
    }
}

/// How a sprite should be drawn in the active visual mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteVisual {
    /// Flat colored primitive; always available, used while assets load.
    Primitive,
    /// Detailed art asset keyed by the entity kind.
    Detailed,
}

impl SpriteVisual {
    /// Visual to use for the given mode.
    #[must_use]
    pub const fn for_mode(mode: VisualMode) -> Self {
        match mode {
            VisualMode::Prototype => Self::Primitive,
            VisualMode::Detailed => Self::Detailed,
        }
    }
}

/// Drawable fish emitted by the adapter each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FishPresentation {
    /// Identifier of the fish, stable across mode toggles.
    pub id: FishId,
    /// Kind selecting the sprite and placeholder color.
    pub kind: EggKind,
    /// Rendered position in world units.
    pub position: Vec2,
    /// Horizontal mirroring for the sprite.
    pub facing: Facing,
    /// Growth-derived uniform scale.
    pub scale: f32,
    /// Half extents of the unscaled sprite.
    pub half_extents: Vec2,
    /// Procedural wiggle rotations (pitch, yaw, roll) for detailed sprites.
    pub wiggle: Vec2,
    /// Body roll for detailed sprites.
    pub roll: f32,
}

/// Drawable egg emitted by the adapter each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EggPresentation {
    /// Identifier of the egg.
    pub id: EggId,
    /// Kind selecting the shell tint.
    pub kind: EggKind,
    /// Position in world units.
    pub position: Vec2,
    /// Incubation wobble angle in radians.
    pub wobble: f32,
    /// Uniform scale; shrinks to zero after the hatch.
    pub scale: f32,
}

/// Drawable decoration emitted by the adapter each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecorPresentation {
    /// Identifier of the decoration.
    pub id: DecorId,
    /// Kind selecting the sprite and placeholder color.
    pub kind: DecorKind,
    /// Position in world units.
    pub position: Vec2,
    /// Half extents of the sprite.
    pub half_extents: Vec2,
    /// Whether the pointer is dragging the decoration.
    pub dragging: bool,
}

/// Drawable food flake emitted by the adapter each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlakePresentation {
    /// Identifier of the flake.
    pub id: FlakeId,
    /// Position in world units.
    pub position: Vec2,
    /// Current descent phase, selecting the sprite tint.
    pub phase: FlakePhase,
}

/// Heads-up display content drawn over the tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct HudPresentation {
    /// Current coin balance.
    pub coins: u32,
}

/// Scene description combining the tank geometry and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tank frame, water and sand geometry.
    pub tank: TankPresentation,
    /// Eggs currently visible.
    pub eggs: Vec<EggPresentation>,
    /// Decorations currently visible.
    pub decor: Vec<DecorPresentation>,
    /// Fish currently visible.
    pub fish: Vec<FishPresentation>,
    /// Food flakes currently visible.
    pub flakes: Vec<FlakePresentation>,
    /// Visual mode selecting primitive or detailed sprites.
    pub visual: SpriteVisual,
    /// Heads-up display content.
    pub hud: HudPresentation,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        tank: TankPresentation,
        eggs: Vec<EggPresentation>,
        decor: Vec<DecorPresentation>,
        fish: Vec<FishPresentation>,
        flakes: Vec<FlakePresentation>,
        visual: SpriteVisual,
        hud: HudPresentation,
    ) -> Self {
        Self {
            tank,
            eggs,
            decor,
            fish,
            flakes,
            visual,
            hud,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting aquarium scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the backend, and may replace the scene
    /// contents before they are rendered. Backends that finish loading a
    /// detailed sprite report its measured footprint through the input so the
    /// driver can merge it into the simulation.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The world-to-pixel scale must be positive and finite.
    InvalidScale {
        /// Scale that failed validation.
        pixels_per_unit: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScale { pixels_per_unit } => {
                write!(
                    f,
                    "pixels_per_unit must be positive and finite (received {pixels_per_unit})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use aquarium_core::tank::TankDimensions;

    #[test]
    fn viewport_rejects_non_positive_scale() {
        let error = Viewport::new(800.0, 450.0, 0.0).expect_err("zero scale must be rejected");
        assert!(matches!(
            error,
            RenderingError::InvalidScale { pixels_per_unit } if pixels_per_unit == 0.0
        ));
        assert!(Viewport::new(800.0, 450.0, f32::NAN).is_err());
    }

    #[test]
    fn world_and_screen_conversions_round_trip() {
        let viewport = Viewport::new(800.0, 450.0, 50.0).expect("valid scale");
        let world = Vec2::new(2.5, -1.25);
        let screen = viewport.world_to_screen(world);

        // Positive world y points up, positive screen y points down.
        assert!(screen.y > 450.0 / 2.0);
        let back = viewport.screen_to_world(screen);
        assert!((back - world).length() < 1e-4);
    }

    #[test]
    fn fit_scale_is_limited_by_the_tighter_axis() {
        let scale = Viewport::fit_scale(800.0, 450.0, 16.0, 9.0);
        assert!((scale - 50.0).abs() < 1e-6);

        let narrow = Viewport::fit_scale(400.0, 450.0, 16.0, 9.0);
        assert!((narrow - 25.0).abs() < 1e-6);
    }

    #[test]
    fn tank_presentation_mirrors_the_environment() {
        let env = TankEnvironment::from_dimensions(TankDimensions::new(16.0, 9.0));
        let tank = TankPresentation::from_environment(&env);

        assert_eq!(tank.width, 16.0);
        assert_eq!(tank.sand_top_y, env.sand_top_y());
        assert!(tank.inner_left < tank.inner_right);
        assert!(tank.inner_bottom < tank.sand_top_y);
        assert!(tank.sand_top_y < tank.inner_top);
    }

    #[test]
    fn sprite_visual_follows_the_mode() {
        assert_eq!(
            SpriteVisual::for_mode(VisualMode::Prototype),
            SpriteVisual::Primitive
        );
        assert_eq!(
            SpriteVisual::for_mode(VisualMode::Detailed),
            SpriteVisual::Detailed
        );
    }

    #[test]
    fn scene_new_preserves_every_channel() {
        let env = TankEnvironment::from_dimensions(TankDimensions::new(12.0, 8.0));
        let tank = TankPresentation::from_environment(&env);
        let fish = vec![FishPresentation {
            id: FishId::new(3),
            kind: EggKind::Tropical,
            position: Vec2::new(1.0, 0.5),
            facing: Facing::Left,
            scale: 0.8,
            half_extents: Vec2::new(0.3, 0.18),
            wiggle: Vec2::new(0.02, 0.1),
            roll: 0.01,
        }];

        let scene = Scene::new(
            tank,
            Vec::new(),
            Vec::new(),
            fish.clone(),
            Vec::new(),
            SpriteVisual::Detailed,
            HudPresentation { coins: 30 },
        );

        assert_eq!(scene.tank, tank);
        assert_eq!(scene.fish, fish);
        assert!(scene.eggs.is_empty());
        assert!(scene.decor.is_empty());
        assert!(scene.flakes.is_empty());
        assert_eq!(scene.visual, SpriteVisual::Detailed);
        assert_eq!(scene.hud.coins, 30);
    }

    #[test]
    fn placeholder_palette_covers_every_kind() {
        for kind in EggKind::ALL {
            let color = fish_color(kind);
            assert!(color.alpha == 1.0);
        }
        for kind in DecorKind::ALL {
            let color = decor_color(kind);
            assert!(color.alpha == 1.0);
        }
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(100, 50, 0).lighten(0.5);
        assert!(color.red > 100.0 / 255.0);
        assert!(color.green > 50.0 / 255.0);
        assert!(color.blue > 0.0);
        assert!(color.red <= 1.0);
    }
}
