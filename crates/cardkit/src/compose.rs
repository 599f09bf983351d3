//! Frame composition: the fixed set of primitives that make up the card.
//!
//! Everything is positioned in the group's local frame; `Frame::transform`
//! carries the rotation and hover lift so the assembly moves as one.

use crate::{
    catalog::{Item, Level, ResourceId},
    color::Rgba,
    hit::{HitRegion, Ray},
    state::ViewerState,
    visual::{MaterialParams, VisualAttrs},
};
use glam::{Mat4, Vec2, Vec3};

/// Card layout in group-local units (camera sits 10 units away).
pub mod layout {
    use crate::color::Rgba;
    use glam::{Vec2, Vec3};

    pub const GLOW_SIZE: Vec2 = Vec2::new(4.0, 6.0);
    /// The glow plane is drawn slightly larger than the card.
    pub const GLOW_SCALE: f32 = 1.075;
    pub const GLOW_Z: f32 = -0.02;

    pub const ART_SIZE: Vec2 = Vec2::new(4.0, 3.0);
    pub const ART_CENTER: Vec3 = Vec3::new(0.0, 1.2, 0.0);

    pub const NAME_POS: Vec3 = Vec3::new(-2.0, 2.9, 0.11);
    pub const NAME_FONT_SIZE: f32 = 0.25;
    pub const NAME_COLOR: Rgba = Rgba::opaque(0x44 as f32 / 255.0, 0x44 as f32 / 255.0, 0x44 as f32 / 255.0);

    pub const MASTERY_POS: Vec3 = Vec3::new(0.0, -1.2, 0.11);
    pub const MASTERY_FONT_SIZE: f32 = 0.3;

    pub const TRACK_WIDTH: f32 = 3.0;
    pub const BAR_HEIGHT: f32 = 0.2;
    pub const BAR_Y: f32 = -1.9;
    pub const TRACK_Z: f32 = 0.11;
    pub const FILL_Z: f32 = 0.12;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadRole {
    Glow,
    Art,
    Track,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    Name,
    Mastery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Left,
    Center,
}

/// Flat rectangle facing +Z.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    pub role: QuadRole,
    pub center: Vec3,
    pub size: Vec2,
    pub color: Rgba,
    pub texture: Option<ResourceId>,
    /// Lit quads are shaded with these parameters; `None` draws unlit.
    pub material: Option<MaterialParams>,
}

/// Single-line glyph run anchored at `position`, vertically centered.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub role: LabelRole,
    pub text: String,
    pub position: Vec3,
    pub font_size: f32,
    pub anchor: TextAnchor,
    pub color: Rgba,
    pub outline: Option<Rgba>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Quad(Quad),
    Label(Label),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Group model matrix.
    pub transform: Mat4,
    /// In draw order, back to front.
    pub primitives: Vec<Primitive>,
}

/// The one hit target of the group: the glow plane's footprint.
pub const CARD_HIT_REGION: HitRegion = HitRegion {
    half_extents: Vec2::new(
        layout::GLOW_SIZE.x * layout::GLOW_SCALE * 0.5,
        layout::GLOW_SIZE.y * layout::GLOW_SCALE * 0.5,
    ),
    z: 0.0,
};

impl Frame {
    pub fn quads(&self) -> impl Iterator<Item = &Quad> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Quad(q) => Some(q),
            Primitive::Label(_) => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Label(l) => Some(l),
            Primitive::Quad(_) => None,
        })
    }

    pub fn quad(&self, role: QuadRole) -> Option<&Quad> {
        self.quads().find(|q| q.role == role)
    }

    pub fn label(&self, role: LabelRole) -> Option<&Label> {
        self.labels().find(|l| l.role == role)
    }

    /// Whether a world-space pick ray lands on the card group.
    pub fn hit_test(&self, ray: &Ray) -> bool {
        CARD_HIT_REGION.contains(ray, self.transform)
    }
}

/// Width of the progress fill and the X of its center, left-aligned inside a
/// track of `track_width` centered at the origin.
pub fn progress_fill(level: Level, track_width: f32) -> (f32, f32) {
    let width = level.fraction() * track_width;
    let center_x = -track_width / 2.0 + width / 2.0;
    (width, center_x)
}

pub fn mastery_text(level: Level) -> String {
    format!("Mastery: {level}%")
}

/// Emits the card's six primitives for this frame.
pub fn compose(item: &Item, visual: &VisualAttrs, state: &ViewerState) -> Frame {
    use layout::*;

    let (fill_width, fill_x) = progress_fill(item.level, TRACK_WIDTH);

    let primitives = vec![
        Primitive::Quad(Quad {
            role: QuadRole::Glow,
            center: Vec3::new(0.0, 0.0, GLOW_Z),
            size: GLOW_SIZE * GLOW_SCALE,
            color: visual.tint_lightened,
            texture: Some(visual.background_texture.clone()),
            material: None,
        }),
        Primitive::Quad(Quad {
            role: QuadRole::Art,
            center: ART_CENTER + Vec3::new(0.0, 0.0, visual.art_depth_bias),
            size: ART_SIZE,
            color: visual.surface_color,
            texture: Some(visual.art_texture.clone()),
            material: Some(visual.material),
        }),
        Primitive::Label(Label {
            role: LabelRole::Name,
            text: item.name.clone(),
            position: NAME_POS,
            font_size: NAME_FONT_SIZE,
            anchor: TextAnchor::Left,
            color: NAME_COLOR,
            outline: Some(item.tint),
        }),
        Primitive::Label(Label {
            role: LabelRole::Mastery,
            text: mastery_text(item.level),
            position: MASTERY_POS,
            font_size: MASTERY_FONT_SIZE,
            anchor: TextAnchor::Center,
            color: Rgba::WHITE,
            outline: None,
        }),
        Primitive::Quad(Quad {
            role: QuadRole::Track,
            center: Vec3::new(0.0, BAR_Y, TRACK_Z),
            size: Vec2::new(TRACK_WIDTH, BAR_HEIGHT),
            color: Rgba::WHITE,
            texture: None,
            material: None,
        }),
        Primitive::Quad(Quad {
            role: QuadRole::Fill,
            center: Vec3::new(fill_x, BAR_Y, FILL_Z),
            size: Vec2::new(fill_width, BAR_HEIGHT),
            color: item.tint,
            texture: None,
            material: None,
        }),
    ];

    Frame {
        transform: state.orientation.group_transform(state.depth_offset),
        primitives,
    }
}
