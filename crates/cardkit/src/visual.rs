//! Drawable attributes derived from the active item and the hover flag.

use crate::{
    catalog::{Item, ResourceId},
    color::Rgba,
};

/// How far the tint is pulled towards white for the glow plane.
pub const TINT_BLEND: f32 = 0.4;

/// Art panel offset along +Z (towards the camera) while hovered.
pub const HOVER_ART_DEPTH_BIAS: f32 = 0.05;

/// Art panel surface shade while hovered.
pub const SURFACE_HOVERED: Rgba = Rgba::opaque(1.0, 1.0, 1.0);

/// Art panel surface shade at rest (`#cccccc`).
pub const SURFACE_IDLE: Rgba = Rgba::opaque(0.8, 0.8, 0.8);

/// Shading parameters of the art panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub roughness: f32,
    pub metalness: f32,
}

impl MaterialParams {
    pub const CARD: MaterialParams = MaterialParams {
        roughness: 1.0,
        metalness: 0.6,
    };

    pub fn clamped(self) -> Self {
        Self {
            roughness: self.roughness.clamp(0.0, 1.0),
            metalness: self.metalness.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualAttrs {
    pub tint_lightened: Rgba,
    pub art_texture: ResourceId,
    pub background_texture: ResourceId,
    pub art_depth_bias: f32,
    pub surface_color: Rgba,
    pub material: MaterialParams,
}

pub fn lighten_tint(tint: Rgba) -> Rgba {
    tint.lighten(TINT_BLEND)
}

/// Pure mapping from `(item, hovered)` to what the frame draws.
pub fn derive_visual(item: &Item, hovered: bool) -> VisualAttrs {
    VisualAttrs {
        tint_lightened: lighten_tint(item.tint),
        art_texture: item.art.clone(),
        background_texture: item.background.clone(),
        art_depth_bias: if hovered { HOVER_ART_DEPTH_BIAS } else { 0.0 },
        surface_color: if hovered { SURFACE_HOVERED } else { SURFACE_IDLE },
        material: MaterialParams::CARD.clamped(),
    }
}

/// Holds the last derived record and rebuilds it only when the
/// `(active_index, hovered)` key changes.
#[derive(Debug, Default)]
pub struct VisualMemo {
    cached: Option<((usize, bool), VisualAttrs)>,
    recomputes: u64,
}

impl VisualMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, index: usize, item: &Item, hovered: bool) -> &VisualAttrs {
        let key = (index, hovered);
        let stale = !matches!(&self.cached, Some((k, _)) if *k == key);
        if stale {
            self.cached = None;
            self.recomputes += 1;
            log::trace!("Deriving visual for item {index} (hovered={hovered})");
        }
        let (_, attrs) = self
            .cached
            .get_or_insert_with(|| (key, derive_visual(item, hovered)));
        attrs
    }

    /// Number of times the record was rebuilt.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Level;

    fn item(tint: &str) -> Item {
        Item::new(
            "React",
            Level::new(70).unwrap(),
            tint.parse().unwrap(),
            "/react.webp",
            "/raw_texture.webp",
        )
    }

    #[test]
    fn hover_changes_only_surface_and_depth_bias() {
        for tint in ["#61DAFB", "red", "#000", "#ffffff", "lightblue"] {
            let it = item(tint);
            let rest = derive_visual(&it, false);
            let hover = derive_visual(&it, true);

            assert_eq!(rest.tint_lightened, hover.tint_lightened);
            assert_eq!(rest.art_texture, hover.art_texture);
            assert_eq!(rest.background_texture, hover.background_texture);
            assert_eq!(rest.material, hover.material);
            assert_ne!(rest.surface_color, hover.surface_color);
            assert_ne!(rest.art_depth_bias, hover.art_depth_bias);
        }
    }

    #[test]
    fn depth_bias_pulls_toward_camera_only_when_hovered() {
        let it = item("blue");
        assert_eq!(derive_visual(&it, false).art_depth_bias, 0.0);
        assert!(derive_visual(&it, true).art_depth_bias > 0.0);
    }

    #[test]
    fn hovered_surface_is_brighter() {
        let it = item("blue");
        let rest = derive_visual(&it, false).surface_color;
        let hover = derive_visual(&it, true).surface_color;
        assert!(hover.r > rest.r && hover.g > rest.g && hover.b > rest.b);
    }

    #[test]
    fn lightened_tint_is_stable_and_closer_to_white() {
        for tint in ["#339933", "#E10098", "orange", "#000000", "#3178C6"] {
            let c: Rgba = tint.parse().unwrap();
            let once = lighten_tint(c);
            assert_eq!(once, lighten_tint(c));
            assert!(once.distance_to_white() < c.distance_to_white());
        }
    }

    #[test]
    fn memo_recomputes_only_on_key_change() {
        let a = item("red");
        let b = item("blue");
        let mut memo = VisualMemo::new();

        memo.get(0, &a, false);
        memo.get(0, &a, false);
        memo.get(0, &a, false);
        assert_eq!(memo.recomputes(), 1);

        assert_eq!(memo.get(0, &a, true).surface_color, SURFACE_HOVERED);
        assert_eq!(memo.recomputes(), 2);

        let attrs = memo.get(1, &b, true).clone();
        assert_eq!(attrs.tint_lightened, lighten_tint(b.tint));
        assert_eq!(memo.recomputes(), 3);

        memo.get(1, &b, true);
        assert_eq!(memo.recomputes(), 3);
    }
}
