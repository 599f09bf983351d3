use crate::{
    animation::Orientation,
    interaction::{Interaction, Pointer},
};

/// Mutable per-viewer state.
///
/// Only the interaction transitions and the animation step write it; the
/// composer and outside observers get read access through the accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub(crate) active_index: usize,
    pub(crate) interaction: Interaction,
    pub(crate) orientation: Orientation,
    pub(crate) depth_offset: f32,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            active_index: 0,
            interaction: Interaction::Idle,
            orientation: Orientation::default(),
            depth_offset: 0.0,
        }
    }
}

impl ViewerState {
    #[inline]
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    #[inline]
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    #[inline]
    pub fn hovered(&self) -> bool {
        matches!(self.interaction, Interaction::Hovering { .. })
    }

    /// Normalized pointer; only meaningful while hovered.
    pub fn pointer(&self) -> Option<Pointer> {
        match self.interaction {
            Interaction::Hovering { pointer } => Some(pointer),
            Interaction::Idle => None,
        }
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline]
    pub fn depth_offset(&self) -> f32 {
        self.depth_offset
    }

    pub fn selection(&self) -> Selection {
        Selection {
            active_index: self.active_index,
            hovered: self.hovered(),
        }
    }
}

/// The externally observable part of the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub active_index: usize,
    pub hovered: bool,
}
