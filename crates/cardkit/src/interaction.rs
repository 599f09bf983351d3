//! Hover/click state machine.
//!
//! Two states, `Idle` and `Hovering`, with the active index kept beside them.
//! The index only ever moves on `Click`, by one, wrapping at the catalog
//! length. Hover and pointer motion never touch it.

use crate::{error::ViewerError, state::ViewerState};

/// Size of the host's display surface in device pixels, read per event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.width.is_finite()
            || !self.height.is_finite()
    }
}

/// Pointer position in `[-1, 1]²`, +y up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub const CENTER: Pointer = Pointer { x: 0.0, y: 0.0 };

    /// Maps device pixels to `(2x/w − 1, −(2y/h − 1))`. `None` for an empty
    /// viewport or non-finite input.
    pub fn from_device(x: f32, y: f32, viewport: Viewport) -> Option<Self> {
        if viewport.is_degenerate() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let nx = 2.0 * x / viewport.width - 1.0;
        let ny = -(2.0 * y / viewport.height - 1.0);
        Some(Self {
            x: nx.clamp(-1.0, 1.0),
            y: ny.clamp(-1.0, 1.0),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    Hovering { pointer: Pointer },
}

/// Raw input delivered by the host display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerEnter,
    PointerLeave,
    /// Device-pixel coordinates plus the viewport size at the time of the event.
    PointerMove { x: f32, y: f32, viewport: Viewport },
    Click,
}

/// What an applied event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    pub index_changed: bool,
    pub hover_changed: bool,
}

impl Transition {
    #[inline]
    pub fn selection_changed(&self) -> bool {
        self.index_changed || self.hover_changed
    }
}

/// Applies one event. `len` is the catalog length (at least one).
pub fn apply(state: &mut ViewerState, len: usize, event: HostEvent) -> Transition {
    debug_assert!(len >= 1);
    let mut t = Transition::default();

    match (state.interaction, event) {
        (Interaction::Idle, HostEvent::PointerEnter) => {
            state.interaction = Interaction::Hovering {
                pointer: Pointer::CENTER,
            };
            t.hover_changed = true;
        }
        (Interaction::Hovering { .. }, HostEvent::PointerEnter) => {}
        (Interaction::Hovering { .. }, HostEvent::PointerLeave) => {
            state.interaction = Interaction::Idle;
            t.hover_changed = true;
        }
        (Interaction::Idle, HostEvent::PointerLeave) => {}
        (Interaction::Hovering { pointer }, HostEvent::PointerMove { x, y, viewport }) => {
            let pointer = Pointer::from_device(x, y, viewport).unwrap_or(pointer);
            state.interaction = Interaction::Hovering { pointer };
        }
        (Interaction::Idle, HostEvent::PointerMove { .. }) => {}
        (_, HostEvent::Click) => {
            let next = (state.active_index + 1) % len.max(1);
            t.index_changed = next != state.active_index;
            state.active_index = next;
        }
    }

    t
}

/// Explicit selection from outside the event path. Out-of-range indices are
/// rejected and leave the state untouched.
pub fn set_active_index(
    state: &mut ViewerState,
    len: usize,
    index: usize,
) -> Result<Transition, ViewerError> {
    if index >= len {
        return Err(ViewerError::OutOfRangeIndex { index, len });
    }
    let changed = state.active_index != index;
    state.active_index = index;
    Ok(Transition {
        index_changed: changed,
        hover_changed: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    fn mv(x: f32, y: f32) -> HostEvent {
        HostEvent::PointerMove { x, y, viewport: VP }
    }

    #[test]
    fn starts_idle_at_zero() {
        let s = ViewerState::default();
        assert_eq!(s.active_index(), 0);
        assert_eq!(s.interaction(), Interaction::Idle);
        assert!(!s.hovered());
    }

    #[test]
    fn clicks_cycle_modulo_catalog_length() {
        let len = 5;
        let mut s = ViewerState::default();
        for k in 1..=12 {
            apply(&mut s, len, HostEvent::Click);
            assert_eq!(s.active_index(), k % len);
        }

        let start = s.active_index();
        for _ in 0..len {
            apply(&mut s, len, HostEvent::Click);
        }
        assert_eq!(s.active_index(), start);
    }

    #[test]
    fn single_item_click_is_accepted_without_change() {
        let mut s = ViewerState::default();
        let t = apply(&mut s, 1, HostEvent::Click);
        assert_eq!(s.active_index(), 0);
        assert!(!t.index_changed);
    }

    #[test]
    fn enter_is_idempotent_and_leave_without_enter_is_noop() {
        let mut once = ViewerState::default();
        apply(&mut once, 3, HostEvent::PointerEnter);
        let mut twice = ViewerState::default();
        apply(&mut twice, 3, HostEvent::PointerEnter);
        let t = apply(&mut twice, 3, HostEvent::PointerEnter);
        assert_eq!(once, twice);
        assert!(!t.hover_changed);

        let mut idle = ViewerState::default();
        let t = apply(&mut idle, 3, HostEvent::PointerLeave);
        assert_eq!(idle, ViewerState::default());
        assert_eq!(t, Transition::default());
    }

    #[test]
    fn enter_starts_at_center() {
        let mut s = ViewerState::default();
        apply(&mut s, 3, HostEvent::PointerEnter);
        assert_eq!(s.pointer(), Some(Pointer::CENTER));
    }

    #[test]
    fn hover_and_motion_never_move_the_index() {
        let mut s = ViewerState::default();
        apply(&mut s, 4, HostEvent::Click);
        apply(&mut s, 4, HostEvent::PointerEnter);
        apply(&mut s, 4, mv(10.0, 10.0));
        apply(&mut s, 4, HostEvent::PointerLeave);
        apply(&mut s, 4, mv(500.0, 20.0));
        assert_eq!(s.active_index(), 1);
    }

    #[test]
    fn click_keeps_hover_and_leave_keeps_index() {
        let mut s = ViewerState::default();
        apply(&mut s, 4, HostEvent::PointerEnter);
        apply(&mut s, 4, mv(600.0, 150.0));
        let before = s.pointer();
        apply(&mut s, 4, HostEvent::Click);
        assert!(s.hovered());
        assert_eq!(s.pointer(), before);

        apply(&mut s, 4, HostEvent::PointerLeave);
        assert_eq!(s.active_index(), 1);
        assert!(!s.hovered());
    }

    #[test]
    fn pointer_normalization_corners_and_center() {
        let center = Pointer::from_device(400.0, 300.0, VP).unwrap();
        assert_eq!(center, Pointer::CENTER);

        let top_right = Pointer::from_device(800.0, 0.0, VP).unwrap();
        assert_eq!(top_right, Pointer { x: 1.0, y: 1.0 });

        let bottom_left = Pointer::from_device(0.0, 600.0, VP).unwrap();
        assert_eq!(bottom_left, Pointer { x: -1.0, y: -1.0 });

        let outside = Pointer::from_device(2000.0, -50.0, VP).unwrap();
        assert_eq!(outside, Pointer { x: 1.0, y: 1.0 });
    }

    #[test]
    fn move_uses_the_viewport_of_each_event() {
        let mut s = ViewerState::default();
        apply(&mut s, 2, HostEvent::PointerEnter);
        apply(
            &mut s,
            2,
            HostEvent::PointerMove {
                x: 100.0,
                y: 50.0,
                viewport: Viewport::new(200.0, 100.0),
            },
        );
        assert_eq!(s.pointer(), Some(Pointer::CENTER));

        apply(
            &mut s,
            2,
            HostEvent::PointerMove {
                x: 100.0,
                y: 50.0,
                viewport: Viewport::new(100.0, 100.0),
            },
        );
        assert_eq!(s.pointer(), Some(Pointer { x: 1.0, y: 0.0 }));
    }

    #[test]
    fn degenerate_viewport_keeps_previous_pointer() {
        let mut s = ViewerState::default();
        apply(&mut s, 2, HostEvent::PointerEnter);
        apply(&mut s, 2, mv(800.0, 0.0));
        apply(
            &mut s,
            2,
            HostEvent::PointerMove {
                x: 1.0,
                y: 1.0,
                viewport: Viewport::new(0.0, 0.0),
            },
        );
        assert_eq!(s.pointer(), Some(Pointer { x: 1.0, y: 1.0 }));
    }

    #[test]
    fn non_finite_coordinates_keep_previous_pointer() {
        assert_eq!(Pointer::from_device(f32::NAN, 10.0, VP), None);
        assert_eq!(Pointer::from_device(10.0, f32::INFINITY, VP), None);
        assert_eq!(
            Pointer::from_device(10.0, 10.0, Viewport::new(f32::INFINITY, 600.0)),
            None
        );

        let mut s = ViewerState::default();
        apply(&mut s, 2, HostEvent::PointerEnter);
        apply(&mut s, 2, mv(800.0, 0.0));
        apply(&mut s, 2, mv(f32::NAN, f32::NAN));
        let p = s.pointer().unwrap();
        assert!(p.x.is_finite() && p.y.is_finite());
        assert_eq!(p, Pointer { x: 1.0, y: 1.0 });
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut s = ViewerState::default();
        let err = set_active_index(&mut s, 3, 3).unwrap_err();
        assert!(matches!(err, ViewerError::OutOfRangeIndex { index: 3, len: 3 }));
        assert_eq!(s.active_index(), 0);

        let t = set_active_index(&mut s, 3, 2).unwrap();
        assert!(t.index_changed);
        assert_eq!(s.active_index(), 2);
    }
}
