//! Turns winit window events into the card's [`HostEvent`]s.
//!
//! winit only reports the cursor over the whole window, so enter/leave of
//! the card group is derived by hit-testing each cursor move against the
//! last composed frame.

use crate::camera::Camera;
use cardkit::{Frame, HostEvent, Viewport};
use winit::event::{ElementState, MouseButton, WindowEvent};

#[derive(Debug, Default)]
pub struct PointerBridge {
    over_card: bool,
}

impl PointerBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn over_card(&self) -> bool {
        self.over_card
    }

    /// Host events for one window event. `viewport` is the window's current
    /// size in device pixels.
    pub fn handle_event(
        &mut self,
        event: &WindowEvent,
        viewport: Viewport,
        frame: &Frame,
        camera: &Camera,
    ) -> Vec<HostEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                let hit = !viewport.is_degenerate()
                    && frame.hit_test(&camera.pick_ray(x, y, viewport));
                self.cursor_at(hit, x, y, viewport)
            }
            WindowEvent::CursorLeft { .. } => self.leave(),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if self.over_card => vec![HostEvent::Click],
            _ => Vec::new(),
        }
    }

    /// Events for a cursor at `(x, y)` that does or does not hit the card.
    pub fn cursor_at(&mut self, hit: bool, x: f32, y: f32, viewport: Viewport) -> Vec<HostEvent> {
        let moved = HostEvent::PointerMove { x, y, viewport };
        match (self.over_card, hit) {
            (false, true) => {
                self.over_card = true;
                vec![HostEvent::PointerEnter, moved]
            }
            (true, true) => vec![moved],
            (true, false) => self.leave(),
            (false, false) => Vec::new(),
        }
    }

    pub fn leave(&mut self) -> Vec<HostEvent> {
        if std::mem::take(&mut self.over_card) {
            vec![HostEvent::PointerLeave]
        } else {
            Vec::new()
        }
    }
}
