//! Per-frame orientation update.
//!
//! Orientation is a function of `(interaction, elapsed seconds)` only, so the
//! result does not depend on how many frames were rendered in between.

use crate::{interaction::Interaction, state::ViewerState};
use glam::{Mat4, Vec3};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationParams {
    /// `A`: idle yaw amplitude, radians.
    pub idle_yaw_amplitude: f32,
    /// `ωy`: idle yaw angular frequency, rad/s.
    pub idle_yaw_frequency: f32,
    /// `B`: idle pitch amplitude, radians.
    pub idle_pitch_amplitude: f32,
    /// `ωx`: idle pitch angular frequency, rad/s.
    pub idle_pitch_frequency: f32,
    /// `K`: radians of rotation per unit of normalized pointer offset.
    pub pointer_gain: f32,
    /// Group offset towards the camera while hovered.
    pub hover_depth: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            idle_yaw_amplitude: 0.2,
            idle_yaw_frequency: 0.5,
            idle_pitch_amplitude: 0.1,
            idle_pitch_frequency: 0.3,
            pointer_gain: 0.5,
            hover_depth: 2.0,
        }
    }
}

/// Rotation of the card group.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Rotation about +Y, radians.
    pub yaw: f32,
    /// Rotation about +X, radians.
    pub pitch: f32,
}

impl Orientation {
    /// Model matrix of the group: lift along +Z by `depth`, then yaw, then pitch.
    pub fn group_transform(self, depth: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, depth))
            * Mat4::from_rotation_y(self.yaw)
            * Mat4::from_rotation_x(self.pitch)
    }
}

impl AnimationParams {
    pub fn idle_orientation(&self, t: f32) -> Orientation {
        Orientation {
            yaw: self.idle_yaw_amplitude * (t * self.idle_yaw_frequency).sin(),
            pitch: self.idle_pitch_amplitude * (t * self.idle_pitch_frequency).sin(),
        }
    }

    /// Evaluates orientation and depth for the given interaction at time `t`.
    pub fn evaluate(&self, interaction: Interaction, t: f32) -> (Orientation, f32) {
        match interaction {
            Interaction::Idle => (self.idle_orientation(t), 0.0),
            Interaction::Hovering { pointer } => (
                Orientation {
                    yaw: pointer.x * self.pointer_gain,
                    pitch: pointer.y * self.pointer_gain,
                },
                self.hover_depth,
            ),
        }
    }

    /// Writes this frame's orientation and depth into `state`.
    pub fn step(&self, state: &mut ViewerState, elapsed: Duration) {
        let (orientation, depth) = self.evaluate(state.interaction, elapsed.as_secs_f32());
        state.orientation = orientation;
        state.depth_offset = depth;
    }
}

/// Wall-clock time since the viewer started.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Pointer;

    #[test]
    fn idle_rotation_is_zero_at_start() {
        let p = AnimationParams::default();
        let (o, depth) = p.evaluate(Interaction::Idle, 0.0);
        assert_eq!(o, Orientation { yaw: 0.0, pitch: 0.0 });
        assert_eq!(depth, 0.0);
    }

    #[test]
    fn idle_rotation_is_bounded() {
        let p = AnimationParams::default();
        for i in 0..10_000 {
            let o = p.idle_orientation(i as f32 * 0.037);
            assert!(o.yaw.abs() <= p.idle_yaw_amplitude + 1e-6);
            assert!(o.pitch.abs() <= p.idle_pitch_amplitude + 1e-6);
        }
    }

    #[test]
    fn result_is_independent_of_frame_count() {
        let p = AnimationParams::default();
        let target = Duration::from_millis(2_750);

        // One big step.
        let mut coarse = ViewerState::default();
        p.step(&mut coarse, target);

        // Many small irregular steps ending at the same instant.
        let mut fine = ViewerState::default();
        let mut t = Duration::ZERO;
        let deltas = [7u64, 16, 33, 4, 16, 16, 50];
        let mut i = 0;
        while t < target {
            t = (t + Duration::from_millis(deltas[i % deltas.len()])).min(target);
            p.step(&mut fine, t);
            i += 1;
        }

        assert_eq!(coarse.orientation(), fine.orientation());
    }

    #[test]
    fn idle_is_continuous() {
        let p = AnimationParams::default();
        let mut prev = p.idle_orientation(0.0);
        for i in 1..2_000 {
            let o = p.idle_orientation(i as f32 * 0.001);
            assert!((o.yaw - prev.yaw).abs() < 1e-3);
            assert!((o.pitch - prev.pitch).abs() < 1e-3);
            prev = o;
        }
    }

    #[test]
    fn hover_tracks_pointer_directly_and_lifts_group() {
        let p = AnimationParams::default();
        let hovering = Interaction::Hovering {
            pointer: Pointer { x: 1.0, y: -0.5 },
        };
        // Same answer at any time: no easing.
        for t in [0.0, 1.0, 123.4] {
            let (o, depth) = p.evaluate(hovering, t);
            assert_eq!(o.yaw, 0.5);
            assert_eq!(o.pitch, -0.25);
            assert_eq!(depth, p.hover_depth);
        }
    }

    #[test]
    fn group_transform_lifts_along_z() {
        let m = Orientation::default().group_transform(2.0);
        let origin = m.transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(0.0, 0.0, 2.0));
    }
}
