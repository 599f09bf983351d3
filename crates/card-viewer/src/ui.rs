use crate::camera::Camera;
use cardkit::{compose::TextAnchor, Frame, Rgba, Viewport};
use egui::{Align2, Color32, FontId};
use glam::Vec3;

/// Labels smaller than this many points are not worth drawing.
const MIN_LABEL_PT: f32 = 1.0;

fn color32(c: Rgba) -> Color32 {
    let [r, g, b, a] = c.to_rgba8();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Paints the frame's text labels where their anchors project on screen,
/// sized so one `font_size` in world units matches its on-screen height.
pub fn draw_labels(ctx: &egui::Context, frame: &Frame, camera: &Camera, viewport: Viewport) {
    let ppp = ctx.pixels_per_point();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("card_labels"),
    ));

    for label in frame.labels() {
        let anchor = frame.transform.transform_point3(label.position);
        let top = frame
            .transform
            .transform_point3(label.position + Vec3::Y * label.font_size);
        let (Some(a), Some(t)) = (
            camera.project(anchor, viewport),
            camera.project(top, viewport),
        ) else {
            continue;
        };

        let size_pt = (a - t).length() / ppp;
        if size_pt < MIN_LABEL_PT {
            continue;
        }

        let pos = egui::pos2(a.x / ppp, a.y / ppp);
        let align = match label.anchor {
            TextAnchor::Left => Align2::LEFT_CENTER,
            TextAnchor::Center => Align2::CENTER_CENTER,
        };
        let font = FontId::proportional(size_pt);

        if let Some(outline) = label.outline {
            let c = color32(outline);
            for offset in [
                egui::vec2(-1.0, 0.0),
                egui::vec2(1.0, 0.0),
                egui::vec2(0.0, -1.0),
                egui::vec2(0.0, 1.0),
            ] {
                painter.text(pos + offset, align, &label.text, font.clone(), c);
            }
        }
        painter.text(pos, align, &label.text, font, color32(label.color));
    }
}

pub struct HudInfo<'a> {
    pub name: &'a str,
    pub index: usize,
    pub count: usize,
    pub hovered: bool,
    pub hint: Option<&'a str>,
    pub loading: bool,
    pub failed: usize,
    pub last_failure: Option<&'a str>,
}

/// Top-left status panel.
pub fn draw_hud(ctx: &egui::Context, hud: &HudInfo<'_>) {
    egui::Area::new(egui::Id::new("card_hud"))
        .anchor(Align2::LEFT_TOP, [12.0, 12.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(format!("{} ({}/{})", hud.name, hud.index + 1, hud.count));
                if hud.hovered {
                    ui.label("Hovering");
                }
                if let Some(hint) = hud.hint {
                    ui.weak(hint);
                }
                if hud.loading {
                    ui.weak("Loading textures…");
                }
                if hud.failed > 0 {
                    ui.colored_label(
                        Color32::LIGHT_RED,
                        format!("{} texture(s) failed to load", hud.failed),
                    );
                    if let Some(last) = hud.last_failure {
                        ui.small(last);
                    }
                }
            });
        });
}
