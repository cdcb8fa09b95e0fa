use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use cinegraph::view::{EdgeTone, NodeTone};

/// Maps graph coordinates (origin top-left of the viewport) to the screen.
/// The viewport centre sits on the canvas centre before panning.
#[derive(Clone, Copy, Debug)]
pub(super) struct CanvasTransform {
    pub(super) rect: Rect,
    pub(super) pan: Vec2,
    pub(super) zoom: f32,
    pub(super) viewport: Vec2,
}

impl CanvasTransform {
    pub(super) fn to_screen(self, world: Pos2) -> Pos2 {
        self.rect.center() + self.pan + (world.to_vec2() - self.viewport * 0.5) * self.zoom
    }

    pub(super) fn to_world(self, screen: Pos2) -> Pos2 {
        ((screen - self.rect.center() - self.pan) / self.zoom + self.viewport * 0.5).to_pos2()
    }
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub(super) fn draw_background(painter: &Painter, transform: CanvasTransform) {
    let rect = transform.rect;
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let top_left = transform.to_screen(Pos2::ZERO);
    let bottom_right = transform.to_screen(transform.viewport.to_pos2());
    painter.rect_stroke(
        Rect::from_two_pos(top_left, bottom_right),
        0.0,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 120)),
        eframe::egui::StrokeKind::Inside,
    );
}

pub(super) fn node_fill(tone: NodeTone) -> Color32 {
    match tone {
        NodeTone::Normal => Color32::from_rgb(140, 200, 230),
        NodeTone::Hovered => Color32::from_rgb(241, 146, 94),
        NodeTone::Candidate => Color32::from_rgb(226, 68, 68),
        NodeTone::Focused => Color32::from_rgb(245, 206, 93),
        NodeTone::Unfocused => Color32::from_rgba_unmultiplied(140, 200, 230, 60),
    }
}

pub(super) fn edge_stroke(tone: EdgeTone, zoom: f32, arc: bool) -> Stroke {
    let width = (1.5 * zoom.sqrt()).clamp(0.6, 3.4);
    match tone {
        EdgeTone::Hovered => Stroke::new(width * 1.6, Color32::from_rgb(241, 146, 94)),
        EdgeTone::Unfocused => {
            Stroke::new(width * 0.6, Color32::from_rgba_unmultiplied(80, 90, 104, 50))
        }
        EdgeTone::Normal if arc => {
            Stroke::new(width, Color32::from_rgba_unmultiplied(160, 160, 160, 90))
        }
        EdgeTone::Normal => Stroke::new(width, Color32::from_rgba_unmultiplied(150, 150, 150, 170)),
    }
}
