use eframe::egui::{self, Align2, Color32, FontId, PointerButton, Sense, Shape, Stroke, Ui, vec2};

use cinegraph::PointerEvent;
use cinegraph::render::EdgeShape;
use cinegraph::view::DrawList;

use super::ViewModel;
use super::render_utils::{
    CanvasTransform, draw_background, edge_stroke, node_fill, with_opacity,
};

const ARC_SEGMENTS: usize = 32;

impl ViewModel {
    pub(super) fn draw_graph(&mut self, ui: &mut Ui, now: f64) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let blocked = self.notice.is_some();

        if self.view.pan_zoom_enabled() && !blocked {
            self.handle_graph_zoom(ui, rect, &response);
            self.handle_graph_pan(&response);
        }

        let transform = CanvasTransform {
            rect,
            pan: self.pan,
            zoom: self.zoom,
            viewport: self.view.viewport(),
        };
        draw_background(&painter, transform);

        if !blocked {
            self.route_pointer(ui, &response, transform, now);
        }

        if self.pointer_over.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let list = self.view.draw_list(now);
        self.paint(&painter, transform, &list);
    }

    fn handle_graph_zoom(&mut self, ui: &Ui, rect: egui::Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let anchor = (pointer - rect.center() - self.pan) / self.zoom;

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 6.0);
        self.pan = pointer - rect.center() - (anchor * self.zoom);
    }

    fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Turns raw egui pointer state into engine events.
    fn route_pointer(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        transform: CanvasTransform,
        now: f64,
    ) {
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pos| transform.rect.contains(*pos))
            .map(|pos| transform.to_world(pos));
        let under = pointer.and_then(|pos| self.view.node_at(pos));

        if under != self.pointer_over {
            if let Some(previous) = self.pointer_over.take() {
                self.send(PointerEvent::Leave(previous), now);
            }
            if let Some(next) = under.clone() {
                self.send(PointerEvent::Enter(next), now);
            }
            self.pointer_over = under.clone();
        }

        if let Some(pos) = pointer
            && !self.view.drag_state().is_idle()
        {
            self.send(PointerEvent::Move(pos), now);
        }

        let (pressed, released) = ui.input(|input| {
            (
                input.pointer.button_pressed(PointerButton::Primary),
                input.pointer.button_released(PointerButton::Primary),
            )
        });

        if pressed
            && let (Some(node), Some(pos)) = (under.clone(), pointer)
        {
            self.selected = Some(node.clone());
            self.attribute_key.clear();
            self.attribute_value.clear();
            self.send(PointerEvent::Press { node, pos }, now);
        }

        if released && !self.view.drag_state().is_idle() {
            self.send(PointerEvent::Release, now);
        }

        if response.clicked_by(PointerButton::Primary)
            && under.is_none()
            && let Some(pos) = pointer
        {
            self.send(PointerEvent::Click(pos), now);
        }
    }

    fn send(&mut self, event: PointerEvent, now: f64) {
        if let Some(notice) = self.view.handle_pointer(event, now, &mut self.details) {
            self.notice = Some(notice);
        }
    }

    fn paint(&self, painter: &egui::Painter, transform: CanvasTransform, list: &DrawList) {
        let zoom = transform.zoom;

        for edge in &list.edges {
            match &edge.shape {
                EdgeShape::Line { from, to } => {
                    let mut stroke = edge_stroke(edge.tone, zoom, false);
                    stroke.color = with_opacity(stroke.color, edge.opacity);
                    painter.line_segment(
                        [transform.to_screen(*from), transform.to_screen(*to)],
                        stroke,
                    );
                }
                EdgeShape::Arc(arc) => {
                    let mut stroke = edge_stroke(edge.tone, zoom, true);
                    stroke.color = with_opacity(stroke.color, edge.opacity);
                    let points = arc
                        .points(ARC_SEGMENTS)
                        .into_iter()
                        .map(|point| transform.to_screen(point))
                        .collect::<Vec<_>>();
                    painter.add(Shape::line(points, stroke));
                }
            }
        }

        if let Some([from, to]) = list.guide {
            painter.line_segment(
                [transform.to_screen(from), transform.to_screen(to)],
                Stroke::new(1.5, Color32::WHITE),
            );
        }

        for node in &list.nodes {
            let center = transform.to_screen(node.center);
            let radius = (node.radius * zoom).max(0.5);
            painter.circle_filled(center, radius, with_opacity(node_fill(node.tone), node.opacity));
            if self.selected.as_ref() == Some(&node.id) {
                painter.circle_stroke(
                    center,
                    radius + 2.5,
                    Stroke::new(1.5, with_opacity(Color32::WHITE, node.opacity)),
                );
            }
        }

        let font = FontId::proportional((11.0 * zoom.sqrt()).clamp(9.0, 18.0));
        for label in &list.labels {
            let anchor = transform.to_screen(label.anchor) + vec2(7.0 * zoom, -7.0 * zoom);
            painter.text(
                anchor,
                Align2::LEFT_BOTTOM,
                label.text.as_str(),
                font.clone(),
                with_opacity(Color32::from_rgb(225, 228, 232), label.opacity),
            );
        }
    }
}
