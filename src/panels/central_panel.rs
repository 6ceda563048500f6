use crate::InpaintApp;
use crate::input::CanvasView;

pub fn central_panel(app: &mut InpaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(texture) = app.canvas_texture(ctx) else {
            ui.centered_and_justified(|ui| {
                ui.label("Drop an image here to start");
            });
            return;
        };
        let texture_id = texture.id();
        let size = texture.size_vec2();

        let view = CanvasView::fit(ui.available_rect_before_wrap(), size);
        let response = ui.allocate_rect(view.rect, egui::Sense::drag());
        let painter = ui.painter_at(view.rect);
        painter.image(
            texture_id,
            view.rect,
            egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        // Strokes can't be added while a render is in flight
        if app.render_in_flight() {
            response.on_hover_cursor(egui::CursorIcon::Progress);
        } else {
            if response.drag_started() {
                app.editor_mut().start_stroke();
            }
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    app.editor_mut().add_point(view.to_canvas(pos));
                }
            }
            if response.drag_stopped() {
                app.finish_stroke(ctx);
            }
        }

        // The stroke being drawn is not on the canvas yet
        let [r, g, b, a] = app.editor().config().highlight_color;
        let color = egui::Color32::from_rgba_unmultiplied(r, g, b, a);
        if let Some(line) = app.editor().current_lines().last().filter(|line| !line.is_empty()) {
            let width = line.size() * view.scale();
            let points: Vec<egui::Pos2> = line.points().iter().map(|p| view.to_screen(*p)).collect();
            if let [single] = points.as_slice() {
                painter.circle_filled(*single, width / 2.0, color);
            } else {
                painter.add(egui::Shape::line(points, egui::Stroke::new(width, color)));
            }
        }
    });
}
