use crate::InpaintApp;

pub fn tools_panel(app: &mut InpaintApp, ui: &mut egui::Ui) {
    ui.heading("Tools");
    ui.separator();

    let busy = app.render_in_flight();
    let has_file = app.editor().file().is_some();

    let mut use_hd = app.editor().use_hd();
    if ui
        .add_enabled(!busy, egui::Checkbox::new(&mut use_hd, "HD"))
        .on_hover_text("Edit at full resolution. Switching clears the edit history.")
        .changed()
    {
        log::info!("HD mode {}", if use_hd { "on" } else { "off" });
        app.set_use_hd(use_hd);
    }

    // Brush size slider
    ui.horizontal(|ui| {
        ui.label("Brush:");
        let mut size = app.editor().config().brush_size;
        if ui.add(egui::Slider::new(&mut size, 5.0..=200.0)).changed() {
            app.editor_mut().set_brush_size(size);
        }
    });

    ui.separator();

    ui.horizontal(|ui| {
        let can_undo = !busy && app.editor().history().can_undo();
        if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
            app.undo();
        }

        // Preview mode renders on every stroke, HD waits for this button
        let can_render = !busy && has_file && app.editor().use_hd();
        if ui.add_enabled(can_render, egui::Button::new("Render")).clicked() {
            app.start_render(ui.ctx());
        }

        if ui.add_enabled(!busy && has_file, egui::Button::new("Download")).clicked() {
            app.download();
        }
    });

    ui.separator();

    let history = app.editor().history();
    ui.label(format!("Edits: {}", history.committed_len()));
    ui.label(format!("Strokes in batch: {}", history.current().committed().len()));
    if busy {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Rendering…");
        });
    }
}
