use crate::DrawableApp;

pub fn central_panel(app: &mut DrawableApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let canvas_rect = ui.available_rect_before_wrap();
        app.ensure_surface(canvas_rect);

        // Presses only reach the surface when this widget is hovered
        let response = ui.allocate_rect(canvas_rect, egui::Sense::drag());

        app.handle_input(ctx, &response);

        if let Some((texture_id, rect)) = app.display(ctx) {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            ui.painter().image(texture_id, rect, uv, egui::Color32::WHITE);
        }

        if let Some(err) = app.last_error() {
            ui.colored_label(egui::Color32::RED, err);
        }
    });
}
