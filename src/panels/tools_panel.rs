use egui::{Color32, Slider};

use crate::brush::{FLOW_RANGE, SMOOTHING_RANGE};
use crate::DrawableApp;

pub fn tools_panel(app: &mut DrawableApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Brush");
            ui.separator();

            let palette = app.palette().to_vec();
            let Some(surface) = app.surface_mut() else {
                ui.label("Surface not ready");
                return;
            };

            let brush = surface.brush().clone();
            let mut color = brush.color();
            let mut thickness = brush.thickness();
            let mut flow = brush.flow();
            let mut smoothing = brush.smoothing_rate();
            let mut stationary = brush.draw_when_stationary();

            ui.horizontal(|ui| {
                ui.label("Color:");
                if egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut color,
                    egui::color_picker::Alpha::OnlyBlend,
                )
                .changed()
                {
                    surface.set_color(color);
                }
            });

            if !palette.is_empty() {
                ui.horizontal_wrapped(|ui| {
                    for (index, swatch) in palette.iter().enumerate() {
                        let button = egui::Button::new("   ")
                            .fill(*swatch)
                            .selected(brush.color() == *swatch);
                        if ui.add(button).clicked() {
                            if let Err(e) = surface.set_color_by_index(index) {
                                log::error!("Palette selection failed: {}", e);
                            }
                        }
                    }
                });
            }

            ui.horizontal(|ui| {
                ui.label("Thickness:");
                if ui.add(Slider::new(&mut thickness, 1.0..=64.0)).changed() {
                    surface.set_thickness(thickness);
                }
            });

            ui.horizontal(|ui| {
                ui.label("Flow:");
                if ui.add(Slider::new(&mut flow, FLOW_RANGE)).changed() {
                    surface.set_flow(flow);
                }
            });

            ui.horizontal(|ui| {
                ui.label("Smoothing:");
                if ui.add(Slider::new(&mut smoothing, SMOOTHING_RANGE)).changed() {
                    surface.set_smoothing_rate(smoothing);
                }
            });

            if ui
                .checkbox(&mut stationary, "Paint while holding still")
                .changed()
            {
                surface.set_draw_when_stationary(stationary);
            }

            ui.separator();

            let eraser_color = surface.configuration().initialization_color;
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(brush.color() == eraser_color, "⌫ Eraser")
                    .clicked()
                {
                    surface.set_eraser();
                }
                if ui.button("Erase all").clicked() {
                    if let Err(e) = surface.erase_all() {
                        log::error!("Erase failed: {}", e);
                    }
                }
            });

            ui.separator();
            let [width, height] = surface.surface_size().unwrap_or([0, 0]);
            ui.label(format!("Surface: {}x{} px", width, height));
            if surface.is_drawing() {
                ui.colored_label(Color32::LIGHT_GREEN, "Drawing");
            }
        });
}
