#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use ui_drawable::{Configuration, DrawableApp};

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    // Optional JSON configuration as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => match Configuration::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::error!("Failed to load configuration from {}: {}", path, e);
                None
            }
        },
        None => None,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([300.0, 220.0]),
        ..Default::default()
    };
    eframe::run_native(
        "UI Drawable",
        native_options,
        Box::new(|cc| Ok(Box::new(DrawableApp::new(cc, config)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {}
