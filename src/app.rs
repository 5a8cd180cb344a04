use egui::{Pos2, Rect, Vec2};
use log::{error, info};

use crate::brush::BrushState;
use crate::config::Configuration;
use crate::geometry::RectGeometry;
use crate::input::{InputEvent, InputHandler, PanelHost};
use crate::panels::{central_panel, tools_panel};
use crate::stroke::StrokeSurface;
use crate::surface::SoftwareSurface;
use crate::texture_manager::TextureManager;

/// Settings restored across launches. The painted image is never persisted.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
struct SavedSettings {
    config: Configuration,
    brush: Option<BrushState>,
}

/// Desktop host for a single drawing surface
pub struct DrawableApp {
    config: Configuration,
    /// Brush to apply once the surface exists
    restored_brush: Option<BrushState>,
    surface: Option<StrokeSurface<SoftwareSurface>>,
    /// Screen rect the buffer is displayed in, fixed at initialization
    surface_rect: Option<Rect>,
    pivot: Vec2,
    input: InputHandler,
    textures: TextureManager,
    last_error: Option<String>,
}

impl DrawableApp {
    /// Called once before the first frame.
    ///
    /// An explicit `config` wins over the one saved by a previous run.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Option<Configuration>) -> Self {
        let saved: SavedSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let config = match config {
            Some(config) => config,
            None => match saved.config.validate() {
                Ok(()) => saved.config,
                Err(e) => {
                    error!("Ignoring saved configuration: {}", e);
                    Configuration::default()
                }
            },
        };

        Self::with_config(config, saved.brush)
    }

    fn with_config(config: Configuration, restored_brush: Option<BrushState>) -> Self {
        Self {
            config,
            restored_brush,
            surface: None,
            surface_rect: None,
            pivot: Vec2::splat(0.5),
            input: InputHandler::new(),
            textures: TextureManager::new(),
            last_error: None,
        }
    }

    pub fn surface(&self) -> Option<&StrokeSurface<SoftwareSurface>> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut StrokeSurface<SoftwareSurface>> {
        self.surface.as_mut()
    }

    pub fn palette(&self) -> &[egui::Color32] {
        &self.config.palette
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Log and remember a failed surface operation
    pub fn report<T>(&mut self, result: crate::DrawableResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Drawing surface error: {}", e);
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    /// Creates the surface the first time a rect is available for it
    pub fn ensure_surface(&mut self, rect: Rect) {
        if self.surface.is_some() || self.last_error.is_some() {
            return;
        }

        let result = StrokeSurface::new(self.config.clone())
            .map_err(crate::DrawableError::from)
            .and_then(|mut surface| {
                let geometry = RectGeometry::new(rect.size(), self.pivot);
                surface.initialize(geometry, |w, h| Ok(SoftwareSurface::new(w, h)))?;
                Ok(surface)
            });

        if let Some(mut surface) = self.report(result) {
            if let Some(brush) = self.restored_brush.take() {
                surface.set_thickness(brush.thickness());
                surface.set_flow(brush.flow());
                surface.set_smoothing_rate(brush.smoothing_rate());
                surface.set_draw_when_stationary(brush.draw_when_stationary());
                surface.set_color(brush.color());
            }
            info!("Surface placed at {:?}", rect);
            self.surface_rect = Some(rect);
            self.input.set_surface_rect(rect);
            self.surface = Some(surface);
        }
    }

    /// Route this frame's pointer events and run one tick.
    ///
    /// `canvas` is the response of the widget the surface is drawn in.
    pub fn handle_input(&mut self, ctx: &egui::Context, canvas: &egui::Response) {
        let Some(rect) = self.surface_rect else {
            return;
        };

        let events = self.input.process_input(ctx, canvas);
        let host = PanelHost {
            rect,
            pivot: self.pivot,
            pointer: self.input.pointer_position().unwrap_or(Pos2::ZERO),
        };
        let now = ctx.input(|i| i.time);

        self.apply_events(&events, &host, now);
        if self.surface.as_ref().is_some_and(|surface| surface.is_drawing()) {
            ctx.request_repaint();
        }
    }

    /// Deliver a frame's events to the surface, then tick it once.
    ///
    /// A press released within the same frame gets a tick of its own before
    /// the release, so a quick tap still leaves a dot. The error label is
    /// cleared by the first frame that runs without errors.
    pub fn apply_events(&mut self, events: &[InputEvent], host: &PanelHost, now: f64) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        let mut results = Vec::new();
        let mut pressed_this_frame = false;
        for event in events {
            let result = match *event {
                InputEvent::PointerDown { position } => {
                    pressed_this_frame = true;
                    surface.on_pointer_down(host, position)
                }
                InputEvent::PointerUp { position } => {
                    let tap = if pressed_this_frame && surface.is_drawing() {
                        surface.on_tick(host, now).map(|_| ())
                    } else {
                        Ok(())
                    };
                    let released = surface.on_pointer_up(host, position);
                    tap.and(released)
                }
                InputEvent::FocusLost => {
                    surface.on_focus_lost();
                    Ok(())
                }
            };
            results.push(result);
        }
        results.push(surface.on_tick(host, now).map(|_| ()));

        let errors: Vec<_> = results.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() {
            self.last_error = None;
        }
        for e in errors {
            self.report::<()>(Err(e));
        }
    }

    /// Texture id and screen rect of the painted image
    pub fn display(&mut self, ctx: &egui::Context) -> Option<(egui::TextureId, Rect)> {
        let rect = self.surface_rect?;
        let backend = self.surface.as_ref()?.backend()?;
        Some((self.textures.sync(ctx, backend), rect))
    }
}

impl eframe::App for DrawableApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = SavedSettings {
            config: self.config.clone(),
            brush: self
                .surface
                .as_ref()
                .map(|surface| surface.brush().clone())
                .or_else(|| self.restored_brush.clone()),
        };
        eframe::set_value(storage, eframe::APP_KEY, &settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        tools_panel(self, ctx);
        central_panel(self, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn test_surface_created_once() {
        let mut app = DrawableApp::with_config(Configuration::default(), None);
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(200.0, 100.0));

        app.ensure_surface(rect);
        assert_eq!(app.surface().and_then(|s| s.surface_size()), Some([200, 100]));

        // A later, larger rect does not resize the buffer
        app.ensure_surface(Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 300.0)));
        assert_eq!(app.surface().and_then(|s| s.surface_size()), Some([200, 100]));
    }

    #[test]
    fn test_degenerate_rect_reported() {
        let mut app = DrawableApp::with_config(Configuration::default(), None);
        app.ensure_surface(Rect::from_min_size(pos2(0.0, 0.0), vec2(0.0, 100.0)));
        assert!(app.surface().is_none());
        assert!(app.last_error().is_some());
    }

    fn host_at(rect: Rect, pointer: Pos2) -> PanelHost {
        PanelHost {
            rect,
            pivot: Vec2::splat(0.5),
            pointer,
        }
    }

    #[test]
    fn test_tap_within_one_frame_leaves_a_dot() {
        let mut app = DrawableApp::with_config(Configuration::default(), None);
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(200.0, 100.0));
        app.ensure_surface(rect);
        app.surface_mut().unwrap().set_thickness(4.0);

        let tap = pos2(100.0, 50.0);
        let events = [
            InputEvent::PointerDown { position: tap },
            InputEvent::PointerUp { position: tap },
        ];
        app.apply_events(&events, &host_at(rect, tap), 1.0);

        let surface = app.surface().unwrap();
        assert!(!surface.is_drawing());
        let pixel = surface.backend().unwrap().pixel(100, 50).unwrap();
        assert_ne!(pixel, egui::Color32::WHITE);
    }

    #[test]
    fn test_release_in_later_frame_does_not_double_tick() {
        let mut app = DrawableApp::with_config(Configuration::default(), None);
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(200.0, 100.0));
        app.ensure_surface(rect);

        let pos = pos2(100.0, 50.0);
        let host = host_at(rect, pos);
        app.apply_events(&[InputEvent::PointerDown { position: pos }], &host, 1.0);
        let version = app.surface().unwrap().backend().unwrap().version();

        // Only the release happens this frame: no tick runs for it
        app.apply_events(&[InputEvent::PointerUp { position: pos }], &host, 1.1);
        assert_eq!(app.surface().unwrap().backend().unwrap().version(), version);
    }

    #[test]
    fn test_error_label_cleared_by_clean_frame() {
        let mut app = DrawableApp::with_config(Configuration::default(), None);
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(200.0, 100.0));
        app.ensure_surface(rect);

        app.report::<()>(Err(crate::DrawableError::PaintPass("device lost".to_string())));
        assert!(app.last_error().is_some());

        app.apply_events(&[], &host_at(rect, Pos2::ZERO), 1.0);
        assert!(app.last_error().is_none());
    }

    #[test]
    fn test_restored_brush_applied() {
        let mut brush = BrushState::default();
        brush.set_thickness(12.0);
        brush.set_color(egui::Color32::RED);

        let mut app = DrawableApp::with_config(Configuration::default(), Some(brush));
        app.ensure_surface(Rect::from_min_size(pos2(0.0, 0.0), vec2(50.0, 50.0)));

        let surface = app.surface().unwrap();
        assert_eq!(surface.brush().thickness(), 12.0);
        assert_eq!(surface.current_brush_color(), egui::Color32::RED);
    }
}
