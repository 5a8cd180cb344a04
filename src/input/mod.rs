use egui::{Context, Event, PointerButton, Pos2, Rect, Response, Vec2};

use crate::stroke::WidgetHost;

/// Pointer and focus messages delivered to the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed over the surface
    PointerDown { position: Pos2 },
    /// Primary button released after a press that started on the surface
    PointerUp { position: Pos2 },
    /// The window lost focus
    FocusLost,
}

/// Handles converting raw egui input into surface InputEvents
#[derive(Debug, Default)]
pub struct InputHandler {
    surface_rect: Option<Rect>,
    pressed_on_surface: bool,
    last_pointer_pos: Option<Pos2>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the screen rectangle the surface is drawn in
    pub fn set_surface_rect(&mut self, rect: Rect) {
        self.surface_rect = Some(rect);
    }

    /// Last known pointer position, in screen space
    pub fn pointer_position(&self) -> Option<Pos2> {
        self.last_pointer_pos
    }

    pub fn surface_rect(&self) -> Option<Rect> {
        self.surface_rect
    }

    /// A press lands on the surface only if the canvas widget is hovered,
    /// i.e. nothing drawn above it holds the pointer
    fn on_surface(&self, canvas: &Response, pos: Pos2) -> bool {
        canvas.hovered() && self.surface_rect.is_some_and(|rect| rect.contains(pos))
    }

    /// Process raw egui input and generate surface events.
    ///
    /// `canvas` is this frame's response of the widget the surface is drawn in.
    pub fn process_input(&mut self, ctx: &Context, canvas: &Response) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            if let Some(pos) = input.pointer.latest_pos() {
                self.last_pointer_pos = Some(pos);
            }

            if input.pointer.button_pressed(PointerButton::Primary) {
                if let Some(pos) = input.pointer.interact_pos() {
                    if self.on_surface(canvas, pos) {
                        self.pressed_on_surface = true;
                        events.push(InputEvent::PointerDown { position: pos });
                    }
                }
            }

            if input.pointer.button_released(PointerButton::Primary) && self.pressed_on_surface {
                self.pressed_on_surface = false;
                if let Some(pos) = input.pointer.latest_pos() {
                    events.push(InputEvent::PointerUp { position: pos });
                } else {
                    // Released outside the window, no position to report
                    events.push(InputEvent::FocusLost);
                }
            }

            let focus_lost = input
                .events
                .iter()
                .any(|event| matches!(event, Event::WindowFocused(false)));
            if focus_lost {
                self.pressed_on_surface = false;
                events.push(InputEvent::FocusLost);
            }
        });

        events
    }
}

/// `WidgetHost` for a surface drawn into an egui rect
#[derive(Debug, Clone, Copy)]
pub struct PanelHost {
    pub rect: Rect,
    pub pivot: Vec2,
    pub pointer: Pos2,
}

impl WidgetHost for PanelHost {
    fn world_to_local(&self, point: Pos2) -> Pos2 {
        let origin = self.rect.min + self.pivot * self.rect.size();
        (point - origin).to_pos2()
    }

    fn pointer_position(&self) -> Pos2 {
        self.pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn test_world_to_local_centered_pivot() {
        let host = PanelHost {
            rect: Rect::from_min_size(pos2(10.0, 20.0), vec2(200.0, 100.0)),
            pivot: Vec2::splat(0.5),
            pointer: Pos2::ZERO,
        };
        assert_eq!(host.world_to_local(pos2(110.0, 70.0)), pos2(0.0, 0.0));
        assert_eq!(host.world_to_local(pos2(10.0, 20.0)), pos2(-100.0, -50.0));
    }

    #[test]
    fn test_world_to_local_corner_pivot() {
        let host = PanelHost {
            rect: Rect::from_min_size(pos2(10.0, 20.0), vec2(200.0, 100.0)),
            pivot: Vec2::ZERO,
            pointer: Pos2::ZERO,
        };
        assert_eq!(host.world_to_local(pos2(10.0, 20.0)), Pos2::ZERO);
    }

    const SCREEN: Rect = Rect::from_min_max(Pos2::ZERO, pos2(800.0, 600.0));

    /// Runs one frame: an optional fixed-width side panel with a button,
    /// then the canvas filling the central panel
    fn run_frame(
        ctx: &Context,
        handler: &mut InputHandler,
        panel_width: Option<f32>,
        events: Vec<Event>,
    ) -> Vec<InputEvent> {
        let raw = egui::RawInput {
            screen_rect: Some(SCREEN),
            events,
            ..Default::default()
        };
        let mut out = Vec::new();
        let _ = ctx.run(raw, |ctx| {
            if let Some(width) = panel_width {
                egui::SidePanel::left("tools_panel")
                    .exact_width(width)
                    .show(ctx, |ui| {
                        let _ = ui.button("Erase all");
                    });
            }
            egui::CentralPanel::default().show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(rect, egui::Sense::drag());
                if handler.surface_rect().is_none() {
                    handler.set_surface_rect(rect);
                }
                out = handler.process_input(ctx, &response);
            });
        });
        out
    }

    fn press(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Default::default(),
        }
    }

    #[test]
    fn test_no_events_without_input() {
        let ctx = Context::default();
        let mut handler = InputHandler::new();
        assert!(run_frame(&ctx, &mut handler, None, Vec::new()).is_empty());
        assert!(run_frame(&ctx, &mut handler, None, Vec::new()).is_empty());
    }

    #[test]
    fn test_press_and_release_on_canvas() {
        let ctx = Context::default();
        let mut handler = InputHandler::new();
        let pos = pos2(400.0, 300.0);

        run_frame(&ctx, &mut handler, None, Vec::new());
        run_frame(&ctx, &mut handler, None, vec![Event::PointerMoved(pos)]);

        let events = run_frame(&ctx, &mut handler, None, vec![press(pos, true)]);
        assert_eq!(events, vec![InputEvent::PointerDown { position: pos }]);

        let events = run_frame(&ctx, &mut handler, None, vec![press(pos, false)]);
        assert_eq!(events, vec![InputEvent::PointerUp { position: pos }]);
    }

    #[test]
    fn test_press_on_panel_covering_old_canvas_area_is_ignored() {
        let ctx = Context::default();
        let mut handler = InputHandler::new();

        // The surface rect is fixed from the first frame, without a panel
        run_frame(&ctx, &mut handler, None, Vec::new());
        let surface_rect = handler.surface_rect().unwrap();

        // The side panel now covers part of that rect
        let pos = pos2(300.0, 300.0);
        assert!(surface_rect.contains(pos));
        run_frame(&ctx, &mut handler, Some(500.0), Vec::new());
        run_frame(&ctx, &mut handler, Some(500.0), vec![Event::PointerMoved(pos)]);

        let events = run_frame(&ctx, &mut handler, Some(500.0), vec![press(pos, true)]);
        assert!(events.is_empty(), "press inside the panel produced {:?}", events);

        // The release is not reported either, since the press never started a stroke
        let events = run_frame(&ctx, &mut handler, Some(500.0), vec![press(pos, false)]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_focus_loss_reported() {
        let ctx = Context::default();
        let mut handler = InputHandler::new();
        run_frame(&ctx, &mut handler, None, Vec::new());

        let events = run_frame(&ctx, &mut handler, None, vec![Event::WindowFocused(false)]);
        assert_eq!(events, vec![InputEvent::FocusLost]);
    }
}
