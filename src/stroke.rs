use egui::{Color32, Pos2};
use log::{debug, info};

use crate::brush::BrushState;
use crate::config::Configuration;
use crate::error::{ConfigurationError, DrawableError, DrawableResult};
use crate::geometry::{self, RectGeometry, SENTINEL_POSITION};
use crate::surface::{PaintUniforms, SurfaceBackend};

/// What the surface needs from the widget's host
pub trait WidgetHost {
    /// Map a point from screen space into the widget's local space,
    /// whose origin is the rect pivot
    fn world_to_local(&self, point: Pos2) -> Pos2;

    /// Pointer position for the current frame, in screen space
    fn pointer_position(&self) -> Pos2;
}

/// Per-gesture state, reset only by pointer events
#[derive(Debug, Clone, Copy, PartialEq)]
struct StrokeState {
    last_normalized_position: Pos2,
    pointer_active: bool,
}

/// Buffer and geometry, present once the surface is initialized
#[derive(Debug)]
struct Canvas<B> {
    backend: B,
    geometry: RectGeometry,
    size: [usize; 2],
}

/// A drawing surface driven by pointer events and per-frame ticks.
///
/// Pointer down and up only record a position. Painting happens in
/// [`StrokeSurface::tick`], which moves a smoothed cursor toward the live
/// pointer and composites one segment per frame.
#[derive(Debug)]
pub struct StrokeSurface<B: SurfaceBackend> {
    config: Configuration,
    brush: BrushState,
    stroke: StrokeState,
    canvas: Option<Canvas<B>>,
    last_tick_secs: Option<f64>,
}

impl<B: SurfaceBackend> StrokeSurface<B> {
    /// Creates an uninitialized surface. Call [`Self::initialize`] before drawing.
    pub fn new(config: Configuration) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            brush: BrushState::from_defaults(&config.brush),
            config,
            stroke: StrokeState {
                last_normalized_position: SENTINEL_POSITION,
                pointer_active: false,
            },
            canvas: None,
            last_tick_secs: None,
        })
    }

    /// Creates the buffer for `geometry` and fills it with the initialization color.
    ///
    /// `create` receives the buffer dimensions in pixels.
    pub fn initialize<F>(&mut self, geometry: RectGeometry, create: F) -> DrawableResult<()>
    where
        F: FnOnce(usize, usize) -> DrawableResult<B>,
    {
        if self.canvas.is_some() {
            return Err(DrawableError::AlreadyInitialized);
        }

        let size = geometry.surface_size(self.config.render_multiplier)?;
        let mut backend = create(size[0], size[1])?;
        if backend.size() != size {
            return Err(DrawableError::BackendSize {
                expected: size,
                actual: backend.size(),
            });
        }
        backend.fill_pass(self.config.initialization_color)?;
        info!("🎨 Created {}x{} drawing surface", size[0], size[1]);

        self.canvas = Some(Canvas {
            backend,
            geometry,
            size,
        });

        if !self.config.palette.is_empty() {
            self.set_color_by_index(0)?;
        }
        self.stroke = StrokeState {
            last_normalized_position: SENTINEL_POSITION,
            pointer_active: false,
        };

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.canvas.is_some()
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    pub fn current_brush_color(&self) -> Color32 {
        self.brush.color()
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.pointer_active
    }

    pub fn last_normalized_position(&self) -> Pos2 {
        self.stroke.last_normalized_position
    }

    /// Buffer dimensions in pixels, `None` before initialization
    pub fn surface_size(&self) -> Option<[usize; 2]> {
        self.canvas.as_ref().map(|canvas| canvas.size)
    }

    pub fn backend(&self) -> Option<&B> {
        self.canvas.as_ref().map(|canvas| &canvas.backend)
    }

    /// The painted image
    pub fn texture(&self) -> DrawableResult<&B::Texture> {
        Ok(self.canvas()?.backend.texture())
    }

    pub fn set_thickness(&mut self, thickness: f32) {
        self.brush.set_thickness(thickness);
    }

    pub fn set_flow(&mut self, flow: f32) {
        self.brush.set_flow(flow);
    }

    pub fn set_smoothing_rate(&mut self, rate: f32) {
        self.brush.set_smoothing_rate(rate);
    }

    pub fn set_draw_when_stationary(&mut self, enabled: bool) {
        self.brush.set_draw_when_stationary(enabled);
    }

    pub fn set_color(&mut self, color: Color32) {
        self.brush.set_color(color);
    }

    /// Select a palette color. Out of range indices leave the color unchanged.
    pub fn set_color_by_index(&mut self, index: usize) -> DrawableResult<()> {
        let palette = &self.config.palette;
        let color = palette.get(index).copied().ok_or(
            ConfigurationError::PaletteIndexOutOfRange {
                index,
                len: palette.len(),
            },
        )?;
        info!("Selected palette color {}: {:?}", index, color);
        self.brush.set_color(color);
        Ok(())
    }

    /// Paint with the initialization color
    pub fn set_eraser(&mut self) {
        self.brush.set_color(self.config.initialization_color);
    }

    /// Reset every pixel to the initialization color
    pub fn erase_all(&mut self) -> DrawableResult<()> {
        let color = self.config.initialization_color;
        self.canvas_mut()?.backend.fill_pass(color)?;
        info!("Erased drawing surface");
        Ok(())
    }

    /// Start a stroke at `position` (screen space). Nothing is painted.
    pub fn on_pointer_down(&mut self, host: &dyn WidgetHost, position: Pos2) -> DrawableResult<()> {
        let normalized = self.normalize(host, position)?;
        self.stroke = StrokeState {
            last_normalized_position: normalized,
            pointer_active: true,
        };
        debug!("Stroke started at {:?}", normalized);
        Ok(())
    }

    /// End the stroke at `position` (screen space). Nothing is painted.
    pub fn on_pointer_up(&mut self, host: &dyn WidgetHost, position: Pos2) -> DrawableResult<()> {
        let normalized = self.normalize(host, position)?;
        self.stroke = StrokeState {
            last_normalized_position: normalized,
            pointer_active: false,
        };
        debug!("Stroke ended at {:?}", normalized);
        Ok(())
    }

    /// Release an active stroke when the host loses focus and the matching
    /// pointer-up will never arrive. The last position is kept.
    pub fn on_focus_lost(&mut self) {
        if self.stroke.pointer_active {
            debug!("Focus lost, releasing stroke");
            self.stroke.pointer_active = false;
        }
    }

    /// Frame callback with an absolute timestamp in seconds.
    ///
    /// Elapsed time is measured from the previous call; the first call
    /// counts as zero elapsed. Returns whether a segment was painted.
    pub fn on_tick(&mut self, host: &dyn WidgetHost, now_secs: f64) -> DrawableResult<bool> {
        let elapsed = self
            .last_tick_secs
            .map_or(0.0, |last| (now_secs - last) as f32);
        self.last_tick_secs = Some(now_secs);
        self.tick(host, elapsed)
    }

    /// Frame callback with the elapsed seconds since the previous frame.
    ///
    /// While a stroke is active, moves the cursor toward the live pointer by
    /// `elapsed * smoothing_rate` (clamped to 1) and paints the segment from
    /// the previous cursor to the new one.
    pub fn tick(&mut self, host: &dyn WidgetHost, elapsed_secs: f32) -> DrawableResult<bool> {
        self.canvas()?;
        if !self.stroke.pointer_active {
            return Ok(false);
        }

        let sample = self.normalize(host, host.pointer_position())?;
        let last = self.stroke.last_normalized_position;
        // max/min rather than clamp so a NaN elapsed counts as no movement
        let t = (elapsed_secs * self.brush.smoothing_rate()).max(0.0).min(1.0);
        let target = if t >= 1.0 { sample } else { last.lerp(sample, t) };

        if !self.brush.draw_when_stationary()
            && target.distance(last) <= self.config.stationary_threshold
        {
            return Ok(false);
        }

        let [width, height] = self.canvas()?.size;
        let uniforms = PaintUniforms {
            start: last,
            end: target,
            thickness: self.brush.thickness(),
            color: self.brush.color(),
            flow: self.brush.flow(),
            height_ratio: height as f32 / width as f32,
        };
        self.canvas_mut()?.backend.paint_pass(&uniforms)?;

        self.stroke.last_normalized_position = target;
        Ok(true)
    }

    fn normalize(&self, host: &dyn WidgetHost, position: Pos2) -> DrawableResult<Pos2> {
        let canvas = self.canvas()?;
        Ok(geometry::normalize(
            host.world_to_local(position),
            canvas.geometry.pivot,
            canvas.size,
            self.config.render_multiplier,
            true,
        ))
    }

    fn canvas(&self) -> DrawableResult<&Canvas<B>> {
        self.canvas.as_ref().ok_or(DrawableError::Uninitialized)
    }

    fn canvas_mut(&mut self) -> DrawableResult<&mut Canvas<B>> {
        self.canvas.as_mut().ok_or(DrawableError::Uninitialized)
    }
}
