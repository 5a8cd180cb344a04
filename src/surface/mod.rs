use egui::{Color32, Pos2};

use crate::error::DrawableResult;

mod software;
pub use software::SoftwareSurface;

/// Parameters of one incremental paint pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintUniforms {
    /// Segment start, normalized
    pub start: Pos2,
    /// Segment end, normalized
    pub end: Pos2,
    /// Brush diameter in buffer pixels
    pub thickness: f32,
    pub color: Color32,
    /// Paint strength in [0, 10]
    pub flow: f32,
    /// Buffer height divided by width
    pub height_ratio: f32,
}

/// A persistent double-buffered image the stroke controller paints into.
///
/// Each `paint_pass` composites onto whatever the previous passes left, so
/// passes are order dependent. A failed pass must leave the image untouched.
pub trait SurfaceBackend {
    /// Read-only handle exposed to the host for display
    type Texture;

    /// Pixel dimensions, fixed for the lifetime of the backend
    fn size(&self) -> [usize; 2];

    /// Fill the whole image with `color`
    fn fill_pass(&mut self, color: Color32) -> DrawableResult<()>;

    /// Composite one segment, reading the previous frame and writing the next
    fn paint_pass(&mut self, uniforms: &PaintUniforms) -> DrawableResult<()>;

    fn texture(&self) -> &Self::Texture;
}
