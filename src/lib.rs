#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod brush;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod panels;
pub mod stroke;
pub mod surface;
pub mod texture_manager;

pub use app::DrawableApp;
pub use brush::BrushState;
pub use config::{BrushDefaults, Configuration};
pub use error::{ConfigurationError, DrawableError, DrawableResult};
pub use geometry::{RectGeometry, SENTINEL_POSITION};
pub use input::{InputEvent, InputHandler, PanelHost};
pub use stroke::{StrokeSurface, WidgetHost};
pub use surface::{PaintUniforms, SoftwareSurface, SurfaceBackend};
