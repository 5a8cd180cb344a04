use thiserror::Error;

/// Errors caused by bad configuration or bad arguments from the UI layer
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Palette index {index} out of range (palette has {len} colors)")]
    PaletteIndexOutOfRange { index: usize, len: usize },

    #[error("Render multiplier {0} outside of [0.5, 4]")]
    RenderMultiplierOutOfRange(f32),

    #[error("Invalid brush default for {field}: {value}")]
    InvalidBrushDefault { field: &'static str, value: f32 },

    #[error("Failed to read configuration: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by the drawing surface
#[derive(Debug, Error)]
pub enum DrawableError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Drawing surface used before its buffer was created")]
    Uninitialized,

    #[error("Drawing surface already initialized")]
    AlreadyInitialized,

    #[error("Surface resolves to a degenerate {width}x{height} pixel buffer")]
    DegenerateGeometry { width: usize, height: usize },

    #[error("Backend created a {actual:?} buffer, expected {expected:?}")]
    BackendSize {
        expected: [usize; 2],
        actual: [usize; 2],
    },

    #[error("Paint pass failed: {0}")]
    PaintPass(String),
}

/// Result type for drawing surface operations
pub type DrawableResult<T> = Result<T, DrawableError>;
