use egui::Color32;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::brush::{FLOW_RANGE, MIN_THICKNESS, SMOOTHING_RANGE};
use crate::error::ConfigurationError;

/// Allowed range for the buffer's render multiplier
pub const RENDER_MULTIPLIER_RANGE: std::ops::RangeInclusive<f32> = 0.5..=4.0;

/// Initial brush parameters applied when the surface is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushDefaults {
    pub thickness: f32,
    pub flow: f32,
    pub smoothing_rate: f32,
    pub draw_when_stationary: bool,
}

impl Default for BrushDefaults {
    fn default() -> Self {
        Self {
            thickness: 1.0,
            flow: 5.0,
            smoothing_rate: 20.0,
            draw_when_stationary: true,
        }
    }
}

/// Surface configuration, fixed once the surface has been initialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to their defaults
pub struct Configuration {
    /// Fill color of a fresh surface, also used by the eraser
    pub initialization_color: Color32,
    /// Buffer pixels per widget unit
    pub render_multiplier: f32,
    /// Selectable colors for `set_color_by_index`
    pub palette: Vec<Color32>,
    pub brush: BrushDefaults,
    /// Largest normalized movement still treated as standing still
    pub stationary_threshold: f32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            initialization_color: Color32::WHITE,
            render_multiplier: 1.0,
            palette: Vec::new(),
            brush: BrushDefaults::default(),
            stationary_threshold: 0.0,
        }
    }
}

impl Configuration {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every ranged field
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !RENDER_MULTIPLIER_RANGE.contains(&self.render_multiplier) {
            return Err(ConfigurationError::RenderMultiplierOutOfRange(
                self.render_multiplier,
            ));
        }

        let brush = &self.brush;
        if !brush.thickness.is_finite() || brush.thickness < MIN_THICKNESS {
            return Err(ConfigurationError::InvalidBrushDefault {
                field: "thickness",
                value: brush.thickness,
            });
        }
        if !FLOW_RANGE.contains(&brush.flow) {
            return Err(ConfigurationError::InvalidBrushDefault {
                field: "flow",
                value: brush.flow,
            });
        }
        if !SMOOTHING_RANGE.contains(&brush.smoothing_rate) {
            return Err(ConfigurationError::InvalidBrushDefault {
                field: "smoothing_rate",
                value: brush.smoothing_rate,
            });
        }
        if !self.stationary_threshold.is_finite() || self.stationary_threshold < 0.0 {
            return Err(ConfigurationError::InvalidBrushDefault {
                field: "stationary_threshold",
                value: self.stationary_threshold,
            });
        }

        Ok(())
    }
}
