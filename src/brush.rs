use egui::Color32;
use log::warn;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::config::BrushDefaults;

/// Smallest brush diameter, in buffer pixels
pub const MIN_THICKNESS: f32 = 0.01;
/// Allowed flow (paint strength) values
pub const FLOW_RANGE: RangeInclusive<f32> = 0.0..=10.0;
/// Allowed smoothing rates, per second
pub const SMOOTHING_RANGE: RangeInclusive<f32> = 5.0..=30.0;

/// Brush parameters read on every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushState {
    color: Color32,
    thickness: f32,
    flow: f32,
    smoothing_rate: f32,
    draw_when_stationary: bool,
}

impl Default for BrushState {
    fn default() -> Self {
        Self::from_defaults(&BrushDefaults::default())
    }
}

impl BrushState {
    /// Build a brush from validated defaults. The color starts black.
    pub fn from_defaults(defaults: &BrushDefaults) -> Self {
        let mut brush = Self {
            color: Color32::BLACK,
            thickness: 1.0,
            flow: 5.0,
            smoothing_rate: 20.0,
            draw_when_stationary: defaults.draw_when_stationary,
        };
        brush.set_thickness(defaults.thickness);
        brush.set_flow(defaults.flow);
        brush.set_smoothing_rate(defaults.smoothing_rate);
        brush
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    /// Brush diameter in buffer pixels
    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// Values below MIN_THICKNESS are clamped, non-finite values ignored
    pub fn set_thickness(&mut self, thickness: f32) {
        if let Some(v) = sanitize("thickness", thickness, MIN_THICKNESS..=f32::MAX) {
            self.thickness = v;
        }
    }

    pub fn flow(&self) -> f32 {
        self.flow
    }

    pub fn set_flow(&mut self, flow: f32) {
        if let Some(v) = sanitize("flow", flow, FLOW_RANGE) {
            self.flow = v;
        }
    }

    pub fn smoothing_rate(&self) -> f32 {
        self.smoothing_rate
    }

    pub fn set_smoothing_rate(&mut self, rate: f32) {
        if let Some(v) = sanitize("smoothing_rate", rate, SMOOTHING_RANGE) {
            self.smoothing_rate = v;
        }
    }

    pub fn draw_when_stationary(&self) -> bool {
        self.draw_when_stationary
    }

    pub fn set_draw_when_stationary(&mut self, enabled: bool) {
        self.draw_when_stationary = enabled;
    }
}

fn sanitize(field: &str, value: f32, range: RangeInclusive<f32>) -> Option<f32> {
    if !value.is_finite() {
        warn!("Ignoring non-finite brush {}: {}", field, value);
        return None;
    }
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        warn!("Brush {} {} clamped to {}", field, value, clamped);
    }
    Some(clamped)
}
