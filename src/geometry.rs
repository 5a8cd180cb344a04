use egui::{Pos2, Vec2, pos2};

use crate::error::{DrawableError, DrawableResult};

/// Normalized position a fresh surface starts from. It lies outside the
/// buffer so nothing drawn from it is visible.
pub const SENTINEL_POSITION: Pos2 = pos2(-1.0, -1.0);

/// Widget rectangle as seen by the surface, read once at initialization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectGeometry {
    /// Width and height in widget-local units
    pub size: Vec2,
    /// Pivot as a fraction of the size, (0.5, 0.5) being the center
    pub pivot: Vec2,
}

impl RectGeometry {
    pub fn new(size: Vec2, pivot: Vec2) -> Self {
        Self { size, pivot }
    }

    /// Geometry with a centered pivot
    pub fn centered(size: Vec2) -> Self {
        Self::new(size, Vec2::splat(0.5))
    }

    /// Buffer dimensions for this rect, each axis floored
    pub fn surface_size(&self, render_multiplier: f32) -> DrawableResult<[usize; 2]> {
        let width = floor_px(self.size.x * render_multiplier);
        let height = floor_px(self.size.y * render_multiplier);
        if width == 0 || height == 0 {
            return Err(DrawableError::DegenerateGeometry { width, height });
        }
        Ok([width, height])
    }
}

fn floor_px(v: f32) -> usize {
    if v.is_finite() && v > 0.0 {
        v.floor() as usize
    } else {
        0
    }
}

/// Maps a widget-local point (origin at the pivot) into buffer space.
///
/// With `normalize` the result is in [0, 1] across the buffer; points off
/// the surface come out beyond that range and are kept as is. Without it the
/// result is in buffer pixels.
pub fn normalize(
    local: Pos2,
    pivot: Vec2,
    surface_size: [usize; 2],
    render_multiplier: f32,
    normalize: bool,
) -> Pos2 {
    let [width, height] = surface_size;
    let (w, h) = (width as f32, height as f32);

    // Integer halving of the pixel size, pivot correction is fractional
    let mut x = local.x * render_multiplier + (width / 2) as f32;
    let mut y = local.y * render_multiplier + (height / 2) as f32;

    x -= w * (0.5 - pivot.x);
    y -= h * (0.5 - pivot.y);

    if normalize {
        x /= w;
        y /= h;
    }

    pos2(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn test_center_maps_to_middle() {
        let p = normalize(Pos2::ZERO, Vec2::splat(0.5), [200, 100], 1.0, true);
        assert_eq!(p, pos2(0.5, 0.5));
    }

    #[test]
    fn test_pixel_space_without_normalizing() {
        let p = normalize(pos2(10.0, -20.0), Vec2::splat(0.5), [200, 100], 1.0, false);
        assert_eq!(p, pos2(110.0, 30.0));
    }

    #[test]
    fn test_render_multiplier_scales_local_units() {
        // 100x50 rect at 2x gives a 200x100 buffer
        let p = normalize(pos2(50.0, 25.0), Vec2::splat(0.5), [200, 100], 2.0, true);
        assert_eq!(p, pos2(1.0, 1.0));
    }

    #[test]
    fn test_corner_pivot() {
        // Pivot at the min corner: local origin is the buffer origin
        let p = normalize(Pos2::ZERO, Vec2::ZERO, [200, 100], 1.0, true);
        assert_eq!(p, pos2(0.0, 0.0));

        let p = normalize(pos2(200.0, 100.0), Vec2::ZERO, [200, 100], 1.0, true);
        assert_eq!(p, pos2(1.0, 1.0));
    }

    #[test]
    fn test_off_surface_not_clamped() {
        let p = normalize(pos2(-300.0, 150.0), Vec2::splat(0.5), [200, 100], 1.0, true);
        assert_eq!(p, pos2(-1.0, 2.0));
    }

    #[test]
    fn test_odd_width_uses_integer_half() {
        let p = normalize(Pos2::ZERO, Vec2::splat(0.5), [201, 100], 1.0, false);
        assert_eq!(p.x, 100.0);
    }

    #[test]
    fn test_surface_size_floors() {
        let geometry = RectGeometry::centered(vec2(100.7, 50.2));
        assert_eq!(geometry.surface_size(1.0).unwrap(), [100, 50]);
        assert_eq!(geometry.surface_size(1.5).unwrap(), [151, 75]);
    }

    #[test]
    fn test_degenerate_geometry_rejected() {
        let geometry = RectGeometry::centered(vec2(100.0, 0.9));
        let err = geometry.surface_size(1.0).unwrap_err();
        assert!(matches!(
            err,
            DrawableError::DegenerateGeometry { width: 100, height: 0 }
        ));
    }
}
