use egui::{Color32, ColorImage};
use log::trace;

use super::{PaintUniforms, SurfaceBackend};
use crate::error::{DrawableError, DrawableResult};

/// CPU implementation of the double-buffered paint surface.
///
/// `front` always holds the last completed frame. A paint pass copies it into
/// `back`, composites the segment into `back` while sampling `front`, then
/// swaps the two.
pub struct SoftwareSurface {
    front: ColorImage,
    back: ColorImage,
    /// Bumped on every successful pass
    version: u64,
}

// ColorImage debug output would dump every pixel
impl std::fmt::Debug for SoftwareSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareSurface")
            .field("size", &self.front.size)
            .field("version", &self.version)
            .finish()
    }
}

impl SoftwareSurface {
    /// Creates a transparent buffer. Callers fill it before first use.
    pub fn new(width: usize, height: usize) -> Self {
        let image = ColorImage::new([width, height], Color32::TRANSPARENT);
        Self {
            back: image.clone(),
            front: image,
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Color of the completed frame at pixel (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color32> {
        let [width, height] = self.front.size;
        if x < width && y < height {
            Some(self.front.pixels[y * width + x])
        } else {
            None
        }
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
        self.version += 1;
    }
}

impl SurfaceBackend for SoftwareSurface {
    type Texture = ColorImage;

    fn size(&self) -> [usize; 2] {
        self.front.size
    }

    fn fill_pass(&mut self, color: Color32) -> DrawableResult<()> {
        self.back.pixels.fill(color);
        self.swap();
        self.back.pixels.fill(color);
        Ok(())
    }

    fn paint_pass(&mut self, uniforms: &PaintUniforms) -> DrawableResult<()> {
        validate(uniforms)?;

        let [width, height] = self.front.size;
        let w = width as f32;
        let ratio = uniforms.height_ratio;

        // Work in width-normalized space so distances are isotropic
        let (ax, ay) = (uniforms.start.x, uniforms.start.y * ratio);
        let (bx, by) = (uniforms.end.x, uniforms.end.y * ratio);
        let radius_px = uniforms.thickness * 0.5;
        let strength = (uniforms.flow / 10.0).clamp(0.0, 1.0);

        self.back.pixels.copy_from_slice(&self.front.pixels);

        // Pixel bounds of the segment grown by the brush radius plus the AA band
        let reach = radius_px + 1.0;
        let min_x = (ax.min(bx) * w - reach).floor().max(0.0);
        let max_x = (ax.max(bx) * w + reach).ceil().min(w);
        let min_y = (ay.min(by) * w - reach).floor().max(0.0);
        let max_y = (ay.max(by) * w + reach).ceil().min(height as f32);

        if min_x < max_x && min_y < max_y {
            for y in min_y as usize..max_y as usize {
                for x in min_x as usize..max_x as usize {
                    let px = (x as f32 + 0.5) / w;
                    let py = (y as f32 + 0.5) / w;
                    let distance_px = distance_to_segment(px, py, ax, ay, bx, by) * w;
                    let coverage = (radius_px + 0.5 - distance_px).clamp(0.0, 1.0);
                    if coverage <= 0.0 {
                        continue;
                    }
                    let idx = y * width + x;
                    self.back.pixels[idx] =
                        mix(self.front.pixels[idx], uniforms.color, coverage * strength);
                }
            }
        }

        trace!(
            "🖌️ Paint pass {:?} -> {:?} (thickness {}, flow {})",
            uniforms.start,
            uniforms.end,
            uniforms.thickness,
            uniforms.flow
        );

        self.swap();
        Ok(())
    }

    fn texture(&self) -> &ColorImage {
        &self.front
    }
}

fn validate(uniforms: &PaintUniforms) -> DrawableResult<()> {
    let values = [
        uniforms.start.x,
        uniforms.start.y,
        uniforms.end.x,
        uniforms.end.y,
        uniforms.thickness,
        uniforms.flow,
        uniforms.height_ratio,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DrawableError::PaintPass(format!(
            "non-finite uniforms: {:?}",
            uniforms
        )));
    }
    if uniforms.thickness <= 0.0 || uniforms.height_ratio <= 0.0 {
        return Err(DrawableError::PaintPass(format!(
            "non-positive thickness or height ratio: {:?}",
            uniforms
        )));
    }
    Ok(())
}

/// Distance from (px, py) to the segment a-b
fn distance_to_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (ax + dx * t, ay + dy * t);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

/// Blend premultiplied colors, `t` = 0 keeps `dst`, `t` = 1 gives `src`
fn mix(dst: Color32, src: Color32, t: f32) -> Color32 {
    let channel = |d: u8, s: u8| -> u8 {
        (d as f32 + (s as f32 - d as f32) * t).round().clamp(0.0, 255.0) as u8
    };
    let [dr, dg, db, da] = dst.to_array();
    let [sr, sg, sb, sa] = src.to_array();
    Color32::from_rgba_premultiplied(
        channel(dr, sr),
        channel(dg, sg),
        channel(db, sb),
        channel(da, sa),
    )
}
