use egui::{Context, TextureHandle, TextureId, TextureOptions};

use crate::surface::{SoftwareSurface, SurfaceBackend};

/// Mirrors a software surface into an egui texture
#[derive(Default)]
pub struct TextureManager {
    handle: Option<TextureHandle>,
    /// Surface version the texture was last uploaded from
    uploaded_version: Option<u64>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads the surface if it changed since the last call and returns the texture id
    pub fn sync(&mut self, ctx: &Context, surface: &SoftwareSurface) -> TextureId {
        let version = surface.version();
        let handle = match self.handle.take() {
            Some(mut handle) => {
                if self.uploaded_version != Some(version) {
                    handle.set(surface.texture().clone(), TextureOptions::LINEAR);
                }
                handle
            }
            None => ctx.load_texture(
                "drawing_surface",
                surface.texture().clone(),
                TextureOptions::LINEAR,
            ),
        };

        let id = handle.id();
        self.handle = Some(handle);
        self.uploaded_version = Some(version);
        id
    }

    /// True if the texture holds the surface's latest frame
    #[cfg(test)]
    pub fn is_current(&self, surface: &SoftwareSurface) -> bool {
        self.handle.is_some() && self.uploaded_version == Some(surface.version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    fn surface() -> SoftwareSurface {
        let mut surface = SoftwareSurface::new(8, 4);
        surface.fill_pass(Color32::WHITE).unwrap();
        surface
    }

    #[test]
    fn test_first_sync_uploads() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        let surface = surface();

        assert!(!manager.is_current(&surface));
        manager.sync(&ctx, &surface);
        assert!(manager.is_current(&surface));
    }

    #[test]
    fn test_sync_keeps_texture_id() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        let mut surface = surface();

        let first = manager.sync(&ctx, &surface);
        surface.fill_pass(Color32::BLACK).unwrap();
        assert!(!manager.is_current(&surface));

        let second = manager.sync(&ctx, &surface);
        assert_eq!(first, second);
        assert!(manager.is_current(&surface));
    }
}
