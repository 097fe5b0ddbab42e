use crate::error::ViewerError;
use crate::scene::{SceneGraph, SceneId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(u64);

/// Decoded RGBA8 image with a process-unique identity.
#[derive(Clone, Debug)]
pub struct TextureImage {
    id: TextureId,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), width as usize * height as usize * 4);
        Self {
            id: TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed)),
            width,
            height,
            rgba,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Copy shrunk so neither side exceeds `max_dim`, aspect kept. `None` when
    /// the image already fits.
    pub fn downscaled_to(&self, max_dim: u32) -> Option<TextureImage> {
        let max_dim = max_dim.max(1);
        let longest = self.width.max(self.height);
        if longest <= max_dim {
            return None;
        }
        let ratio = max_dim as f64 / longest as f64;
        let w = ((self.width as f64 * ratio).round() as u32).clamp(1, max_dim);
        let h = ((self.height as f64 * ratio).round() as u32).clamp(1, max_dim);
        let src = image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())?;
        let out = image::imageops::resize(&src, w, h, image::imageops::FilterType::Triangle);
        log::info!(
            "[assets] texture {}x{} exceeds {}, downscaled to {}x{}",
            self.width,
            self.height,
            max_dim,
            w,
            h
        );
        Some(TextureImage::new(w, h, out.into_raw()))
    }
}

/// Decode a JPEG/PNG byte buffer into RGBA8. `flip_y` mirrors the rows so
/// the first row ends up at v = 1.
pub fn decode_texture(bytes: &[u8], flip_y: bool) -> Result<TextureImage, ViewerError> {
    let mut img = image::load_from_memory(bytes)?;
    if flip_y {
        img = img.flipv();
    }
    let img = img.to_rgba8();
    let (width, height) = img.dimensions();
    log::info!("[assets] texture decoded {}x{}", width, height);
    Ok(TextureImage::new(width, height, img.into_raw()))
}

/// One-shot assignment of a color map to every mesh material of a scene.
///
/// Remembers which `(scene, texture)` pair it last applied; calling again with
/// the same pair leaves the scene untouched.
#[derive(Debug, Default)]
pub struct TexturePass {
    applied: Option<(SceneId, TextureId)>,
}

impl TexturePass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_applied(&self, scene: &SceneGraph, texture: &TextureImage) -> bool {
        self.applied == Some((scene.id(), texture.id()))
    }

    /// Returns `true` when the pass ran, `false` when it was already applied.
    pub fn apply(&mut self, scene: &mut SceneGraph, texture: &Arc<TextureImage>) -> bool {
        if self.is_applied(scene, texture) {
            return false;
        }
        let targets = scene.reachable_materials();
        for &m in &targets {
            let mat = &mut scene.materials[m];
            mat.map = Some(Arc::clone(texture));
            mat.needs_update = true;
        }
        log::info!(
            "[assets] texture applied to {} material(s) of scene {:?}",
            targets.len(),
            scene.id()
        );
        self.applied = Some((scene.id(), texture.id()));
        true
    }

    pub fn reset(&mut self) {
        self.applied = None;
    }
}
