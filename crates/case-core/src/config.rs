use crate::constants::*;
use crate::lighting::Lighting;

/// Startup configuration shared by the frontends. Defaults come from
/// `constants`; the web host may override the asset locations.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub model_path: String,
    pub texture_path: String,
    pub fit_target: f32,
    /// Mirror the standalone texture vertically before upload.
    pub flip_texture_y: bool,
    pub lighting: Lighting,
    pub clear_color_linear: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_path: MODEL_PATH.to_owned(),
            texture_path: TEXTURE_PATH.to_owned(),
            fit_target: FIT_TARGET_SIZE,
            flip_texture_y: true,
            lighting: Lighting::default(),
            clear_color_linear: clear_color_linear(),
        }
    }
}

impl ViewerConfig {
    pub fn with_model_path(mut self, path: impl Into<String>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_texture_path(mut self, path: impl Into<String>) -> Self {
        self.texture_path = path.into();
        self
    }
}
