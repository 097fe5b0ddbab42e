use thiserror::Error;

/// Failures while turning fetched bytes into viewer data.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("model parse failed: {0}")]
    ModelParse(#[from] gltf::Error),
    #[error("model contains no renderable scene")]
    EmptyScene,
    #[error("mesh {mesh} primitive {primitive} has no {attribute} attribute")]
    MissingAttribute {
        mesh: usize,
        primitive: usize,
        attribute: &'static str,
    },
    #[error("texture decode failed: {0}")]
    TextureDecode(#[from] image::ImageError),
}
