//! Visualization Service - "after" renderings of a before photo

use std::path::Path;

use mitsumori_domain::repository::ImageRepository;
use mitsumori_types::{Error, Result};
use mitsumori_vision::{find_preset, render_after_image, InferenceBackend, InferenceConfig, InlineData, RenderOptions};

use crate::scanner::validate_image;

/// A decoded rendering
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub mime_type: String,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
    /// Blob store path when the rendering was saved
    pub blob_path: Option<String>,
}

pub struct VisualizationService<'a> {
    images: &'a dyn ImageRepository,
}

impl<'a> VisualizationService<'a> {
    pub fn new(images: &'a dyn ImageRepository) -> Self {
        Self { images }
    }

    /// Render `before` in the style of `preset_id`; with `save`, the result is
    /// stored under `renders/<uuid>.<ext>`.
    pub fn render(
        &self,
        backend: &dyn InferenceBackend,
        config: &InferenceConfig,
        before: &Path,
        preset_id: &str,
        options: &RenderOptions,
        save: bool,
    ) -> Result<RenderedImage> {
        let preset = find_preset(preset_id)
            .ok_or_else(|| Error::NotFound(format!("style preset '{}'", preset_id)))?;
        validate_image(before)?;

        let before_data = InlineData::from_file(before)?;
        let image = render_after_image(backend, config, &before_data, preset, options)?;
        let bytes = image.decode()?;
        let extension = image.extension();

        let blob_path = if save {
            let path = format!("renders/{}.{}", uuid::Uuid::new_v4(), extension);
            self.images.upload(&path, &bytes)?;
            tracing::info!(path = %path, size = bytes.len(), "rendering saved");
            Some(path)
        } else {
            None
        };

        Ok(RenderedImage {
            mime_type: image.mime_type,
            extension,
            bytes,
            blob_path,
        })
    }
}
