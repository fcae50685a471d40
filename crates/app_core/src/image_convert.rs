//! Built-in image conversion strategy

use crate::conversion::{output_name, NamedFile, Transcoder};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Largest icon side the ICO encoder accepts
const MAX_ICON_SIZE: u32 = 256;

/// Transcodes raster images with the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTranscoder;

impl ImageTranscoder {
    pub fn new() -> Self {
        Self
    }

    /// Encoder for a target extension
    pub fn target_format(extension: &str) -> Result<ImageFormat> {
        ImageFormat::from_extension(extension)
            .filter(|format| format.writing_enabled())
            .ok_or_else(|| AppError::UnsupportedFormat(extension.to_string()))
    }
}

#[async_trait]
impl Transcoder for ImageTranscoder {
    async fn convert(&self, files: Vec<NamedFile>, extension: &str) -> Result<Vec<NamedFile>> {
        let format = Self::target_format(extension)?;
        let mut converted = Vec::with_capacity(files.len());

        for (path, data) in files {
            let encoded = tokio::task::spawn_blocking(move || encode(&data, format))
                .await
                .map_err(|e| AppError::Conversion {
                    path: path.clone(),
                    message: e.to_string(),
                })??;
            converted.push((output_name(&path, extension), encoded));
        }

        Ok(converted)
    }
}

/// Decode any supported image and re-encode it as `format`
pub fn encode(data: &[u8], format: ImageFormat) -> Result<Vec<u8>> {
    let image = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::ImageCodec(e.to_string()))?
        .decode()?;

    // JPEG has no alpha channel
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        ImageFormat::Ico if image.width() > MAX_ICON_SIZE || image.height() > MAX_ICON_SIZE => {
            image.thumbnail(MAX_ICON_SIZE, MAX_ICON_SIZE)
        }
        _ => image,
    };

    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format)?;
    Ok(out.into_inner())
}
