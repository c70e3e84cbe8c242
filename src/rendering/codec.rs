use crate::error::ProcessError;
use image::error::{ParameterError, ParameterErrorKind};
use near_white::RgbaBuffer;
use std::io::Cursor;

/// PNG output settings
#[derive(Debug, Clone, Copy, Default)]
pub struct PngOptions {
    /// Recompress with oxipng after encoding
    pub optimize: bool,
}

/// Decode any supported image format into an RGBA buffer.
///
/// Sources without an alpha channel are widened with alpha 255. Animated
/// GIFs yield their first frame.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaBuffer, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    RgbaBuffer::from_raw(width, height, rgba.into_raw()).map_err(|_| {
        image::ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        ))
    })
}

/// Encode an RGBA buffer as an 8-bit RGBA PNG.
pub fn encode_png(image: &RgbaBuffer, options: PngOptions) -> Result<Vec<u8>, ProcessError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(if options.optimize {
            // oxipng will re-compress optimally
            png::Compression::Fast
        } else {
            png::Compression::Default
        });
        let mut writer = encoder
            .write_header()
            .map_err(|e| ProcessError::Encode(e.to_string()))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| ProcessError::Encode(e.to_string()))?;
    }
    let png_bytes = buf.into_inner();

    if !options.optimize {
        return Ok(png_bytes);
    }

    // Alpha optimization would rewrite the RGB of cleared pixels
    let optimized = oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    );
    match optimized {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            tracing::warn!(error = %e, "oxipng failed, keeping unoptimized PNG");
            Ok(png_bytes)
        }
    }
}
