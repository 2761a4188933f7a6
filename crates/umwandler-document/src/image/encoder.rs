// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster encoder: turns rendered page surfaces into image files, or wraps them
// in a minimal SVG container. Operates on in-memory images using the `image`
// crate.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tracing::{debug, instrument};
use umwandler_core::error::{ConvertError, Result};
use umwandler_core::{Format, FormatFamily};

use crate::render::PageSurface;

/// Encodes page surfaces into raster or SVG output.
#[derive(Debug, Clone, Copy)]
pub struct RasterEncoder {
    /// JPEG quality (1-100).
    jpeg_quality: u8,
}

impl Default for RasterEncoder {
    fn default() -> Self {
        Self { jpeg_quality: 92 }
    }
}

impl RasterEncoder {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Encode one surface as `target`.
    ///
    /// Raster targets are encoded directly; an SVG target gets the page as a
    /// single embedded PNG sized to the surface.
    #[instrument(skip(self, surface), fields(page = surface.page_index()))]
    pub fn encode(&self, surface: &PageSurface, target: Format) -> Result<Vec<u8>> {
        let bytes = match target.family() {
            FormatFamily::Raster => self.encode_image(surface.image(), target)?,
            FormatFamily::Vector => wrap_in_svg(surface.image())?,
            _ => {
                return Err(ConvertError::Encode {
                    format: target,
                    detail: "not an image format".into(),
                });
            }
        };

        debug!(output_bytes = bytes.len(), "Page encoded");
        Ok(bytes)
    }

    /// Encode an image into a raster `target` format.
    pub fn encode_image(&self, image: &DynamicImage, target: Format) -> Result<Vec<u8>> {
        match target {
            // JPEG has no alpha channel; flatten first.
            Format::Jpeg => {
                let mut buffer = Vec::new();
                let rgb = flatten_onto_white(image);
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut buffer,
                    self.jpeg_quality,
                );
                rgb.write_with_encoder(encoder)
                    .map_err(|err| encode_error(target, err))?;
                Ok(buffer)
            }
            other => {
                let format = image_format_for(other).ok_or_else(|| ConvertError::Encode {
                    format: other,
                    detail: "not a raster format".into(),
                })?;
                encode_to_format(image, format).map_err(|err| encode_error(other, err))
            }
        }
    }
}

/// The `image` crate codec for a raster format.
pub fn image_format_for(format: Format) -> Option<ImageFormat> {
    match format {
        Format::Jpeg => Some(ImageFormat::Jpeg),
        Format::Png => Some(ImageFormat::Png),
        Format::Bmp => Some(ImageFormat::Bmp),
        Format::Tiff => Some(ImageFormat::Tiff),
        Format::Gif => Some(ImageFormat::Gif),
        _ => None,
    }
}

/// Decode raster bytes declared as `format`. GIFs yield their first frame.
pub fn decode_raster(bytes: &[u8], format: Format) -> Result<DynamicImage> {
    let codec = image_format_for(format).ok_or_else(|| ConvertError::Decode {
        format,
        detail: "not a raster format".into(),
    })?;
    image::load_from_memory_with_format(bytes, codec).map_err(|err| ConvertError::Decode {
        format,
        detail: err.to_string(),
    })
}

/// Composite any transparency onto a white background.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |channel: u8| ((channel as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Wrap `image` as a single PNG inside an SVG document of the same size.
pub fn wrap_in_svg(image: &DynamicImage) -> Result<Vec<u8>> {
    let png =
        encode_to_format(image, ImageFormat::Png).map_err(|err| encode_error(Format::Svg, err))?;
    let (width, height) = (image.width(), image.height());

    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r#"<image width="100%" height="100%" preserveAspectRatio="none" href="data:image/png;base64,{data}"/>"#,
            "</svg>\n"
        ),
        w = width,
        h = height,
        data = BASE64.encode(png),
    );
    Ok(svg.into_bytes())
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(
    image: &DynamicImage,
    format: ImageFormat,
) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format)?;
    Ok(buffer)
}

fn encode_error(format: Format, err: image::ImageError) -> ConvertError {
    ConvertError::Encode {
        format,
        detail: err.to_string(),
    }
}
