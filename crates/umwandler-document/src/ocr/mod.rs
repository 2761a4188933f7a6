// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction from rendered pages.

#[cfg(feature = "ocr")]
pub mod engine;

#[cfg(feature = "ocr")]
pub use engine::{OcrConfig, OcrEngine};

use tracing::{info, instrument};
use umwandler_core::error::{ConvertError, Result};

use crate::render::PageSurface;
use crate::traits::TextRecognizer;

/// Run `recognizer` over one rendered page in `locale`.
///
/// A page without text yields an empty string. Recognition failures surface
/// as [`ConvertError::OcrEngine`].
#[instrument(skip(recognizer, surface), fields(page = surface.page_index()))]
pub fn extract_text(
    recognizer: &dyn TextRecognizer,
    surface: &PageSurface,
    locale: &str,
) -> Result<String> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(ConvertError::OcrEngine("page image is empty".into()));
    }

    let text = recognizer.recognize(surface.image(), locale)?;
    info!(chars = text.chars().count(), "Text extracted");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};

    struct Echo(&'static str);

    impl TextRecognizer for Echo {
        fn recognize(&self, _image: &DynamicImage, locale: &str) -> Result<String> {
            Ok(format!("{}:{}", locale, self.0))
        }
    }

    #[test]
    fn passes_locale_through() {
        let surface = PageSurface::new(1, DynamicImage::ImageRgba8(RgbaImage::new(4, 4)));
        assert_eq!(extract_text(&Echo("hi"), &surface, "eng").unwrap(), "eng:hi");
    }

    #[test]
    fn empty_surface_is_an_ocr_error() {
        let surface = PageSurface::new(1, DynamicImage::ImageRgba8(RgbaImage::new(0, 0)));
        assert!(matches!(
            extract_text(&Echo(""), &surface, "eng"),
            Err(ConvertError::OcrEngine(_))
        ));
    }
}
