// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Converter configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Minimum render scale that keeps small print legible to the OCR engine.
pub const MIN_OCR_SCALE: f32 = 4.0;

/// Tunables for one converter instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Page render scale for PDF → image/SVG conversion.
    pub raster_scale: f32,
    /// Page render scale for the OCR path (PDF → DOCX).
    pub ocr_scale: f32,
    /// OCR language (ISO 639-2 code).
    pub ocr_locale: String,
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
    /// Paper size for image → PDF and spreadsheet → PDF output.
    pub paper_size: crate::PaperSize,
    /// Body font size for spreadsheet tables, in points.
    pub table_font_size: f32,
    /// Title font size for spreadsheet tables, in points.
    pub title_font_size: f32,
    /// Directory holding the OCR model files.
    pub ocr_model_dir: Option<PathBuf>,
    /// Explicit path to the pdfium shared library.
    pub pdfium_library_path: Option<PathBuf>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            raster_scale: 2.0,
            ocr_scale: 5.0,
            ocr_locale: "eng".into(),
            jpeg_quality: 92,
            paper_size: crate::PaperSize::A4,
            table_font_size: 10.0,
            title_font_size: 14.0,
            ocr_model_dir: None,
            pdfium_library_path: None,
        }
    }
}

impl ConverterConfig {
    /// Parse a JSON config; absent keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(json) => Self::from_json_str(&json),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.raster_scale > 0.0) {
            return Err(ConvertError::InvalidConfig(format!(
                "raster_scale must be positive, got {}",
                self.raster_scale
            )));
        }
        if !(self.ocr_scale >= MIN_OCR_SCALE) {
            return Err(ConvertError::InvalidConfig(format!(
                "ocr_scale must be at least {MIN_OCR_SCALE}, got {}",
                self.ocr_scale
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConvertError::InvalidConfig(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.ocr_locale.trim().is_empty() {
            return Err(ConvertError::InvalidConfig("ocr_locale is empty".into()));
        }
        if !(self.table_font_size > 0.0 && self.title_font_size > 0.0) {
            return Err(ConvertError::InvalidConfig(
                "font sizes must be positive".into(),
            ));
        }
        Ok(())
    }
}
