// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Umwandler conversion pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Every format the converter knows about, as a source or a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Pdf,
    Jpeg,
    Png,
    Bmp,
    Tiff,
    Gif,
    Svg,
    Xlsx,
    Docx,
}

/// Broad family a format belongs to. Drives pipeline selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatFamily {
    /// Paginated, fixed-layout documents (PDF).
    PageDocument,
    /// Pixel-grid images.
    Raster,
    /// Shape/markup images that may embed raster content.
    Vector,
    /// Tabular workbooks.
    Spreadsheet,
    /// Flowing word-processor documents.
    TextDocument,
}

impl Format {
    /// All formats, in catalog order.
    pub const ALL: [Format; 9] = [
        Format::Pdf,
        Format::Jpeg,
        Format::Png,
        Format::Svg,
        Format::Tiff,
        Format::Bmp,
        Format::Gif,
        Format::Xlsx,
        Format::Docx,
    ];

    /// Short tag used on the command line and in output names (`jpg`, not `jpeg`).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Gif => "gif",
            Self::Svg => "svg",
            Self::Xlsx => "xlsx",
            Self::Docx => "docx",
        }
    }

    /// MIME type of a blob in this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Gif => "image/gif",
            Self::Svg => "image/svg+xml",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Extension written on output files.
    pub fn extension(&self) -> &'static str {
        self.tag()
    }

    pub fn family(&self) -> FormatFamily {
        match self {
            Self::Pdf => FormatFamily::PageDocument,
            Self::Jpeg | Self::Png | Self::Bmp | Self::Tiff | Self::Gif => FormatFamily::Raster,
            Self::Svg => FormatFamily::Vector,
            Self::Xlsx => FormatFamily::Spreadsheet,
            Self::Docx => FormatFamily::TextDocument,
        }
    }

    /// File extensions accepted for an upload declared as this format.
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &["pdf"],
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Png => &["png"],
            Self::Bmp => &["bmp"],
            Self::Tiff => &["tiff", "tif"],
            Self::Gif => &["gif"],
            Self::Svg => &["svg"],
            Self::Xlsx => &["xls", "xlsx"],
            Self::Docx => &["doc", "docx"],
        }
    }

    /// Whether a file with extension `ext` may be submitted as this format.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let lower = ext.to_ascii_lowercase();
        self.accepted_extensions().contains(&lower.as_str())
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lower = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.accepted_extensions().contains(&lower.as_str()))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Format {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim().trim_start_matches('.'))
            .ok_or_else(|| ConvertError::UnknownFormat(s.to_string()))
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Portrait dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in millimetres for the given orientation.
    pub fn oriented_mm(&self, orientation: Orientation) -> (u32, u32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w.min(h), w.max(h)),
            Orientation::Landscape => (w.max(h), w.min(h)),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Caller-supplied input: the bytes, their declared format, and the original
/// file name (used only to derive output names).
#[derive(Debug, Clone)]
pub struct SourceDocument {
    bytes: Vec<u8>,
    format: Format,
    file_name: String,
}

impl SourceDocument {
    pub fn new(bytes: Vec<u8>, format: Format) -> Self {
        Self {
            bytes,
            format,
            file_name: format!("document.{}", format.extension()),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name up to its first `.`; `"report.final.pdf"` gives `"report"`.
    pub fn base_name(&self) -> &str {
        let name = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.file_name);
        match name.split('.').next() {
            Some(stem) if !stem.is_empty() => stem,
            _ => "document",
        }
    }
}

/// The terminal product of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub blob: Vec<u8>,
    pub name: String,
    pub mime_type: String,
}

/// One page's conversion output before optional archiving.
pub type OutputUnit = ConversionResult;

impl ConversionResult {
    pub fn new(blob: Vec<u8>, name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            blob,
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Output unit for 1-based page `page_index` in `format`: `page-<n>.<ext>`.
    pub fn page_unit(blob: Vec<u8>, page_index: u32, format: Format) -> Self {
        Self::new(
            blob,
            format!("page-{}.{}", page_index, format.extension()),
            format.mime_type(),
        )
    }
}

/// What an archive of several pages holds; names the archive file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveKind {
    Images,
    Svgs,
}

impl ArchiveKind {
    pub fn for_target(target: Format) -> Self {
        match target.family() {
            FormatFamily::Vector => Self::Svgs,
            _ => Self::Images,
        }
    }

    /// `converted_images.zip` or `converted_svgs.zip`.
    pub fn archive_name(&self) -> &'static str {
        match self {
            Self::Images => "converted_images.zip",
            Self::Svgs => "converted_svgs.zip",
        }
    }
}
