// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability traits for the external collaborators of the conversion
// pipeline: page rendering, OCR, and spreadsheet parsing.
//
// The converter only ever sees these traits, so a different PDF engine or OCR
// backend can be plugged in without touching the pipelines.

use image::DynamicImage;
use umwandler_core::error::Result;

/// Opens paginated documents for rasterisation.
pub trait DocumentRenderer: Send + Sync {
    /// Parse `bytes` into a renderable document handle.
    ///
    /// Returns [`ConvertError::Decode`](umwandler_core::ConvertError::Decode)
    /// when the bytes are not a readable document.
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RenderedDocument + 'a>>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// An opened document. Lives no longer than one conversion call.
pub trait RenderedDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Rasterise page `page_index` (1-based) at `scale` × its natural size.
    fn render_page(&self, page_index: u32, scale: f32) -> Result<DynamicImage>;
}

/// Recognises text in a page image.
pub trait TextRecognizer: Send + Sync {
    /// Run recognition for `locale` (ISO 639-2, e.g. `eng`).
    ///
    /// An image without any text yields `Ok` with an empty string.
    fn recognize(&self, image: &DynamicImage, locale: &str) -> Result<String>;
}

/// Reads tabular workbooks.
pub trait TableReader: Send + Sync {
    /// All rows of the first sheet, each cell rendered as text.
    fn read_first_sheet(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>>;
}
