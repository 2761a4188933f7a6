// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// umwandler-document: Conversion pipelines for Umwandler.
//
// Renders PDF pages to raster images or SVG, extracts page text by OCR into
// DOCX, places raster and SVG images onto PDF pages, lays spreadsheets out as
// table PDFs, and archives multi-page results. `Converter` ties them together.

pub mod archive;
pub mod convert;
pub mod docx;
pub mod image;
pub mod ocr;
pub mod pdf;
pub mod place;
pub mod render;
pub mod sheet;
pub mod traits;

// Re-export the primary structs so callers can use `umwandler_document::Converter` etc.
pub use archive::MultiPageArchiver;
pub use convert::{Converter, ConverterBuilder, Pipeline};
pub use docx::TextDocumentBuilder;
pub use image::RasterEncoder;
pub use pdf::{PdfReader, PdfWriter, TableLayout};
pub use place::PagePlacer;
pub use render::{PageSurface, PdfiumRenderer, RenderContext};
pub use sheet::{CalamineReader, TableRenderer};
pub use traits::{DocumentRenderer, RenderedDocument, TableReader, TextRecognizer};

#[cfg(feature = "ocr")]
pub use ocr::OcrEngine;
