// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rendering: a per-call render context over an opened document, and the
// page surfaces it produces.

pub mod pdfium;

use image::DynamicImage;
use tracing::{debug, info, instrument};
use umwandler_core::Format;
use umwandler_core::error::{ConvertError, Result};

use crate::traits::{DocumentRenderer, RenderedDocument};

pub use pdfium::PdfiumRenderer;

/// One rendered page.
#[derive(Debug, Clone)]
pub struct PageSurface {
    /// 1-based page number within the source document.
    page_index: u32,
    image: DynamicImage,
}

impl PageSurface {
    pub fn new(page_index: u32, image: DynamicImage) -> Self {
        Self { page_index, image }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// Rendering state for a single conversion call.
///
/// Holds the opened document and the render scale. Every surface it hands out
/// is owned by the caller; the document handle is released when the context
/// is dropped at the end of the call.
pub struct RenderContext<'a> {
    document: Box<dyn RenderedDocument + 'a>,
    page_count: u32,
    scale: f32,
}

impl<'a> RenderContext<'a> {
    /// Open `bytes` with `renderer`. Documents without pages are rejected.
    #[instrument(skip(renderer, bytes), fields(backend = renderer.name(), bytes_len = bytes.len()))]
    pub fn open(renderer: &'a dyn DocumentRenderer, bytes: &'a [u8], scale: f32) -> Result<Self> {
        let document = renderer.open(bytes)?;
        let page_count = document.page_count();
        if page_count == 0 {
            return Err(ConvertError::Decode {
                format: Format::Pdf,
                detail: "document has no pages".into(),
            });
        }

        info!(page_count, scale, "Document opened for rendering");
        Ok(Self {
            document,
            page_count,
            scale,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Render page `page_index` (1-based).
    pub fn render_page(&self, page_index: u32) -> Result<PageSurface> {
        if page_index == 0 || page_index > self.page_count {
            return Err(ConvertError::Render {
                page: page_index,
                detail: format!(
                    "page out of range (document has {} pages)",
                    self.page_count
                ),
            });
        }

        let image = self.document.render_page(page_index, self.scale)?;
        debug!(
            page_index,
            width = image.width(),
            height = image.height(),
            "Page rendered"
        );
        Ok(PageSurface::new(page_index, image))
    }
}
