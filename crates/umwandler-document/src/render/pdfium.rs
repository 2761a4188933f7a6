// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page rasterisation backed by pdfium (via `pdfium-render`).
//
// The pdfium shared library is bound at runtime. Binding order: an explicit
// configured path (file or directory), then the working directory, then the
// system library search path.

use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, instrument, warn};
use umwandler_core::Format;
use umwandler_core::error::{ConvertError, Result};

use crate::traits::{DocumentRenderer, RenderedDocument};

/// [`DocumentRenderer`] that rasterises PDF pages with pdfium.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl PdfiumRenderer {
    /// Bind to the pdfium library.
    ///
    /// Returns [`ConvertError::MissingCapability`] if no library can be found.
    #[instrument(skip_all)]
    pub fn bind(library_path: Option<&Path>) -> Result<Self> {
        let bindings = match library_path {
            Some(path) if path.is_dir() => {
                Pdfium::bind_to_library(&Pdfium::pdfium_platform_library_name_at_path(path))
            }
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_library(&Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|err| {
            warn!(error = ?err, "failed to bind pdfium library");
            ConvertError::MissingCapability("PDF page renderer (pdfium)")
        })?;

        info!("pdfium library bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl DocumentRenderer for PdfiumRenderer {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RenderedDocument + 'a>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|err| ConvertError::Decode {
                format: Format::Pdf,
                detail: format!("{:?}", err),
            })?;

        debug!(pages = document.pages().len(), "PDF loaded into pdfium");
        Ok(Box::new(PdfiumDocument { document }))
    }

    fn name(&self) -> &str {
        "pdfium"
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl RenderedDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> u32 {
        self.document.pages().len() as u32
    }

    fn render_page(&self, page_index: u32, scale: f32) -> Result<DynamicImage> {
        let render_error = |err: PdfiumError| ConvertError::Render {
            page: page_index,
            detail: format!("{:?}", err),
        };

        // pdfium pages are 0-indexed.
        let page = self
            .document
            .pages()
            .iter()
            .nth(page_index.saturating_sub(1) as usize)
            .ok_or_else(|| ConvertError::Render {
                page: page_index,
                detail: "page not found".into(),
            })?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page.render_with_config(&config).map_err(render_error)?;

        Ok(bitmap.as_image())
    }
}
