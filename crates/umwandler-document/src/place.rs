// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page placement: put a single raster or SVG image onto one PDF page, fitted
// and centred. SVG stays vector: it is converted with svg2pdf and the
// resulting page is drawn as a Form XObject.

use std::sync::{Arc, LazyLock};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, dictionary};
use tracing::{debug, info, instrument, warn};
use umwandler_core::error::{ConvertError, Result};
use umwandler_core::{Format, FormatFamily, PaperSize};

use crate::image::encoder::decode_raster;
use crate::pdf::{PdfReader, PdfWriter, fit_centered};

/// Resource name of the placed form on the composed page.
const FORM_NAME: &str = "Fm0";

/// System fonts for SVG `<text>`, loaded once per process. usvg drops text
/// whose font cannot be resolved.
static SYSTEM_FONTS: LazyLock<Arc<usvg::fontdb::Database>> = LazyLock::new(|| {
    let mut fonts = usvg::fontdb::Database::new();
    fonts.load_system_fonts();
    if fonts.is_empty() {
        warn!("No system fonts found, SVG text will not be rendered");
    } else {
        debug!(faces = fonts.len(), "System fonts loaded");
    }
    Arc::new(fonts)
});

/// Places a single image on a single page.
#[derive(Debug, Clone, Copy)]
pub struct PagePlacer {
    paper_size: PaperSize,
}

impl PagePlacer {
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }

    /// Produce a one-page PDF holding `bytes`, declared as `format`.
    ///
    /// Malformed input fails with [`ConvertError::Decode`] before any page
    /// is emitted.
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    pub fn place_on_page(&self, bytes: &[u8], format: Format) -> Result<Vec<u8>> {
        match format.family() {
            FormatFamily::Raster => {
                let image = decode_raster(bytes, format)?;
                PdfWriter::new(self.paper_size).create_from_image(&image)
            }
            FormatFamily::Vector => self.place_svg(bytes),
            _ => Err(ConvertError::Decode {
                format,
                detail: "not an image format".into(),
            }),
        }
    }

    fn place_svg(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let text = std::str::from_utf8(bytes).map_err(|err| svg_error(err.to_string()))?;
        let options = usvg::Options {
            fontdb: Arc::clone(&SYSTEM_FONTS),
            ..usvg::Options::default()
        };
        let tree =
            usvg::Tree::from_str(text, &options).map_err(|err| svg_error(err.to_string()))?;

        let size = tree.size();
        if size.width() <= 0.0 || size.height() <= 0.0 {
            return Err(svg_error(format!(
                "invalid SVG dimensions: {}x{}",
                size.width(),
                size.height()
            )));
        }
        info!(width = size.width(), height = size.height(), "SVG parsed");

        let intermediate = svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions::default(),
        );
        debug!(intermediate_bytes = intermediate.len(), "SVG converted to PDF");

        self.compose(&intermediate)
    }

    /// Draw page 1 of `pdf` onto a fresh page of the configured paper size.
    ///
    /// `pdf` is produced here, not supplied by the caller, so failing to read
    /// it back is an [`ConvertError::Encode`] error.
    fn compose(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        let reader = PdfReader::from_bytes(pdf).map_err(intermediate_error)?;
        let (page_w, page_h) = PdfWriter::new(self.paper_size).page_dimensions_pt();

        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let imported = reader
            .import_page_as_form(1, &mut doc)
            .map_err(intermediate_error)?;

        let placement = fit_centered(imported.width(), imported.height(), page_w, page_h);
        let sx = placement.width / imported.width();
        let sy = placement.height / imported.height();
        let tx = placement.x - imported.bbox[0] * sx;
        let ty = placement.y - imported.bbox[1] * sy;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![sx.into(), 0.into(), 0.into(), sy.into(), tx.into(), ty.into()],
                ),
                Operation::new("Do", vec![Object::Name(FORM_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(compose_error)?;
        let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { FORM_NAME => imported.form_id },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(compose_error)?;

        debug!(?placement, output_bytes = output.len(), "SVG placed on page");
        Ok(output)
    }
}

fn svg_error(detail: String) -> ConvertError {
    ConvertError::Decode {
        format: Format::Svg,
        detail,
    }
}

fn intermediate_error(err: ConvertError) -> ConvertError {
    match err {
        ConvertError::Decode { detail, .. } => ConvertError::Encode {
            format: Format::Pdf,
            detail: format!("intermediate PDF unreadable: {detail}"),
        },
        other => other,
    }
}

fn compose_error(err: impl std::fmt::Display) -> ConvertError {
    ConvertError::Encode {
        format: Format::Pdf,
        detail: err.to_string(),
    }
}
