// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: create new PDF documents from images or pre-built page
// operations using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use image::DynamicImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};
use umwandler_core::error::{ConvertError, Result};
use umwandler_core::{Format, Orientation, PaperSize};

use crate::image::encoder::flatten_onto_white;

/// Where a piece of content lands on a page, in points from the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fit `content_w` × `content_h` onto a page, centred.
///
/// The content first takes the full page width; if its height then overflows,
/// it takes the full page height instead. Aspect ratio is preserved.
pub fn fit_centered(content_w: f32, content_h: f32, page_w: f32, page_h: f32) -> Placement {
    if content_w <= 0.0 || content_h <= 0.0 {
        return Placement {
            x: page_w / 2.0,
            y: page_h / 2.0,
            width: 0.0,
            height: 0.0,
        };
    }

    let ratio = content_w / content_h;
    let mut width = page_w;
    let mut height = width / ratio;
    if height > page_h {
        height = page_h;
        width = height * ratio;
    }

    Placement {
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        width,
        height,
    }
}

/// Creates new PDF documents with `printpdf`.
pub struct PdfWriter {
    /// Paper size for page creation.
    paper_size: PaperSize,
    orientation: Orientation,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    /// Create a new portrait writer targeting the given paper size.
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            orientation: Orientation::Portrait,
            title: None,
        }
    }

    /// Switch to landscape pages.
    pub fn landscape(mut self) -> Self {
        self.orientation = Orientation::Landscape;
        self
    }

    /// Set a title for the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Page dimensions in printpdf's Mm units, honouring orientation.
    pub fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.oriented_mm(self.orientation);
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Page dimensions in points.
    pub fn page_dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.page_dimensions();
        (w.into_pt().0, h.into_pt().0)
    }

    // -- Image to PDF ---------------------------------------------------------

    /// Create a single-page PDF containing `image`, fitted and centred with
    /// [`fit_centered`]. Transparency is flattened onto white.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn create_from_image(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let (page_w, page_h) = self.page_dimensions();
        let (page_w_pt, page_h_pt) = self.page_dimensions_pt();

        if image.width() == 0 || image.height() == 0 {
            return Err(ConvertError::Decode {
                format: Format::Pdf,
                detail: "image has zero size".into(),
            });
        }

        info!(paper = ?self.paper_size, "Creating image PDF");

        let img_width = image.width() as usize;
        let img_height = image.height() as usize;

        // printpdf wants tightly packed RGB8.
        let rgb_image = flatten_onto_white(image);
        let raw = RawImage {
            pixels: RawImageData::U8(rgb_image.into_raw()),
            width: img_width,
            height: img_height,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(self.title.as_deref().unwrap_or("Converted image"));
        let xobject_id = doc.add_image(&raw);

        // At 72 DPI one pixel is one point, so the scale factors map pixels
        // straight onto the placement box.
        let placement = fit_centered(img_width as f32, img_height as f32, page_w_pt, page_h_pt);
        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(placement.x)),
                translate_y: Some(Pt(placement.y)),
                scale_x: Some(placement.width / img_width as f32),
                scale_y: Some(placement.height / img_height as f32),
                dpi: Some(72.0),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);
        debug!(?placement, "Image placed on page");

        Ok(save(&doc))
    }

    /// Serialise pre-built page operation lists, one entry per page.
    ///
    /// An empty list yields a single blank page.
    pub fn create_from_pages(&self, pages: Vec<Vec<Op>>) -> Vec<u8> {
        let (page_w, page_h) = self.page_dimensions();
        let mut doc = PdfDocument::new(self.title.as_deref().unwrap_or("Converted document"));

        let mut pdf_pages: Vec<PdfPage> = pages
            .into_iter()
            .map(|ops| PdfPage::new(page_w, page_h, ops))
            .collect();
        if pdf_pages.is_empty() {
            pdf_pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        doc.with_pages(pdf_pages);
        save(&doc)
    }
}

fn save(doc: &PdfDocument) -> Vec<u8> {
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "printpdf reported warnings while saving");
    }
    debug!(output_bytes = output.len(), pages = doc.pages.len(), "PDF serialised");
    output
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then performs simple word-wrap within each
/// paragraph. Words longer than `max_width` are force-broken on character
/// boundaries.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_len = 0usize;

        for word in words {
            let word_len = word.chars().count();
            if word_len > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_width).peekable();
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        result.push(chunk.iter().collect());
                    } else {
                        current_line = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_len += 1 + word_len;
            } else {
                result.push(std::mem::replace(&mut current_line, word.to_string()));
                current_len = word_len;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}
