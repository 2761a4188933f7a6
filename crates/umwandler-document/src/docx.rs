// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX output: turn plain text into a Word document, one paragraph per line.

use std::io::Cursor;

use docx_rs::{Docx, LineSpacing, Paragraph, Run, RunFonts};
use tracing::{debug, instrument};
use umwandler_core::Format;
use umwandler_core::error::{ConvertError, Result};

const FONT_FAMILY: &str = "Arial";
/// Run size in half-points (10 pt).
const FONT_HALF_POINTS: usize = 20;
/// Space after each paragraph in twentieths of a point (10 pt).
const SPACING_AFTER_TWIPS: u32 = 200;

/// Builds DOCX documents from extracted text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextDocumentBuilder;

impl TextDocumentBuilder {
    /// Serialise `text` as a DOCX.
    ///
    /// Every line becomes one paragraph with its surrounding whitespace
    /// trimmed. Blank lines become empty paragraphs so vertical spacing
    /// survives.
    #[instrument(skip_all, fields(text_len = text.len()))]
    pub fn build_document(&self, text: &str) -> Result<Vec<u8>> {
        let mut docx = Docx::new();
        let mut paragraphs = 0usize;

        for line in text.split('\n') {
            docx = docx.add_paragraph(paragraph(line.trim()));
            paragraphs += 1;
        }

        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).map_err(|err| ConvertError::Encode {
            format: Format::Docx,
            detail: err.to_string(),
        })?;

        let bytes = cursor.into_inner();
        debug!(paragraphs, output_bytes = bytes.len(), "DOCX built");
        Ok(bytes)
    }
}

fn paragraph(line: &str) -> Paragraph {
    let run = Run::new()
        .add_text(line)
        .size(FONT_HALF_POINTS)
        .fonts(RunFonts::new().ascii(FONT_FAMILY).hi_ansi(FONT_FAMILY));

    Paragraph::new()
        .add_run(run)
        .line_spacing(LineSpacing::new().after(SPACING_AFTER_TWIPS))
}
