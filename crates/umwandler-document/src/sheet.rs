// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spreadsheet to PDF: read the first sheet of a workbook with calamine and
// lay it out as a landscape table document.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::{debug, info, instrument};
use umwandler_core::error::{ConvertError, Result};
use umwandler_core::{Format, PaperSize};

use crate::pdf::{PdfWriter, TableLayout};
use crate::traits::TableReader;

/// [`TableReader`] for xlsx, xls, xlsb and ods workbooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalamineReader;

impl TableReader for CalamineReader {
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn read_first_sheet(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|err| {
            ConvertError::Decode {
                format: Format::Xlsx,
                detail: err.to_string(),
            }
        })?;

        // A workbook without sheets has no rows either.
        let Some(range) = workbook.worksheet_range_at(0) else {
            return Ok(Vec::new());
        };
        let range = range.map_err(|err| ConvertError::Decode {
            format: Format::Xlsx,
            detail: err.to_string(),
        })?;

        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        debug!(rows = rows.len(), columns = range.width(), "First sheet read");
        Ok(rows)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR:{e:?}"),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Renders tabular sources as paginated table PDFs.
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer {
    layout: TableLayout,
    paper_size: PaperSize,
}

impl TableRenderer {
    pub fn new(layout: TableLayout, paper_size: PaperSize) -> Self {
        Self { layout, paper_size }
    }

    /// Read the first sheet of `bytes` with `reader` and render it under
    /// `title`. Zero rows fail with [`ConvertError::EmptyTable`].
    #[instrument(skip(self, reader, bytes), fields(bytes_len = bytes.len()))]
    pub fn table_to_pages(
        &self,
        reader: &dyn TableReader,
        bytes: &[u8],
        title: &str,
    ) -> Result<Vec<u8>> {
        let rows = reader.read_first_sheet(bytes)?;
        if rows.is_empty() {
            return Err(ConvertError::EmptyTable);
        }

        let writer = PdfWriter::new(self.paper_size).landscape().with_title(title);
        let (page_w, page_h) = writer.page_dimensions_pt();
        let pages = self.layout.layout(title, &rows, page_w, page_h);

        info!(rows = rows.len(), pages = pages.len(), "Table rendered");
        Ok(writer.create_from_pages(pages))
    }
}
