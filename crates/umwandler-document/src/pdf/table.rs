// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Table layout: lay out rows of text as a gridded, paginated table on
// landscape pages, emitting printpdf page operations.

use printpdf::{BuiltinFont, Line, LinePoint, Mm, Op, Point, Pt, TextItem};
use tracing::{debug, instrument};
use umwandler_core::ConverterConfig;

use super::writer::wrap_text;

/// Distance from the top edge to the title baseline.
const TITLE_TOP_MM: f32 = 10.0;
/// Table top on the first page (below the title).
const FIRST_PAGE_TOP_MM: f32 = 20.0;
/// Table top on continuation pages.
const NEXT_PAGE_TOP_MM: f32 = 15.0;
/// Left, right and bottom margins.
const EDGE_MARGIN_MM: f32 = 14.0;

const CELL_PADDING_PT: f32 = 5.0;
const LINE_HEIGHT_FACTOR: f32 = 1.15;
/// Average Helvetica glyph width relative to the font size.
const AVG_CHAR_WIDTH_FACTOR: f32 = 0.5;
const GRID_THICKNESS_PT: f32 = 0.5;

/// Font sizes for a table document.
#[derive(Debug, Clone, Copy)]
pub struct TableLayout {
    pub font_size: f32,
    pub title_font_size: f32,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            title_font_size: 14.0,
        }
    }
}

impl TableLayout {
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            font_size: config.table_font_size,
            title_font_size: config.title_font_size,
        }
    }

    fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT_FACTOR
    }

    fn char_width(&self) -> f32 {
        self.font_size * AVG_CHAR_WIDTH_FACTOR
    }

    /// Lay out `rows` under `title` on pages of `page_w` × `page_h` points.
    ///
    /// The first row is the header and is set in bold. Short rows are padded
    /// with empty cells. Returns one operation list per page.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn layout(
        &self,
        title: &str,
        rows: &[Vec<String>],
        page_w: f32,
        page_h: f32,
    ) -> Vec<Vec<Op>> {
        let margin = mm(EDGE_MARGIN_MM);
        let usable_w = (page_w - 2.0 * margin).max(1.0);
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let widths = self.column_widths(rows, column_count, usable_w);

        let mut pages: Vec<Vec<Op>> = Vec::new();
        let mut ops: Vec<Op> = vec![Op::SetOutlineThickness {
            pt: Pt(GRID_THICKNESS_PT),
        }];
        push_text(
            &mut ops,
            title,
            margin,
            page_h - mm(TITLE_TOP_MM),
            self.title_font_size,
            BuiltinFont::Helvetica,
        );

        let bottom = mm(EDGE_MARGIN_MM);
        let mut cursor = page_h - mm(FIRST_PAGE_TOP_MM);
        let mut rows_on_page = 0usize;

        for (row_index, row) in rows.iter().enumerate() {
            let font = if row_index == 0 {
                BuiltinFont::HelveticaBold
            } else {
                BuiltinFont::Helvetica
            };

            let cells: Vec<Vec<String>> = (0..column_count)
                .map(|col| {
                    let text = row.get(col).map(String::as_str).unwrap_or("");
                    let max_chars =
                        ((widths[col] - 2.0 * CELL_PADDING_PT) / self.char_width()) as usize;
                    wrap_text(text, max_chars)
                })
                .collect();
            let line_count = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
            let row_height = line_count as f32 * self.line_height() + 2.0 * CELL_PADDING_PT;

            // A row that does not fit starts a new page, unless it is alone
            // on the page already.
            if cursor - row_height < bottom && rows_on_page > 0 {
                pages.push(std::mem::replace(
                    &mut ops,
                    vec![Op::SetOutlineThickness {
                        pt: Pt(GRID_THICKNESS_PT),
                    }],
                ));
                cursor = page_h - mm(NEXT_PAGE_TOP_MM);
                rows_on_page = 0;
            }

            let mut x = margin;
            for (col, lines) in cells.iter().enumerate() {
                ops.push(rectangle(x, cursor - row_height, widths[col], row_height));
                for (line_index, line) in lines.iter().enumerate() {
                    if line.is_empty() {
                        continue;
                    }
                    let baseline = cursor
                        - CELL_PADDING_PT
                        - self.font_size
                        - line_index as f32 * self.line_height();
                    push_text(&mut ops, line, x + CELL_PADDING_PT, baseline, self.font_size, font);
                }
                x += widths[col];
            }

            cursor -= row_height;
            rows_on_page += 1;
        }

        pages.push(ops);
        debug!(pages = pages.len(), columns = column_count, "Table laid out");
        pages
    }

    /// Column widths proportional to each column's widest cell, scaled so
    /// the table spans `usable_w`.
    fn column_widths(&self, rows: &[Vec<String>], column_count: usize, usable_w: f32) -> Vec<f32> {
        let natural: Vec<f32> = (0..column_count)
            .map(|col| {
                let longest = rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(1);
                longest as f32 * self.char_width() + 2.0 * CELL_PADDING_PT
            })
            .collect();

        let total: f32 = natural.iter().sum();
        natural.iter().map(|w| w / total * usable_w).collect()
    }
}

fn mm(value: f32) -> f32 {
    Mm(value).into_pt().0
}

fn push_text(ops: &mut Vec<Op>, text: &str, x: f32, y: f32, size: f32, font: BuiltinFont) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point { x: Pt(x), y: Pt(y) },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font,
    });
    ops.push(Op::EndTextSection);
}

/// Closed outline of a cell with its bottom-left corner at (`x`, `y`).
fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Op {
    let corner = |px: f32, py: f32| LinePoint {
        p: Point { x: Pt(px), y: Pt(py) },
        bezier: false,
    };
    Op::DrawLine {
        line: Line {
            points: vec![
                corner(x, y),
                corner(x + width, y),
                corner(x + width, y + height),
                corner(x, y + height),
            ],
            is_closed: true,
        },
    }
}
