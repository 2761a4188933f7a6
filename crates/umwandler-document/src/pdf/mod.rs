// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: reading page geometry, importing pages as forms, and creating
// image and table PDFs.

pub mod reader;
pub mod table;
pub mod writer;

pub use reader::{ImportedPage, PdfReader};
pub use table::TableLayout;
pub use writer::{PdfWriter, Placement, fit_centered};
