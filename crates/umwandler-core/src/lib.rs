// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Umwandler: Core types, conversion catalog, and error definitions shared
// across all crates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use catalog::FormatCatalog;
pub use config::ConverterConfig;
pub use error::{ConversionFailure, ConvertError, Stage};
pub use types::*;
