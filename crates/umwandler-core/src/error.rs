// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Umwandler.

use std::fmt;

use thiserror::Error;

use crate::types::Format;

/// Error raised by a single pipeline stage.
#[derive(Debug, Error)]
pub enum ConvertError {
    // -- Validation --
    #[error("conversion from {from} to {to} is not supported")]
    UnsupportedPair { from: Format, to: Format },

    #[error("unknown format: {0}")]
    UnknownFormat(String),

    // -- Input --
    #[error("failed to decode {format} input: {detail}")]
    Decode { format: Format, detail: String },

    #[error("spreadsheet is empty")]
    EmptyTable,

    // -- Processing --
    #[error("failed to render page {page}: {detail}")]
    Render { page: u32, detail: String },

    #[error("OCR failed: {0}")]
    OcrEngine(String),

    #[error("failed to encode {format} output: {detail}")]
    Encode { format: Format, detail: String },

    #[error("failed to build archive: {0}")]
    Archive(String),

    // -- Setup --
    #[error("no {0} is configured")]
    MissingCapability(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// The pipeline stage in which a conversion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Decode,
    Render,
    Encode,
    Compose,
    Table,
    Ocr,
    TextDocument,
    Archive,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validate => "validate",
            Self::Decode => "decode",
            Self::Render => "render",
            Self::Encode => "encode",
            Self::Compose => "compose",
            Self::Table => "table",
            Self::Ocr => "ocr",
            Self::TextDocument => "text-document",
            Self::Archive => "archive",
        };
        f.write_str(name)
    }
}

/// A failed conversion: the first stage error, tagged with its stage.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {error}")]
pub struct ConversionFailure {
    pub stage: Stage,
    #[source]
    pub error: ConvertError,
}

impl ConversionFailure {
    pub fn new(stage: Stage, error: ConvertError) -> Self {
        Self { stage, error }
    }
}

/// Attach a stage to a stage-level result.
pub trait StageExt<T> {
    fn stage(self, stage: Stage) -> std::result::Result<T, ConversionFailure>;
}

impl<T> StageExt<T> for Result<T> {
    fn stage(self, stage: Stage) -> std::result::Result<T, ConversionFailure> {
        self.map_err(|error| ConversionFailure::new(stage, error))
    }
}
