// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for conversion failures.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how a front end presents it; nothing here retries.

use serde::Serialize;

use crate::error::{ConversionFailure, ConvertError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The user can fix it by choosing a different file or format.
    ActionRequired,
    /// The input cannot be converted as-is.
    Permanent,
    /// Something on this machine is missing or misconfigured.
    Setup,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a failed conversion into a `HumanError`.
pub fn humanize_failure(failure: &ConversionFailure) -> HumanError {
    humanize_error(&failure.error)
}

/// Convert a `ConvertError` into a `HumanError`.
pub fn humanize_error(err: &ConvertError) -> HumanError {
    match err {
        ConvertError::UnsupportedPair { from, to } => HumanError {
            message: format!(
                "Converting {} to {} isn't supported.",
                from.tag().to_uppercase(),
                to.tag().to_uppercase()
            ),
            suggestion: "Pick one of the target formats offered for this file type.".into(),
            severity: Severity::ActionRequired,
        },

        ConvertError::UnknownFormat(tag) => HumanError {
            message: format!("We don't know the format \"{tag}\"."),
            suggestion: "Use one of: pdf, jpg, png, svg, tiff, bmp, gif, xlsx, docx.".into(),
            severity: Severity::ActionRequired,
        },

        ConvertError::Decode { format, .. } => HumanError {
            message: format!(
                "This file couldn't be read as {}.",
                format.tag().to_uppercase()
            ),
            suggestion: "The file may be damaged or saved in a different format. Check the file type and try again.".into(),
            severity: Severity::Permanent,
        },

        ConvertError::EmptyTable => HumanError {
            message: "The spreadsheet is empty.".into(),
            suggestion: "Make sure the first sheet contains at least one row.".into(),
            severity: Severity::ActionRequired,
        },

        ConvertError::Render { page, .. } => HumanError {
            message: format!("Page {page} of this document couldn't be drawn."),
            suggestion: "The PDF may be damaged. Try opening it in a viewer first, or use a different file.".into(),
            severity: Severity::Permanent,
        },

        ConvertError::OcrEngine(_) => HumanError {
            message: "Text recognition didn't work on this document.".into(),
            suggestion: "Make sure the page is clear and readable, then try again.".into(),
            severity: Severity::Permanent,
        },

        ConvertError::Encode { format, .. } => HumanError {
            message: format!(
                "The result couldn't be saved as {}.",
                format.tag().to_uppercase()
            ),
            suggestion: "Try a different target format.".into(),
            severity: Severity::Permanent,
        },

        ConvertError::Archive(_) => HumanError {
            message: "The converted pages couldn't be bundled together.".into(),
            suggestion: "Try again. If this keeps happening, convert a shorter document.".into(),
            severity: Severity::Permanent,
        },

        ConvertError::MissingCapability(what) => HumanError {
            message: format!("This conversion needs a {what}, which isn't set up."),
            suggestion: "Install the missing component or point the configuration at it.".into(),
            severity: Severity::Setup,
        },

        ConvertError::InvalidConfig(detail) => HumanError {
            message: "The converter settings are invalid.".into(),
            suggestion: format!("Fix the configuration file. ({detail})"),
            severity: Severity::Setup,
        },

        ConvertError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Check the file permissions and free disk space, then try again.".into(),
                    severity: Severity::Setup,
                }
            }
        }

        ConvertError::Serialization(_) | ConvertError::Internal(_) => HumanError {
            message: "The converter had an internal problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            severity: Severity::Permanent,
        },
    }
}
