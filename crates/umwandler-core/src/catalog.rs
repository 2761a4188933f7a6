// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion catalog: the allowed targets for every source format.
//
// The matrix is asymmetric on purpose: PDFs convert outward to images, SVG,
// and DOCX; single images and spreadsheets only convert inward to PDF.

use crate::error::{ConvertError, Result};
use crate::types::Format;

/// Catalog adjacency, in the order formats are offered to users.
const ADJACENCY: &[(Format, &[Format])] = &[
    (
        Format::Pdf,
        &[
            Format::Jpeg,
            Format::Png,
            Format::Svg,
            Format::Tiff,
            Format::Bmp,
            Format::Docx,
        ],
    ),
    (Format::Jpeg, &[Format::Pdf]),
    (Format::Tiff, &[Format::Pdf]),
    (Format::Svg, &[Format::Pdf]),
    (Format::Png, &[Format::Pdf]),
    (Format::Bmp, &[Format::Pdf]),
    (Format::Xlsx, &[Format::Pdf]),
    (Format::Gif, &[Format::Pdf]),
];

/// Static lookup over the conversion matrix.
pub struct FormatCatalog;

impl FormatCatalog {
    /// Allowed targets for `source`. Empty when the format is never a source.
    pub fn targets_for(source: Format) -> &'static [Format] {
        ADJACENCY
            .iter()
            .find(|(from, _)| *from == source)
            .map(|(_, targets)| *targets)
            .unwrap_or(&[])
    }

    pub fn supports(source: Format, target: Format) -> bool {
        Self::targets_for(source).contains(&target)
    }

    /// Formats accepted as conversion sources.
    pub fn sources() -> impl Iterator<Item = Format> {
        ADJACENCY.iter().map(|(from, _)| *from)
    }

    /// Every supported `(source, target)` pair.
    pub fn pairs() -> impl Iterator<Item = (Format, Format)> {
        ADJACENCY
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (*from, *to)))
    }

    /// Fail with [`ConvertError::UnsupportedPair`] unless the pair is listed.
    pub fn validate(source: Format, target: Format) -> Result<()> {
        if Self::supports(source, target) {
            Ok(())
        } else {
            Err(ConvertError::UnsupportedPair {
                from: source,
                to: target,
            })
        }
    }
}
