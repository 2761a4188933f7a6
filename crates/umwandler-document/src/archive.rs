// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multi-page archiving: bundle per-page outputs into one ZIP.

use std::io::{Cursor, Write};

use tracing::{debug, info, instrument};
use umwandler_core::error::{ConvertError, Result};
use umwandler_core::{ArchiveKind, ConversionResult, OutputUnit};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub const ZIP_MIME_TYPE: &str = "application/zip";

/// Bundles per-page outputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MultiPageArchiver;

impl MultiPageArchiver {
    /// A single unit passes through unchanged. Several units become one
    /// deflate ZIP named after `kind`, members in input order.
    ///
    /// Every member carries the same fixed timestamp, so identical units
    /// produce identical archives.
    #[instrument(skip(self, units), fields(units = units.len()))]
    pub fn archive(
        &self,
        mut units: Vec<OutputUnit>,
        kind: ArchiveKind,
    ) -> Result<ConversionResult> {
        match units.len() {
            0 => Err(ConvertError::Archive("nothing to archive".into())),
            1 => Ok(units.remove(0)),
            _ => {
                let options = SimpleFileOptions::default()
                    .compression_method(CompressionMethod::Deflated)
                    .last_modified_time(DateTime::default());

                let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
                for unit in &units {
                    writer
                        .start_file(unit.name.as_str(), options)
                        .map_err(|err| ConvertError::Archive(format!("{}: {}", unit.name, err)))?;
                    writer
                        .write_all(&unit.blob)
                        .map_err(|err| ConvertError::Archive(format!("{}: {}", unit.name, err)))?;
                    debug!(member = %unit.name, bytes = unit.blob.len(), "Archive member written");
                }

                let blob = writer
                    .finish()
                    .map_err(|err| ConvertError::Archive(err.to_string()))?
                    .into_inner();

                info!(members = units.len(), archive_bytes = blob.len(), "Pages archived");
                Ok(ConversionResult::new(blob, kind.archive_name(), ZIP_MIME_TYPE))
            }
        }
    }
}
