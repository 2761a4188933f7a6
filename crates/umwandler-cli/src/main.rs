// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Umwandler: command-line entry point.
//
// `umwandler formats` lists the conversion catalog; `umwandler convert` runs
// one conversion and writes the result next to the other outputs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use umwandler_core::human_errors::humanize_failure;
use umwandler_core::{ConversionResult, ConverterConfig, Format, FormatCatalog, SourceDocument};
use umwandler_document::Converter;

#[derive(Parser, Debug)]
#[command(name = "umwandler", version, about = "Convert PDFs, images, and spreadsheets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every supported source format and its targets.
    Formats {
        /// Print the catalog as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Convert one file.
    Convert {
        /// File to convert.
        input: PathBuf,

        /// Target format (pdf, jpg, png, svg, tiff, bmp, docx).
        #[arg(long)]
        to: Format,

        /// Source format; taken from the file extension when omitted.
        #[arg(long)]
        from: Option<Format>,

        /// Directory the result is written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// JSON configuration file. A missing file means defaults.
        #[arg(long, env = "UMWANDLER_CONFIG")]
        config: Option<PathBuf>,

        /// Directory with the OCR models, overriding the configuration.
        #[arg(long, env = "UMWANDLER_OCR_MODELS")]
        ocr_models: Option<PathBuf>,

        /// pdfium library file or directory, overriding the configuration.
        #[arg(long, env = "UMWANDLER_PDFIUM")]
        pdfium: Option<PathBuf>,

        /// Abandon the conversion after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Formats { json } => print_formats(json),
        Command::Convert {
            input,
            to,
            from,
            out_dir,
            config,
            ocr_models,
            pdfium,
            timeout_secs,
        } => {
            let mut config = match config {
                Some(path) => ConverterConfig::load(&path)
                    .with_context(|| format!("failed to load config from {}", path.display()))?,
                None => ConverterConfig::default(),
            };
            if ocr_models.is_some() {
                config.ocr_model_dir = ocr_models;
            }
            if pdfium.is_some() {
                config.pdfium_library_path = pdfium;
            }

            let path = convert(&input, from, to, &out_dir, config, timeout_secs).await?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn print_formats(json: bool) -> Result<()> {
    if json {
        let catalog: serde_json::Map<String, serde_json::Value> = FormatCatalog::sources()
            .map(|source| {
                let targets = FormatCatalog::targets_for(source)
                    .iter()
                    .map(|target| serde_json::Value::from(target.tag()))
                    .collect();
                (source.tag().to_string(), serde_json::Value::Array(targets))
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    for source in FormatCatalog::sources() {
        let targets: Vec<&str> = FormatCatalog::targets_for(source)
            .iter()
            .map(Format::tag)
            .collect();
        println!("{:<5} -> {}", source.tag(), targets.join(", "));
    }
    Ok(())
}

async fn convert(
    input: &Path,
    from: Option<Format>,
    to: Format,
    out_dir: &Path,
    config: ConverterConfig,
    timeout_secs: Option<u64>,
) -> Result<PathBuf> {
    let source_format = resolve_source_format(input, from)?;
    let bytes =
        std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("document.{}", source_format.extension()));

    let converter = Converter::from_config(config).context("invalid configuration")?;
    let source = SourceDocument::new(bytes, source_format).with_file_name(file_name);

    info!(input = %input.display(), from = %source_format, %to, "Converting");
    let conversion = converter.convert(source, to);
    let outcome = match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), conversion)
            .await
            .map_err(|_| anyhow::anyhow!("conversion timed out after {secs}s"))?,
        None => conversion.await,
    };

    let result = match outcome {
        Ok(result) => result,
        Err(failure) => {
            let human = humanize_failure(&failure);
            warn!(stage = %failure.stage, error = %failure.error, "Conversion failed");
            bail!("{}\n{}", human.message, human.suggestion);
        }
    };

    write_result(out_dir, &result)
}

/// The declared format, or the one implied by the file extension. A declared
/// format must accept the file's extension.
fn resolve_source_format(input: &Path, declared: Option<Format>) -> Result<Format> {
    let extension = input
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());

    match (declared, extension) {
        (Some(format), Some(ext)) if !format.accepts_extension(&ext) => {
            bail!("invalid file type: .{ext} is not a {} file", format.tag())
        }
        (Some(format), _) => Ok(format),
        (None, Some(ext)) => Format::from_extension(&ext)
            .with_context(|| format!("unknown file extension .{ext}; pass --from")),
        (None, None) => bail!("{} has no extension; pass --from", input.display()),
    }
}

fn write_result(out_dir: &Path, result: &ConversionResult) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let path = out_dir.join(&result.name);
    std::fs::write(&path, &result.blob)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        path = %path.display(),
        bytes = result.blob.len(),
        mime_type = %result.mime_type,
        "Result written"
    );
    Ok(path)
}
