// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion dispatch: validate a format pair against the catalog, pick the
// pipeline for it, and run its stages in order.
//
// Pipelines by direction:
//   pdf → raster/svg       render every page, encode each, archive if > 1
//   pdf → docx             render page 1 at OCR scale, recognise, build DOCX
//   raster/svg → pdf       place the image on one page
//   spreadsheet → pdf      lay the first sheet out as a table
//
// CPU-bound stages run on tokio's blocking pool, one after another. The first
// failing stage ends the conversion and nothing partial is returned.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use umwandler_core::error::{ConversionFailure, ConvertError, Stage, StageExt};
use umwandler_core::{
    ArchiveKind, ConversionResult, ConverterConfig, Format, FormatCatalog, FormatFamily,
    OutputUnit, SourceDocument,
};

use crate::archive::MultiPageArchiver;
use crate::docx::TextDocumentBuilder;
use crate::image::RasterEncoder;
use crate::ocr::extract_text;
use crate::pdf::TableLayout;
use crate::place::PagePlacer;
use crate::render::{PageSurface, PdfiumRenderer, RenderContext};
use crate::sheet::{CalamineReader, TableRenderer};
use crate::traits::{DocumentRenderer, TableReader, TextRecognizer};

type ConvertResult<T> = std::result::Result<T, ConversionFailure>;

/// The pipeline a validated format pair runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Paginated document → one raster or SVG file per page.
    PagesToImages,
    /// Paginated document → text document via OCR of the first page.
    PagesToText,
    /// Single raster or vector image → one-page PDF.
    PlaceOnPage,
    /// Spreadsheet → paginated table PDF.
    TableToPages,
}

impl Pipeline {
    /// Pipeline for a pair that has already passed [`FormatCatalog::validate`].
    pub fn select(source: Format, target: Format) -> Self {
        match (source.family(), target.family()) {
            (FormatFamily::PageDocument, FormatFamily::TextDocument) => Self::PagesToText,
            (FormatFamily::PageDocument, _) => Self::PagesToImages,
            (FormatFamily::Spreadsheet, _) => Self::TableToPages,
            _ => Self::PlaceOnPage,
        }
    }
}

/// Assembles a [`Converter`] from explicit capabilities.
pub struct ConverterBuilder {
    config: ConverterConfig,
    renderer: Option<Arc<dyn DocumentRenderer>>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    table_reader: Arc<dyn TableReader>,
}

impl ConverterBuilder {
    pub fn renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn table_reader(mut self, table_reader: Arc<dyn TableReader>) -> Self {
        self.table_reader = table_reader;
        self
    }

    /// Validate the configuration and build.
    pub fn build(self) -> umwandler_core::error::Result<Converter> {
        self.config.validate()?;
        Ok(Converter {
            config: self.config,
            renderer: self.renderer,
            recognizer: self.recognizer,
            table_reader: self.table_reader,
        })
    }
}

/// Converts documents between the formats in [`FormatCatalog`].
///
/// Holds only configuration and shared capabilities, so one converter can
/// serve any number of concurrent calls.
#[derive(Clone)]
pub struct Converter {
    config: ConverterConfig,
    renderer: Option<Arc<dyn DocumentRenderer>>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    table_reader: Arc<dyn TableReader>,
}

impl Converter {
    /// Start building a converter without a renderer or recognizer. The
    /// spreadsheet reader defaults to [`CalamineReader`].
    pub fn builder(config: ConverterConfig) -> ConverterBuilder {
        ConverterBuilder {
            config,
            renderer: None,
            recognizer: None,
            table_reader: Arc::new(CalamineReader),
        }
    }

    /// Build a converter with every capability available on this machine.
    ///
    /// A missing pdfium library or missing OCR models only disable the
    /// pipelines that need them; those conversions then fail with
    /// [`ConvertError::MissingCapability`].
    pub fn from_config(config: ConverterConfig) -> umwandler_core::error::Result<Self> {
        let mut builder = Self::builder(config);

        match PdfiumRenderer::bind(builder.config.pdfium_library_path.as_deref()) {
            Ok(renderer) => builder = builder.renderer(Arc::new(renderer)),
            Err(err) => warn!(%err, "PDF conversions are unavailable"),
        }

        #[cfg(feature = "ocr")]
        {
            let ocr_config =
                crate::ocr::OcrConfig::resolve(builder.config.ocr_model_dir.as_deref());
            match crate::ocr::OcrEngine::new(&ocr_config) {
                Ok(engine) => builder = builder.recognizer(Arc::new(engine)),
                Err(err) => warn!(%err, "PDF to DOCX is unavailable"),
            }
        }

        builder.build()
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert `source` into `target`.
    ///
    /// Unsupported pairs and missing capabilities are rejected in the
    /// validate stage, before the source is touched.
    #[instrument(skip(self, source), fields(
        from = %source.format(),
        to = %target,
        bytes_len = source.bytes().len(),
    ))]
    pub async fn convert(
        &self,
        source: SourceDocument,
        target: Format,
    ) -> ConvertResult<ConversionResult> {
        FormatCatalog::validate(source.format(), target).stage(Stage::Validate)?;
        let pipeline = Pipeline::select(source.format(), target);
        info!(?pipeline, "Conversion started");

        let result = match pipeline {
            Pipeline::PagesToImages => self.pages_to_images(source, target).await?,
            Pipeline::PagesToText => self.pages_to_text(source).await?,
            Pipeline::PlaceOnPage => self.place_on_page(source).await?,
            Pipeline::TableToPages => self.table_to_pages(source).await?,
        };

        info!(
            name = %result.name,
            mime_type = %result.mime_type,
            output_bytes = result.blob.len(),
            "Conversion finished"
        );
        Ok(result)
    }

    // -- Pipelines ------------------------------------------------------------

    async fn pages_to_images(
        &self,
        source: SourceDocument,
        target: Format,
    ) -> ConvertResult<ConversionResult> {
        let renderer = self.require_renderer()?;
        let scale = self.config.raster_scale;
        let encoder = RasterEncoder::new(self.config.jpeg_quality);
        let bytes = source.into_bytes();

        let units = blocking(Stage::Render, move || {
            render_pages(renderer.as_ref(), &bytes, scale, &encoder, target)
        })
        .await?;

        let kind = ArchiveKind::for_target(target);
        blocking(Stage::Archive, move || {
            MultiPageArchiver.archive(units, kind).stage(Stage::Archive)
        })
        .await
    }

    async fn pages_to_text(&self, source: SourceDocument) -> ConvertResult<ConversionResult> {
        let renderer = self.require_renderer()?;
        let recognizer = self.require_recognizer()?;
        let scale = self.config.ocr_scale;
        let locale = self.config.ocr_locale.clone();
        let name = format!("{}.{}", source.base_name(), Format::Docx.extension());
        let bytes = source.into_bytes();

        let surface = blocking(Stage::Render, move || {
            render_first_page(renderer.as_ref(), &bytes, scale)
        })
        .await?;

        let text = blocking(Stage::Ocr, move || {
            extract_text(recognizer.as_ref(), &surface, &locale).stage(Stage::Ocr)
        })
        .await?;

        let blob = blocking(Stage::TextDocument, move || {
            TextDocumentBuilder.build_document(&text).stage(Stage::TextDocument)
        })
        .await?;

        Ok(ConversionResult::new(blob, name, Format::Docx.mime_type()))
    }

    async fn place_on_page(&self, source: SourceDocument) -> ConvertResult<ConversionResult> {
        let placer = PagePlacer::new(self.config.paper_size);
        let format = source.format();
        let name = pdf_name(&source);
        let bytes = source.into_bytes();

        let blob = blocking(Stage::Compose, move || {
            placer
                .place_on_page(&bytes, format)
                .map_err(|err| tag_decode_or(Stage::Compose, err))
        })
        .await?;

        Ok(ConversionResult::new(blob, name, Format::Pdf.mime_type()))
    }

    async fn table_to_pages(&self, source: SourceDocument) -> ConvertResult<ConversionResult> {
        let table =
            TableRenderer::new(TableLayout::from_config(&self.config), self.config.paper_size);
        let reader = Arc::clone(&self.table_reader);
        let title = source.base_name().to_string();
        let name = pdf_name(&source);
        let bytes = source.into_bytes();

        let blob = blocking(Stage::Table, move || {
            table
                .table_to_pages(reader.as_ref(), &bytes, &title)
                .map_err(|err| tag_decode_or(Stage::Table, err))
        })
        .await?;

        Ok(ConversionResult::new(blob, name, Format::Pdf.mime_type()))
    }

    // -- Capabilities ---------------------------------------------------------

    fn require_renderer(&self) -> ConvertResult<Arc<dyn DocumentRenderer>> {
        self.renderer
            .clone()
            .ok_or(ConvertError::MissingCapability("PDF page renderer (pdfium)"))
            .stage(Stage::Validate)
    }

    fn require_recognizer(&self) -> ConvertResult<Arc<dyn TextRecognizer>> {
        self.recognizer
            .clone()
            .ok_or(ConvertError::MissingCapability("OCR engine"))
            .stage(Stage::Validate)
    }
}

/// Render and encode every page in order.
fn render_pages(
    renderer: &dyn DocumentRenderer,
    bytes: &[u8],
    scale: f32,
    encoder: &RasterEncoder,
    target: Format,
) -> ConvertResult<Vec<OutputUnit>> {
    let context = RenderContext::open(renderer, bytes, scale).stage(Stage::Decode)?;

    let mut units = Vec::with_capacity(context.page_count() as usize);
    for page_index in 1..=context.page_count() {
        let surface = context.render_page(page_index).stage(Stage::Render)?;
        let blob = encoder.encode(&surface, target).stage(Stage::Encode)?;
        units.push(OutputUnit::page_unit(blob, page_index, target));
    }
    Ok(units)
}

fn render_first_page(
    renderer: &dyn DocumentRenderer,
    bytes: &[u8],
    scale: f32,
) -> ConvertResult<PageSurface> {
    let context = RenderContext::open(renderer, bytes, scale).stage(Stage::Decode)?;
    if context.page_count() > 1 {
        warn!(
            page_count = context.page_count(),
            "only the first page is converted to text"
        );
    }
    context.render_page(1).stage(Stage::Render)
}

fn pdf_name(source: &SourceDocument) -> String {
    format!("{}.{}", source.base_name(), Format::Pdf.extension())
}

/// Decode errors belong to the decode stage wherever they surface.
fn tag_decode_or(stage: Stage, error: ConvertError) -> ConversionFailure {
    match error {
        ConvertError::Decode { .. } => ConversionFailure::new(Stage::Decode, error),
        other => ConversionFailure::new(stage, other),
    }
}

/// Run `task` on the blocking pool. A panicked task becomes
/// [`ConvertError::Internal`] in `stage`.
async fn blocking<T, F>(stage: Stage, task: F) -> ConvertResult<T>
where
    F: FnOnce() -> ConvertResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|err| {
        ConversionFailure::new(
            stage,
            ConvertError::Internal(format!("blocking task failed: {err}")),
        )
    })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_pair_has_a_pipeline() {
        for (from, to) in FormatCatalog::pairs() {
            let pipeline = Pipeline::select(from, to);
            match from {
                Format::Pdf if to == Format::Docx => assert_eq!(pipeline, Pipeline::PagesToText),
                Format::Pdf => assert_eq!(pipeline, Pipeline::PagesToImages),
                Format::Xlsx => assert_eq!(pipeline, Pipeline::TableToPages),
                _ => assert_eq!(pipeline, Pipeline::PlaceOnPage),
            }
        }
    }

    #[test]
    fn decode_errors_are_tagged_decode() {
        let failure = tag_decode_or(
            Stage::Compose,
            ConvertError::Decode {
                format: Format::Svg,
                detail: "bad".into(),
            },
        );
        assert_eq!(failure.stage, Stage::Decode);

        let failure = tag_decode_or(Stage::Table, ConvertError::EmptyTable);
        assert_eq!(failure.stage, Stage::Table);

        let failure = tag_decode_or(
            Stage::Compose,
            ConvertError::Encode {
                format: Format::Pdf,
                detail: "intermediate PDF unreadable".into(),
            },
        );
        assert_eq!(failure.stage, Stage::Compose);
    }

    #[tokio::test]
    async fn pdf_needs_a_renderer() {
        let converter = Converter::builder(ConverterConfig::default()).build().unwrap();
        let source = SourceDocument::new(b"%PDF-1.7".to_vec(), Format::Pdf);
        let failure = converter.convert(source, Format::Png).await.unwrap_err();
        assert_eq!(failure.stage, Stage::Validate);
        assert!(matches!(failure.error, ConvertError::MissingCapability(_)));
    }

    #[tokio::test]
    async fn unsupported_pair_fails_validation() {
        let converter = Converter::builder(ConverterConfig::default()).build().unwrap();
        let source = SourceDocument::new(Vec::new(), Format::Png);
        let failure = converter.convert(source, Format::Jpeg).await.unwrap_err();
        assert_eq!(failure.stage, Stage::Validate);
        assert!(matches!(failure.error, ConvertError::UnsupportedPair { .. }));
    }
}
