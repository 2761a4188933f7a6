// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end conversion tests. PDF pages are "rendered" by a lopdf-backed
// stand-in that produces blank surfaces of the right size, and OCR is
// scripted, so no pdfium library or OCR models are needed.

use std::io::{Cursor, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use lopdf::content::Content;
use umwandler_core::error::{ConvertError, Result, Stage};
use umwandler_core::{ConverterConfig, Format, FormatCatalog, PaperSize, SourceDocument};
use umwandler_document::{
    Converter, DocumentRenderer, PdfReader, PdfWriter, RenderedDocument, TextRecognizer,
};

// ---------------------------------------------------------------------------
// Stand-in capabilities
// ---------------------------------------------------------------------------

/// Renders every page as a white surface sized MediaBox × scale.
#[derive(Default)]
struct BlankRenderer {
    opens: AtomicUsize,
}

impl BlankRenderer {
    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl DocumentRenderer for BlankRenderer {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RenderedDocument + 'a>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(BlankDocument {
            reader: PdfReader::from_bytes(bytes)?,
        }))
    }

    fn name(&self) -> &str {
        "blank"
    }
}

struct BlankDocument {
    reader: PdfReader,
}

impl RenderedDocument for BlankDocument {
    fn page_count(&self) -> u32 {
        self.reader.page_count()
    }

    fn render_page(&self, page_index: u32, scale: f32) -> Result<DynamicImage> {
        let [x0, y0, x1, y1] = self.reader.media_box(page_index)?;
        let width = (((x1 - x0) * scale).round() as u32).max(1);
        let height = (((y1 - y0) * scale).round() as u32).max(1);
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([255, 255, 255, 255]),
        )))
    }
}

/// Returns the same text for every image.
struct ScriptedRecognizer(&'static str);

impl TextRecognizer for ScriptedRecognizer {
    fn recognize(&self, _image: &DynamicImage, _locale: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

struct FailingRecognizer;

impl TextRecognizer for FailingRecognizer {
    fn recognize(&self, _image: &DynamicImage, _locale: &str) -> Result<String> {
        Err(ConvertError::OcrEngine("model crashed".into()))
    }
}

fn converter_with(renderer: Arc<BlankRenderer>, recognizer: Arc<dyn TextRecognizer>) -> Converter {
    Converter::builder(ConverterConfig::default())
        .renderer(renderer)
        .recognizer(recognizer)
        .build()
        .unwrap()
}

fn converter() -> (Converter, Arc<BlankRenderer>) {
    let renderer = Arc::new(BlankRenderer::default());
    let converter = converter_with(
        Arc::clone(&renderer),
        Arc::new(ScriptedRecognizer("Invoice 42\n\nTotal: 10 EUR")),
    );
    (converter, renderer)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Small pages keep the rendered surfaces cheap.
const SMALL_PAGE: PaperSize = PaperSize::Custom {
    width_mm: 50,
    height_mm: 70,
};

fn pdf_with_pages(pages: usize) -> Vec<u8> {
    PdfWriter::new(SMALL_PAGE).create_from_pages(vec![Vec::new(); pages])
}

fn raster(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([40, 120, 200, 255]),
    ));
    let image = match format {
        // JPEG and BMP encoders in `image` want opaque RGB.
        ImageFormat::Jpeg | ImageFormat::Bmp => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image,
    };
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="60">
    <circle cx="30" cy="30" r="25" fill="orange"/>
</svg>"#;

/// A minimal single-sheet XLSX. `rows` become inline-string cells.
fn xlsx(rows: &[&[&str]]) -> Vec<u8> {
    let mut sheet_data = String::new();
    for (r, row) in rows.iter().enumerate() {
        sheet_data.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            let column = (b'A' + c as u8) as char;
            sheet_data.push_str(&format!(
                r#"<c r="{column}{row}" t="inlineStr"><is><t>{value}</t></is></c>"#,
                row = r + 1
            ));
        }
        sheet_data.push_str("</row>");
    }

    let files = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#
                .to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
                .to_string(),
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#
                .to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#
                .to_string(),
        ),
        (
            "xl/worksheets/sheet1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_data}</sheetData></worksheet>"#
            ),
        ),
    ];

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in files {
        writer
            .start_file(name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A minimal valid sample for every source format.
fn sample(format: Format) -> Vec<u8> {
    match format {
        Format::Pdf => pdf_with_pages(1),
        Format::Jpeg => raster(ImageFormat::Jpeg, 16, 8),
        Format::Png => raster(ImageFormat::Png, 16, 8),
        Format::Bmp => raster(ImageFormat::Bmp, 16, 8),
        Format::Tiff => raster(ImageFormat::Tiff, 16, 8),
        Format::Gif => raster(ImageFormat::Gif, 16, 8),
        Format::Svg => SVG.as_bytes().to_vec(),
        Format::Xlsx => xlsx(&[&["Item", "Qty"], &["Bolts", "12"]]),
        Format::Docx => Vec::new(),
    }
}

fn zip_members(blob: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(blob)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

fn page_count(pdf: &[u8]) -> u32 {
    PdfReader::from_bytes(pdf).unwrap().page_count()
}

// ---------------------------------------------------------------------------
// Catalog coverage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_catalog_pair_produces_target_mime() {
    let (converter, _) = converter();

    for (from, to) in FormatCatalog::pairs() {
        let source = SourceDocument::new(sample(from), from)
            .with_file_name(format!("sample.{}", from.extension()));
        let result = converter
            .convert(source, to)
            .await
            .unwrap_or_else(|err| panic!("{from} -> {to}: {err}"));
        assert_eq!(result.mime_type, to.mime_type(), "{from} -> {to}");
        assert!(!result.blob.is_empty(), "{from} -> {to}");
    }
}

#[tokio::test]
async fn non_catalog_pairs_fail_before_rendering() {
    let (converter, renderer) = converter();

    for from in Format::ALL {
        for to in Format::ALL {
            if FormatCatalog::supports(from, to) {
                continue;
            }
            let failure = converter
                .convert(SourceDocument::new(sample(from), from), to)
                .await
                .unwrap_err();
            assert_eq!(failure.stage, Stage::Validate, "{from} -> {to}");
            assert!(
                matches!(failure.error, ConvertError::UnsupportedPair { .. }),
                "{from} -> {to}"
            );
        }
    }
    assert_eq!(renderer.opens(), 0);
}

// ---------------------------------------------------------------------------
// Page documents to images
// ---------------------------------------------------------------------------

#[tokio::test]
async fn three_pages_archive_in_page_order() {
    let (converter, _) = converter();
    let source = SourceDocument::new(pdf_with_pages(3), Format::Pdf);

    let result = converter.convert(source, Format::Png).await.unwrap();
    assert_eq!(result.name, "converted_images.zip");
    assert_eq!(result.mime_type, "application/zip");
    assert_eq!(zip_members(&result.blob), vec!["page-1.png", "page-2.png", "page-3.png"]);
}

#[tokio::test]
async fn svg_pages_archive_as_svgs() {
    let (converter, _) = converter();
    let source = SourceDocument::new(pdf_with_pages(2), Format::Pdf);

    let result = converter.convert(source, Format::Svg).await.unwrap();
    assert_eq!(result.name, "converted_svgs.zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(&result.blob)).unwrap();
    let mut svg = String::new();
    archive.by_name("page-2.svg").unwrap().read_to_string(&mut svg).unwrap();
    assert!(svg.starts_with("<svg"));
}

#[tokio::test]
async fn single_page_is_not_archived() {
    let (converter, _) = converter();
    let source = SourceDocument::new(pdf_with_pages(1), Format::Pdf);

    let result = converter.convert(source, Format::Jpeg).await.unwrap();
    assert_eq!(result.name, "page-1.jpg");
    assert_eq!(result.mime_type, "image/jpeg");
    assert_eq!(image::guess_format(&result.blob).unwrap(), ImageFormat::Jpeg);
}

#[tokio::test]
async fn repeated_conversions_agree() {
    let (converter, _) = converter();
    let bytes = pdf_with_pages(4);

    let first = converter
        .convert(SourceDocument::new(bytes.clone(), Format::Pdf), Format::Tiff)
        .await
        .unwrap();
    let second = converter
        .convert(SourceDocument::new(bytes, Format::Pdf), Format::Tiff)
        .await
        .unwrap();

    assert_eq!(first.name, second.name);
    assert_eq!(zip_members(&first.blob), zip_members(&second.blob));
    assert_eq!(zip_members(&first.blob).len(), 4);
}

#[tokio::test]
async fn broken_pdf_fails_in_decode() {
    let (converter, _) = converter();
    let source = SourceDocument::new(b"%PDF-1.7 broken".to_vec(), Format::Pdf);

    let failure = converter.convert(source, Format::Png).await.unwrap_err();
    assert_eq!(failure.stage, Stage::Decode);
}

#[tokio::test]
async fn pdf_png_pdf_round_trip_keeps_pages_and_aspect() {
    let (converter, _) = converter();
    let original = pdf_with_pages(1);
    let [_, _, w, h] = PdfReader::from_bytes(&original).unwrap().media_box(1).unwrap();

    let png = converter
        .convert(SourceDocument::new(original, Format::Pdf), Format::Png)
        .await
        .unwrap();
    let back = converter
        .convert(SourceDocument::new(png.blob, Format::Png), Format::Pdf)
        .await
        .unwrap();
    assert_eq!(page_count(&back.blob), 1);

    // Multiply out every `cm` on the page to get the drawn image size.
    let doc = lopdf::Document::load_mem(&back.blob).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    let (mut sx, mut sy) = (1.0f32, 1.0f32);
    for op in content.operations.iter().filter(|op| op.operator == "cm") {
        sx *= op.operands[0].as_float().unwrap();
        sy *= op.operands[3].as_float().unwrap();
    }

    let drawn = sx / sy;
    let expected = w / h;
    assert!(
        (drawn - expected).abs() / expected < 0.01,
        "aspect {drawn} vs {expected}"
    );
}

// ---------------------------------------------------------------------------
// OCR path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pdf_to_docx_uses_base_name_and_recognised_text() {
    let (converter, _) = converter();
    let source = SourceDocument::new(pdf_with_pages(2), Format::Pdf)
        .with_file_name("scans/invoice.2024.pdf");

    let result = converter.convert(source, Format::Docx).await.unwrap();
    assert_eq!(result.name, "invoice.docx");

    let mut archive = zip::ZipArchive::new(Cursor::new(&result.blob)).unwrap();
    let mut xml = String::new();
    archive.by_name("word/document.xml").unwrap().read_to_string(&mut xml).unwrap();
    assert!(xml.contains("Invoice 42"));
    assert!(xml.contains("Total: 10 EUR"));
}

#[tokio::test]
async fn page_without_text_still_yields_docx() {
    let converter = converter_with(
        Arc::new(BlankRenderer::default()),
        Arc::new(ScriptedRecognizer("")),
    );
    let source = SourceDocument::new(pdf_with_pages(1), Format::Pdf);

    let result = converter.convert(source, Format::Docx).await.unwrap();
    assert_eq!(result.mime_type, Format::Docx.mime_type());
    assert!(result.blob.starts_with(b"PK"));
}

#[tokio::test]
async fn ocr_failure_is_reported_in_ocr_stage() {
    let converter = converter_with(Arc::new(BlankRenderer::default()), Arc::new(FailingRecognizer));
    let source = SourceDocument::new(pdf_with_pages(1), Format::Pdf);

    let failure = converter.convert(source, Format::Docx).await.unwrap_err();
    assert_eq!(failure.stage, Stage::Ocr);
    assert!(matches!(failure.error, ConvertError::OcrEngine(_)));
}

#[tokio::test]
async fn docx_without_recognizer_is_a_missing_capability() {
    let converter = Converter::builder(ConverterConfig::default())
        .renderer(Arc::new(BlankRenderer::default()))
        .build()
        .unwrap();
    let source = SourceDocument::new(pdf_with_pages(1), Format::Pdf);

    let failure = converter.convert(source, Format::Docx).await.unwrap_err();
    assert_eq!(failure.stage, Stage::Validate);
    assert!(matches!(failure.error, ConvertError::MissingCapability(_)));
}

// ---------------------------------------------------------------------------
// Images and spreadsheets to PDF
// ---------------------------------------------------------------------------

#[tokio::test]
async fn images_become_single_page_pdfs_named_after_source() {
    let (converter, _) = converter();
    for format in [Format::Png, Format::Gif, Format::Svg] {
        let source = SourceDocument::new(sample(format), format)
            .with_file_name(format!("logo.v2.{}", format.extension()));
        let result = converter.convert(source, Format::Pdf).await.unwrap();
        assert_eq!(result.name, "logo.pdf", "{format}");
        assert_eq!(page_count(&result.blob), 1, "{format}");
    }
}

#[tokio::test]
async fn malformed_image_fails_in_decode() {
    let (converter, _) = converter();
    let source = SourceDocument::new(b"GIF89a-truncated".to_vec(), Format::Gif);

    let failure = converter.convert(source, Format::Pdf).await.unwrap_err();
    assert_eq!(failure.stage, Stage::Decode);
    assert!(matches!(failure.error, ConvertError::Decode { format: Format::Gif, .. }));
}

#[tokio::test]
async fn spreadsheet_becomes_landscape_table() {
    let (converter, _) = converter();
    let rows: Vec<[String; 3]> = (0..120)
        .map(|i| [format!("row {i}"), (i * 3).to_string(), "note".to_string()])
        .collect();
    let row_refs: Vec<Vec<&str>> = rows
        .iter()
        .map(|r| r.iter().map(String::as_str).collect())
        .collect();
    let slices: Vec<&[&str]> = row_refs.iter().map(Vec::as_slice).collect();
    let source = SourceDocument::new(xlsx(&slices), Format::Xlsx).with_file_name("inventory.xlsx");

    let result = converter.convert(source, Format::Pdf).await.unwrap();
    assert_eq!(result.name, "inventory.pdf");

    let reader = PdfReader::from_bytes(&result.blob).unwrap();
    assert!(reader.page_count() > 1);
    let [_, _, w, h] = reader.media_box(1).unwrap();
    assert!(w > h);
}

#[tokio::test]
async fn empty_spreadsheet_is_empty_table() {
    let (converter, _) = converter();
    let source = SourceDocument::new(xlsx(&[]), Format::Xlsx);

    let failure = converter.convert(source, Format::Pdf).await.unwrap_err();
    assert_eq!(failure.stage, Stage::Table);
    assert!(matches!(failure.error, ConvertError::EmptyTable));
}
