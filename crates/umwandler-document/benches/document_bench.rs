// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the umwandler-document pipelines that need no
// external libraries: page encoding, archiving, and table layout.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgba, RgbaImage};

use umwandler_core::{ArchiveKind, Format, OutputUnit};
use umwandler_document::{MultiPageArchiver, PageSurface, RasterEncoder, TableLayout};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// An A4 page rendered at scale 2 (roughly 1190x1684), mostly white with a
/// dark band so the encoders have something to compress.
fn synthetic_page(page_index: u32) -> PageSurface {
    let (width, height) = (1190u32, 1684u32);
    let image = RgbaImage::from_fn(width, height, |_, y| {
        if (200..260).contains(&y) {
            Rgba([20, 20, 20, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    PageSurface::new(page_index, DynamicImage::ImageRgba8(image))
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Encode one page as PNG and as JPEG.
fn bench_encode_page(c: &mut Criterion) {
    let encoder = RasterEncoder::default();
    let page = synthetic_page(1);

    c.bench_function("encode_page png (A4 @2x)", |b| {
        b.iter(|| black_box(encoder.encode(black_box(&page), Format::Png)))
    });
    c.bench_function("encode_page jpg (A4 @2x)", |b| {
        b.iter(|| black_box(encoder.encode(black_box(&page), Format::Jpeg)))
    });
}

/// Archive three encoded pages.
fn bench_archive_pages(c: &mut Criterion) {
    let encoder = RasterEncoder::default();
    let units: Vec<OutputUnit> = (1..=3)
        .filter_map(|i| {
            let blob = encoder.encode(&synthetic_page(i), Format::Png).ok()?;
            Some(OutputUnit::page_unit(blob, i, Format::Png))
        })
        .collect();

    c.bench_function("archive 3 png pages", |b| {
        b.iter(|| {
            black_box(MultiPageArchiver.archive(black_box(units.clone()), ArchiveKind::Images))
        })
    });
}

/// Lay out a 500-row, 6-column table on landscape A4.
fn bench_table_layout(c: &mut Criterion) {
    let rows: Vec<Vec<String>> = (0..500)
        .map(|r| (0..6).map(|col| format!("r{r} c{col} value")).collect())
        .collect();
    let layout = TableLayout::default();

    c.bench_function("table_layout (500x6)", |b| {
        b.iter(|| black_box(layout.layout("bench", black_box(&rows), 841.89, 595.28)))
    });
}

criterion_group!(benches, bench_encode_page, bench_archive_pages, bench_table_layout);
criterion_main!(benches);
