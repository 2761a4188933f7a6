// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: raster encoding, SVG wrapping, and raster decoding.

pub mod encoder;

pub use encoder::RasterEncoder;
