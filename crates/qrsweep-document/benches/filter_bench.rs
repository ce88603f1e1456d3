// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the retry-raster box filter.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{GrayImage, Luma};

use qrsweep_document::{BoxKernel, smooth};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A4 at 200 DPI with a dark square where a code would sit.
fn synthetic_page() -> GrayImage {
    let (width, height) = (1654u32, 2339u32);
    let mut page = GrayImage::from_pixel(width, height, Luma([235u8]));
    for y in 200..600 {
        for x in 200..600 {
            let module = ((x / 12) + (y / 12)) % 2 == 0;
            page.put_pixel(x, y, Luma([if module { 20 } else { 235 }]));
        }
    }
    page
}

/// The stock 5x5 kernel used for the 72/200 DPI retry.
fn bench_smooth(c: &mut Criterion) {
    let page = synthetic_page();
    let kernel = BoxKernel::for_resolutions(72, 200, 9.0);

    c.bench_function("smooth k=5 (A4 @ 200 DPI)", |b| {
        b.iter(|| black_box(smooth(black_box(&page), kernel.dimension())));
    });
}

fn bench_kernel_sizes(c: &mut Criterion) {
    let page = synthetic_page();
    let mut group = c.benchmark_group("smooth by kernel");
    for k in [3u32, 9, 15] {
        group.bench_function(format!("k={k}"), |b| {
            b.iter(|| black_box(smooth(black_box(&page), k)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_smooth, bench_kernel_sizes);
criterion_main!(benches);
