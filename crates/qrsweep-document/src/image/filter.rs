// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster filter: uniform box blur applied to high-resolution retry rasters
// before the second decode attempt.
//
// The blur footprint scales with the retry/default resolution ratio so that
// its physical size on the page stays roughly constant: a 3x3 kernel at
// 72 DPI becomes 5x5 at 200 DPI.

use image::{GrayImage, Luma};
use tracing::{debug, instrument};

/// Footprint area of the blur at the default resolution (3x3).
pub const DEFAULT_BLUR_BASE_AREA: f64 = 9.0;

/// Square uniform-weight convolution kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxKernel {
    dimension: u32,
}

impl BoxKernel {
    /// A `dimension` x `dimension` kernel. Dimensions below 1 are raised to 1.
    pub fn new(dimension: u32) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Kernel sized for a raster rendered at `retry_resolution` when the
    /// footprint `base_area` was calibrated at `default_resolution`.
    pub fn for_resolutions(default_resolution: u32, retry_resolution: u32, base_area: f64) -> Self {
        Self::new(kernel_dimension(default_resolution, retry_resolution, base_area))
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Weight of every cell, `1 / k²`.
    pub fn weight(&self) -> f64 {
        1.0 / f64::from(self.dimension * self.dimension)
    }

    /// Offset of the output pixel inside the window.
    pub fn origin(&self) -> u32 {
        (self.dimension - 1) / 2
    }

    /// Apply this kernel to `raster`.
    pub fn apply(&self, raster: &GrayImage) -> GrayImage {
        smooth(raster, self.dimension)
    }
}

/// `floor(sqrt(base_area / default * retry))`, never less than 1.
///
/// Callers must pass positive resolutions.
pub fn kernel_dimension(default_resolution: u32, retry_resolution: u32, base_area: f64) -> u32 {
    let area = base_area / f64::from(default_resolution) * f64::from(retry_resolution);
    let dimension = area.sqrt().floor();
    if dimension.is_finite() && dimension >= 1.0 {
        dimension as u32
    } else {
        1
    }
}

/// Box-blur `raster` with a `kernel_size` x `kernel_size` window.
///
/// The output has the input's dimensions. Pixels whose window would leave the
/// raster are copied through unchanged. `kernel_size` 0 or 1 is the identity.
#[instrument(skip(raster), fields(width = raster.width(), height = raster.height()))]
pub fn smooth(raster: &GrayImage, kernel_size: u32) -> GrayImage {
    let (width, height) = raster.dimensions();
    let mut output = raster.clone();
    if kernel_size <= 1 || width < kernel_size || height < kernel_size {
        return output;
    }

    let kernel = BoxKernel::new(kernel_size);
    let weight = kernel.weight();
    let before = kernel.origin();
    let after = kernel_size - 1 - before;

    let integral = compute_integral_image(raster);
    let stride = width as usize + 1;
    let at = |x: u32, y: u32| integral[y as usize * stride + x as usize];

    for y in before..height - after {
        let y0 = y - before;
        let y1 = y0 + kernel_size;
        for x in before..width - after {
            let x0 = x - before;
            let x1 = x0 + kernel_size;
            let sum = at(x1, y1) + at(x0, y0) - at(x1, y0) - at(x0, y1);
            let value = (sum as f64 * weight).round().clamp(0.0, 255.0) as u8;
            output.put_pixel(x, y, Luma([value]));
        }
    }

    debug!(kernel = kernel_size, "Box blur applied");
    output
}

/// Summed-area table with a zero row and column in front, so the sum over
/// `[x0, x1) x [y0, y1)` is `I(x1,y1) + I(x0,y0) - I(x1,y0) - I(x0,y1)`.
fn compute_integral_image(gray: &GrayImage) -> Vec<u64> {
    let (width, height) = gray.dimensions();
    let stride = width as usize + 1;
    let mut integral = vec![0u64; stride * (height as usize + 1)];

    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += u64::from(gray.get_pixel(x as u32, y as u32).0[0]);
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    integral
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 17 + y * 31) % 256) as u8]))
    }

    #[test]
    fn kernel_for_200_dpi_is_five() {
        assert_eq!(kernel_dimension(72, 200, DEFAULT_BLUR_BASE_AREA), 5);
        assert_eq!(BoxKernel::for_resolutions(72, 200, 9.0).dimension(), 5);
    }

    #[test]
    fn kernel_at_default_resolution_is_three() {
        assert_eq!(kernel_dimension(72, 72, DEFAULT_BLUR_BASE_AREA), 3);
        assert_eq!(kernel_dimension(72, 300, DEFAULT_BLUR_BASE_AREA), 6);
    }

    #[test]
    fn kernel_never_below_one() {
        assert_eq!(kernel_dimension(300, 72, 0.5), 1);
        assert_eq!(BoxKernel::new(0).dimension(), 1);
    }

    #[test]
    fn weights_sum_to_one() {
        let kernel = BoxKernel::new(5);
        let total = kernel.weight() * 25.0;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn size_one_is_identity() {
        let img = gradient(40, 30);
        assert_eq!(smooth(&img, 1), img);
    }

    #[test]
    fn uniform_image_unchanged() {
        let img = GrayImage::from_pixel(20, 20, Luma([200u8]));
        assert_eq!(smooth(&img, 5), img);
    }

    #[test]
    fn dimensions_preserved() {
        let img = gradient(37, 23);
        let out = smooth(&img, 5);
        assert_eq!(out.dimensions(), (37, 23));
    }

    #[test]
    fn border_pixels_pass_through() {
        let img = gradient(16, 12);
        let out = smooth(&img, 5);
        for x in 0..16 {
            for y in [0, 1, 10, 11] {
                assert_eq!(out.get_pixel(x, y), img.get_pixel(x, y), "({x},{y})");
            }
        }
        for y in 0..12 {
            for x in [0, 1, 14, 15] {
                assert_eq!(out.get_pixel(x, y), img.get_pixel(x, y), "({x},{y})");
            }
        }
    }

    #[test]
    fn single_bright_pixel_spreads_evenly() {
        let mut img = GrayImage::new(5, 5);
        img.put_pixel(2, 2, Luma([90]));
        let out = smooth(&img, 3);
        for y in 1..=3 {
            for x in 1..=3 {
                assert_eq!(out.get_pixel(x, y).0[0], 10, "({x},{y})");
            }
        }
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn even_kernel_window_trails_origin() {
        let img = GrayImage::from_raw(3, 3, vec![0, 10, 20, 30, 40, 50, 60, 70, 80]).unwrap();
        let out = smooth(&img, 2);
        assert_eq!(out.get_pixel(0, 0).0[0], 20);
        assert_eq!(out.get_pixel(1, 1).0[0], 60);
        // Last column and row have no room for the window.
        assert_eq!(out.get_pixel(2, 0).0[0], 20);
        assert_eq!(out.get_pixel(0, 2).0[0], 60);
    }

    #[test]
    fn kernel_larger_than_raster_is_identity() {
        let img = gradient(4, 4);
        assert_eq!(smooth(&img, 7), img);
    }
}
