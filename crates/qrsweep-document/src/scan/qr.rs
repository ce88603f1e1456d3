// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR symbol decoder built on `rqrr`.
//
// The plain attempt hands the grayscale raster to rqrr's own thresholding.
// With the try-harder hint, two more strategies run before reporting
// not-found: a global Otsu binarization and its inverse (light-on-dark codes).

use image::GrayImage;
use imageproc::contrast::otsu_level;
use qrsweep_core::error::{QrsweepError, Result};
use qrsweep_core::types::DecodeHints;
use rqrr::PreparedImage;
use tracing::{debug, instrument, trace};

use super::capabilities::SymbolDecoder;

/// Decoding strategies, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Greyscale,
    Otsu,
    OtsuInverted,
}

impl Strategy {
    fn cascade(hints: DecodeHints) -> &'static [Strategy] {
        if hints.try_harder {
            &[Strategy::Greyscale, Strategy::Otsu, Strategy::OtsuInverted]
        } else {
            &[Strategy::Greyscale]
        }
    }
}

/// Outcome of a single strategy.
enum Attempt {
    Found(String),
    /// Finder patterns located but no grid decoded; carries the last reason.
    Undecodable(String),
    NoGrid,
}

/// [`SymbolDecoder`] for QR codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolDecoder for QrDecoder {
    #[instrument(skip(self, raster), fields(width = raster.width(), height = raster.height(), try_harder = hints.try_harder))]
    fn decode(&self, raster: &GrayImage, hints: DecodeHints) -> Result<Option<String>> {
        if raster.width() == 0 || raster.height() == 0 {
            return Ok(None);
        }

        let mut undecodable = None;
        for &strategy in Strategy::cascade(hints) {
            match run_strategy(raster, strategy) {
                Attempt::Found(text) => {
                    debug!(?strategy, chars = text.len(), "QR code decoded");
                    return Ok(Some(text));
                }
                Attempt::Undecodable(reason) => {
                    trace!(?strategy, %reason, "grid found but not decoded");
                    undecodable = Some(reason);
                }
                Attempt::NoGrid => trace!(?strategy, "no grid found"),
            }
        }

        match undecodable {
            Some(reason) => Err(QrsweepError::DecodeFailed(reason)),
            None => Ok(None),
        }
    }
}

fn run_strategy(raster: &GrayImage, strategy: Strategy) -> Attempt {
    let (width, height) = (raster.width() as usize, raster.height() as usize);
    let luma = |x: usize, y: usize| raster.get_pixel(x as u32, y as u32).0[0];

    // `otsu_level` puts samples `<= level` in the dark class.
    let mut prepared = match strategy {
        Strategy::Greyscale => PreparedImage::prepare_from_greyscale(width, height, luma),
        Strategy::Otsu => {
            let threshold = otsu_level(raster);
            PreparedImage::prepare_from_bitmap(width, height, |x, y| luma(x, y) <= threshold)
        }
        Strategy::OtsuInverted => {
            let threshold = otsu_level(raster);
            PreparedImage::prepare_from_bitmap(width, height, |x, y| luma(x, y) > threshold)
        }
    };

    let grids = prepared.detect_grids();
    if grids.is_empty() {
        return Attempt::NoGrid;
    }

    let mut last_error = String::new();
    for grid in &grids {
        match grid.decode() {
            Ok((_meta, content)) => return Attempt::Found(content),
            Err(err) => last_error = format!("{err:?}"),
        }
    }
    Attempt::Undecodable(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::testing::qr_raster;
    use image::Luma;

    #[test]
    fn blank_page_is_not_found() {
        let raster = GrayImage::from_pixel(200, 280, Luma([255u8]));
        let result = QrDecoder::new().decode(&raster, DecodeHints::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn empty_raster_is_not_found() {
        let raster = GrayImage::new(0, 0);
        assert!(QrDecoder::new().decode(&raster, DecodeHints::default()).unwrap().is_none());
    }

    #[test]
    fn stripes_are_not_found_without_hint() {
        let raster = GrayImage::from_fn(120, 120, |x, _| Luma([if (x / 8) % 2 == 0 { 0 } else { 255 }]));
        let hints = DecodeHints { try_harder: false };
        assert!(matches!(QrDecoder::new().decode(&raster, hints), Ok(None)));
    }

    #[test]
    fn decodes_dark_on_light_symbol() {
        let raster = qr_raster("LOT-2026-0042", 4, false);
        let result = QrDecoder::new().decode(&raster, DecodeHints { try_harder: false });
        assert_eq!(result.unwrap(), Some("LOT-2026-0042".to_string()));
    }

    #[test]
    fn inverted_symbol_needs_try_harder() {
        let raster = qr_raster("INV-2026-0042", 6, true);

        let plain = QrDecoder::new().decode(&raster, DecodeHints { try_harder: false });
        assert!(!matches!(plain, Ok(Some(_))), "got {plain:?}");

        let harder = QrDecoder::new().decode(&raster, DecodeHints { try_harder: true });
        assert_eq!(harder.unwrap(), Some("INV-2026-0042".to_string()));
    }

    #[test]
    fn otsu_bitmap_decodes_clean_binary_raster() {
        // On a 0/255 raster the Otsu level is 0, so black must land in the dark class.
        let raster = qr_raster("binary", 5, false);
        assert_eq!(otsu_level(&raster), 0);
        assert!(matches!(run_strategy(&raster, Strategy::Otsu), Attempt::Found(text) if text == "binary"));
    }

    #[test]
    fn cascade_grows_with_try_harder() {
        assert_eq!(Strategy::cascade(DecodeHints { try_harder: false }).len(), 1);
        assert_eq!(Strategy::cascade(DecodeHints { try_harder: true }).len(), 3);
    }
}
