//! Pixelation (mosaic) mode.

use image::RgbImage;
use image::imageops::{self, FilterType};

/// Pixelates a region crop.
///
/// Block size scales with intensity and region size: the crop is averaged
/// down by the block factor (triangle filter) and scaled back up with
/// nearest-neighbor to produce hard mosaic cells. Intensity 0 yields a
/// block of 1, leaving the crop effectively untouched.
pub fn apply(roi: &RgbImage, intensity: u8) -> RgbImage {
    let min_side = roi.width().min(roi.height());
    let block = ((intensity as u32 * min_side) / 400).max(1);
    if block <= 1 {
        return roi.clone();
    }
    let small_w = (roi.width() / block).max(1);
    let small_h = (roi.height() / block).max(1);
    let small = imageops::resize(roi, small_w, small_h, FilterType::Triangle);
    imageops::resize(&small, roi.width(), roi.height(), FilterType::Nearest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(size: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, _| {
            let v = (x * 255 / size.max(1)) as u8;
            Rgb([v, v, v])
        })
    }

    fn distinct_values(img: &RgbImage) -> usize {
        let mut values: Vec<u8> = img.pixels().map(|p| p.0[0]).collect();
        values.sort_unstable();
        values.dedup();
        values.len()
    }

    #[test]
    fn zero_intensity_is_identity() {
        let roi = gradient(40);
        assert_eq!(apply(&roi, 0), roi);
    }

    #[test]
    fn output_keeps_dimensions() {
        let roi = gradient(37);
        let out = apply(&roi, 80);
        assert_eq!(out.dimensions(), roi.dimensions());
    }

    #[test]
    fn higher_intensity_means_coarser_mosaic() {
        let roi = gradient(64);
        let mut last = usize::MAX;
        for intensity in [20u8, 50, 80, 100] {
            let n = distinct_values(&apply(&roi, intensity));
            assert!(n <= last, "intensity {intensity} produced finer mosaic");
            last = n;
        }
        assert!(last < distinct_values(&roi));
    }

    #[test]
    fn tiny_region_still_pixelates() {
        let roi = gradient(6);
        let out = apply(&roi, 100);
        assert_eq!(out.dimensions(), (6, 6));
    }
}
