//! Grayscale tone statistics.

use image::DynamicImage;

/// Number of histogram buckets kept per image
pub const HISTOGRAM_BUCKETS: usize = 16;

/// Brightness summary of one image
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    /// Mean intensity scaled to 0..=1
    pub brightness_mean: f64,
    /// 256-bin grayscale histogram folded into 16 buckets
    pub histogram: [u64; HISTOGRAM_BUCKETS],
}

/// Compute tone statistics; `None` for an image with no pixels
pub fn measure_tone(image: &DynamicImage) -> Option<Tone> {
    let gray = image.to_luma8();

    let mut bins = [0u64; 256];
    for pixel in gray.pixels() {
        bins[pixel[0] as usize] += 1;
    }

    let total: u64 = bins.iter().sum();
    if total == 0 {
        return None;
    }

    let weighted: u64 = bins
        .iter()
        .enumerate()
        .map(|(intensity, count)| intensity as u64 * count)
        .sum();
    let brightness_mean = weighted as f64 / (255.0 * total as f64);

    let mut histogram = [0u64; HISTOGRAM_BUCKETS];
    let width = 256 / HISTOGRAM_BUCKETS;
    for (intensity, count) in bins.iter().enumerate() {
        histogram[intensity / width] += count;
    }

    Some(Tone {
        brightness_mean,
        histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn gray(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_pixel(width, height, Luma([value])))
    }

    #[test]
    fn black_and_white_extremes() {
        let black = measure_tone(&gray(4, 4, 0)).unwrap();
        let white = measure_tone(&gray(4, 4, 255)).unwrap();

        assert_eq!(black.brightness_mean, 0.0);
        assert_eq!(white.brightness_mean, 1.0);
        assert_eq!(black.histogram[0], 16);
        assert_eq!(white.histogram[15], 16);
    }

    #[test]
    fn histogram_counts_every_pixel() {
        let tone = measure_tone(&gray(10, 3, 100)).unwrap();
        assert_eq!(tone.histogram.iter().sum::<u64>(), 30);
        // 100 / 16 = bucket 6
        assert_eq!(tone.histogram[6], 30);
    }

    #[test]
    fn empty_image_has_no_tone() {
        assert!(measure_tone(&gray(0, 0, 0)).is_none());
    }
}
