//! Average-hash over page screenshots. The hash is an `h×h` grid of
//! brighter-than-mean bits; similarity decays exponentially with Hamming
//! distance so near-identical pages score high and everything else drops off
//! fast.

use image::imageops::FilterType;

use crate::constants::PHASH_SIZE;
use crate::error::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PHash {
    bits: Vec<bool>,
}

impl PHash {
    /// Decode a PNG/JPEG screenshot and compute its average hash.
    pub fn from_image_bytes(data: &[u8], hsize: u32) -> Result<PHash, Error> {
        let hsize = if hsize == 0 { PHASH_SIZE } else { hsize };

        let decoded = image::load_from_memory(data)
            .map_err(|err| Error::Network(format!("screenshot decode failed: {err}")))?;

        let scaled = decoded.resize_exact(hsize, hsize, FilterType::Lanczos3);
        let rgb = scaled.to_rgb8();

        let luminance: Vec<f64> = rgb
            .pixels()
            .map(|pixel| {
                let [r, g, b] = pixel.0;
                (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0
            })
            .collect();

        let mean = luminance.iter().sum::<f64>() / luminance.len() as f64;
        let bits = luminance.iter().map(|value| *value > mean).collect();

        Ok(PHash { bits })
    }

    /// Similarity percentage derived from the Hamming distance. Identical
    /// hashes score 100; anything past ~40% of bits differing bottoms out at
    /// zero.
    pub fn similarity(&self, other: &PHash) -> u8 {
        if self.bits.len() != other.bits.len() || self.bits.is_empty() {
            return 0;
        }

        let bit_count = self.bits.len() as f64;
        let hamming = self
            .bits
            .iter()
            .zip(&other.bits)
            .filter(|(a, b)| a != b)
            .count() as f64;

        let raw = (1.0 + std::f64::consts::E.powf((bit_count - hamming) / bit_count)
            - std::f64::consts::E)
            * 100.0;

        raw.max(0.0).min(100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(image: RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn gradient() -> Vec<u8> {
        png_bytes(RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, 0])
        }))
    }

    #[test]
    fn test_identical_screenshots_score_100() {
        let hash = PHash::from_image_bytes(&gradient(), PHASH_SIZE).unwrap();
        assert_eq!(hash.similarity(&hash), 100);
    }

    #[test]
    fn test_inverted_screenshot_scores_zero() {
        let light = PHash::from_image_bytes(&gradient(), PHASH_SIZE).unwrap();
        let inverted = png_bytes(RgbImage::from_fn(64, 64, |x, y| {
            Rgb([255 - (x * 4) as u8, 255 - (y * 4) as u8, 255])
        }));
        let dark = PHash::from_image_bytes(&inverted, PHASH_SIZE).unwrap();

        assert_eq!(light.similarity(&dark), 0);
    }

    #[test]
    fn test_score_stays_in_range() {
        let a = PHash::from_image_bytes(&gradient(), PHASH_SIZE).unwrap();
        let noisy = png_bytes(RgbImage::from_fn(64, 64, |x, y| {
            Rgb([((x * 7 + y * 3) % 256) as u8, (y * 4) as u8, 128])
        }));
        let b = PHash::from_image_bytes(&noisy, PHASH_SIZE).unwrap();

        assert!(a.similarity(&b) <= 100);
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(PHash::from_image_bytes(b"not an image", PHASH_SIZE).is_err());
    }

    #[test]
    fn test_hash_is_the_expected_width() {
        let hash = PHash::from_image_bytes(&gradient(), PHASH_SIZE).unwrap();
        assert_eq!(hash.bits.len(), (PHASH_SIZE * PHASH_SIZE) as usize);
    }
}
