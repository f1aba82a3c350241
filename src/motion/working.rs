//! Fixed-width working copy for motion analysis.

use image::imageops::{self, FilterType};
use image::RgbImage;

/// Resizes `image` to `width` pixels wide, keeping the aspect ratio.
///
/// The height is truncated, never below one pixel. A fixed width keeps the
/// variance threshold meaningful regardless of the source resolution.
pub fn working_copy(image: &RgbImage, width: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || w == width {
        return image.clone();
    }
    let height = ((u64::from(h) * u64::from(width)) / u64::from(w)).max(1) as u32;
    imageops::resize(image, width, height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downscale_keeps_aspect() {
        let img = RgbImage::new(1920, 1080);
        let small = working_copy(&img, 600);
        assert_eq!(small.dimensions(), (600, 337));
    }

    #[test]
    fn test_upscale_narrow_source() {
        let img = RgbImage::new(300, 200);
        assert_eq!(working_copy(&img, 600).dimensions(), (600, 400));
    }

    #[test]
    fn test_same_width_is_copied() {
        let img = RgbImage::from_pixel(600, 10, image::Rgb([9, 9, 9]));
        assert_eq!(working_copy(&img, 600), img);
    }

    #[test]
    fn test_extreme_aspect_never_zero_height() {
        let img = RgbImage::new(10_000, 1);
        assert_eq!(working_copy(&img, 600).dimensions(), (600, 1));
    }
}
