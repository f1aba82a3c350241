//! Full-resolution decoded frame.

use image::RgbImage;

/// A single decoded frame from a video source.
///
/// Pixels are 8-bit RGB, row-major. Frames are always full resolution;
/// the downscaled working copy used for motion analysis is derived on demand.
#[derive(Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wraps an existing RGB image.
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Builds a frame from packed `rgb24` bytes.
    ///
    /// Returns `None` if the buffer length does not match `width * height * 3`.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, pixels).map(Self::new)
    }

    /// Builds a frame filled with one colour.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(width, height, image::Rgb(rgb)))
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns the raw interleaved RGB bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width() as usize) * (self.height() as usize)
    }

    /// Returns true if the frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Borrows the underlying raster.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Consumes the frame and returns its raster.
    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("pixel_bytes", &self.pixels().len())
            .finish()
    }
}
