//! Per-pixel classification result.

/// Classification of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Label {
    /// Matches the learned background.
    Background = 0,
    /// Darker copy of the background.
    Shadow = 127,
    /// Differs from the background.
    Foreground = 255,
}

impl Label {
    /// Grey level used in mask images.
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Motion mask at working resolution.
///
/// Stored as one byte per pixel using the [`Label`] values, which keeps it
/// directly viewable as an 8-bit grayscale image.
#[derive(Clone, PartialEq, Eq)]
pub struct MotionMask {
    width: u32,
    height: u32,
    labels: Vec<u8>,
}

impl MotionMask {
    /// Creates a mask with every pixel set to `label`.
    pub fn filled(width: u32, height: u32, label: Label) -> Self {
        Self {
            width,
            height,
            labels: vec![label.value(); width as usize * height as usize],
        }
    }

    pub(crate) fn from_labels(width: u32, height: u32, labels: Vec<u8>) -> Self {
        debug_assert_eq!(labels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            labels,
        }
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw label values, row-major.
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Returns the label at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Label {
        match self.labels[(y as usize) * (self.width as usize) + x as usize] {
            0 => Label::Background,
            127 => Label::Shadow,
            _ => Label::Foreground,
        }
    }

    /// Sets the label at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, label: Label) {
        let idx = (y as usize) * (self.width as usize) + x as usize;
        self.labels[idx] = label.value();
    }

    /// Number of pixels not labelled background (shadows included).
    pub fn non_background_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l != 0).count()
    }

    /// Percentage of pixels not labelled background, in `0..=100`.
    pub fn foreground_percent(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        100.0 * self.non_background_count() as f64 / self.labels.len() as f64
    }

    /// Returns the mask as a grayscale image.
    pub fn to_image(&self) -> image::GrayImage {
        image::GrayImage::from_raw(self.width, self.height, self.labels.clone())
            .unwrap_or_else(|| image::GrayImage::new(self.width, self.height))
    }
}

impl std::fmt::Debug for MotionMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionMask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("foreground_percent", &self.foreground_percent())
            .finish()
    }
}
