//! Keyframe persistence.

use super::WriteError;
use crate::pipeline::Keyframe;
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// Receives captured keyframes in capture order.
pub trait KeyframeSink {
    /// Persists `keyframe` and returns where it was stored.
    fn write(&mut self, keyframe: &Keyframe) -> Result<PathBuf, WriteError>;
}

/// File name of a keyframe: `{sequence:03}_{minutes:.2}.png`.
///
/// The zero-padded sequence prefix makes lexical order equal capture order
/// for up to 1000 keyframes.
pub fn keyframe_file_name(sequence_number: u32, timestamp: f64) -> String {
    format!("{:03}_{:.2}.png", sequence_number, timestamp / 60.0)
}

/// Writes keyframes as PNG files into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory keyframes are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl KeyframeSink for DirectorySink {
    fn write(&mut self, keyframe: &Keyframe) -> Result<PathBuf, WriteError> {
        let path = self
            .dir
            .join(keyframe_file_name(keyframe.sequence_number, keyframe.timestamp));
        keyframe
            .frame
            .image()
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| WriteError::Image {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Keeps keyframes in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    keyframes: Vec<Keyframe>,
}

impl MemorySink {
    /// Keyframes written so far, in capture order.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Consumes the sink and returns its keyframes.
    pub fn into_keyframes(self) -> Vec<Keyframe> {
        self.keyframes
    }
}

impl KeyframeSink for MemorySink {
    fn write(&mut self, keyframe: &Keyframe) -> Result<PathBuf, WriteError> {
        self.keyframes.push(keyframe.clone());
        Ok(PathBuf::from(keyframe_file_name(
            keyframe.sequence_number,
            keyframe.timestamp,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Frame;
    use proptest::prelude::*;

    #[test]
    fn test_file_name_format() {
        assert_eq!(keyframe_file_name(0, 0.0), "000_0.00.png");
        assert_eq!(keyframe_file_name(7, 90.0), "007_1.50.png");
        assert_eq!(keyframe_file_name(123, 3600.0 + 20.0), "123_60.33.png");
    }

    #[test]
    fn test_minutes_always_two_decimals() {
        assert_eq!(keyframe_file_name(1, 30.0), "001_0.50.png");
        assert_eq!(keyframe_file_name(2, 120.0), "002_2.00.png");
        assert_eq!(keyframe_file_name(3, 3.0), "003_0.05.png");
    }

    #[test]
    fn test_directory_sink_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let keyframe = Keyframe {
            sequence_number: 2,
            frame_index: 10,
            timestamp: 3.0,
            frame: Frame::solid(6, 4, [1, 2, 3]),
        };

        let path = sink.write(&keyframe).unwrap();

        assert_eq!(path, dir.path().join("002_0.05.png"));
        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (6, 4));
        assert_eq!(decoded.get_pixel(5, 3).0, [1, 2, 3]);
    }

    #[test]
    fn test_directory_sink_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("gone"));
        let keyframe = Keyframe {
            sequence_number: 0,
            frame_index: 4,
            timestamp: 1.0,
            frame: Frame::solid(2, 2, [0, 0, 0]),
        };
        assert!(matches!(
            sink.write(&keyframe),
            Err(WriteError::Image { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_lexical_order_is_capture_order(
            mut times in prop::collection::vec(0.0f64..20_000.0, 1..200),
        ) {
            times.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let names: Vec<String> = times
                .iter()
                .enumerate()
                .map(|(seq, &t)| keyframe_file_name(seq as u32, t))
                .collect();

            let mut sorted = names.clone();
            sorted.sort();
            prop_assert_eq!(sorted, names);
        }
    }
}
