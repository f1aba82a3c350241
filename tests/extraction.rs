//! End-to-end extraction over synthetic videos.

use slide_capture::output::{keyframe_file_name, DirectorySink, MemorySink};
use slide_capture::source::{SyntheticVideo, VideoSource};
use slide_capture::{ExtractionConfig, KeyframeExtractor};

const WHITE: [u8; 3] = [255, 255, 255];
const NAVY: [u8; 3] = [20, 20, 80];

fn config() -> ExtractionConfig {
    ExtractionConfig {
        working_width: 32,
        ..Default::default()
    }
}

fn captured(sink: &MemorySink) -> Vec<(u32, u64)> {
    sink.keyframes()
        .iter()
        .map(|k| (k.sequence_number, k.frame_index))
        .collect()
}

#[test]
fn static_video_yields_one_keyframe_after_warmup() {
    let video = SyntheticVideo::still(10.0, 64, 36, WHITE);
    let mut sink = MemorySink::default();

    let report = KeyframeExtractor::new(config()).run(video, &mut sink).unwrap();

    assert_eq!(report.frames_sampled, 30);
    assert_eq!(captured(&sink), vec![(0, 4)]);
    assert_eq!(sink.keyframes()[0].timestamp, 1.0);
    assert_eq!(report.last_percent, Some(0.0));
    assert_eq!(report.total_frames, Some(300));
}

#[test]
fn slideshow_yields_one_keyframe_per_slide() {
    let video = SyntheticVideo::slideshow(64, 36, vec![(5.0, WHITE), (5.0, NAVY)]);
    let mut sink = MemorySink::default();

    let report = KeyframeExtractor::new(config()).run(video, &mut sink).unwrap();

    assert_eq!(report.keyframe_count(), 2);
    let keyframes = sink.keyframes();
    assert_eq!(keyframes[0].frame_index, 4);
    assert!(keyframes[1].frame_index > 16);
    assert_eq!(&keyframes[0].frame.pixels()[..3], &WHITE);
    assert_eq!(&keyframes[1].frame.pixels()[..3], &NAVY);
}

#[test]
fn read_failure_ends_the_video() {
    let mut video = SyntheticVideo::still(10.0, 64, 36, WHITE).failing_from(2.0);
    let mut sink = MemorySink::default();

    let report = KeyframeExtractor::new(config())
        .run(&mut video, &mut sink)
        .unwrap();

    assert_eq!(report.frames_sampled, 6);
    assert_eq!(report.keyframe_count(), 1);
    // The failing request is the last one made.
    assert_eq!(video.requests().last(), Some(&2.0));
    assert!(video.duration().unwrap() > 2.0);
}

#[test]
fn higher_rate_samples_more_densely() {
    let video = SyntheticVideo::still(2.0, 64, 36, WHITE);
    let mut sink = MemorySink::default();
    let config = ExtractionConfig {
        frame_rate: 10.0,
        ..config()
    };

    let report = KeyframeExtractor::new(config).run(video, &mut sink).unwrap();

    assert_eq!(report.frames_sampled, 20);
    // Warmup is one virtual second at 10 frames per second.
    assert_eq!(captured(&sink), vec![(0, 11)]);
}

#[test]
fn keyframes_are_written_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let video = SyntheticVideo::slideshow(64, 36, vec![(5.0, WHITE), (5.0, NAVY)]);
    let mut sink = DirectorySink::new(dir.path());

    let report = KeyframeExtractor::new(config()).run(video, &mut sink).unwrap();

    assert_eq!(report.keyframes.len(), 2);
    assert_eq!(report.keyframes[0], dir.path().join(keyframe_file_name(0, 1.0)));
    for path in &report.keyframes {
        let image = image::open(path).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (64, 36));
    }
    let first = report.keyframes[0].file_name().unwrap().to_string_lossy();
    assert_eq!(first, "000_0.02.png");
}
