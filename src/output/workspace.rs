//! Input enumeration and per-video output locations.

use super::WriteError;
use std::fs;
use std::path::{Path, PathBuf};

/// Lists the regular files in `dir`, sorted by file name.
pub fn list_videos(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// File name of `video` up to its first `.`.
pub fn video_stem(video: &Path) -> String {
    let name = video
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

/// Recreates `<output_root>/<stem>` empty and returns it.
pub fn prepare_output_dir(output_root: &Path, video: &Path) -> Result<PathBuf, WriteError> {
    let dir = output_root.join(video_stem(video));
    if dir.exists() {
        fs::remove_dir_all(&dir).map_err(|e| WriteError::io(&dir, e))?;
    }
    fs::create_dir_all(&dir).map_err(|e| WriteError::io(&dir, e))?;
    tracing::info!(path = %dir.display(), "Initialised output folder");
    Ok(dir)
}

/// Path of the document assembled for `video`.
pub fn document_path(output_root: &Path, video: &Path) -> PathBuf {
    output_root.join(format!("{}.pdf", video_stem(video)))
}

/// PNG files in `dir`, sorted by file name.
pub fn collect_keyframe_images(dir: &Path) -> Result<Vec<PathBuf>, WriteError> {
    let mut images: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| WriteError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "png"))
        .collect();
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_stem() {
        assert_eq!(video_stem(Path::new("/in/lecture.01.mp4")), "lecture");
        assert_eq!(video_stem(Path::new("talk.mkv")), "talk");
        assert_eq!(video_stem(Path::new("noext")), "noext");
        assert_eq!(video_stem(Path::new(".hidden")), ".hidden");
    }

    #[test]
    fn test_list_videos_sorted_files_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp4", "a.mp4", "c.mkv"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let names: Vec<_> = list_videos(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.mp4", "b.mp4", "c.mkv"]);
    }

    #[test]
    fn test_prepare_output_dir_clears_previous_run() {
        let root = tempfile::tempdir().unwrap();
        let video = Path::new("/videos/talk.mp4");

        let dir = prepare_output_dir(root.path(), video).unwrap();
        fs::write(dir.join("000_0.00.png"), b"old").unwrap();

        let again = prepare_output_dir(root.path(), video).unwrap();
        assert_eq!(again, root.path().join("talk"));
        assert_eq!(fs::read_dir(&again).unwrap().count(), 0);
        assert_eq!(document_path(root.path(), video), root.path().join("talk.pdf"));
    }

    #[test]
    fn test_collect_keyframe_images() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["010_2.00.png", "002_0.50.png", "notes.txt", "001_0.10.png"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let names: Vec<_> = collect_keyframe_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["001_0.10.png", "002_0.50.png", "010_2.00.png"]);
    }

    #[test]
    fn test_list_missing_dir() {
        assert!(list_videos(Path::new("/no/such/input")).is_err());
    }
}
