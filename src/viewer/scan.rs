use std::{fs, path::Path};

use chrono::NaiveDateTime;
use log::debug;

use super::pane::LoadedArtifact;
use crate::AuroraError;

pub const ARTIFACT_EXTENSION: &str = "gif";
pub const FRAME_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];
/// Frame files are named after the forecast time they show.
pub const FRAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Finds the most recently modified animation in `dir`.
///
/// Returns `Ok(None)` for a directory without animations. Entries whose
/// metadata cannot be read are skipped; a file can vanish between listing and
/// stat while the pipeline is publishing.
pub fn newest_artifact(dir: &Path) -> Result<Option<LoadedArtifact>, AuroraError> {
    let entries = fs::read_dir(dir).map_err(|e| AuroraError::DirectoryError {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut newest: Option<LoadedArtifact> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if !has_extension(&path, &[ARTIFACT_EXTENSION]) {
            continue;
        }
        let modified = match entry.metadata().and_then(|m| {
            if m.is_file() {
                m.modified()
            } else {
                Err(std::io::Error::other("not a regular file"))
            }
        }) {
            Ok(modified) => modified,
            Err(e) => {
                debug!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        let is_newer = match &newest {
            None => true,
            // equal timestamps fall back to the path so the choice is stable
            Some(current) => (modified, &path) > (current.modified, &current.path),
        };
        if is_newer {
            newest = Some(LoadedArtifact { path, modified });
        }
    }
    Ok(newest)
}

/// Parses the forecast time out of a frame file name such as
/// `2024-05-10_12-05-00.jpg`.
pub fn parse_frame_timestamp(path: &Path) -> Option<NaiveDateTime> {
    if !has_extension(path, &FRAME_EXTENSIONS) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    NaiveDateTime::parse_from_str(stem, FRAME_TIMESTAMP_FORMAT).ok()
}

/// The newest forecast time among the frame files in `dir`.
pub fn latest_forecast_time(dir: &Path) -> Result<Option<NaiveDateTime>, AuroraError> {
    let entries = fs::read_dir(dir).map_err(|e| AuroraError::DirectoryError {
        path: dir.display().to_string(),
        source: e,
    })?;

    Ok(entries
        .flatten()
        .filter_map(|entry| parse_frame_timestamp(&entry.path()))
        .max())
}

pub fn forecast_label(time: NaiveDateTime) -> String {
    format!("Latest forecast: {} UTC", time.format("%Y-%m-%d %H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn touch(path: &Path, modified: SystemTime) {
        let file = File::create(path).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_newest_artifact_picks_latest_mtime() {
        let dir = TempDir::new().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        touch(&dir.path().join("b.gif"), base);
        touch(&dir.path().join("a.gif"), base + Duration::from_secs(60));
        touch(&dir.path().join("c.GIF"), base - Duration::from_secs(60));

        let newest = newest_artifact(dir.path()).unwrap().unwrap();
        assert_eq!(newest.path, dir.path().join("a.gif"));
        assert_eq!(newest.modified, base + Duration::from_secs(60));
    }

    #[test]
    fn test_newest_artifact_ignores_other_files() {
        let dir = TempDir::new().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        touch(&dir.path().join("old.gif"), base);
        touch(&dir.path().join(".new.gif.partial"), base + Duration::from_secs(10));
        touch(&dir.path().join("notes.txt"), base + Duration::from_secs(20));
        fs::create_dir(dir.path().join("folder.gif")).unwrap();

        let newest = newest_artifact(dir.path()).unwrap().unwrap();
        assert_eq!(newest.path, dir.path().join("old.gif"));
    }

    #[test]
    fn test_newest_artifact_empty_and_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(newest_artifact(dir.path()).unwrap().is_none());
        assert!(matches!(
            newest_artifact(&dir.path().join("missing")),
            Err(AuroraError::DirectoryError { .. })
        ));
    }

    #[test]
    fn test_parse_frame_timestamp() {
        let parsed = parse_frame_timestamp(Path::new("/x/2024-05-10_12-05-00.jpg")).unwrap();
        assert_eq!(parsed.to_string(), "2024-05-10 12:05:00");
        assert!(parse_frame_timestamp(Path::new("2024-05-10_12-05-00.txt")).is_none());
        assert!(parse_frame_timestamp(Path::new("aurora_north.gif")).is_none());
    }

    #[test]
    fn test_latest_forecast_label() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        touch(&dir.path().join("2024-05-10_11-55-00.jpg"), now);
        touch(&dir.path().join("2024-05-10_12-05-00.jpg"), now);
        touch(&dir.path().join("2024-05-10_12-00-00.png"), now);
        touch(&dir.path().join("zzz.jpg"), now);

        let latest = latest_forecast_time(dir.path()).unwrap().unwrap();
        assert_eq!(forecast_label(latest), "Latest forecast: 2024-05-10 12:05 UTC");
    }
}
