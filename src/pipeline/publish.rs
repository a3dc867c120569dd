use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use log::{debug, info};

use crate::AuroraError;

const STAGING_SUFFIX: &str = "partial";

/// Removes `dir` and everything in it, then recreates it empty.
pub fn clear_directory(dir: &Path) -> Result<(), AuroraError> {
    let dir_error = |e| AuroraError::DirectoryError {
        path: dir.display().to_string(),
        source: e,
    };
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(dir_error)?;
    }
    fs::create_dir_all(dir).map_err(dir_error)
}

/// Copies `artifact` into `published_dir` so that the viewer only ever sees
/// a complete file: the copy lands under a hidden staging name without the
/// animation extension and is then renamed into place.
pub fn publish_artifact(artifact: &Path, published_dir: &Path) -> Result<PathBuf, AuroraError> {
    let publish_error = |path: &Path, e| AuroraError::PublishError {
        path: path.display().to_string(),
        source: e,
    };

    let file_name = artifact.file_name().ok_or_else(|| {
        publish_error(
            artifact,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "artifact has no file name"),
        )
    })?;
    fs::create_dir_all(published_dir).map_err(|e| publish_error(published_dir, e))?;

    let final_path = published_dir.join(file_name);
    let staging_path = published_dir.join(format!(
        ".{}.{}",
        file_name.to_string_lossy(),
        STAGING_SUFFIX
    ));

    if let Err(e) = fs::copy(artifact, &staging_path) {
        let _ = fs::remove_file(&staging_path);
        return Err(publish_error(staging_path.as_path(), e));
    }
    debug!("Staged {:?} as {:?}", artifact, staging_path);

    if let Err(e) = fs::rename(&staging_path, &final_path) {
        let _ = fs::remove_file(&staging_path);
        return Err(publish_error(final_path.as_path(), e));
    }
    info!("Published {:?}", final_path);
    Ok(final_path)
}

/// Rewrites the freshness signal so its modification time moves forward.
pub fn touch_signal(path: &Path) -> Result<(), AuroraError> {
    let signal_error = |e| AuroraError::SignalWriteError {
        path: path.display().to_string(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(signal_error)?;
    }
    fs::write(path, Utc::now().to_rfc3339()).map_err(signal_error)
}
