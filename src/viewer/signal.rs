use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use log::{debug, warn};

/// Watches a marker file whose modification time announces that a new cycle
/// has been published. Only the timestamp matters, never the content.
#[derive(Debug)]
pub struct FreshnessSignal {
    path: PathBuf,
    last_seen: Option<SystemTime>,
    primed: bool,
}

impl FreshnessSignal {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_seen: None,
            primed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true when the marker's mtime differs from the one seen on the
    /// previous call. The first call only records a baseline. A missing
    /// marker never counts as a change and leaves the baseline untouched.
    pub fn has_changed(&mut self) -> bool {
        let modified = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                if self.primed {
                    warn!("Freshness signal {:?} unavailable: {}", self.path, e);
                } else {
                    debug!("Freshness signal {:?} not present yet: {}", self.path, e);
                }
                self.primed = true;
                return false;
            }
        };

        let changed = self.primed && self.last_seen != Some(modified);
        self.last_seen = Some(modified);
        self.primed = true;
        changed
    }
}
