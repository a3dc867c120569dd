pub mod decoder;
pub mod pane;
pub mod scan;
pub mod signal;

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use crate::config::ChannelConfig;
pub use decoder::{FrameDecoder, GifFrameDecoder};
pub use pane::{LoadedArtifact, PaneState, PaneStatus};
pub use signal::FreshnessSignal;

/// Outcome of one freshness check on one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactCheck {
    /// The published directory is empty or unreadable.
    NothingPublished,
    /// The newest artifact is the one already playing.
    Unchanged,
    /// A new artifact was decoded and swapped in.
    Loaded { path: PathBuf, frame_count: usize },
    /// A new artifact was found but could not be decoded; the previous frames
    /// keep playing and the next check tries again.
    DecodeFailed { path: PathBuf },
}

/// Viewer state for every channel: one pane per channel, the decoder that
/// fills them, and the bookkeeping for the freshness-check cadence.
///
/// All mutation happens through [`ViewerState::poll_tick`] (or the checks it
/// runs), which the display loop calls once per tick.
pub struct ViewerState<D: FrameDecoder> {
    channels: Vec<ChannelConfig>,
    panes: Vec<PaneState<D::Frame>>,
    decoder: D,
    check_interval: Duration,
    last_checked: Option<Instant>,
    signal: Option<FreshnessSignal>,
}

impl<D: FrameDecoder> ViewerState<D> {
    pub fn new(
        channels: Vec<ChannelConfig>,
        decoder: D,
        check_interval: Duration,
        signal_file: Option<PathBuf>,
    ) -> Self {
        let panes = channels.iter().map(|_| PaneState::new()).collect();
        Self {
            channels,
            panes,
            decoder,
            check_interval,
            last_checked: None,
            signal: signal_file.map(FreshnessSignal::new),
        }
    }

    pub fn channels(&self) -> &[ChannelConfig] {
        &self.channels
    }

    pub fn panes(&self) -> &[PaneState<D::Frame>] {
        &self.panes
    }

    pub fn pane(&self, index: usize) -> Option<&PaneState<D::Frame>> {
        self.panes.get(index)
    }

    /// The decoder filling the panes, for inspecting decode activity.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    #[cfg(test)]
    pub(crate) fn last_checked(&self) -> Option<Instant> {
        self.last_checked
    }

    /// Looks for a newer artifact in the channel's published directory and,
    /// when one is found, replaces the pane's frames with its decoded frames.
    pub fn check_for_new_artifact(&mut self, index: usize) -> ArtifactCheck {
        let (Some(channel), Some(pane)) = (self.channels.get(index), self.panes.get_mut(index))
        else {
            warn!("No channel at index {}", index);
            return ArtifactCheck::NothingPublished;
        };
        check_channel(channel, pane, &mut self.decoder)
    }

    /// Runs the signal check and then a freshness check on every channel.
    pub fn check_all(&mut self) -> Vec<ArtifactCheck> {
        if let Some(signal) = self.signal.as_mut() {
            if signal.has_changed() {
                info!(
                    "Freshness signal {:?} changed, reloading all channels",
                    signal.path()
                );
                self.panes.iter_mut().for_each(PaneState::reset);
            }
        }

        self.channels
            .iter()
            .zip(self.panes.iter_mut())
            .map(|(channel, pane)| check_channel(channel, pane, &mut self.decoder))
            .collect()
    }

    /// One scheduled unit of work: a freshness check when the check interval
    /// has elapsed (always on the first tick), then one frame advance on every
    /// pane. Returns whether a freshness check ran.
    pub fn poll_tick(&mut self, now: Instant) -> bool {
        let check_due = self
            .last_checked
            .is_none_or(|last| now.saturating_duration_since(last) >= self.check_interval);
        if check_due {
            self.check_all();
            self.last_checked = Some(now);
        }

        for pane in self.panes.iter_mut() {
            pane.advance_and_render();
        }
        check_due
    }
}

fn check_channel<D: FrameDecoder>(
    channel: &ChannelConfig,
    pane: &mut PaneState<D::Frame>,
    decoder: &mut D,
) -> ArtifactCheck {
    refresh_forecast_label(channel, pane);

    let newest = match scan::newest_artifact(&channel.published_directory) {
        Ok(Some(newest)) => newest,
        Ok(None) => {
            debug!("{}: no animation published yet", channel.name);
            return ArtifactCheck::NothingPublished;
        }
        Err(e) => {
            warn!("{}: {}", channel.name, e);
            return ArtifactCheck::NothingPublished;
        }
    };

    if pane.loaded_artifact() == Some(&newest) {
        return ArtifactCheck::Unchanged;
    }

    info!(
        "{}: new animation detected: {:?}",
        channel.name, newest.path
    );
    match decoder.decode(&newest.path) {
        Ok(frames) => {
            let frame_count = frames.len();
            info!(
                "{}: loaded {} frames from {:?}",
                channel.name, frame_count, newest.path
            );
            let path = newest.path.clone();
            pane.replace_frames(frames, newest);
            ArtifactCheck::Loaded { path, frame_count }
        }
        Err(e) => {
            warn!(
                "{}: keeping previous animation, {}",
                channel.name, e
            );
            ArtifactCheck::DecodeFailed { path: newest.path }
        }
    }
}

fn refresh_forecast_label<F>(channel: &ChannelConfig, pane: &mut PaneState<F>) {
    match scan::latest_forecast_time(&channel.frame_directory) {
        Ok(Some(time)) => pane.note_forecast_time(time),
        Ok(None) => debug!("{}: frame directory holds no frames", channel.name),
        Err(e) => debug!("{}: no forecast timestamp, {}", channel.name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuroraError;
    use std::fs::File;
    use std::path::Path;
    use std::time::SystemTime;
    use tempfile::TempDir;

    /// Decodes a file into one frame per byte of content, failing on files
    /// that start with `!`.
    #[derive(Default)]
    struct ByteDecoder {
        calls: usize,
    }

    impl FrameDecoder for ByteDecoder {
        type Frame = u8;

        fn decode(&mut self, path: &Path) -> Result<Vec<u8>, AuroraError> {
            self.calls += 1;
            let bytes = std::fs::read(path).map_err(|e| AuroraError::ArtifactOpenError {
                path: path.display().to_string(),
                source: e,
            })?;
            if bytes.first() == Some(&b'!') || bytes.is_empty() {
                return Err(AuroraError::EmptyArtifact {
                    path: path.display().to_string(),
                });
            }
            Ok(bytes)
        }
    }

    fn publish(dir: &Path, name: &str, content: &[u8], secs: u64) {
        std::fs::write(dir.join(name), content).unwrap();
        File::options()
            .write(true)
            .open(dir.join(name))
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    fn viewer(root: &Path) -> ViewerState<ByteDecoder> {
        let channel = ChannelConfig::north(root);
        std::fs::create_dir_all(&channel.published_directory).unwrap();
        ViewerState::new(
            vec![channel],
            ByteDecoder::default(),
            Duration::from_secs(30),
            None,
        )
    }

    #[test]
    fn test_check_is_idempotent() {
        let root = TempDir::new().unwrap();
        let mut viewer = viewer(root.path());
        let dir = viewer.channels()[0].published_directory.clone();
        publish(&dir, "a.gif", b"abc", 1_000);

        assert!(matches!(
            viewer.check_for_new_artifact(0),
            ArtifactCheck::Loaded { frame_count: 3, .. }
        ));
        viewer.poll_tick(Instant::now());
        let index_before = viewer.pane(0).unwrap().current_index();

        assert_eq!(viewer.check_for_new_artifact(0), ArtifactCheck::Unchanged);
        assert_eq!(viewer.pane(0).unwrap().frames(), b"abc");
        assert_eq!(viewer.pane(0).unwrap().current_index(), index_before);
        assert_eq!(viewer.decoder().calls, 1);
    }

    #[test]
    fn test_rewrite_in_place_is_detected() {
        let root = TempDir::new().unwrap();
        let mut viewer = viewer(root.path());
        let dir = viewer.channels()[0].published_directory.clone();
        publish(&dir, "aurora_north.gif", b"ab", 1_000);
        viewer.check_for_new_artifact(0);

        publish(&dir, "aurora_north.gif", b"xyz", 2_000);
        assert!(matches!(
            viewer.check_for_new_artifact(0),
            ArtifactCheck::Loaded { frame_count: 3, .. }
        ));
        assert_eq!(viewer.pane(0).unwrap().frames(), b"xyz");
    }

    #[test]
    fn test_poll_tick_respects_check_interval() {
        let root = TempDir::new().unwrap();
        let mut viewer = viewer(root.path());
        let dir = viewer.channels()[0].published_directory.clone();
        let start = Instant::now();

        assert!(viewer.poll_tick(start));
        publish(&dir, "a.gif", b"ab", 1_000);
        assert!(!viewer.poll_tick(start + Duration::from_millis(115)));
        assert_eq!(viewer.pane(0).unwrap().status(), PaneStatus::Empty);

        assert!(viewer.poll_tick(start + Duration::from_secs(30)));
        assert_eq!(viewer.pane(0).unwrap().status(), PaneStatus::Playing);
        assert_eq!(viewer.pane(0).unwrap().displayed_frame(), Some(&b'a'));
        assert_eq!(viewer.last_checked(), Some(start + Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_published_directory_is_nothing_new() {
        let root = TempDir::new().unwrap();
        let mut viewer = ViewerState::new(
            vec![ChannelConfig::south(root.path())],
            ByteDecoder::default(),
            Duration::from_secs(5),
            None,
        );
        assert_eq!(viewer.check_for_new_artifact(0), ArtifactCheck::NothingPublished);
        assert_eq!(viewer.check_for_new_artifact(7), ArtifactCheck::NothingPublished);
        assert!(viewer.poll_tick(Instant::now()));
        assert!(viewer.pane(0).unwrap().displayed_frame().is_none());
    }

    #[test]
    fn test_forecast_label_follows_frame_directory() {
        let root = TempDir::new().unwrap();
        let mut viewer = viewer(root.path());
        let frames = viewer.channels()[0].frame_directory.clone();
        std::fs::create_dir_all(&frames).unwrap();
        std::fs::write(frames.join("2024-05-10_12-05-00.jpg"), b"").unwrap();

        viewer.check_for_new_artifact(0);
        assert_eq!(
            viewer.pane(0).unwrap().forecast_label(),
            Some("Latest forecast: 2024-05-10 12:05 UTC")
        );
    }

    #[test]
    fn test_forecast_label_survives_frame_directory_rebuild() {
        let root = TempDir::new().unwrap();
        let mut viewer = viewer(root.path());
        let frames = viewer.channels()[0].frame_directory.clone();
        std::fs::create_dir_all(&frames).unwrap();
        std::fs::write(frames.join("2024-05-10_12-05-00.jpg"), b"").unwrap();
        viewer.check_for_new_artifact(0);

        // a new cycle wipes the directory and fetches the oldest frames first
        std::fs::remove_file(frames.join("2024-05-10_12-05-00.jpg")).unwrap();
        viewer.check_for_new_artifact(0);
        std::fs::write(frames.join("2024-05-10_11-00-00.jpg"), b"").unwrap();
        viewer.check_for_new_artifact(0);
        assert_eq!(
            viewer.pane(0).unwrap().forecast_label(),
            Some("Latest forecast: 2024-05-10 12:05 UTC")
        );

        std::fs::write(frames.join("2024-05-10_12-35-00.jpg"), b"").unwrap();
        viewer.check_for_new_artifact(0);
        assert_eq!(
            viewer.pane(0).unwrap().forecast_label(),
            Some("Latest forecast: 2024-05-10 12:35 UTC")
        );
    }
}
