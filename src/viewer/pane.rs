use std::{path::PathBuf, time::SystemTime};

use chrono::NaiveDateTime;

use super::scan;

/// An animation file as seen on disk: where it is and when it was last written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedArtifact {
    pub path: PathBuf,
    pub modified: SystemTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaneStatus {
    Empty,
    Playing,
}

/// Per-channel viewer state: the decoded frames of the loaded animation and
/// the position of the playback cursor.
///
/// Frames are only ever replaced as a whole, so a pane never mixes frames
/// from two different animations.
#[derive(Debug)]
pub struct PaneState<F> {
    frames: Vec<F>,
    current_index: usize,
    displayed_index: Option<usize>,
    loaded: Option<LoadedArtifact>,
    forecast_time: Option<NaiveDateTime>,
    forecast_label: Option<String>,
}

impl<F> Default for PaneState<F> {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            current_index: 0,
            displayed_index: None,
            loaded: None,
            forecast_time: None,
            forecast_label: None,
        }
    }
}

impl<F> PaneState<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> PaneStatus {
        if self.frames.is_empty() {
            PaneStatus::Empty
        } else {
            PaneStatus::Playing
        }
    }

    pub fn frames(&self) -> &[F] {
        &self.frames
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn loaded_artifact(&self) -> Option<&LoadedArtifact> {
        self.loaded.as_ref()
    }

    pub fn forecast_label(&self) -> Option<&str> {
        self.forecast_label.as_deref()
    }

    /// Records the newest forecast time seen in the frame directory. The
    /// label never moves backwards, so a pipeline run that is still
    /// re-downloading older frames does not regress it.
    pub(crate) fn note_forecast_time(&mut self, time: NaiveDateTime) {
        if self.forecast_time.is_some_and(|shown| shown >= time) {
            return;
        }
        self.forecast_time = Some(time);
        self.forecast_label = Some(scan::forecast_label(time));
    }

    /// Swaps in a freshly decoded animation and restarts playback from its
    /// first frame.
    pub(crate) fn replace_frames(&mut self, frames: Vec<F>, artifact: LoadedArtifact) {
        self.frames = frames;
        self.current_index = 0;
        self.displayed_index = None;
        self.loaded = Some(artifact);
    }

    /// Drops the loaded animation, forcing the next freshness check to reload
    /// whatever is newest on disk.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.current_index = 0;
        self.displayed_index = None;
        self.loaded = None;
    }

    /// Shows the frame at the playback cursor and moves the cursor one frame
    /// forward, wrapping at the end of the animation. An empty pane shows
    /// nothing.
    pub fn advance_and_render(&mut self) -> Option<&F> {
        if self.frames.is_empty() {
            self.displayed_index = None;
            return None;
        }
        let shown = self.current_index % self.frames.len();
        self.displayed_index = Some(shown);
        self.current_index = (shown + 1) % self.frames.len();
        self.frames.get(shown)
    }

    /// The frame shown by the last `advance_and_render`, used to repaint
    /// between ticks without moving the cursor.
    pub fn displayed_frame(&self) -> Option<&F> {
        self.displayed_index.and_then(|i| self.frames.get(i))
    }

    /// Index of the frame shown by the last `advance_and_render`, for
    /// inspecting playback from outside the display loop.
    pub fn displayed_index(&self) -> Option<usize> {
        self.displayed_index
    }
}
