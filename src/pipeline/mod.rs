pub mod publish;
pub mod render;
pub mod source;

use std::{fs, path::PathBuf};

use log::{debug, error, info, warn};

use crate::AuroraError;
use crate::config::{AppConfig, ChannelConfig};
pub use publish::{clear_directory, publish_artifact, touch_signal};
pub use render::{encode_animation, resize_frames};
pub use source::{FrameSource, HttpFrameSource, IndexEntry, frame_file_name};

const PROGRESS_LOG_EVERY: usize = 25;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub failed: usize,
}

/// What one pipeline run did for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReport {
    pub channel: String,
    pub download: DownloadReport,
    pub encoded_frames: usize,
    pub published: Option<PathBuf>,
}

/// Downloads every frame listed by the channel's index into its frame
/// directory. An unreachable index fails the whole download; a failing frame
/// is logged and skipped.
pub fn download_frames(
    source: &mut impl FrameSource,
    channel: &ChannelConfig,
    base_url: &str,
) -> Result<DownloadReport, AuroraError> {
    let entries = source.fetch_index(&channel.source_index_url)?;
    info!(
        "{}: index lists {} frames",
        channel.name,
        entries.len()
    );

    fs::create_dir_all(&channel.frame_directory).map_err(|e| AuroraError::DirectoryError {
        path: channel.frame_directory.display().to_string(),
        source: e,
    })?;

    let mut report = DownloadReport::default();
    for (i, entry) in entries.iter().enumerate() {
        match download_frame(source, channel, entry, base_url) {
            Ok(path) => {
                debug!("{}: saved {:?}", channel.name, path);
                report.downloaded += 1;
            }
            Err(e) => {
                warn!("{}: failed to download {}: {}", channel.name, entry.url, e);
                report.failed += 1;
            }
        }
        if (i + 1) % PROGRESS_LOG_EVERY == 0 {
            info!("{}: {}/{} frames", channel.name, i + 1, entries.len());
        }
    }
    info!(
        "{}: download complete, {} saved, {} failed",
        channel.name, report.downloaded, report.failed
    );
    Ok(report)
}

fn download_frame(
    source: &mut impl FrameSource,
    channel: &ChannelConfig,
    entry: &IndexEntry,
    base_url: &str,
) -> Result<PathBuf, AuroraError> {
    let file_name = frame_file_name(&entry.time_tag)?;
    let image = source.fetch_image(&source::resolve_image_url(base_url, &entry.url))?;
    let path = channel.frame_directory.join(file_name);
    fs::write(&path, image).map_err(|e| AuroraError::FrameWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(path)
}

/// One full cycle for one channel: wipe, download, resize, encode, publish.
pub fn run_channel(
    config: &AppConfig,
    source: &mut impl FrameSource,
    channel: &ChannelConfig,
) -> Result<ChannelReport, AuroraError> {
    info!("{}: starting cycle", channel.name);
    clear_directory(&channel.frame_directory)?;
    clear_directory(&channel.artifact_output_directory)?;

    let download = download_frames(source, channel, &config.service_base_url)?;
    resize_frames(&channel.frame_directory, config.frame_size)?;

    let artifact = channel
        .artifact_output_directory
        .join(&channel.artifact_file_name);
    let encoded_frames =
        encode_animation(&channel.frame_directory, &artifact, config.frame_delay())?;
    let published = publish_artifact(&artifact, &channel.published_directory)?;

    Ok(ChannelReport {
        channel: channel.name.clone(),
        download,
        encoded_frames,
        published: Some(published),
    })
}

/// Runs a cycle for the named channels (all channels when `only` is empty).
/// Channels are processed one after the other and a failing channel does not
/// stop the others. The freshness signal is touched once if anything was
/// published.
pub fn run_pipeline(
    config: &AppConfig,
    source: &mut impl FrameSource,
    only: &[String],
) -> Result<Vec<ChannelReport>, AuroraError> {
    let channels: Vec<&ChannelConfig> = if only.is_empty() {
        config.channels.iter().collect()
    } else {
        only.iter()
            .map(|name| config.channel(name))
            .collect::<Result<_, _>>()?
    };

    let mut reports = Vec::with_capacity(channels.len());
    for channel in channels {
        match run_channel(config, source, channel) {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!("{}: cycle failed: {}", channel.name, e);
                reports.push(ChannelReport {
                    channel: channel.name.clone(),
                    download: DownloadReport::default(),
                    encoded_frames: 0,
                    published: None,
                });
            }
        }
    }

    if let Some(signal) = &config.signal_file {
        if reports.iter().any(|r| r.published.is_some()) {
            match touch_signal(signal) {
                Ok(()) => info!("Freshness signal {:?} updated", signal),
                Err(e) => warn!("{}", e),
            }
        }
    }
    Ok(reports)
}
