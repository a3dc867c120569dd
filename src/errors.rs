// Error types for aurora-watch

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum AuroraError {
    // Config management errors
    #[snafu(display("Could not find application config directory"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file {path}: {source}"))]
    ConfigIOError { path: String, source: io::Error },
    #[snafu(display("Error parsing or serializing config file {path}: {source}"))]
    ConfigSerializeError {
        path: String,
        source: serde_json::Error,
    },
    #[snafu(display("Unknown channel: {name}"))]
    UnknownChannel { name: String },

    // Errors while fetching frames
    #[snafu(display("Could not start the async runtime: {source}"))]
    RuntimeError { source: io::Error },
    #[snafu(display("Could not build the HTTP client: {source}"))]
    HttpClientError { source: reqwest::Error },
    #[snafu(display("Error fetching frame index from {url}: {source}"))]
    IndexFetchError { url: String, source: reqwest::Error },
    #[snafu(display("Error fetching frame image from {url}: {source}"))]
    ImageFetchError { url: String, source: reqwest::Error },
    #[snafu(display("Invalid frame time tag: {time_tag}: {source}"))]
    InvalidTimeTag {
        time_tag: String,
        source: chrono::ParseError,
    },
    #[snafu(display("Error writing frame file {path}: {source}"))]
    FrameWriteError { path: String, source: io::Error },

    // Errors while rendering and publishing animations
    #[snafu(display("Directory operation failed on {path}: {source}"))]
    DirectoryError { path: String, source: io::Error },
    #[snafu(display("Image processing failed for {path}: {source}"))]
    ImageProcessingError {
        path: String,
        source: image::ImageError,
    },
    #[snafu(display("No frames found in {path}"))]
    NoFrames { path: String },
    #[snafu(display("Error encoding animation {path}: {source}"))]
    EncodeError {
        path: String,
        source: image::ImageError,
    },
    #[snafu(display("Error publishing animation {path}: {source}"))]
    PublishError { path: String, source: io::Error },
    #[snafu(display("Error updating freshness signal {path}: {source}"))]
    SignalWriteError { path: String, source: io::Error },

    // Viewer errors
    #[snafu(display("Could not open animation {path}: {source}"))]
    ArtifactOpenError { path: String, source: io::Error },
    #[snafu(display("Could not decode animation {path}: {source}"))]
    ArtifactDecodeError {
        path: String,
        source: image::ImageError,
    },
    #[snafu(display("Animation {path} has no frames"))]
    EmptyArtifact { path: String },
    #[snafu(display("Viewer error: {description}"))]
    UiError { description: String },
}
