// Library interface for aurora-watch
// This allows integration tests to access internal modules

pub mod config;
pub mod errors;
pub mod pipeline;
pub mod ui;
pub mod viewer;

// Re-export commonly used types
pub use config::{AppConfig, ChannelConfig};
pub use errors::AuroraError;
pub use viewer::{ArtifactCheck, FrameDecoder, GifFrameDecoder, PaneState, PaneStatus, ViewerState};
