use std::{fs::File, io::BufReader, path::Path};

use image::{AnimationDecoder, RgbaImage, codecs::gif::GifDecoder};

use crate::AuroraError;

/// Turns an animation file into the frames a pane plays back.
pub trait FrameDecoder {
    type Frame;

    /// Decodes every embedded frame, in order. Reaching the end of the
    /// animation is success; an unreadable or frameless file is an error.
    fn decode(&mut self, path: &Path) -> Result<Vec<Self::Frame>, AuroraError>;
}

/// Decodes GIF animations into fully composited RGBA frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct GifFrameDecoder;

impl FrameDecoder for GifFrameDecoder {
    type Frame = RgbaImage;

    fn decode(&mut self, path: &Path) -> Result<Vec<RgbaImage>, AuroraError> {
        decode_gif_frames(path)
    }
}

pub fn decode_gif_frames(path: &Path) -> Result<Vec<RgbaImage>, AuroraError> {
    let file = File::open(path).map_err(|e| AuroraError::ArtifactOpenError {
        path: path.display().to_string(),
        source: e,
    })?;
    let decode_error = |e| AuroraError::ArtifactDecodeError {
        path: path.display().to_string(),
        source: e,
    };

    let frames = GifDecoder::new(BufReader::new(file))
        .map_err(decode_error)?
        .into_frames()
        .collect_frames()
        .map_err(decode_error)?;

    if frames.is_empty() {
        return Err(AuroraError::EmptyArtifact {
            path: path.display().to_string(),
        });
    }
    Ok(frames.into_iter().map(|f| f.into_buffer()).collect())
}
