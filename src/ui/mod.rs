use std::path::Path;

use egui::{ColorImage, TextureHandle, TextureOptions};

use crate::AuroraError;
use crate::viewer::{FrameDecoder, decoder::decode_gif_frames};

pub mod live;

/// Decodes animations straight into GPU textures owned by the egui context,
/// so painting a frame is just a texture lookup.
pub struct TextureFrameDecoder {
    ctx: egui::Context,
}

impl TextureFrameDecoder {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl FrameDecoder for TextureFrameDecoder {
    type Frame = TextureHandle;

    fn decode(&mut self, path: &Path) -> Result<Vec<TextureHandle>, AuroraError> {
        let frames = decode_gif_frames(path)?;
        Ok(frames
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let size = [frame.width() as usize, frame.height() as usize];
                self.ctx.load_texture(
                    format!("{}#{}", path.display(), i),
                    ColorImage::from_rgba_unmultiplied(size, frame.as_raw()),
                    TextureOptions::LINEAR,
                )
            })
            .collect())
    }
}
