use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use image::{
    Delay, DynamicImage, Frame, ImageFormat, ImageReader, RgbaImage,
    codecs::gif::{GifEncoder, Repeat},
    imageops::FilterType,
};
use itertools::Itertools;
use log::{debug, info, warn};

use super::source::FRAME_FILE_EXTENSION;
use crate::AuroraError;

/// NeuQuant sampling speed, 1 (best) to 30 (fastest).
const GIF_ENCODE_SPEED: i32 = 10;

/// Frame files in `dir`, sorted by name and therefore by forecast time.
pub fn list_frame_files(dir: &Path) -> Result<Vec<PathBuf>, AuroraError> {
    let entries = fs::read_dir(dir).map_err(|e| AuroraError::DirectoryError {
        path: dir.display().to_string(),
        source: e,
    })?;

    Ok(entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(FRAME_FILE_EXTENSION))
        })
        .sorted()
        .collect())
}

fn open_frame(path: &Path) -> Result<DynamicImage, AuroraError> {
    // the service does not always serve what the extension promises
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(image::ImageError::IoError)
        .and_then(|reader| reader.decode())
        .map_err(|e| AuroraError::ImageProcessingError {
            path: path.display().to_string(),
            source: e,
        })
}

fn resize_frame(path: &Path, [width, height]: [u32; 2]) -> Result<(), AuroraError> {
    let resized = open_frame(path)?.resize_exact(width, height, FilterType::CatmullRom);
    DynamicImage::ImageRgb8(resized.to_rgb8())
        .save_with_format(path, ImageFormat::Jpeg)
        .map_err(|e| AuroraError::ImageProcessingError {
            path: path.display().to_string(),
            source: e,
        })
}

/// Resizes every frame in `dir` in place. Frames that cannot be resized are
/// logged and left as they are. Returns the number of resized frames.
pub fn resize_frames(dir: &Path, size: [u32; 2]) -> Result<usize, AuroraError> {
    let frames = list_frame_files(dir)?;
    if frames.is_empty() {
        info!("No frames to resize in {:?}", dir);
        return Ok(0);
    }

    let mut resized = 0;
    for path in &frames {
        match resize_frame(path, size) {
            Ok(()) => resized += 1,
            Err(e) => warn!("Failed to resize {:?}: {}", path, e),
        }
    }
    info!(
        "Resized {}/{} frames in {:?} to {}x{}",
        resized,
        frames.len(),
        dir,
        size[0],
        size[1]
    );
    Ok(resized)
}

/// Encodes the frames of `frames_dir` into one infinitely looping GIF at
/// `output`. Unreadable frames, and frames whose size differs from the first
/// one, are skipped. Returns the number of encoded frames.
pub fn encode_animation(
    frames_dir: &Path,
    output: &Path,
    frame_delay: Duration,
) -> Result<usize, AuroraError> {
    let mut images: Vec<RgbaImage> = Vec::new();
    for path in list_frame_files(frames_dir)? {
        match open_frame(&path) {
            Ok(image) => {
                let image = image.to_rgba8();
                if let Some(first) = images.first() {
                    if first.dimensions() != image.dimensions() {
                        warn!(
                            "Skipping {:?}: size {:?} differs from {:?}",
                            path,
                            image.dimensions(),
                            first.dimensions()
                        );
                        continue;
                    }
                }
                images.push(image);
            }
            Err(e) => warn!("Failed to load {:?}: {}", path, e),
        }
    }

    if images.is_empty() {
        return Err(AuroraError::NoFrames {
            path: frames_dir.display().to_string(),
        });
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| AuroraError::DirectoryError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let frame_count = images.len();
    info!("Encoding {} frames into {:?}", frame_count, output);
    let encode_error = |e| AuroraError::EncodeError {
        path: output.display().to_string(),
        source: e,
    };
    let delay = Delay::from_saturating_duration(frame_delay);
    let mut bytes = Vec::new();
    {
        // the trailer is only written when the encoder drops
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, GIF_ENCODE_SPEED);
        encoder.set_repeat(Repeat::Infinite).map_err(encode_error)?;
        encoder
            .encode_frames(
                images
                    .into_iter()
                    .map(|image| Frame::from_parts(image, 0, 0, delay)),
            )
            .map_err(encode_error)?;
    }

    fs::write(output, &bytes).map_err(|e| AuroraError::PublishError {
        path: output.display().to_string(),
        source: e,
    })?;

    debug!("Animation {:?} written", output);
    Ok(frame_count)
}
