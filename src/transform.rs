//! Per-frame pixel transformation applied before encoding.
//!
//! Frames are stored as RGB with the origin the camera's way up; the
//! exported video carries them channel-reversed (RGB → BGR) and rotated
//! 180 degrees. [`transform_frame`] performs that reordering as a pure
//! `ndarray` operation and [`frame_to_image`] turns the result into the
//! [`image::DynamicImage`] currency the encoder consumes.

use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::{Array3, ArrayView3, Axis, s};

use crate::error::TrajvidError;

/// Transform one frame for encoding.
///
/// If the channel dimension is 3 the channel axis is reversed (RGB → BGR);
/// frames with any other channel count keep their channel order. Both
/// spatial axes are always reversed, which is a 180-degree rotation.
///
/// The input is `(height, width, channels)`; the output has the same shape
/// and is freshly allocated in standard layout.
pub fn transform_frame(frame: ArrayView3<'_, u8>) -> Array3<u8> {
    let flipped = if frame.len_of(Axis(2)) == 3 {
        frame.slice(s![..;-1, ..;-1, ..;-1])
    } else {
        frame.slice(s![..;-1, ..;-1, ..])
    };
    flipped.to_owned()
}

/// Convert a `(height, width, channels)` frame into a [`DynamicImage`].
///
/// Three channels map to [`DynamicImage::ImageRgb8`] (the byte order is
/// taken as-is; a transformed frame therefore carries BGR bytes in the RGB
/// slots, matching the stored-video convention). One channel maps to
/// [`DynamicImage::ImageLuma8`].
///
/// # Errors
///
/// [`TrajvidError::UnsupportedChannels`] for any other channel count.
pub fn frame_to_image(frame: &Array3<u8>) -> Result<DynamicImage, TrajvidError> {
    let (height, width, channels) = frame.dim();
    let raw = frame.as_standard_layout().into_owned().into_raw_vec();

    match channels {
        3 => RgbImage::from_raw(width as u32, height as u32, raw)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| {
                TrajvidError::DatasetFormat("frame buffer does not match its shape".to_string())
            }),
        1 => GrayImage::from_raw(width as u32, height as u32, raw)
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(|| {
                TrajvidError::DatasetFormat("frame buffer does not match its shape".to_string())
            }),
        other => Err(TrajvidError::UnsupportedChannels(other)),
    }
}
