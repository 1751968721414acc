//! Error types for the `trajvid` crate.
//!
//! This module defines [`TrajvidError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry enough context to
//! diagnose a problem at the batch level, including file paths and upstream
//! error messages.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `trajvid` operations.
///
/// Every public method that can fail returns `Result<T, TrajvidError>`.
/// The batch driver decides the recovery boundary per variant: output
/// directory failures are fatal, dataset failures skip one file, encoding
/// failures skip one trajectory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrajvidError {
    /// The output directory could not be created. Fatal for the whole run.
    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        /// The directory that was being created.
        path: PathBuf,
        /// The underlying I/O error.
        source: IoError,
    },

    /// A dataset file could not be opened.
    #[error("Failed to open dataset file at {path}: {reason}")]
    DatasetOpen {
        /// Path that was passed to [`crate::DatasetFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A dataset file was opened but its contents do not match the expected
    /// trajectory layout.
    #[error("Malformed dataset: {0}")]
    DatasetFormat(String),

    /// A frame stack does not have the expected (frames, height, width,
    /// channels) shape.
    #[error("Frame stack has shape {shape:?}, expected 4 dimensions (T, H, W, C)")]
    FrameShape {
        /// The shape that was actually read.
        shape: Vec<usize>,
    },

    /// A frame has a channel count the encoder cannot represent.
    #[error("Unsupported channel count {0} (expected 1 or 3)")]
    UnsupportedChannels(usize),

    /// The video encoder could not be created or opened.
    #[error("Video encoding error: {0}")]
    VideoEncode(String),

    /// Writing encoded video data failed.
    #[error("Video write error: {0}")]
    VideoWrite(String),

    /// An error originating from the HDF5 library.
    #[error("HDF5 error: {0}")]
    Hdf5(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while scanning directories or touching files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl From<hdf5::Error> for TrajvidError {
    fn from(error: hdf5::Error) -> Self {
        TrajvidError::Hdf5(error.to_string())
    }
}

impl From<FfmpegError> for TrajvidError {
    fn from(error: FfmpegError) -> Self {
        TrajvidError::Ffmpeg(error.to_string())
    }
}
