//! # trajvid
//!
//! Export trajectory image streams from HDF5 datasets as playable MP4
//! videos, one video per trajectory.
//!
//! A dataset file holds named trajectories under a top-level `data` group;
//! each trajectory that carries an observation bundle stores an agent-view
//! camera stream as a `(frames, height, width, channels)` byte array at
//! `obs/agentview_rgb`. `trajvid` reads those stacks, channel-reverses and
//! 180°-rotates every frame, and encodes them at a fixed 10 fps via FFmpeg.
//!
//! ## Quick Start
//!
//! ### Convert a directory of datasets
//!
//! ```no_run
//! use trajvid::BatchExporter;
//!
//! let summary = BatchExporter::new("datasets", "videos").run().unwrap();
//! println!("{} video(s) written", summary.videos_written);
//! ```
//!
//! ### Work with one dataset file
//!
//! ```no_run
//! use trajvid::{DatasetFile, TrajvidError, VideoEncoder, VideoEncoderOptions};
//! use trajvid::{frame_to_image, transform_frame};
//!
//! let dataset = DatasetFile::open("demo.hdf5")?;
//! for trajectory in dataset.trajectories()? {
//!     let trajectory = trajectory?;
//!     let frames = trajectory
//!         .frames
//!         .outer_iter()
//!         .map(|frame| frame_to_image(&transform_frame(frame)))
//!         .collect::<Result<Vec<_>, _>>()?;
//!     let output = format!("{}.mp4", trajectory.id);
//!     VideoEncoder::new(VideoEncoderOptions::default()).write(&output, &frames)?;
//! }
//! # Ok::<(), TrajvidError>(())
//! ```
//!
//! ## Requirements
//!
//! The HDF5 and FFmpeg development libraries must be installed on your
//! system; the crate links against them via the
//! [`hdf5`](https://crates.io/crates/hdf5) and
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crates.

pub mod batch;
pub mod dataset;
pub mod encode;
pub mod error;
pub mod ffmpeg;
pub mod progress;
pub mod transform;

pub use batch::{BatchExporter, BatchSummary, ExportOptions};
pub use dataset::{DatasetFile, Trajectory, TrajectoryIter};
pub use encode::{VideoCodec, VideoEncoder, VideoEncoderOptions};
pub use error::TrajvidError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use transform::{frame_to_image, transform_frame};
