//! Batch driver — convert every dataset file in a directory.
//!
//! [`BatchExporter`] enumerates the `.hdf5` files directly inside an input
//! directory and, strictly sequentially, exports every trajectory of every
//! file to `{file-stem}_{trajectory-id}.mp4` in the output directory. A
//! file that fails to open or read is skipped and the batch continues; an
//! encoding failure abandons only that trajectory. Only failure to create
//! the output directory aborts the run.
//!
//! # Example
//!
//! ```no_run
//! use trajvid::{BatchExporter, TrajvidError};
//!
//! let summary = BatchExporter::new("datasets", "videos").run()?;
//! println!(
//!     "{} videos from {} files ({} failed)",
//!     summary.videos_written, summary.files_processed, summary.files_failed,
//! );
//! # Ok::<(), TrajvidError>(())
//! ```

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::dataset::{DatasetFile, Trajectory};
use crate::encode::{VideoCodec, VideoEncoder, VideoEncoderOptions};
use crate::error::TrajvidError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};
use crate::transform::{frame_to_image, transform_frame};

/// File extension (lowercased, without dot) that marks a dataset file.
const DATASET_EXTENSION: &str = "hdf5";

/// Options for a batch export.
#[derive(Clone)]
pub struct ExportOptions {
    /// Output frame rate. All videos share it; 10 fps by default.
    pub fps: u32,
    /// Output codec; MPEG-4 Part 2 by default.
    pub codec: VideoCodec,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl std::fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportOptions")
            .field("fps", &self.fps)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportOptions {
    /// Create options with the default export contract: 10 fps, MPEG-4,
    /// no progress callback.
    pub fn new() -> Self {
        Self {
            fps: 10,
            codec: VideoCodec::Mpeg4,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the output frame rate.
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the output codec.
    pub fn codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }
}

/// Counters and failure records from one batch run.
///
/// A non-empty [`failures`](BatchSummary::failures) list does not make the
/// run itself an error; the batch contract is to keep going.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Dataset files fully processed (all readable trajectories attempted).
    pub files_processed: usize,
    /// Dataset files skipped because they could not be opened or read.
    pub files_failed: usize,
    /// Videos successfully written.
    pub videos_written: usize,
    /// Trajectories abandoned because encoding failed.
    pub trajectories_failed: usize,
    /// What failed and why — dataset paths for file-level failures, output
    /// paths for trajectory-level ones.
    pub failures: Vec<(PathBuf, TrajvidError)>,
}

/// Converts every dataset file in a directory into videos.
///
/// Created via [`BatchExporter::new`]; configure with
/// [`with_options`](BatchExporter::with_options), then call
/// [`run`](BatchExporter::run). No state persists across files: at most one
/// dataset handle and one video encoder are live at any instant.
#[derive(Debug)]
pub struct BatchExporter {
    input_dir: PathBuf,
    output_dir: PathBuf,
    options: ExportOptions,
}

impl BatchExporter {
    /// Create an exporter reading datasets from `input_dir` and writing
    /// videos flat into `output_dir`.
    pub fn new<I: Into<PathBuf>, O: Into<PathBuf>>(input_dir: I, output_dir: O) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            options: ExportOptions::new(),
        }
    }

    /// Replace the export options.
    #[must_use]
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the batch.
    ///
    /// Creates the output directory, then processes each dataset file in
    /// name order. Per-file failures are logged, recorded in the summary,
    /// and do not stop the batch.
    ///
    /// # Errors
    ///
    /// - [`TrajvidError::OutputDirectory`] if the output directory cannot
    ///   be created.
    /// - [`TrajvidError::Io`] if the input directory cannot be read.
    pub fn run(&self) -> Result<BatchSummary, TrajvidError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| TrajvidError::OutputDirectory {
            path: self.output_dir.clone(),
            source,
        })?;

        let files = discover_dataset_files(&self.input_dir)?;
        log::info!(
            "found {} dataset file(s) in {}",
            files.len(),
            self.input_dir.display(),
        );

        let mut summary = BatchSummary::default();
        let mut file_tracker = ProgressTracker::new(
            Arc::clone(&self.options.progress),
            OperationType::FileExport,
            Some(files.len() as u64),
        );

        for path in &files {
            log::info!("processing {}", path.display());
            file_tracker.advance(Some(path.as_path()), None);

            match self.export_file(path, &mut summary) {
                Ok(()) => summary.files_processed += 1,
                Err(error) => {
                    log::warn!("skipping {}: {error}", path.display());
                    summary.files_failed += 1;
                    summary.failures.push((path.clone(), error));
                }
            }
        }

        Ok(summary)
    }

    /// Export every trajectory of one dataset file.
    ///
    /// An encoding failure abandons just that trajectory; a read failure
    /// propagates and fails the whole file.
    fn export_file(&self, path: &Path, summary: &mut BatchSummary) -> Result<(), TrajvidError> {
        let dataset = DatasetFile::open(path)?;
        let total = dataset.trajectory_count()? as u64;
        let mut tracker = ProgressTracker::new(
            Arc::clone(&self.options.progress),
            OperationType::TrajectoryExport,
            Some(total),
        );

        for trajectory in dataset.trajectories()? {
            let trajectory = trajectory?;
            let output_path = output_video_path(&self.output_dir, path, &trajectory.id);

            match self.encode_trajectory(&trajectory, &output_path) {
                Ok(()) => summary.videos_written += 1,
                Err(error) => {
                    log::warn!(
                        "abandoning trajectory `{}` of {}: {error}",
                        trajectory.id,
                        path.display(),
                    );
                    summary.trajectories_failed += 1;
                    summary.failures.push((output_path, error));
                }
            }

            tracker.advance(None, Some(trajectory.id.as_str()));
        }

        Ok(())
    }

    /// Transform and encode one trajectory's frame stack.
    fn encode_trajectory(
        &self,
        trajectory: &Trajectory,
        output_path: &Path,
    ) -> Result<(), TrajvidError> {
        let mut frames = Vec::with_capacity(trajectory.frame_count());
        for frame in trajectory.frames.outer_iter() {
            let transformed = transform_frame(frame);
            frames.push(frame_to_image(&transformed)?);
        }

        let options = VideoEncoderOptions::default()
            .fps(self.options.fps)
            .codec(self.options.codec);
        VideoEncoder::new(options).write(output_path, &frames)
    }
}

/// Regular files directly inside `dir` with the dataset extension,
/// sorted by file name so batch order is deterministic.
fn discover_dataset_files(dir: &Path) -> Result<Vec<PathBuf>, TrajvidError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_dataset = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DATASET_EXTENSION));
        if is_dataset {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Build the output path `{output_dir}/{source-stem}_{trajectory-id}.mp4`.
fn output_video_path(output_dir: &Path, source: &Path, trajectory_id: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    output_dir.join(format!("{stem}_{trajectory_id}.mp4"))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{discover_dataset_files, output_video_path};

    #[test]
    fn discovery_filters_by_extension_and_sorts() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("b.hdf5"), b"").unwrap();
        fs::write(dir.path().join("a.hdf5"), b"").unwrap();
        fs::write(dir.path().join("c.HDF5"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("nested.hdf5")).unwrap();

        let files = discover_dataset_files(dir.path()).expect("discover");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.hdf5", "b.hdf5", "c.HDF5"]);
    }

    #[test]
    fn discovery_of_empty_directory_is_empty_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files = discover_dataset_files(dir.path()).expect("discover");
        assert!(files.is_empty());
    }

    #[test]
    fn output_path_joins_stem_and_trajectory_id() {
        let path = output_video_path(
            Path::new("videos"),
            Path::new("/data/run_03.hdf5"),
            "demo_12",
        );
        assert_eq!(path, Path::new("videos").join("run_03_demo_12.mp4"));
    }
}
