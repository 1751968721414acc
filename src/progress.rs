//! Progress reporting for batch exports.
//!
//! The batch driver emits [`ProgressInfo`] snapshots through a
//! [`ProgressCallback`]: one [`FileExport`](OperationType::FileExport)
//! event when a dataset file is picked up, and one
//! [`TrajectoryExport`](OperationType::TrajectoryExport) event per
//! trajectory written. Callbacks are cosmetic — they observe the export
//! but cannot alter or halt it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use trajvid::{BatchExporter, ExportOptions, ProgressCallback, ProgressInfo, TrajvidError};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(file) = &info.file {
//!             println!("processing {}", file.display());
//!         }
//!     }
//! }
//!
//! let options = ExportOptions::new().with_progress(Arc::new(PrintProgress));
//! BatchExporter::new("datasets", "videos")
//!     .with_options(options)
//!     .run()?;
//! # Ok::<(), TrajvidError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of work a progress event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// A dataset file was picked up by the batch driver.
    FileExport,
    /// A trajectory within the current file was exported.
    TrajectoryExport,
}

/// A snapshot of export progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work this event refers to.
    pub operation: OperationType,
    /// Items completed so far (files or trajectories, per `operation`).
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// The dataset file being processed, for [`OperationType::FileExport`].
    pub file: Option<PathBuf>,
    /// The trajectory just exported, for [`OperationType::TrajectoryExport`].
    pub trajectory: Option<String>,
}

/// Trait for receiving progress updates during a batch export.
///
/// Implementations must be [`Send`] and [`Sync`] so one callback can be
/// shared across exporter configurations.
pub trait ProgressCallback: Send + Sync {
    /// Called once per file picked up and once per trajectory exported.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Internal helper that tracks counts and timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one completed item and fire the callback.
    pub(crate) fn advance(&mut self, file: Option<&Path>, trajectory: Option<&str>) {
        self.current += 1;

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            file: file.map(Path::to_path_buf),
            trajectory: trajectory.map(str::to_string),
        };

        self.callback.on_progress(&info);
    }
}
