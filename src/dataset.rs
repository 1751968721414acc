//! Dataset reading — lazy trajectory iteration over an HDF5 container.
//!
//! A dataset file holds a top-level `data` group whose members are
//! trajectories. Each trajectory that carries an observation bundle stores
//! its camera stream as an unsigned-byte array of shape
//! `(frames, height, width, channels)` at `obs/agentview_rgb`.
//!
//! [`DatasetFile`] opens the container read-only and
//! [`trajectories()`](DatasetFile::trajectories) yields one
//! [`Trajectory`] per member that has a bundle, in the container's native
//! key order. Members without a bundle are silently skipped. The HDF5
//! handle is released when the `DatasetFile` drops, on every exit path.
//!
//! # Example
//!
//! ```no_run
//! use trajvid::DatasetFile;
//!
//! let dataset = DatasetFile::open("demo.hdf5")?;
//! for trajectory in dataset.trajectories()? {
//!     let trajectory = trajectory?;
//!     println!("{}: {} frames", trajectory.id, trajectory.frame_count());
//! }
//! # Ok::<(), trajvid::TrajvidError>(())
//! ```

use std::path::{Path, PathBuf};

use hdf5::Group;
use ndarray::{Array4, Ix4};

use crate::error::TrajvidError;

/// Name of the top-level group holding all trajectories.
const DATA_GROUP: &str = "data";
/// Name of the observation bundle inside a trajectory.
const OBS_GROUP: &str = "obs";
/// Name of the agent-view camera stream inside the observation bundle.
const AGENTVIEW_DATASET: &str = "agentview_rgb";

/// One trajectory read from a dataset file.
#[derive(Debug, Clone)]
pub struct Trajectory {
    /// The trajectory's key within the container.
    pub id: String,
    /// The frame stack, shape `(frames, height, width, channels)`.
    pub frames: Array4<u8>,
}

impl Trajectory {
    /// Number of frames in the stack.
    pub fn frame_count(&self) -> usize {
        self.frames.shape()[0]
    }
}

/// A read-only handle to one HDF5 dataset file.
///
/// Created via [`DatasetFile::open`]. Holds the file and the top-level
/// `data` group open for the lifetime of the value.
#[derive(Debug)]
pub struct DatasetFile {
    // Keeps the file handle alive alongside the group handle.
    _file: hdf5::File,
    data: Group,
    path: PathBuf,
}

impl DatasetFile {
    /// Open a dataset file for read-only trajectory extraction.
    ///
    /// # Errors
    ///
    /// [`TrajvidError::DatasetOpen`] if the file cannot be opened as HDF5,
    /// [`TrajvidError::DatasetFormat`] if the top-level `data` group is
    /// missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TrajvidError> {
        let path = path.as_ref();

        let file = hdf5::File::open(path).map_err(|error| TrajvidError::DatasetOpen {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        let data = file.group(DATA_GROUP).map_err(|error| {
            TrajvidError::DatasetFormat(format!(
                "{}: missing top-level `{DATA_GROUP}` group ({error})",
                path.display(),
            ))
        })?;

        Ok(Self {
            _file: file,
            data,
            path: path.to_path_buf(),
        })
    }

    /// Path this dataset was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of top-level trajectory keys, including ones that will be
    /// skipped for lacking an observation bundle.
    ///
    /// Useful for sizing progress reporting before iterating.
    pub fn trajectory_count(&self) -> Result<usize, TrajvidError> {
        Ok(self.data.member_names()?.len())
    }

    /// Lazily iterate the trajectories in native key order.
    ///
    /// The iterator is finite, single-pass, and not restartable. Members
    /// without an `obs` bundle are omitted; for each remaining member the
    /// full agent-view frame stack is loaded into memory and yielded.
    pub fn trajectories(&self) -> Result<TrajectoryIter<'_>, TrajvidError> {
        let keys = self.data.member_names()?;
        Ok(TrajectoryIter {
            data: &self.data,
            keys: keys.into_iter(),
        })
    }
}

/// Lazy iterator over the trajectories of one [`DatasetFile`].
///
/// Yields `Result<Trajectory, TrajvidError>`; an error means the member
/// exists but could not be read, which callers should treat as a
/// file-level failure.
pub struct TrajectoryIter<'a> {
    data: &'a Group,
    keys: std::vec::IntoIter<String>,
}

impl TrajectoryIter<'_> {
    fn read_trajectory(&self, key: &str) -> Result<Option<Trajectory>, TrajvidError> {
        let trajectory = self.data.group(key).map_err(|error| {
            TrajvidError::DatasetFormat(format!("member `{key}` is not a group ({error})"))
        })?;

        // No observation bundle: not an error, just nothing to export.
        if !trajectory.link_exists(OBS_GROUP) {
            log::debug!("trajectory `{key}` has no `{OBS_GROUP}` bundle, skipping");
            return Ok(None);
        }

        let obs = trajectory.group(OBS_GROUP).map_err(|error| {
            TrajvidError::DatasetFormat(format!("`{key}/{OBS_GROUP}` is not a group ({error})"))
        })?;

        let stream = obs.dataset(AGENTVIEW_DATASET).map_err(|error| {
            TrajvidError::DatasetFormat(format!(
                "`{key}/{OBS_GROUP}` has no `{AGENTVIEW_DATASET}` stream ({error})"
            ))
        })?;

        let raw = stream.read_dyn::<u8>().map_err(|error| {
            TrajvidError::DatasetFormat(format!(
                "cannot read `{key}/{OBS_GROUP}/{AGENTVIEW_DATASET}` as u8 ({error})"
            ))
        })?;

        let shape = raw.shape().to_vec();
        let frames = raw
            .into_dimensionality::<Ix4>()
            .map_err(|_| TrajvidError::FrameShape { shape })?;

        Ok(Some(Trajectory {
            id: key.to_string(),
            frames,
        }))
    }
}

impl Iterator for TrajectoryIter<'_> {
    type Item = Result<Trajectory, TrajvidError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = self.keys.next()?;
            match self.read_trajectory(&key) {
                Ok(Some(trajectory)) => return Some(Ok(trajectory)),
                Ok(None) => continue,
                Err(error) => return Some(Err(error)),
            }
        }
    }
}
