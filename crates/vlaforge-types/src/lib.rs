use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use ndarray::Array3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claw flag value meaning the gripper is closed.
///
/// Recorders disagreed on polarity over time; every consumer in this
/// workspace goes through these two constants instead of writing `0`/`1`.
pub const CLAW_CLOSED: i32 = 0;
/// Claw flag value meaning the gripper is open.
pub const CLAW_OPEN: i32 = 1;

/// Camera viewpoints an episode may record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CameraView {
    /// Fixed third-person camera, the primary training view.
    #[serde(rename = "3rd")]
    ThirdPerson,
    /// Arm-mounted wrist camera. Recognized in configuration but no rig
    /// records it yet; loaders must reject it rather than emit empty planes.
    #[serde(rename = "wrist")]
    Wrist,
}

impl CameraView {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraView::ThirdPerson => "3rd",
            CameraView::Wrist => "wrist",
        }
    }
}

impl fmt::Display for CameraView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed line of an episode pose log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    /// Opaque recorder timestamp token; only log order is relied upon.
    pub timestamp: String,
    /// End-effector position in millimeters, tool frame.
    pub position_mm: [f64; 3],
    /// Euler angles in degrees, XYZ extrinsic axis order.
    pub orientation_deg: [f64; 3],
    /// [`CLAW_CLOSED`] or [`CLAW_OPEN`].
    pub claw_status: i32,
    /// Arm/side selector; `0` when the log line carries no explicit column.
    pub arm_flag: i32,
}

/// Image and point-cloud planes for one camera view at one timestep.
///
/// Both arrays are channel-first `(3, H, W)`. `pcd` holds XYZ coordinates in
/// the robot-base frame, already pushed through the episode's extrinsic.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewData {
    pub rgb: Array3<u8>,
    pub pcd: Array3<f32>,
}

/// One training datum for a single episode timestep.
///
/// Built once during dataset assembly and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Task identifier (the task directory name).
    pub task: String,
    /// Trimmed instruction string, possibly suffixed with a rendering of the
    /// current gripper pose.
    pub lang_goal: String,
    /// Target pose: position in meters ++ unit quaternion `(x, y, z, w)` ++
    /// claw flag, all from the *next* pose record.
    pub gripper_pose: [f64; 8],
    /// `[claw flag at the current step, progress time in [-1, 1]]`.
    pub low_dim_state: [f32; 2],
    /// Reserved flag, currently always `1.0`.
    pub ignore_collisions: f32,
    /// Per-view planes, keyed by view so iteration order is stable.
    pub views: BTreeMap<CameraView, ViewData>,
    /// Arm selector from the target pose record, when enabled.
    pub arm_flag: Option<i32>,
    /// Encoding of the *current* pose record, when pose augmentation is on.
    pub current_gripper_pose: Option<[f64; 8]>,
}

/// A matching/mismatched instruction pair for preference-style training.
///
/// `negative` is identical to `positive` except for its `lang_goal`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastivePair {
    pub positive: Sample,
    pub negative: Sample,
}

/// Entry in the assembled dataset table.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingItem {
    Sample(Sample),
    Pair(ContrastivePair),
}

impl TrainingItem {
    pub fn as_sample(&self) -> Option<&Sample> {
        match self {
            TrainingItem::Sample(s) => Some(s),
            TrainingItem::Pair(_) => None,
        }
    }

    pub fn as_pair(&self) -> Option<&ContrastivePair> {
        match self {
            TrainingItem::Sample(_) => None,
            TrainingItem::Pair(p) => Some(p),
        }
    }
}

/// Errors raised while assembling a dataset from recorded episodes.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Malformed artifact {path}: {details}")]
    Format { path: PathBuf, details: String },

    #[error("Missing artifact: {path}")]
    NotFound { path: PathBuf },

    #[error("Camera view '{0}' is not supported by this loader")]
    UnsupportedView(CameraView),

    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DatasetError {
    /// Wrap an I/O failure, folding `ErrorKind::NotFound` into the
    /// missing-artifact variant so skip policies can match on it.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            DatasetError::NotFound { path }
        } else {
            DatasetError::Io { path, source: err }
        }
    }

    /// Shorthand for a malformed-artifact error.
    pub fn format(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        DatasetError::Format {
            path: path.into(),
            details: details.into(),
        }
    }

    /// True for missing directories/artifacts, the only class of error an
    /// enumeration pass is allowed to skip past.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatasetError::NotFound { .. })
    }
}
