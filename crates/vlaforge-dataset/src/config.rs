//! Dataset construction configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vlaforge_types::{CameraView, DatasetError};

/// Options recognized by [`EpisodeDataset::construct`][crate::EpisodeDataset].
///
/// Deserializable so the CLI can load it from a TOML job file; every field but
/// `root` has a default matching the recorder's conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset root: one subdirectory per task.
    pub root: PathBuf,

    /// Compute device identifier, carried for the training loop's benefit.
    /// Construction itself never touches a device.
    #[serde(default = "default_device")]
    pub device: String,

    /// Camera views to load for every sample.
    #[serde(default = "default_cameras")]
    pub cameras: Vec<CameraView>,

    /// Episode cap: only indices below this are loaded from each task.
    #[serde(default = "default_ep_per_task")]
    pub ep_per_task: usize,

    /// Attach each target record's arm flag to the sample.
    #[serde(default)]
    pub output_arm_flag: bool,

    /// Expand every sample into contrastive positive/negative pairs.
    #[serde(default)]
    pub contrastive_pairs: bool,

    /// Attach the current gripper pose and append its rendering to the
    /// language goal.
    #[serde(default)]
    pub current_pose_input: bool,
}

fn default_device() -> String {
    "cpu".to_string()
}
fn default_cameras() -> Vec<CameraView> {
    vec![CameraView::ThirdPerson]
}
fn default_ep_per_task() -> usize {
    10
}

impl DatasetConfig {
    /// A configuration with defaults for everything but the root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            device: default_device(),
            cameras: default_cameras(),
            ep_per_task: default_ep_per_task(),
            output_arm_flag: false,
            contrastive_pairs: false,
            current_pose_input: false,
        }
    }

    /// Reject configurations the loader cannot honor. Runs before any I/O so
    /// an unsupported view fails fast instead of mid-build.
    pub fn validate(&self) -> Result<(), DatasetError> {
        for view in &self.cameras {
            if *view == CameraView::Wrist {
                return Err(DatasetError::UnsupportedView(CameraView::Wrist));
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_with_root_only_gets_defaults() {
        let cfg: DatasetConfig = toml::from_str(r#"root = "/data/episodes""#).unwrap();
        assert_eq!(cfg.root, PathBuf::from("/data/episodes"));
        assert_eq!(cfg.device, "cpu");
        assert_eq!(cfg.cameras, [CameraView::ThirdPerson]);
        assert_eq!(cfg.ep_per_task, 10);
        assert!(!cfg.output_arm_flag);
        assert!(!cfg.contrastive_pairs);
        assert!(!cfg.current_pose_input);
    }

    #[test]
    fn toml_roundtrip_preserves_options() {
        let mut cfg = DatasetConfig::new("/data/episodes");
        cfg.ep_per_task = 3;
        cfg.contrastive_pairs = true;
        cfg.current_pose_input = true;

        let raw = toml::to_string(&cfg).unwrap();
        let back: DatasetConfig = toml::from_str(&raw).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn camera_names_match_recorder_vocabulary() {
        let cfg: DatasetConfig = toml::from_str(
            r#"
            root = "/data"
            cameras = ["3rd", "wrist"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.cameras, [CameraView::ThirdPerson, CameraView::Wrist]);
    }

    #[test]
    fn validate_rejects_wrist() {
        let mut cfg = DatasetConfig::new("/data");
        cfg.cameras.push(CameraView::Wrist);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, DatasetError::UnsupportedView(CameraView::Wrist)));
    }

    #[test]
    fn validate_accepts_primary_view() {
        assert!(DatasetConfig::new("/data").validate().is_ok());
    }
}
