//! Episode discovery and on-disk layout.
//!
//! A dataset root contains one directory per task; each task contains one
//! directory per episode, named by its decimal index:
//!
//! ```text
//! <root>/<task>/<episode>/pose.log
//! <root>/<task>/<episode>/instruction.txt
//! <root>/<task>/<episode>/extrinsic_matrix.npy
//! <root>/<task>/<episode>/zed_rgb/<step>.npy
//! <root>/<task>/<episode>/zed_pcd/<step>.npy
//! ```
//!
//! Enumeration is deterministic: tasks sort by name, episodes by index. The
//! recorder writes directories in arrival order, so sorting here is what makes
//! vocabulary order, sample order and therefore pair order reproducible.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use vlaforge_types::DatasetError;

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// Path helpers for one episode directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeLayout {
    dir: PathBuf,
}

impl EpisodeLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pose_log(&self) -> PathBuf {
        self.dir.join("pose.log")
    }

    pub fn instruction(&self) -> PathBuf {
        self.dir.join("instruction.txt")
    }

    pub fn extrinsic(&self) -> PathBuf {
        self.dir.join("extrinsic_matrix.npy")
    }

    /// RGB frame directory of the primary (third-person) camera.
    pub fn rgb_dir(&self) -> PathBuf {
        self.dir.join("zed_rgb")
    }

    /// Point-cloud frame directory of the primary (third-person) camera.
    pub fn pcd_dir(&self) -> PathBuf {
        self.dir.join("zed_pcd")
    }

    pub fn rgb_frame(&self, step: usize) -> PathBuf {
        self.rgb_dir().join(format!("{step}.npy"))
    }

    pub fn pcd_frame(&self, step: usize) -> PathBuf {
        self.pcd_dir().join(format!("{step}.npy"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Enumeration
// ────────────────────────────────────────────────────────────────────────────

/// A task directory discovered under the dataset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    /// Task identifier (the directory name).
    pub name: String,
    pub path: PathBuf,
}

/// An episode directory retained for loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeEntry {
    /// Decimal index parsed from the directory name.
    pub index: usize,
    pub layout: EpisodeLayout,
}

/// List the task directories under `root`, sorted by name.
///
/// Plain files under the root are ignored. A missing or unreadable root is
/// fatal: there is nothing to enumerate.
pub fn enumerate_tasks(root: &Path) -> Result<Vec<TaskEntry>, DatasetError> {
    let entries = std::fs::read_dir(root).map_err(|e| DatasetError::from_io(root, e))?;
    let mut tasks = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DatasetError::from_io(root, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        tasks.push(TaskEntry { name, path });
    }
    tasks.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(root = %root.display(), tasks = tasks.len(), "enumerated tasks");
    Ok(tasks)
}

/// List the episode directories of one task, sorted by index.
///
/// Only indices below `ep_per_task` are retained; higher indices are skipped
/// silently. Directory names that do not parse as a decimal index are warned
/// about and skipped so a stray non-episode directory cannot abort a build.
pub fn enumerate_episodes(
    task_path: &Path,
    ep_per_task: usize,
) -> Result<Vec<EpisodeEntry>, DatasetError> {
    let entries = std::fs::read_dir(task_path).map_err(|e| DatasetError::from_io(task_path, e))?;
    let mut episodes = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DatasetError::from_io(task_path, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let Ok(index) = name.parse::<usize>() else {
            warn!(dir = %path.display(), "skipping non-numeric episode directory");
            continue;
        };
        if index >= ep_per_task {
            debug!(index, cap = ep_per_task, "episode index beyond cap, skipping");
            continue;
        }
        episodes.push(EpisodeEntry {
            index,
            layout: EpisodeLayout::new(path),
        });
    }
    episodes.sort_by_key(|e| e.index);
    Ok(episodes)
}

/// Count the per-step `.npy` frames in a view directory.
///
/// This count defines `num_steps` for the episode; frames are expected to be
/// named `0.npy .. num_steps-1.npy`.
pub fn count_steps(view_dir: &Path) -> Result<usize, DatasetError> {
    let entries = std::fs::read_dir(view_dir).map_err(|e| DatasetError::from_io(view_dir, e))?;
    let mut count = 0;
    for entry in entries {
        let entry = entry.map_err(|e| DatasetError::from_io(view_dir, e))?;
        if entry.path().extension().is_some_and(|ext| ext == "npy") {
            count += 1;
        }
    }
    Ok(count)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
