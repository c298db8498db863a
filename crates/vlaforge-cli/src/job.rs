//! Job configuration – loads a [`DatasetConfig`] from a TOML file.

use std::path::Path;

use vlaforge_dataset::DatasetConfig;

/// Load a dataset job description from a TOML file.
pub fn load(path: &Path) -> Result<DatasetConfig, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read job file at {}: {}", path.display(), e))?;
    let mut cfg: DatasetConfig =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse job file: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Apply `VLAFORGE_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `VLAFORGE_ROOT` | `root` |
/// | `VLAFORGE_EP_PER_TASK` | `ep_per_task` |
pub fn apply_env_overrides(cfg: &mut DatasetConfig) {
    if let Ok(v) = std::env::var("VLAFORGE_ROOT") {
        cfg.root = v.into();
    }
    if let Ok(v) = std::env::var("VLAFORGE_EP_PER_TASK")
        && let Ok(cap) = v.parse::<usize>()
    {
        cfg.ep_per_task = cap;
    }
}
