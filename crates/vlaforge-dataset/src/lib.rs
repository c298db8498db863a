//! `vlaforge-dataset` – episode-to-sample assembly.
//!
//! Turns recorded robot-manipulation episodes (pose logs, camera frames,
//! point clouds, task instructions) into the in-memory table of per-timestep
//! training items a vision-language-action trainer consumes.
//!
//! # Modules
//!
//! - [`artifact`] – typed readers for the on-disk episode artifacts (text
//!   blobs and `.npy` arrays).
//! - [`pose_log`] – whitespace-table pose-log parser with its legacy-format
//!   compatibility fallback.
//! - [`episode`] – episode directory layout plus deterministic task/episode
//!   enumeration and step counting.
//! - [`builder`] – per-timestep fusion of pose, vision and language into one
//!   [`Sample`][vlaforge_types::Sample].
//! - [`contrastive`] – [`InstructionVocabulary`][contrastive::InstructionVocabulary]
//!   pre-pass value and positive/negative pair expansion.
//! - [`config`] – [`DatasetConfig`][config::DatasetConfig] construction
//!   options.
//! - [`dataset`] – [`EpisodeDataset`][dataset::EpisodeDataset]: the eager
//!   construction driver and materialized table.

pub mod artifact;
pub mod builder;
pub mod config;
pub mod contrastive;
pub mod dataset;
pub mod episode;
pub mod pose_log;

pub use config::DatasetConfig;
pub use contrastive::InstructionVocabulary;
pub use dataset::{DatasetSummary, EpisodeDataset};
