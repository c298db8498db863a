//! `vlaforge-export` – debug and visualization exports.
//!
//! Collaborator utilities for inspecting already-built samples. Nothing here
//! is invoked by dataset construction; these exist so a human can eyeball
//! what the pipeline produced.
//!
//! # Modules
//!
//! - [`ply`] – write a sample's base-frame point cloud as an ASCII PLY file
//!   with a red marker sphere at the gripper position.
//! - [`image`] – dump a channel-first RGB plane as a PNG, plus a channel-order
//!   heuristic for spotting accidentally-BGR recordings.

use std::path::PathBuf;

use thiserror::Error;

pub mod image;
pub mod ply;

/// Errors from export utilities.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Expected a channel-first (3, H, W) array, got {0}")]
    BadShape(String),

    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image encoding failed: {0}")]
    Encode(#[from] ::image::ImageError),
}
