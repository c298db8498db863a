//! Typed readers for the on-disk episode artifacts.
//!
//! Every artifact is a plain file the recorder wrote once: UTF-8 text for the
//! pose log and instruction, NumPy `.npy` arrays for image planes, point
//! fields and the extrinsic matrix. All readers return [`DatasetError`] with
//! the offending path attached; a missing file surfaces as
//! [`DatasetError::NotFound`] so enumeration skip policies can match on it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::{Array2, Array3};
use ndarray_npy::ReadNpyExt;
use vlaforge_geometry::extrinsic::Extrinsic;
use vlaforge_types::DatasetError;

/// Read a UTF-8 text artifact (pose log, instruction).
pub fn read_text(path: &Path) -> Result<String, DatasetError> {
    std::fs::read_to_string(path).map_err(|e| DatasetError::from_io(path, e))
}

/// Read an `H×W×C` u8 image artifact (RGB or RGBA).
pub fn read_image(path: &Path) -> Result<Array3<u8>, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::from_io(path, e))?;
    Array3::<u8>::read_npy(BufReader::new(file))
        .map_err(|e| DatasetError::format(path, format!("not an HxWxC u8 array: {e}")))
}

/// Read an `H×W×C` f32 point-field artifact (first three channels XYZ).
pub fn read_point_field(path: &Path) -> Result<Array3<f32>, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::from_io(path, e))?;
    Array3::<f32>::read_npy(BufReader::new(file))
        .map_err(|e| DatasetError::format(path, format!("not an HxWxC f32 array: {e}")))
}

/// Read the episode's 4×4 camera→base extrinsic matrix.
pub fn read_extrinsic(path: &Path) -> Result<Extrinsic, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::from_io(path, e))?;
    let matrix = Array2::<f64>::read_npy(BufReader::new(file))
        .map_err(|e| DatasetError::format(path, format!("not a 2-D f64 array: {e}")))?;
    Extrinsic::from_matrix(&matrix).map_err(|e| DatasetError::format(path, e.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
