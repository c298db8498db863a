//! Camera→base extrinsic transform.
//!
//! Each episode records one fixed 4×4 homogeneous matrix mapping points from
//! the depth camera's frame into the robot-base frame. The matrix is applied
//! as-is (`M · [x y z 1]ᵀ`, pre-multiply); it is never inverted here, and the
//! bottom row is ignored because recorded extrinsics are rigid transforms
//! with no perspective component.
//!
//! # Example
//!
//! ```rust
//! use vlaforge_geometry::extrinsic::Extrinsic;
//!
//! // Camera sits 0.1 m above the base origin.
//! let m = Extrinsic::from_rows([
//!     [1.0, 0.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0, 0.0],
//!     [0.0, 0.0, 1.0, 0.1],
//!     [0.0, 0.0, 0.0, 1.0],
//! ]);
//! let p = m.apply_point([0.2, 0.0, 0.5]);
//! assert!((p[2] - 0.6).abs() < 1e-12);
//! ```

use ndarray::{Array2, Array3};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Error type
// ────────────────────────────────────────────────────────────────────────────

/// Errors from constructing or applying an extrinsic transform.
#[derive(Error, Debug)]
pub enum ExtrinsicError {
    #[error("Expected a 4x4 extrinsic matrix, got {rows}x{cols}")]
    NotFourByFour { rows: usize, cols: usize },
    #[error("Expected an HxWx3 point field, got a trailing dimension of {0}")]
    NotPointField(usize),
}

// ────────────────────────────────────────────────────────────────────────────
// Extrinsic
// ────────────────────────────────────────────────────────────────────────────

/// A 4×4 homogeneous camera→base transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Extrinsic {
    matrix: [[f64; 4]; 4],
}

impl Extrinsic {
    /// The identity transform.
    pub fn identity() -> Self {
        let mut matrix = [[0.0; 4]; 4];
        for i in 0..4 {
            matrix[i][i] = 1.0;
        }
        Self { matrix }
    }

    /// Build from explicit rows. Intended for fixtures and tests.
    pub fn from_rows(matrix: [[f64; 4]; 4]) -> Self {
        Self { matrix }
    }

    /// Build from a loaded matrix artifact, rejecting anything not 4×4.
    pub fn from_matrix(m: &Array2<f64>) -> Result<Self, ExtrinsicError> {
        let (rows, cols) = m.dim();
        if (rows, cols) != (4, 4) {
            return Err(ExtrinsicError::NotFourByFour { rows, cols });
        }
        let mut matrix = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                matrix[i][j] = m[[i, j]];
            }
        }
        Ok(Self { matrix })
    }

    /// Map one camera-frame point into the base frame.
    ///
    /// Computes the first three rows of `M · [x y z 1]ᵀ`; the homogeneous
    /// coordinate is dropped without a divide.
    pub fn apply_point(&self, p: [f64; 3]) -> [f64; 3] {
        let m = &self.matrix;
        [
            m[0][0] * p[0] + m[0][1] * p[1] + m[0][2] * p[2] + m[0][3],
            m[1][0] * p[0] + m[1][1] * p[1] + m[1][2] * p[2] + m[1][3],
            m[2][0] * p[0] + m[2][1] * p[1] + m[2][2] * p[2] + m[2][3],
        ]
    }

    /// Map an `H×W×3` camera-frame point field into the base frame.
    ///
    /// Arithmetic runs in f64 and is truncated back to the field's f32
    /// storage. Non-finite points pass through untouched by any filtering;
    /// downstream consumers decide what to do with them.
    pub fn transform_field(&self, field: &Array3<f32>) -> Result<Array3<f32>, ExtrinsicError> {
        let (h, w, c) = field.dim();
        if c != 3 {
            return Err(ExtrinsicError::NotPointField(c));
        }
        let mut out = Array3::<f32>::zeros((h, w, 3));
        for i in 0..h {
            for j in 0..w {
                let p = self.apply_point([
                    f64::from(field[[i, j, 0]]),
                    f64::from(field[[i, j, 1]]),
                    f64::from(field[[i, j, 2]]),
                ]);
                for (k, v) in p.iter().enumerate() {
                    out[[i, j, k]] = *v as f32;
                }
            }
        }
        Ok(out)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
