//! ASCII PLY export of a point cloud with a gripper marker.
//!
//! Writes one PLY file containing the sample's base-frame cloud (NaN points
//! filtered out, colored from the RGB plane) merged with a red sphere of
//! points centered on the gripper position, so the predicted target pose can
//! be checked against the scene in any point-cloud viewer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use ndarray::Array3;
use tracing::info;

use crate::ExportError;

/// Marker sphere geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerOptions {
    /// Sphere radius in meters.
    pub radius: f64,
    /// Number of surface points sampled for the sphere.
    pub points: usize,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            radius: 0.02,
            points: 1000,
        }
    }
}

/// Sample `count` points evenly over a sphere surface with a Fibonacci
/// lattice.
fn sphere_points(center: [f64; 3], radius: f64, count: usize) -> Vec<[f64; 3]> {
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    (0..count)
        .map(|i| {
            // z runs from ~1 to ~-1; each step advances the azimuth by the
            // golden angle.
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
            let ring = (1.0 - z * z).sqrt();
            let azimuth = golden * i as f64;
            [
                center[0] + radius * ring * azimuth.cos(),
                center[1] + radius * ring * azimuth.sin(),
                center[2] + radius * z,
            ]
        })
        .collect()
}

/// Write `pcd` (channel-first `(3, H, W)`, base-frame XYZ) and `rgb` (same
/// layout) to `path` as ASCII PLY, with a red marker sphere at `gripper_xyz`.
///
/// Points with any NaN coordinate are dropped together with their colors.
/// Returns the number of vertices written.
pub fn save_pcd_with_gripper_ply(
    pcd: &Array3<f32>,
    rgb: &Array3<u8>,
    gripper_xyz: [f64; 3],
    path: &Path,
    marker: MarkerOptions,
) -> Result<usize, ExportError> {
    let (c, h, w) = pcd.dim();
    if c != 3 {
        return Err(ExportError::BadShape(format!("({c}, {h}, {w})")));
    }
    if rgb.dim() != (3, h, w) {
        let (rc, rh, rw) = rgb.dim();
        return Err(ExportError::BadShape(format!(
            "rgb ({rc}, {rh}, {rw}) does not match pcd ({c}, {h}, {w})"
        )));
    }

    let mut vertices: Vec<([f64; 3], [u8; 3])> = Vec::with_capacity(h * w + marker.points);
    for i in 0..h {
        for j in 0..w {
            let p = [pcd[[0, i, j]], pcd[[1, i, j]], pcd[[2, i, j]]];
            if p.iter().any(|v| v.is_nan()) {
                continue;
            }
            let color = [rgb[[0, i, j]], rgb[[1, i, j]], rgb[[2, i, j]]];
            vertices.push((p.map(f64::from), color));
        }
    }
    for p in sphere_points(gripper_xyz, marker.radius, marker.points) {
        vertices.push((p, [255, 0, 0]));
    }

    let io_err = |e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    writeln!(out, "ply").map_err(io_err)?;
    writeln!(out, "format ascii 1.0").map_err(io_err)?;
    writeln!(
        out,
        "comment exported by vlaforge {}",
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    )
    .map_err(io_err)?;
    writeln!(out, "element vertex {}", vertices.len()).map_err(io_err)?;
    for axis in ["x", "y", "z"] {
        writeln!(out, "property float {axis}").map_err(io_err)?;
    }
    for channel in ["red", "green", "blue"] {
        writeln!(out, "property uchar {channel}").map_err(io_err)?;
    }
    writeln!(out, "end_header").map_err(io_err)?;
    for ([x, y, z], [r, g, b]) in &vertices {
        writeln!(out, "{x} {y} {z} {r} {g} {b}").map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;

    info!(path = %path.display(), vertices = vertices.len(), "wrote point cloud");
    Ok(vertices.len())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn planes(h: usize, w: usize) -> (Array3<f32>, Array3<u8>) {
        let mut pcd = Array3::<f32>::zeros((3, h, w));
        for i in 0..h {
            for j in 0..w {
                pcd[[0, i, j]] = j as f32;
                pcd[[1, i, j]] = i as f32;
                pcd[[2, i, j]] = 1.0;
            }
        }
        let rgb = Array3::<u8>::from_elem((3, h, w), 128);
        (pcd, rgb)
    }

    #[test]
    fn writes_cloud_and_marker_vertices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.ply");
        let (pcd, rgb) = planes(2, 3);

        let marker = MarkerOptions {
            radius: 0.01,
            points: 10,
        };
        let count =
            save_pcd_with_gripper_ply(&pcd, &rgb, [0.5, 0.5, 1.0], &path, marker).unwrap();
        assert_eq!(count, 2 * 3 + 10);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("ply\nformat ascii 1.0\n"));
        assert!(text.contains("element vertex 16"));
        assert!(text.contains("255 0 0"));
    }

    #[test]
    fn nan_points_are_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.ply");
        let (mut pcd, rgb) = planes(2, 2);
        pcd[[2, 0, 0]] = f32::NAN;

        let marker = MarkerOptions {
            radius: 0.01,
            points: 5,
        };
        let count = save_pcd_with_gripper_ply(&pcd, &rgb, [0.0; 3], &path, marker).unwrap();
        assert_eq!(count, 3 + 5);
    }

    #[test]
    fn sphere_points_sit_on_the_sphere() {
        let center = [1.0, -2.0, 0.5];
        for p in sphere_points(center, 0.02, 100) {
            let dist = (0..3)
                .map(|k| (p[k] - center[k]).powi(2))
                .sum::<f64>()
                .sqrt();
            assert!((dist - 0.02).abs() < 1e-12);
        }
    }

    #[test]
    fn mismatched_planes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.ply");
        let pcd = Array3::<f32>::zeros((3, 2, 2));
        let rgb = Array3::<u8>::zeros((3, 4, 4));
        let err = save_pcd_with_gripper_ply(&pcd, &rgb, [0.0; 3], &path, MarkerOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExportError::BadShape(_)));
    }

    #[test]
    fn channel_last_cloud_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.ply");
        let pcd = Array3::<f32>::zeros((2, 2, 3));
        let rgb = Array3::<u8>::zeros((2, 2, 3));
        let err = save_pcd_with_gripper_ply(&pcd, &rgb, [0.0; 3], &path, MarkerOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExportError::BadShape(_)));
    }
}
