//! PNG dump and channel-order heuristic for channel-first RGB planes.

use std::path::Path;

use image::RgbImage;
use ndarray::Array3;
use tracing::info;

use crate::ExportError;

/// Save a channel-first `(3, H, W)` u8 plane as a PNG at `path`.
pub fn save_image_from_array(arr: &Array3<u8>, path: &Path) -> Result<(), ExportError> {
    let (c, h, w) = arr.dim();
    if c != 3 {
        return Err(ExportError::BadShape(format!("({c}, {h}, {w})")));
    }

    let mut buf = Vec::with_capacity(h * w * 3);
    for i in 0..h {
        for j in 0..w {
            for k in 0..3 {
                buf.push(arr[[k, i, j]]);
            }
        }
    }
    let img = RgbImage::from_raw(w as u32, h as u32, buf)
        .ok_or_else(|| ExportError::BadShape(format!("({c}, {h}, {w})")))?;
    img.save(path)?;
    info!(path = %path.display(), width = w, height = h, "wrote image");
    Ok(())
}

/// Heuristic check for a plane that was recorded BGR instead of RGB.
///
/// Natural robot-workspace scenes average more red than blue, so a first
/// channel brighter than the last suggests the channels are swapped. This is
/// only a debugging aid; it says nothing definitive about a single frame.
pub fn looks_bgr(arr: &Array3<u8>) -> Result<bool, ExportError> {
    let (c, h, w) = arr.dim();
    if c != 3 {
        return Err(ExportError::BadShape(format!("({c}, {h}, {w})")));
    }
    let mean = |channel: usize| {
        let sum: u64 = (0..h)
            .flat_map(|i| (0..w).map(move |j| (i, j)))
            .map(|(i, j)| u64::from(arr[[channel, i, j]]))
            .sum();
        sum as f64 / (h * w) as f64
    };
    Ok(mean(0) > mean(2))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
