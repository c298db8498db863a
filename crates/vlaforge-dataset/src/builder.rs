//! Per-timestep sample construction.
//!
//! Fuses one timestep's pose records, image planes, point field and the
//! episode instruction into a [`Sample`]. The encoding rules:
//!
//! - positions in the pose log are millimeters and become meters;
//! - orientations are Euler degrees (XYZ extrinsic) and become unit
//!   quaternions in `(x, y, z, w)` order;
//! - a gripper pose is 8 floats: position ++ quaternion ++ claw flag;
//! - `low_dim_state` is `[claw at the current step, progress time]` where the
//!   progress time runs linearly from `1.0` at step 0 to `-1.0` at the final
//!   predictable step.
//!
//! Step `i` pairs pose record `i` ("current") with record `i + 1` ("target"):
//! the target encoding becomes `gripper_pose`, the current one is returned
//! alongside the sample for optional pose augmentation.

use std::collections::BTreeMap;

use ndarray::{Array3, s};
use vlaforge_geometry::extrinsic::Extrinsic;
use vlaforge_geometry::rotation::Quaternion;
use vlaforge_types::{CameraView, DatasetError, PoseRecord, Sample, ViewData};

use crate::artifact;
use crate::episode::EpisodeLayout;

// ────────────────────────────────────────────────────────────────────────────
// Pose encoding
// ────────────────────────────────────────────────────────────────────────────

/// Encode one pose record as the 8-float gripper pose used by samples:
/// position in meters, unit quaternion `(x, y, z, w)`, claw flag.
pub fn encode_gripper_pose(record: &PoseRecord) -> [f64; 8] {
    let [px, py, pz] = record.position_mm.map(|v| v / 1000.0);
    let [qx, qy, qz, qw] = Quaternion::from_euler_xyz_degrees(record.orientation_deg).to_xyzw();
    [px, py, pz, qx, qy, qz, qw, f64::from(record.claw_status)]
}

/// Normalized progress time for `step` of an episode with `num_steps` frames:
/// `(1 − step/(num_steps−1))·2 − 1`, i.e. `1.0` at step 0 falling linearly to
/// `-1.0` at the last frame.
///
/// Requires `num_steps >= 2`; a single-frame episode has no predictable step
/// and never reaches the step loop.
pub fn progress_time(step: usize, num_steps: usize) -> f32 {
    debug_assert!(num_steps >= 2, "progress time needs at least two frames");
    let frac = step as f64 / (num_steps - 1) as f64;
    ((1.0 - frac) * 2.0 - 1.0) as f32
}

/// Render a gripper pose as the human-readable suffix appended to a language
/// goal when current-pose augmentation is on.
pub fn pose_suffix(pose: &[f64; 8]) -> String {
    let fields: Vec<String> = pose.iter().map(|v| format!("{v:.4}")).collect();
    format!(", current gripper pose: [{}]", fields.join(", "))
}

/// Attach `current_pose` to a sample and append its rendering to the
/// language goal. Applied after any goal substitution so the suffix always
/// describes the sample it rides on.
pub fn apply_current_pose(sample: &mut Sample, current_pose: [f64; 8]) {
    sample.lang_goal.push_str(&pose_suffix(&current_pose));
    sample.current_gripper_pose = Some(current_pose);
}

// ────────────────────────────────────────────────────────────────────────────
// View loading
// ────────────────────────────────────────────────────────────────────────────

/// Load the RGB frame for `step`: drop any alpha channel, re-layout as
/// contiguous channel-first `(3, H, W)`.
fn load_rgb_plane(layout: &EpisodeLayout, step: usize) -> Result<Array3<u8>, DatasetError> {
    let path = layout.rgb_frame(step);
    let arr = artifact::read_image(&path)?;
    let (_, _, c) = arr.dim();
    if c < 3 {
        return Err(DatasetError::format(
            &path,
            format!("expected at least 3 channels, got {c}"),
        ));
    }
    let rgb = arr.slice(s![.., .., ..3]);
    Ok(rgb.permuted_axes([2, 0, 1]).as_standard_layout().to_owned())
}

/// Load the point-cloud frame for `step`: drop channels beyond XYZ, map into
/// the base frame through the episode extrinsic, re-layout as channel-first
/// `(3, H, W)` f32.
fn load_pcd_plane(
    layout: &EpisodeLayout,
    step: usize,
    extrinsic: &Extrinsic,
) -> Result<Array3<f32>, DatasetError> {
    let path = layout.pcd_frame(step);
    let arr = artifact::read_point_field(&path)?;
    let (_, _, c) = arr.dim();
    if c < 3 {
        return Err(DatasetError::format(
            &path,
            format!("expected at least 3 channels, got {c}"),
        ));
    }
    let xyz = arr.slice(s![.., .., ..3]).to_owned();
    let base = extrinsic
        .transform_field(&xyz)
        .map_err(|e| DatasetError::format(&path, e.to_string()))?;
    Ok(base.permuted_axes([2, 0, 1]).as_standard_layout().to_owned())
}

// ────────────────────────────────────────────────────────────────────────────
// Step builder
// ────────────────────────────────────────────────────────────────────────────

/// Everything the builder needs for one `(episode, step)` pair. The pose log,
/// instruction and extrinsic are loaded once per episode by the caller.
pub struct StepContext<'a> {
    pub task: &'a str,
    pub layout: &'a EpisodeLayout,
    pub step: usize,
    pub num_steps: usize,
    pub records: &'a [PoseRecord],
    pub lang_goal: &'a str,
    pub extrinsic: &'a Extrinsic,
    pub views: &'a [CameraView],
    pub output_arm_flag: bool,
}

/// A built sample plus the current-pose encoding the caller may choose to
/// attach via [`apply_current_pose`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStep {
    pub sample: Sample,
    pub current_pose: [f64; 8],
}

/// Build the sample for one timestep.
///
/// The caller guarantees `records.len() >= num_steps` and
/// `step <= num_steps - 2`, so records `step` and `step + 1` exist.
pub fn build_step(ctx: &StepContext<'_>) -> Result<BuiltStep, DatasetError> {
    let current = &ctx.records[ctx.step];
    let target = &ctx.records[ctx.step + 1];

    let gripper_pose = encode_gripper_pose(target);
    let current_pose = encode_gripper_pose(current);
    let low_dim_state = [
        current.claw_status as f32,
        progress_time(ctx.step, ctx.num_steps),
    ];

    let mut views = BTreeMap::new();
    for view in ctx.views {
        match view {
            CameraView::ThirdPerson => {
                let rgb = load_rgb_plane(ctx.layout, ctx.step)?;
                let pcd = load_pcd_plane(ctx.layout, ctx.step, ctx.extrinsic)?;
                views.insert(CameraView::ThirdPerson, ViewData { rgb, pcd });
            }
            // No rig records a wrist camera yet. Refuse rather than emit
            // empty planes a training loop would silently consume.
            CameraView::Wrist => {
                return Err(DatasetError::UnsupportedView(CameraView::Wrist));
            }
        }
    }

    Ok(BuiltStep {
        sample: Sample {
            task: ctx.task.to_string(),
            lang_goal: ctx.lang_goal.to_string(),
            gripper_pose,
            low_dim_state,
            ignore_collisions: 1.0,
            views,
            arm_flag: ctx.output_arm_flag.then_some(target.arm_flag),
            current_gripper_pose: None,
        },
        current_pose,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
