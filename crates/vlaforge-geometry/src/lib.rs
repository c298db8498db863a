//! `vlaforge-geometry` – pose and coordinate math for episode assembly.
//!
//! The two conversions every training sample depends on live here, with no
//! knowledge of files or episode layout:
//!
//! # Modules
//!
//! - [`rotation`] – [`Quaternion`][rotation::Quaternion]: Euler angles in
//!   degrees (XYZ extrinsic axis order, as written by the pose recorder) to
//!   and from unit quaternions.
//! - [`extrinsic`] – [`Extrinsic`][extrinsic::Extrinsic]: 4×4 homogeneous
//!   camera→base transform applied to per-pixel point fields.

pub mod extrinsic;
pub mod rotation;
