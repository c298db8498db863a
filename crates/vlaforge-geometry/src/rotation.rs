//! Euler ↔ quaternion conversion.
//!
//! Pose logs store tool orientation as Euler angles in degrees, rotating
//! about the fixed X, then Y, then Z axes (extrinsic "xyz" order). Training
//! samples want a unit quaternion in `(x, y, z, w)` component order.
//!
//! # Example
//!
//! ```rust
//! use vlaforge_geometry::rotation::Quaternion;
//!
//! // 90° roll about the fixed X axis.
//! let q = Quaternion::from_euler_xyz_degrees([90.0, 0.0, 0.0]);
//! let [x, y, z, w] = q.to_xyzw();
//! assert!((x - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
//! assert!(y.abs() < 1e-9 && z.abs() < 1e-9);
//! assert!((w - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
//! ```

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A unit quaternion representing a 3-D rotation (w, x, y, z storage).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// Create a quaternion. The caller is responsible for providing unit
    /// components (|q| = 1).
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Build the rotation described by extrinsic-XYZ Euler angles in degrees.
    ///
    /// `angles` is `[roll, pitch, yaw]`: rotations about the fixed X, Y and Z
    /// axes, applied in that order. The composition is therefore
    /// `q_z * q_y * q_x`, expanded here into the closed form.
    pub fn from_euler_xyz_degrees(angles: [f64; 3]) -> Self {
        let [roll, pitch, yaw] = angles.map(f64::to_radians);
        let (sr, cr) = (roll / 2.0).sin_cos();
        let (sp, cp) = (pitch / 2.0).sin_cos();
        let (sy, cy) = (yaw / 2.0).sin_cos();

        Self::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
    }

    /// Recover extrinsic-XYZ Euler angles in degrees.
    ///
    /// The pitch term is clamped to `[-1, 1]` before `asin` so values a few
    /// ulps outside the range (from float drift) do not produce NaN. At
    /// pitch = ±90° roll and yaw are degenerate and one valid decomposition
    /// is returned.
    pub fn to_euler_xyz_degrees(self) -> [f64; 3] {
        let Self { w, x, y, z } = self;

        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
        let pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin();
        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

        [roll, pitch, yaw].map(f64::to_degrees)
    }

    /// Hamilton product: compose two rotations.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    ///
    /// Sample assembly itself never inverts a rotation; this exists so the
    /// Euler conventions can be verified by rotating known axes.
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Rotate a point by this quaternion: p' = q * p * q*.
    ///
    /// Verification aid, like [`conjugate`](Self::conjugate): the pipeline
    /// only ever encodes rotations, it does not apply them to points.
    pub fn rotate(self, p: [f64; 3]) -> [f64; 3] {
        let pure = Self::new(0.0, p[0], p[1], p[2]);
        let rotated = self.mul(pure).mul(self.conjugate());
        [rotated.x, rotated.y, rotated.z]
    }

    /// Euclidean norm over all four components.
    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Components in `(x, y, z, w)` order, the layout training samples use.
    pub fn to_xyzw(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn assert_close(actual: f64, expected: f64, label: &str) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "{label}: expected {expected}, got {actual}"
        );
    }

    // ── Euler → quaternion ──────────────────────────────────────────────────

    #[test]
    fn zero_angles_give_identity() {
        let q = Quaternion::from_euler_xyz_degrees([0.0, 0.0, 0.0]);
        assert_close(q.w, 1.0, "w");
        assert_close(q.x, 0.0, "x");
        assert_close(q.y, 0.0, "y");
        assert_close(q.z, 0.0, "z");
    }

    #[test]
    fn ninety_degree_roll() {
        let q = Quaternion::from_euler_xyz_degrees([90.0, 0.0, 0.0]);
        assert_close(q.w, FRAC_1_SQRT_2, "w");
        assert_close(q.x, FRAC_1_SQRT_2, "x");
        assert_close(q.y, 0.0, "y");
        assert_close(q.z, 0.0, "z");
    }

    #[test]
    fn ninety_degree_yaw_rotates_x_to_y() {
        let q = Quaternion::from_euler_xyz_degrees([0.0, 0.0, 90.0]);
        let r = q.rotate([1.0, 0.0, 0.0]);
        assert_close(r[0], 0.0, "x");
        assert_close(r[1], 1.0, "y");
        assert_close(r[2], 0.0, "z");
    }

    #[test]
    fn extrinsic_order_applies_roll_before_yaw() {
        // Roll 90° about fixed X sends +Y to +Z; yaw 90° about the *fixed* Z
        // then sends +X to +Y. Applied to the +Y axis: roll gives +Z, which
        // the yaw about Z leaves in place.
        let q = Quaternion::from_euler_xyz_degrees([90.0, 0.0, 90.0]);
        let r = q.rotate([0.0, 1.0, 0.0]);
        assert_close(r[0], 0.0, "x");
        assert_close(r[1], 0.0, "y");
        assert_close(r[2], 1.0, "z");
    }

    #[test]
    fn produced_quaternions_are_unit_norm() {
        let fixtures = [
            [0.0, 0.0, 0.0],
            [90.0, 0.0, 0.0],
            [10.0, 20.0, 30.0],
            [-170.0, 45.0, 12.5],
            [179.9, -89.0, 0.1],
        ];
        for angles in fixtures {
            let q = Quaternion::from_euler_xyz_degrees(angles);
            assert!(
                (q.norm() - 1.0).abs() < 1e-12,
                "norm for {angles:?} was {}",
                q.norm()
            );
        }
    }

    // ── Euler round-trip ────────────────────────────────────────────────────

    #[test]
    fn euler_roundtrip_recovers_angles() {
        let fixtures = [
            [90.0, 0.0, 0.0],
            [10.0, 20.0, 30.0],
            [-45.0, 30.0, -120.0],
            [0.5, -0.25, 179.0],
        ];
        for angles in fixtures {
            let back = Quaternion::from_euler_xyz_degrees(angles).to_euler_xyz_degrees();
            for axis in 0..3 {
                assert!(
                    (back[axis] - angles[axis]).abs() < 1e-9,
                    "axis {axis} of {angles:?}: got {back:?}"
                );
            }
        }
    }

    // ── Quaternion algebra ──────────────────────────────────────────────────

    #[test]
    fn conjugate_is_inverse() {
        let q = Quaternion::from_euler_xyz_degrees([10.0, 20.0, 30.0]);
        let prod = q.mul(q.conjugate());
        assert_close(prod.w, 1.0, "w");
        assert_close(prod.x, 0.0, "x");
        assert_close(prod.y, 0.0, "y");
        assert_close(prod.z, 0.0, "z");
    }

    #[test]
    fn xyzw_reorders_components() {
        let q = Quaternion::new(0.4, 0.1, 0.2, 0.3);
        assert_eq!(q.to_xyzw(), [0.1, 0.2, 0.3, 0.4]);
    }
}
