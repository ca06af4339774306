use std::f32::consts::FRAC_1_SQRT_2;

use glam::{EulerRot, Mat3, Quat, Vec3};

use super::device::{AxisOffsets, DeviceAngles};
use super::screen::ScreenOrientationAngle;

/// -90° around X. The sensor frame has Z pointing out of the screen while
/// the world frame looks down -Z with Y up.
pub const FRAME_CORRECTION: Quat = Quat::from_xyzw(-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);

const GIMBAL_LOCK_THRESHOLD: f32 = 0.9999999;

/// Orientation produced by [`compose`]. Never edited in place; a new one is
/// composed whenever the inputs change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposedRotation(Quat);

impl ComposedRotation {
    pub const IDENTITY: Self = Self(Quat::IDENTITY);

    pub fn quat(self) -> Quat {
        self.0
    }

    /// Euler angles `(x, y, z)` extracted in Y-X-Z order.
    ///
    /// At ±90° pitch (device lying flat) yaw and roll are not separable;
    /// all of it is reported as yaw and roll is 0.
    pub fn euler_yxz(self) -> Vec3 {
        let m = Mat3::from_quat(self.0);
        let m23 = m.z_axis.y;
        let x = (-m23.clamp(-1.0, 1.0)).asin();

        if m23.abs() < GIMBAL_LOCK_THRESHOLD {
            Vec3::new(x, m.z_axis.x.atan2(m.z_axis.z), m.x_axis.y.atan2(m.y_axis.y))
        } else {
            Vec3::new(x, (-m.x_axis.z).atan2(m.x_axis.x), 0.0)
        }
    }
}

impl From<Quat> for ComposedRotation {
    fn from(q: Quat) -> Self {
        Self(q.normalize())
    }
}

/// Euler triple `(x, y, z)` in Y-X-Z order fed into the composition.
///
/// The device reports Z-X-Y (alpha, beta, gamma); remapped that becomes
/// `x = beta`, `y = alpha`, `z = -gamma`.
pub fn device_euler(angles: &DeviceAngles, offsets: &AxisOffsets) -> Vec3 {
    let alpha = angles.alpha + offsets.alpha;
    let beta = angles.beta + offsets.beta;
    let gamma = angles.gamma + offsets.gamma;
    Vec3::new(beta, alpha, -gamma)
}

/// Combine device angles, axis offsets and the screen rotation into a
/// single orientation: `device · FRAME_CORRECTION · Rz(-screen)`.
pub fn compose(angles: &DeviceAngles, screen: ScreenOrientationAngle, offsets: &AxisOffsets) -> ComposedRotation {
    let euler = device_euler(angles, offsets);
    let device = Quat::from_euler(EulerRot::YXZ, euler.y, euler.x, euler.z);
    let screen_correction = Quat::from_axis_angle(Vec3::Z, -screen.radians());

    ComposedRotation::from(device * FRAME_CORRECTION * screen_correction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceOrientationSampler;

    const EPS: f32 = 1e-5;

    fn degrees(alpha: f32, beta: f32, gamma: f32) -> DeviceAngles {
        DeviceOrientationSampler::new().sample(Some(alpha), Some(beta), Some(gamma))
    }

    #[test]
    fn test_neutral_inputs_give_frame_correction() {
        let rotation = compose(&DeviceAngles::ZERO, ScreenOrientationAngle::Portrait, &AxisOffsets::ZERO);
        let golden = Quat::from_xyzw(-0.70710677, 0.0, 0.0, 0.70710677);

        assert!(rotation.quat().abs_diff_eq(golden, EPS), "got {:?}", rotation.quat());
        assert!((rotation.quat().length() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let angles = degrees(37.0, 61.0, -12.0);
        let offsets = AxisOffsets::from_degrees(5.0, -3.0, 1.0);
        let first = compose(&angles, ScreenOrientationAngle::LandscapeSecondary, &offsets);
        let second = compose(&angles, ScreenOrientationAngle::LandscapeSecondary, &offsets);

        assert_eq!(first.quat().to_array(), second.quat().to_array());
    }

    #[test]
    fn test_flat_device_looks_at_floor() {
        let rotation = compose(&DeviceAngles::ZERO, ScreenOrientationAngle::Portrait, &AxisOffsets::ZERO);
        let forward = rotation.quat() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Y, EPS), "forward {forward:?}");
    }

    #[test]
    fn test_upright_device_looks_ahead() {
        let rotation = compose(&degrees(0.0, 90.0, 0.0), ScreenOrientationAngle::Portrait, &AxisOffsets::ZERO);
        assert!((rotation.quat() * Vec3::NEG_Z).abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!((rotation.quat() * Vec3::Y).abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn test_heading_turns_left() {
        let rotation = compose(&degrees(90.0, 90.0, 0.0), ScreenOrientationAngle::Portrait, &AxisOffsets::ZERO);
        let forward = rotation.quat() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_X, EPS), "forward {forward:?}");
    }

    #[test]
    fn test_landscape_rolls_camera_up_vector() {
        let upright = degrees(0.0, 90.0, 0.0);

        let primary = compose(&upright, ScreenOrientationAngle::LandscapePrimary, &AxisOffsets::ZERO);
        assert!((primary.quat() * Vec3::Y).abs_diff_eq(Vec3::X, EPS));
        assert!((primary.quat() * Vec3::NEG_Z).abs_diff_eq(Vec3::NEG_Z, EPS));

        let secondary = compose(&upright, ScreenOrientationAngle::LandscapeSecondary, &AxisOffsets::ZERO);
        assert!((secondary.quat() * Vec3::Y).abs_diff_eq(Vec3::NEG_X, EPS));
    }

    #[test]
    fn test_upside_down_portrait_matches_portrait() {
        use crate::model::ScreenReading;

        let angles = degrees(20.0, 70.0, 5.0);
        let flipped = ScreenOrientationAngle::normalize(Some(&ScreenReading::angle(180.0)));
        let portrait = ScreenOrientationAngle::normalize(Some(&ScreenReading::kind("portrait-primary")));

        assert_eq!(
            compose(&angles, flipped, &AxisOffsets::ZERO),
            compose(&angles, portrait, &AxisOffsets::ZERO),
        );
    }

    #[test]
    fn test_offsets_are_additive_on_euler_terms() {
        let (a, b, g) = (40.0, 25.0, -10.0);
        let (da, db, dg) = (15.0, -5.0, 7.5);

        let with_offsets = device_euler(&degrees(a, b, g), &AxisOffsets::from_degrees(da, db, dg));
        let pre_added = device_euler(&degrees(a + da, b + db, g + dg), &AxisOffsets::ZERO);

        assert!(with_offsets.abs_diff_eq(pre_added, EPS), "{with_offsets:?} vs {pre_added:?}");
        assert!((with_offsets.z + (g + dg).to_radians()).abs() < EPS);
    }

    #[test]
    fn test_euler_extraction_at_gimbal_lock_is_finite() {
        let euler = ComposedRotation::from(FRAME_CORRECTION).euler_yxz();
        assert!(euler.is_finite());
        assert!((euler.x + std::f32::consts::FRAC_PI_2).abs() < 1e-3);
        assert_eq!(euler.z, 0.0);
    }

    #[test]
    fn test_euler_extraction_matches_composition() {
        let q = Quat::from_euler(EulerRot::YXZ, 0.4, -0.3, 0.2);
        let euler = ComposedRotation::from(q).euler_yxz();
        assert!(euler.abs_diff_eq(Vec3::new(-0.3, 0.4, 0.2), EPS), "{euler:?}");
    }

    #[test]
    fn test_euler_extraction_round_trips_yaw() {
        let rotation = ComposedRotation::from(Quat::from_rotation_y(0.75));
        let euler = rotation.euler_yxz();
        assert!(euler.abs_diff_eq(Vec3::new(0.0, 0.75, 0.0), EPS));
    }
}
