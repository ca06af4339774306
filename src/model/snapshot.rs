use super::device::{AxisOffsets, DeviceAngles};
use super::rotation::ComposedRotation;
use super::screen::ScreenOrientationAngle;

/// Read-only view of one composition step, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSnapshot {
    pub enabled: bool,
    pub device: DeviceAngles,
    pub offsets: AxisOffsets,
    pub screen: ScreenOrientationAngle,
    /// Raw angle in degrees from the last screen reading, if any
    pub screen_source_angle: Option<f64>,
    pub rotation: ComposedRotation,
}

impl Default for OrientationSnapshot {
    fn default() -> Self {
        Self {
            enabled: false,
            device: DeviceAngles::ZERO,
            offsets: AxisOffsets::ZERO,
            screen: ScreenOrientationAngle::default(),
            screen_source_angle: None,
            rotation: ComposedRotation::IDENTITY,
        }
    }
}
