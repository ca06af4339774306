// MODEL: Orientation data and the pure conversion steps
pub mod camera;
pub mod device;
pub mod rotation;
pub mod screen;
pub mod snapshot;

pub use camera::{BlendedRotation, CameraPose};
pub use device::{AxisOffsets, DeviceAngles, DeviceOrientationSampler, DeviceReading};
pub use rotation::{compose, device_euler, ComposedRotation, FRAME_CORRECTION};
pub use screen::{ScreenOrientationAngle, ScreenReading};
pub use snapshot::OrientationSnapshot;
