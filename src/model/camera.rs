use glam::{EulerRot, Quat, Vec3};

/// Camera rotation as Euler angles applied in Y-X-Z order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlendedRotation {
    /// Rotation around X
    pub pitch: f32,
    /// Rotation around Y
    pub yaw: f32,
    /// Rotation around Z
    pub roll: f32,
}

impl BlendedRotation {
    pub const ZERO: Self = Self { pitch: 0.0, yaw: 0.0, roll: 0.0 };

    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.pitch, self.yaw, self.roll)
    }
}

/// Pose handed to the renderer every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: BlendedRotation,
}

impl CameraPose {
    pub fn quaternion(&self) -> Quat {
        self.rotation.to_quat()
    }

    pub fn forward(&self) -> Vec3 {
        self.quaternion() * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.quaternion() * Vec3::Y
    }
}
