use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};
use tracing::{debug, info, warn};

use super::input::{InputEvent, MouseButton};
use super::orientation_controls::DeviceOrientationControls;
use crate::config::LookConfig;
use crate::model::{BlendedRotation, CameraPose, ComposedRotation, OrientationSnapshot};

/// Fold an angle difference into (-π, π].
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Blends the device orientation with manual drag rotation.
///
/// Yaw from the sensor is accumulated as frame-to-frame deltas so that a
/// jump in absolute heading does not throw away the yaw the user dragged.
#[derive(Debug, Clone, Default)]
pub struct LookBlender {
    previous_yaw: Option<f32>,
    /// pitch (x), accumulated yaw (y), roll (z)
    delta: Vec3,
}

impl LookBlender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, composed: &ComposedRotation, manual_pitch: f32, manual_yaw: f32) -> BlendedRotation {
        let absolute = composed.euler_yxz();

        // First sample only sets the baseline
        let step = self.previous_yaw.map_or(0.0, |previous| wrap_angle(absolute.y - previous));
        self.previous_yaw = Some(absolute.y);
        self.delta = Vec3::new(absolute.x, self.delta.y + step, absolute.z);

        BlendedRotation::new(
            self.delta.x + manual_pitch.clamp(-FRAC_PI_2, FRAC_PI_2),
            self.delta.y + manual_yaw,
            self.delta.z,
        )
    }

    pub fn delta_yaw(&self) -> f32 {
        self.delta.y
    }

    pub fn reset(&mut self) {
        self.previous_yaw = None;
        self.delta = Vec3::ZERO;
    }
}

/// Camera pose from mouse drag, touch drag and device orientation, with
/// the pose handed over to an immersive session while one is active.
pub struct LookControls {
    orientation: DeviceOrientationControls,
    blender: LookBlender,
    config: LookConfig,
    enabled: bool,
    xr_mode: bool,

    manual_pitch: f32,
    manual_yaw: f32,
    pose: CameraPose,
    saved_pose: Option<CameraPose>,

    mouse_down: bool,
    pointer_locked: bool,
    previous_mouse: Vec2,
    touch_start: Option<Vec2>,
    canvas_width: f32,
}

impl LookControls {
    pub fn new(orientation: DeviceOrientationControls, config: LookConfig, canvas_width: f32) -> Self {
        let xr_mode = config.xr_mode;
        let mut controls = Self {
            orientation,
            blender: LookBlender::new(),
            config,
            enabled: true,
            xr_mode: false,
            manual_pitch: 0.0,
            manual_yaw: 0.0,
            pose: CameraPose::default(),
            saved_pose: None,
            mouse_down: false,
            pointer_locked: false,
            previous_mouse: Vec2::ZERO,
            touch_start: None,
            canvas_width,
        };
        if xr_mode {
            controls.set_xr_mode(true);
        }
        controls
    }

    pub fn orientation(&self) -> &DeviceOrientationControls {
        &self.orientation
    }

    pub fn orientation_mut(&mut self) -> &mut DeviceOrientationControls {
        &mut self.orientation
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.mouse_down = false;
            self.touch_start = None;
        }
        self.orientation.set_enabled(enabled);
        self.enabled = enabled;
    }

    pub fn xr_mode(&self) -> bool {
        self.xr_mode
    }

    /// Entering saves the current pose and zeroes it; leaving restores the
    /// saved pose exactly once.
    pub fn set_xr_mode(&mut self, active: bool) {
        if active == self.xr_mode {
            return;
        }
        self.xr_mode = active;
        if active {
            self.saved_pose = Some(self.pose);
            self.pose = CameraPose::default();
            info!("entered XR, pose delegated");
        } else if let Some(saved) = self.saved_pose.take() {
            self.pose = saved;
            info!("left XR, pose restored");
        }
    }

    pub fn device_orientation_tracking(&self) -> bool {
        self.config.device_orientation_tracking
    }

    pub fn set_device_orientation_tracking(&mut self, tracking: bool) {
        self.config.device_orientation_tracking = tracking;
        if !tracking {
            self.blender.reset();
        }
    }

    /// Whether a click may grab the pointer right now.
    pub fn pointer_lock_allowed(&self) -> bool {
        self.enabled && self.config.mouse_enabled && self.config.pointer_lock_enabled && !self.xr_mode
    }

    pub fn set_mouse_enabled(&mut self, enabled: bool) {
        self.config.mouse_enabled = enabled;
        if !enabled {
            self.mouse_down = false;
        }
    }

    pub fn set_touch_enabled(&mut self, enabled: bool) {
        self.config.touch_enabled = enabled;
        if !enabled {
            self.touch_start = None;
        }
    }

    pub fn set_reverse_mouse_drag(&mut self, reverse: bool) {
        self.config.reverse_mouse_drag = reverse;
    }

    pub fn set_reverse_touch_drag(&mut self, reverse: bool) {
        self.config.reverse_touch_drag = reverse;
    }

    pub fn set_canvas_width(&mut self, width: f32) {
        self.canvas_width = width;
    }

    /// Whether the grabbing cursor should be shown.
    pub fn is_grabbing(&self) -> bool {
        self.enabled && self.mouse_down
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    pub fn manual_rotation(&self) -> (f32, f32) {
        (self.manual_pitch, self.manual_yaw)
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn snapshot(&self) -> OrientationSnapshot {
        self.orientation.last_snapshot()
    }

    /// Process one input event. Returns true when a pointer lock should be
    /// requested; the request itself is best effort.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::DeviceOrientation { .. } => {
                if let Some(reading) = event.device_reading() {
                    self.orientation.on_device_orientation(&reading);
                }
            }
            InputEvent::ScreenOrientation { .. } => {
                if let Some(reading) = event.screen_reading() {
                    self.orientation.on_screen_orientation_change(reading);
                }
            }
            InputEvent::MouseDown { button, screen_x, screen_y } => {
                return self.on_mouse_down(*button, Vec2::new(*screen_x, *screen_y));
            }
            InputEvent::MouseMove { screen_x, screen_y, movement_x, movement_y } => {
                self.on_mouse_move(Vec2::new(*screen_x, *screen_y), Vec2::new(*movement_x, *movement_y));
            }
            InputEvent::MouseUp => self.mouse_down = false,
            InputEvent::TouchStart { touches, page_x, page_y } => {
                self.on_touch_start(*touches, Vec2::new(*page_x, *page_y));
            }
            InputEvent::TouchMove { page_x, page_y } => self.on_touch_move(Vec2::new(*page_x, *page_y)),
            InputEvent::TouchEnd => self.touch_start = None,
            InputEvent::PointerLockChanged { locked } => self.pointer_locked = *locked,
            InputEvent::PointerLockError => {
                warn!("pointer lock request failed");
                self.pointer_locked = false;
            }
            InputEvent::XrSessionChanged { active } => self.set_xr_mode(*active),
        }
        false
    }

    fn on_mouse_down(&mut self, button: MouseButton, screen: Vec2) -> bool {
        if !self.enabled || !self.config.mouse_enabled || self.xr_mode {
            return false;
        }
        if button != MouseButton::Left {
            return false;
        }
        self.mouse_down = true;
        self.previous_mouse = screen;
        self.pointer_lock_allowed() && !self.pointer_locked
    }

    fn on_mouse_move(&mut self, screen: Vec2, movement: Vec2) {
        if !self.enabled || !self.config.mouse_enabled || (!self.mouse_down && !self.pointer_locked) {
            return;
        }
        let delta = if self.pointer_locked { movement } else { screen - self.previous_mouse };
        self.previous_mouse = screen;

        let direction = if self.config.reverse_mouse_drag { 1.0 } else { -1.0 };
        let scale = self.config.mouse_sensitivity * direction;
        self.manual_yaw += delta.x * scale;
        self.manual_pitch = (self.manual_pitch + delta.y * scale).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    fn on_touch_start(&mut self, touches: u32, page: Vec2) {
        if touches != 1 || !self.config.touch_enabled || self.xr_mode {
            return;
        }
        self.touch_start = Some(page);
    }

    /// Touch drag only turns yaw.
    fn on_touch_move(&mut self, page: Vec2) {
        if !self.config.touch_enabled {
            return;
        }
        let Some(start) = self.touch_start else {
            return;
        };
        if self.canvas_width <= 0.0 {
            debug!("touch move ignored, canvas has no width");
            return;
        }
        let turn = TAU * (page.x - start.x) / self.canvas_width;
        let direction = if self.config.reverse_touch_drag { 1.0 } else { -1.0 };
        self.manual_yaw -= turn * self.config.touch_sensitivity * direction;
        self.touch_start = Some(page);
    }

    /// Per-frame update. A no-op while disabled or while an immersive
    /// session owns the pose.
    pub fn update(&mut self) -> CameraPose {
        if !self.enabled || self.xr_mode {
            // Keep the diagnostics current even though the pose is frozen
            self.orientation.update();
            return self.pose;
        }

        let snapshot = self.orientation.update();
        self.pose.rotation = if self.config.device_orientation_tracking {
            self.blender.update(&snapshot.rotation, self.manual_pitch, self.manual_yaw)
        } else {
            BlendedRotation::new(self.manual_pitch.clamp(-FRAC_PI_2, FRAC_PI_2), self.manual_yaw, 0.0)
        };
        self.pose
    }
}
