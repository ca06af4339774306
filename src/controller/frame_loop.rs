use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Quat;

use super::input::InputEvent;
use super::look_controls::LookControls;
use crate::model::{CameraPose, OrientationSnapshot};

/// Events written by the host's listeners and drained once per frame.
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Rc<RefCell<VecDeque<InputEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: InputEvent) {
        self.inner.borrow_mut().push_back(event);
    }

    pub fn drain(&self) -> Vec<InputEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

/// Result of one frame, for the renderer and the debug display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    pub pose: CameraPose,
    pub quaternion: Quat,
    pub snapshot: OrientationSnapshot,
    /// A mouse down asked for pointer lock during this frame
    pub pointer_lock_requested: bool,
    pub grabbing: bool,
}

/// Per-frame state and update logic
pub struct FrameLoopContext {
    pub queue: EventQueue,
    pub look: LookControls,
    frame: u64,
}

impl FrameLoopContext {
    pub fn new(queue: EventQueue, look: LookControls) -> Self {
        Self { queue, look, frame: 0 }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Apply every queued event in arrival order, then update the pose once.
    pub fn update(&mut self) -> FrameOutput {
        let events = self.queue.drain();
        let mut pointer_lock_requested = false;
        for event in &events {
            pointer_lock_requested |= self.look.handle_event(event);
        }

        let pose = self.look.update();
        self.frame += 1;

        let output = FrameOutput {
            pose,
            quaternion: pose.quaternion(),
            snapshot: self.look.snapshot(),
            pointer_lock_requested,
            grabbing: self.look.is_grabbing(),
        };
        tracing::trace!(
            frame = self.frame,
            events = events.len(),
            pitch = pose.rotation.pitch,
            yaw = pose.rotation.yaw,
            roll = pose.rotation.roll,
            "frame updated"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LookConfig, OrientationConfig};
    use crate::controller::input::MouseButton;
    use crate::controller::orientation_controls::DeviceOrientationControls;
    use crate::controller::source::ScriptedSource;
    use crate::model::ScreenOrientationAngle;

    fn context() -> FrameLoopContext {
        let orientation = DeviceOrientationControls::new(Box::new(ScriptedSource::default()), &OrientationConfig::default());
        FrameLoopContext::new(EventQueue::new(), LookControls::new(orientation, LookConfig::default(), 640.0))
    }

    #[test]
    fn test_update_without_events_is_safe() {
        let mut ctx = context();
        let first = ctx.update();
        let second = ctx.update();
        assert_eq!(first, second);
        assert!(first.quaternion.is_finite());
        assert_eq!(ctx.frame_count(), 2);
    }

    #[test]
    fn test_events_apply_in_order() {
        let mut ctx = context();
        ctx.queue.push(InputEvent::DeviceOrientation { alpha: Some(10.0), beta: Some(90.0), gamma: Some(0.0) });
        ctx.queue.push(InputEvent::DeviceOrientation { alpha: None, beta: Some(90.0), gamma: Some(0.0) });
        ctx.queue.push(InputEvent::ScreenOrientation { angle: Some(270.0), kind: None, supported: true });
        assert_eq!(ctx.queue.len(), 3);

        let output = ctx.update();
        assert!(ctx.queue.is_empty());
        // The later null reading wins over the earlier valid one
        assert_eq!(output.snapshot.device.alpha, 0.0);
        assert_eq!(output.snapshot.screen, ScreenOrientationAngle::LandscapeSecondary);
        assert_eq!(output.snapshot.screen_source_angle, Some(270.0));
    }

    #[test]
    fn test_grab_state_is_reported() {
        let mut ctx = context();
        ctx.queue.push(InputEvent::MouseDown { button: MouseButton::Left, screen_x: 0.0, screen_y: 0.0 });
        assert!(ctx.update().grabbing);

        ctx.queue.push(InputEvent::MouseUp);
        let output = ctx.update();
        assert!(!output.grabbing);
        assert!(!output.pointer_lock_requested);
    }
}
