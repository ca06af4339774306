/// Platform-agnostic input events
use serde::Deserialize;

use crate::model::{DeviceReading, ScreenReading};

/// Everything the controls react to, in the order the host delivered it.
///
/// Also the schema of a recorded trace, hence the serde tagging.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    // Sensors
    DeviceOrientation {
        alpha: Option<f32>,
        beta: Option<f32>,
        gamma: Option<f32>,
    },
    ScreenOrientation {
        angle: Option<f64>,
        kind: Option<String>,
        /// false when the host exposes no orientation API at all
        #[serde(default = "default_true")]
        supported: bool,
    },

    // Mouse
    MouseDown { button: MouseButton, screen_x: f32, screen_y: f32 },
    MouseMove {
        screen_x: f32,
        screen_y: f32,
        #[serde(default)]
        movement_x: f32,
        #[serde(default)]
        movement_y: f32,
    },
    MouseUp,

    // Touch
    TouchStart { touches: u32, page_x: f32, page_y: f32 },
    TouchMove { page_x: f32, page_y: f32 },
    TouchEnd,

    // Pointer lock
    PointerLockChanged { locked: bool },
    PointerLockError,

    // Immersive session
    XrSessionChanged { active: bool },
}

fn default_true() -> bool {
    true
}

impl InputEvent {
    pub fn device_reading(&self) -> Option<DeviceReading> {
        match *self {
            InputEvent::DeviceOrientation { alpha, beta, gamma } => Some(DeviceReading { alpha, beta, gamma }),
            _ => None,
        }
    }

    /// Screen reading carried by a `ScreenOrientation` event. The outer
    /// `None` means the event is something else; the inner one means the
    /// host has no orientation API.
    pub fn screen_reading(&self) -> Option<Option<ScreenReading>> {
        match self {
            InputEvent::ScreenOrientation { angle, kind, supported } => Some(supported.then(|| ScreenReading {
                angle: *angle,
                kind: kind.clone(),
            })),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use wasm_bindgen::JsValue;
    use web_sys::{DeviceOrientationEvent, MouseEvent, TouchEvent, Window};

    /// Fields that are null or missing from the payload both become `None`.
    pub fn device_orientation_to_input(e: &DeviceOrientationEvent) -> InputEvent {
        InputEvent::DeviceOrientation {
            alpha: e.alpha().map(|v| v as f32),
            beta: e.beta().map(|v| v as f32),
            gamma: e.gamma().map(|v| v as f32),
        }
    }

    /// Read the current screen orientation, preferring `screen.orientation`
    /// over the deprecated `window.orientation`.
    pub fn screen_orientation_to_input(window: &Window) -> InputEvent {
        match read_screen_orientation(window) {
            Some((angle, kind)) => InputEvent::ScreenOrientation { angle, kind, supported: true },
            None => InputEvent::ScreenOrientation { angle: None, kind: None, supported: false },
        }
    }

    pub fn read_screen_orientation(window: &Window) -> Option<(Option<f64>, Option<String>)> {
        if let Ok(screen) = window.screen() {
            let orientation = screen.orientation();
            if !orientation.is_undefined() && !orientation.is_null() {
                let angle = orientation.angle().ok().map(f64::from);
                let kind = orientation.type_().ok().and_then(orientation_type_name);
                return Some((angle, kind));
            }
        }

        // Deprecated window.orientation
        let legacy = js_sys::Reflect::get(window, &JsValue::from_str("orientation")).ok()?;
        legacy.as_f64().map(|angle| (Some(angle), None))
    }

    fn orientation_type_name(kind: web_sys::OrientationType) -> Option<String> {
        use web_sys::OrientationType;
        let name = match kind {
            OrientationType::PortraitPrimary => "portrait-primary",
            OrientationType::PortraitSecondary => "portrait-secondary",
            OrientationType::LandscapePrimary => "landscape-primary",
            OrientationType::LandscapeSecondary => "landscape-secondary",
            _ => return None,
        };
        Some(name.to_string())
    }

    pub fn mouse_down_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseDown {
            button: MouseButton::from_web_button(e.button()),
            screen_x: e.screen_x() as f32,
            screen_y: e.screen_y() as f32,
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            screen_x: e.screen_x() as f32,
            screen_y: e.screen_y() as f32,
            movement_x: e.movement_x() as f32,
            movement_y: e.movement_y() as f32,
        }
    }

    pub fn touch_start_to_input(e: &TouchEvent) -> Option<InputEvent> {
        let touches = e.touches();
        let first = touches.get(0)?;
        Some(InputEvent::TouchStart {
            touches: touches.length(),
            page_x: first.page_x() as f32,
            page_y: first.page_y() as f32,
        })
    }

    pub fn touch_move_to_input(e: &TouchEvent) -> Option<InputEvent> {
        let first = e.touches().get(0)?;
        Some(InputEvent::TouchMove {
            page_x: first.page_x() as f32,
            page_y: first.page_y() as f32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Trace {
        events: Vec<InputEvent>,
    }

    #[test]
    fn test_events_parse_from_toml() {
        let trace: Trace = toml::from_str(
            r#"
            [[events]]
            type = "device_orientation"
            alpha = 10.0
            beta = 20.0

            [[events]]
            type = "screen_orientation"
            angle = 90.0

            [[events]]
            type = "mouse_down"
            button = "left"
            screen_x = 5.0
            screen_y = 6.0

            [[events]]
            type = "touch_end"
            "#,
        )
        .unwrap();

        assert_eq!(
            trace.events[0],
            InputEvent::DeviceOrientation { alpha: Some(10.0), beta: Some(20.0), gamma: None }
        );
        assert_eq!(
            trace.events[1].screen_reading(),
            Some(Some(ScreenReading::angle(90.0)))
        );
        assert!(matches!(trace.events[2], InputEvent::MouseDown { button: MouseButton::Left, .. }));
        assert_eq!(trace.events[3], InputEvent::TouchEnd);
    }

    #[test]
    fn test_unsupported_screen_api_has_no_reading() {
        let event = InputEvent::ScreenOrientation { angle: Some(90.0), kind: None, supported: false };
        assert_eq!(event.screen_reading(), Some(None));
        assert_eq!(InputEvent::MouseUp.screen_reading(), None);
    }
}
