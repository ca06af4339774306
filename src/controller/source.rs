//! Injected access to the host's orientation sensors.

use thiserror::Error;

use crate::model::ScreenReading;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("{0} is not supported by this host")]
    Unsupported(&'static str),
    #[error("failed to register listener: {0}")]
    Listener(String),
}

/// Capability handed to the orientation controls instead of reaching for
/// `window`/`screen` globals.
pub trait OrientationSource {
    /// Current screen orientation, `None` when the host has no API for it.
    fn screen_orientation(&self) -> Option<ScreenReading>;

    /// Start delivering `deviceorientation` events into the event queue.
    fn subscribe_device_orientation(&mut self) -> Result<(), SourceError>;

    /// Stop delivering `deviceorientation` events. Idempotent.
    fn unsubscribe_device_orientation(&mut self);

    fn is_subscribed(&self) -> bool;
}

/// Source without a live host: the screen reading is fixed and device
/// events are pushed into the queue by whoever drives it (trace replay,
/// tests).
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    pub screen: Option<ScreenReading>,
    subscribed: bool,
    subscribe_count: u32,
}

impl ScriptedSource {
    pub fn new(screen: Option<ScreenReading>) -> Self {
        Self { screen, ..Self::default() }
    }

    pub fn subscribe_count(&self) -> u32 {
        self.subscribe_count
    }
}

impl OrientationSource for ScriptedSource {
    fn screen_orientation(&self) -> Option<ScreenReading> {
        self.screen.clone()
    }

    fn subscribe_device_orientation(&mut self) -> Result<(), SourceError> {
        if !self.subscribed {
            self.subscribed = true;
            self.subscribe_count += 1;
        }
        Ok(())
    }

    fn unsubscribe_device_orientation(&mut self) {
        self.subscribed = false;
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_subscription_is_idempotent() {
        let mut source = ScriptedSource::new(Some(ScreenReading::angle(90.0)));
        source.subscribe_device_orientation().unwrap();
        source.subscribe_device_orientation().unwrap();
        assert!(source.is_subscribed());
        assert_eq!(source.subscribe_count(), 1);

        source.unsubscribe_device_orientation();
        source.unsubscribe_device_orientation();
        assert!(!source.is_subscribed());
        assert_eq!(source.screen_orientation(), Some(ScreenReading::angle(90.0)));
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebOrientationSource;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::*;
    use crate::controller::input::wasm::{device_orientation_to_input, read_screen_orientation};
    use crate::controller::EventQueue;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{DeviceOrientationEvent, Window};

    /// Browser-backed source. The listener closure is owned here so that
    /// unsubscribing really detaches it.
    pub struct WebOrientationSource {
        window: Window,
        queue: EventQueue,
        listener: Option<Closure<dyn FnMut(DeviceOrientationEvent)>>,
    }

    impl WebOrientationSource {
        pub fn new(window: Window, queue: EventQueue) -> Self {
            Self { window, queue, listener: None }
        }
    }

    impl OrientationSource for WebOrientationSource {
        fn screen_orientation(&self) -> Option<ScreenReading> {
            read_screen_orientation(&self.window).map(|(angle, kind)| ScreenReading { angle, kind })
        }

        fn subscribe_device_orientation(&mut self) -> Result<(), SourceError> {
            if self.listener.is_some() {
                return Ok(());
            }
            let has_api = js_sys::Reflect::has(&self.window, &JsValue::from_str("DeviceOrientationEvent"))
                .unwrap_or(false);
            if !has_api {
                return Err(SourceError::Unsupported("DeviceOrientationEvent"));
            }

            let queue = self.queue.clone();
            let listener = Closure::wrap(Box::new(move |e: DeviceOrientationEvent| {
                queue.push(device_orientation_to_input(&e));
            }) as Box<dyn FnMut(DeviceOrientationEvent)>);

            self.window
                .add_event_listener_with_callback("deviceorientation", listener.as_ref().unchecked_ref())
                .map_err(|e| SourceError::Listener(format!("{e:?}")))?;
            self.listener = Some(listener);
            Ok(())
        }

        fn unsubscribe_device_orientation(&mut self) {
            if let Some(listener) = self.listener.take() {
                let _ = self
                    .window
                    .remove_event_listener_with_callback("deviceorientation", listener.as_ref().unchecked_ref());
            }
        }

        fn is_subscribed(&self) -> bool {
            self.listener.is_some()
        }
    }

    impl Drop for WebOrientationSource {
        fn drop(&mut self) {
            self.unsubscribe_device_orientation();
        }
    }
}
