// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod logging;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
use std::{cell::Cell, rc::Rc};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue, prelude::wasm_bindgen};
#[cfg(target_arch = "wasm32")]
use web_sys::{Element, Event, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent};

#[cfg(target_arch = "wasm32")]
use controller::input::wasm as web_input;
#[cfg(target_arch = "wasm32")]
use controller::{EventQueue, FrameLoopContext, InputEvent, WebOrientationSource};
#[cfg(target_arch = "wasm32")]
use config::{ControlsConfig, LogConfig};
#[cfg(target_arch = "wasm32")]
use view::DebugReadout;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    logging::init(&LogConfig::default());
    Ok(())
}

/// Handle given to the page's renderer. The page owns the animation loop
/// and calls [`MagicWindow::update`] once per frame.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct MagicWindow {
    frame: FrameLoopContext,
    canvas: HtmlCanvasElement,
    debug_element: Option<Element>,
    /// Read by the mousedown listener before it grabs the pointer
    lock_allowed: Rc<Cell<bool>>,
    _listeners: Vec<Listener>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl MagicWindow {
    /// `config` is optional TOML text; missing keys take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> Result<MagicWindow, JsValue> {
        let config = match config {
            Some(text) => ControlsConfig::from_toml_str(&text).map_err(|e| js_error(e.to_string()))?,
            None => ControlsConfig::default(),
        };

        let window = web_sys::window().ok_or(js_error("no global `window`"))?;
        let queue = EventQueue::new();
        let source = WebOrientationSource::new(window.clone(), queue.clone());
        let frame = controller::build_frame_loop(Box::new(source), queue.clone(), &config, canvas.client_width() as f32);
        let lock_allowed = Rc::new(Cell::new(frame.look.pointer_lock_allowed()));
        let listeners = setup_input_listeners(&window, &canvas, &queue, lock_allowed.clone())?;

        tracing::info!(listeners = listeners.len(), "magic window controls ready");
        Ok(MagicWindow {
            frame,
            canvas,
            debug_element: None,
            lock_allowed,
            _listeners: listeners,
        })
    }

    /// Apply queued input and return the camera quaternion as `[x, y, z, w]`.
    pub fn update(&mut self) -> Vec<f32> {
        let output = self.frame.update();
        self.sync_lock_allowed();
        if output.pointer_lock_requested {
            tracing::debug!("pointer lock requested by mousedown");
        }

        let class_list = self.canvas.class_list();
        let toggled = if output.grabbing {
            class_list.add_1("grabbing-cursor")
        } else {
            class_list.remove_1("grabbing-cursor")
        };
        if let Err(err) = toggled {
            tracing::debug!(?err, "failed to toggle grabbing cursor class");
        }

        if let Some(element) = &self.debug_element {
            DebugReadout::from_snapshot(&output.snapshot).with_pose(&output.pose).write_to(element);
        }
        output.quaternion.to_array().to_vec()
    }

    /// Camera Euler angles `[x, y, z]` applied in Y-X-Z order.
    pub fn euler(&self) -> Vec<f32> {
        self.frame.look.pose().rotation.as_vec3().to_array().to_vec()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.frame.look.set_enabled(enabled);
        self.sync_lock_allowed();
    }

    pub fn set_xr_mode(&mut self, active: bool) {
        self.frame.look.set_xr_mode(active);
        self.sync_lock_allowed();
    }

    pub fn set_mouse_enabled(&mut self, enabled: bool) {
        self.frame.look.set_mouse_enabled(enabled);
        self.sync_lock_allowed();
    }

    pub fn set_touch_enabled(&mut self, enabled: bool) {
        self.frame.look.set_touch_enabled(enabled);
    }

    /// Re-read the screen orientation, e.g. after the page regains focus.
    pub fn refresh_screen_orientation(&mut self) {
        self.frame.look.orientation_mut().refresh_screen_orientation();
    }

    pub fn set_device_orientation_tracking(&mut self, tracking: bool) {
        self.frame.look.set_device_orientation_tracking(tracking);
    }

    pub fn set_reverse_mouse_drag(&mut self, reverse: bool) {
        self.frame.look.set_reverse_mouse_drag(reverse);
    }

    pub fn set_reverse_touch_drag(&mut self, reverse: bool) {
        self.frame.look.set_reverse_touch_drag(reverse);
    }

    /// Offsets take effect on the next `update`.
    pub fn set_alpha_offset_deg(&mut self, degrees: f32) {
        self.frame.look.orientation_mut().set_alpha_offset(degrees.to_radians());
    }

    pub fn set_beta_offset_deg(&mut self, degrees: f32) {
        self.frame.look.orientation_mut().set_beta_offset(degrees.to_radians());
    }

    pub fn set_gamma_offset_deg(&mut self, degrees: f32) {
        self.frame.look.orientation_mut().set_gamma_offset(degrees.to_radians());
    }

    pub fn resize(&mut self) {
        self.frame.look.set_canvas_width(self.canvas.client_width() as f32);
    }

    pub fn set_debug_element(&mut self, element: Option<Element>) {
        self.debug_element = element;
    }

    pub fn debug_text(&self) -> String {
        DebugReadout::from_snapshot(&self.frame.look.snapshot())
            .with_pose(&self.frame.look.pose())
            .to_string()
    }
}

#[cfg(target_arch = "wasm32")]
impl MagicWindow {
    fn sync_lock_allowed(&self) {
        self.lock_allowed.set(self.frame.look.pointer_lock_allowed());
    }
}

/// Event listener that detaches itself when dropped.
#[cfg(target_arch = "wasm32")]
struct Listener {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

#[cfg(target_arch = "wasm32")]
impl Listener {
    fn attach(
        target: &EventTarget,
        name: &'static str,
        mut handler: impl FnMut(&Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(move |e: Event| handler(&e)) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        Ok(Self { target: target.clone(), name, closure })
    }

    /// Listener that converts the event and pushes it onto the queue.
    fn forward(
        target: &EventTarget,
        name: &'static str,
        queue: &EventQueue,
        convert: impl Fn(&Event) -> Option<InputEvent> + 'static,
    ) -> Result<Self, JsValue> {
        let queue = queue.clone();
        Self::attach(target, name, move |e| {
            if let Some(event) = convert(e) {
                queue.push(event);
            }
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.name, self.closure.as_ref().unchecked_ref());
    }
}

/// Register screen, mouse, touch and pointer lock listeners. Device
/// orientation is handled by the orientation source so it can be toggled.
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    window: &web_sys::Window,
    canvas: &HtmlCanvasElement,
    queue: &EventQueue,
    lock_allowed: Rc<Cell<bool>>,
) -> Result<Vec<Listener>, JsValue> {
    let document = window.document().ok_or(js_error("no document on window"))?;
    let mut listeners = Vec::new();

    // Screen orientation: deprecated window event plus screen.orientation
    {
        let w = window.clone();
        listeners.push(Listener::forward(window, "orientationchange", queue, move |_| {
            Some(web_input::screen_orientation_to_input(&w))
        })?);
    }
    if let Ok(screen) = window.screen() {
        let orientation = screen.orientation();
        if !orientation.is_undefined() && !orientation.is_null() {
            let w = window.clone();
            listeners.push(Listener::forward(&orientation, "change", queue, move |_| {
                Some(web_input::screen_orientation_to_input(&w))
            })?);
        } else {
            tracing::warn!("screen.orientation not available, relying on orientationchange");
        }
    }

    // Mouse down, with best-effort pointer lock
    {
        let queue = queue.clone();
        let canvas_lock = canvas.clone();
        let document_lock = document.clone();
        listeners.push(Listener::attach(canvas, "mousedown", move |e| {
            let Some(e) = e.dyn_ref::<MouseEvent>() else { return };
            queue.push(web_input::mouse_down_to_input(e));
            if lock_allowed.get() && e.button() == 0 && document_lock.pointer_lock_element().is_none() {
                canvas_lock.request_pointer_lock();
            }
        })?);
    }
    listeners.push(Listener::forward(window, "mousemove", queue, |e| {
        e.dyn_ref::<MouseEvent>().map(web_input::mouse_move_to_input)
    })?);
    listeners.push(Listener::forward(window, "mouseup", queue, |_| Some(InputEvent::MouseUp))?);

    // Touch
    listeners.push(Listener::forward(canvas, "touchstart", queue, |e| {
        e.dyn_ref::<TouchEvent>().and_then(web_input::touch_start_to_input)
    })?);
    listeners.push(Listener::forward(window, "touchmove", queue, |e| {
        e.dyn_ref::<TouchEvent>().and_then(web_input::touch_move_to_input)
    })?);
    listeners.push(Listener::forward(window, "touchend", queue, |_| Some(InputEvent::TouchEnd))?);

    // Pointer lock state
    {
        let doc_pl = document.clone();
        listeners.push(Listener::forward(&document, "pointerlockchange", queue, move |_| {
            Some(InputEvent::PointerLockChanged { locked: doc_pl.pointer_lock_element().is_some() })
        })?);
    }
    listeners.push(Listener::forward(&document, "pointerlockerror", queue, |_| Some(InputEvent::PointerLockError))?);

    Ok(listeners)
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}
