// CONTROLLER: Input events, orientation controls and the frame update
pub mod input;
pub mod source;
pub mod orientation_controls;
pub mod look_controls;
pub mod frame_loop;

pub use input::{InputEvent, MouseButton};
pub use source::{OrientationSource, ScriptedSource, SourceError};
#[cfg(target_arch = "wasm32")]
pub use source::WebOrientationSource;
pub use orientation_controls::DeviceOrientationControls;
pub use look_controls::{LookBlender, LookControls};
pub use frame_loop::{EventQueue, FrameLoopContext, FrameOutput};

use crate::config::ControlsConfig;

/// Wire up the full control stack from config.
pub fn build_frame_loop(
    source: Box<dyn OrientationSource>,
    queue: EventQueue,
    config: &ControlsConfig,
    canvas_width: f32,
) -> FrameLoopContext {
    let orientation = DeviceOrientationControls::new(source, &config.orientation);
    let look = LookControls::new(orientation, config.look.clone(), canvas_width);
    FrameLoopContext::new(queue, look)
}
