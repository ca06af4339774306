use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

// Import from the library crate
use magic_window::{
    config::ControlsConfig,
    controller::{self, EventQueue, FrameLoopContext, InputEvent, ScriptedSource},
    logging,
    model::{AxisOffsets, ScreenReading},
    view::DebugReadout,
};

/// Replays a recorded event trace through the controls and logs the pose
/// produced on every frame.
///
/// Usage: `magic-window <trace.toml> [config.toml]`
fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(trace_path) = args.next().map(PathBuf::from) else {
        bail!("usage: magic-window <trace.toml> [config.toml]");
    };
    let config = match args.next() {
        Some(path) => ControlsConfig::load(Path::new(&path))?,
        None => ControlsConfig::default(),
    };
    logging::init(&config.log);

    let trace = Trace::load(&trace_path)?;
    let queue = EventQueue::new();
    let source = ScriptedSource::new(trace.screen_reading());
    let mut ctx = controller::build_frame_loop(Box::new(source), queue.clone(), &config, trace.canvas_width);

    info!(path = ?trace_path, steps = trace.steps.len(), "replaying trace");
    for (index, step) in trace.steps.into_iter().enumerate() {
        match step {
            Step::Input(event) => queue.push(event),
            Step::Frame => run_frame(&mut ctx),
            Step::SetEnabled(enabled) => ctx.look.set_enabled(enabled),
            Step::SetTracking(tracking) => ctx.look.set_device_orientation_tracking(tracking),
            Step::SetOffsets(offsets) => ctx.look.orientation_mut().set_offsets(offsets),
        }
        tracing::trace!(index, "step applied");
    }
    if !queue.is_empty() {
        run_frame(&mut ctx);
    }

    println!("{}", DebugReadout::from_snapshot(&ctx.look.snapshot()).with_pose(&ctx.look.pose()));
    Ok(())
}

fn run_frame(ctx: &mut FrameLoopContext) {
    let output = ctx.update();
    let q = output.quaternion;
    info!(
        frame = ctx.frame_count(),
        pitch = output.pose.rotation.pitch,
        yaw = output.pose.rotation.yaw,
        roll = output.pose.rotation.roll,
        quat = ?[q.x, q.y, q.z, q.w],
        "frame"
    );
}

#[derive(Debug, Deserialize)]
struct TraceFile {
    /// Screen angle in degrees reported when the page loads
    screen_angle: Option<f64>,
    screen_type: Option<String>,
    #[serde(default = "default_canvas_width")]
    canvas_width: f32,
    #[serde(default)]
    events: Vec<toml::Value>,
}

fn default_canvas_width() -> f32 {
    800.0
}

enum Step {
    Input(InputEvent),
    Frame,
    SetEnabled(bool),
    SetTracking(bool),
    SetOffsets(AxisOffsets),
}

struct Trace {
    screen_angle: Option<f64>,
    screen_type: Option<String>,
    canvas_width: f32,
    steps: Vec<Step>,
}

impl Trace {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading trace {}", path.display()))?;
        let file: TraceFile = toml::from_str(&text).with_context(|| format!("parsing trace {}", path.display()))?;

        let steps = file
            .events
            .into_iter()
            .enumerate()
            .map(|(i, value)| parse_step(value).with_context(|| format!("trace event #{i}")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            screen_angle: file.screen_angle,
            screen_type: file.screen_type,
            canvas_width: file.canvas_width,
            steps,
        })
    }

    fn screen_reading(&self) -> Option<ScreenReading> {
        if self.screen_angle.is_none() && self.screen_type.is_none() {
            return None;
        }
        Some(ScreenReading {
            angle: self.screen_angle,
            kind: self.screen_type.clone(),
        })
    }
}

fn flag(value: &toml::Value, key: &str) -> Result<bool> {
    value
        .get(key)
        .and_then(toml::Value::as_bool)
        .with_context(|| format!("missing boolean `{key}`"))
}

fn degrees(value: &toml::Value, key: &str) -> Result<f32> {
    let degrees = value
        .get(key)
        .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
        .with_context(|| format!("missing numeric `{key}`"))?;
    Ok(degrees as f32)
}

/// Control steps are handled here; everything else must be an `InputEvent`.
fn parse_step(value: toml::Value) -> Result<Step> {
    let kind = value.get("type").and_then(toml::Value::as_str).unwrap_or_default().to_string();
    let step = match kind.as_str() {
        "frame" => Step::Frame,
        "set_enabled" => Step::SetEnabled(flag(&value, "enabled")?),
        "set_tracking" => Step::SetTracking(flag(&value, "tracking")?),
        "set_offsets" => Step::SetOffsets(AxisOffsets::from_degrees(
            degrees(&value, "alpha")?,
            degrees(&value, "beta")?,
            degrees(&value, "gamma")?,
        )),
        _ => Step::Input(value.try_into()?),
    };
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(text: &str) -> Result<Step> {
        parse_step(toml::from_str::<toml::Value>(text)?)
    }

    #[test]
    fn test_offsets_step_reads_degrees() {
        let Step::SetOffsets(offsets) = step("type = \"set_offsets\"\nalpha = 90\nbeta = 0.0\ngamma = -45.0").unwrap() else {
            panic!("expected offsets step");
        };
        assert!((offsets.alpha - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((offsets.gamma + std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn test_offsets_step_rejects_missing_axis() {
        assert!(step("type = \"set_offsets\"\nalpha = 10.0\nbeta = 0.0").is_err());
        assert!(step("type = \"set_offsets\"\nalpha = \"ten\"\nbeta = 0.0\ngamma = 0.0").is_err());
    }

    #[test]
    fn test_other_types_parse_as_input() {
        assert!(matches!(step("type = \"mouse_up\"").unwrap(), Step::Input(InputEvent::MouseUp)));
        assert!(matches!(step("type = \"set_enabled\"\nenabled = false").unwrap(), Step::SetEnabled(false)));
    }
}
