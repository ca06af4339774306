use std::fmt;

use crate::model::{CameraPose, OrientationSnapshot};

/// Text readout of the orientation state for an on-page debug panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugReadout {
    lines: Vec<(&'static str, String)>,
}

impl DebugReadout {
    pub fn from_snapshot(snapshot: &OrientationSnapshot) -> Self {
        let device = snapshot.device;
        let offsets = snapshot.offsets;
        let source_angle = snapshot
            .screen_source_angle
            .map_or_else(|| "n/a".to_string(), |a| format!("{a:.0}"));

        Self {
            lines: vec![
                ("enabled", snapshot.enabled.to_string()),
                ("alpha", format!("{:.4}", device.alpha)),
                ("beta", format!("{:.4}", device.beta)),
                ("gamma", format!("{:.4}", device.gamma)),
                ("orientation value", format!("{:.4}", snapshot.screen.radians())),
                ("screen orientation type", snapshot.screen.label().to_string()),
                ("screen orientation angle", source_angle),
                (
                    "offsets",
                    format!("{:.4} {:.4} {:.4}", offsets.alpha, offsets.beta, offsets.gamma),
                ),
            ],
        }
    }

    pub fn with_pose(mut self, pose: &CameraPose) -> Self {
        let r = pose.rotation;
        self.lines.push(("camera", format!("x: {:.4} y: {:.4} z: {:.4}", r.pitch, r.yaw, r.roll)));
        self
    }

    pub fn lines(&self) -> &[(&'static str, String)] {
        &self.lines
    }

    #[cfg(target_arch = "wasm32")]
    pub fn write_to(&self, element: &web_sys::Element) {
        element.set_text_content(Some(&self.to_string()));
    }
}

impl fmt::Display for DebugReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in &self.lines {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}
