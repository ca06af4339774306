use std::f32::consts::FRAC_PI_2;

/// Raw screen orientation as reported by the host.
///
/// `angle` comes from `screen.orientation.angle` or the deprecated
/// `window.orientation`; `kind` is the `screen.orientation.type` string.
/// Either may be missing depending on which API the browser exposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenReading {
    pub angle: Option<f64>,
    pub kind: Option<String>,
}

impl ScreenReading {
    pub fn angle(degrees: f64) -> Self {
        Self { angle: Some(degrees), kind: None }
    }

    pub fn kind(kind: impl Into<String>) -> Self {
        Self { angle: None, kind: Some(kind.into()) }
    }
}

/// Canonical screen rotation relative to the device's natural orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScreenOrientationAngle {
    /// portrait-primary and portrait-secondary
    #[default]
    Portrait,
    /// landscape-primary, 90°
    LandscapePrimary,
    /// landscape-secondary, 270° / -90°
    LandscapeSecondary,
}

impl ScreenOrientationAngle {
    pub fn radians(self) -> f32 {
        match self {
            ScreenOrientationAngle::Portrait => 0.0,
            ScreenOrientationAngle::LandscapePrimary => FRAC_PI_2,
            ScreenOrientationAngle::LandscapeSecondary => -FRAC_PI_2,
        }
    }

    /// Map any raw reading onto one of the three canonical angles.
    ///
    /// The numeric angle wins over the type string when both are present.
    /// Missing or unrecognized input falls back to `Portrait` (0 rad).
    pub fn normalize(reading: Option<&ScreenReading>) -> Self {
        let Some(reading) = reading else {
            return Self::default();
        };

        reading
            .angle
            .and_then(Self::from_degrees)
            .or_else(|| reading.kind.as_deref().and_then(Self::from_type))
            .unwrap_or_else(|| {
                tracing::debug!(?reading, "unrecognized screen orientation, using 0");
                Self::default()
            })
    }

    pub fn from_degrees(degrees: f64) -> Option<Self> {
        if !degrees.is_finite() {
            return None;
        }
        let whole = degrees.round();
        if (degrees - whole).abs() > 1e-6 {
            return None;
        }
        match whole as i32 {
            // 180 is upside-down portrait; treated like portrait-primary
            0 | 180 => Some(ScreenOrientationAngle::Portrait),
            90 => Some(ScreenOrientationAngle::LandscapePrimary),
            270 | -90 => Some(ScreenOrientationAngle::LandscapeSecondary),
            _ => None,
        }
    }

    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "portrait-primary" | "portrait-secondary" => Some(ScreenOrientationAngle::Portrait),
            "landscape-primary" => Some(ScreenOrientationAngle::LandscapePrimary),
            "landscape-secondary" => Some(ScreenOrientationAngle::LandscapeSecondary),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScreenOrientationAngle::Portrait => "portrait",
            ScreenOrientationAngle::LandscapePrimary => "landscape-primary",
            ScreenOrientationAngle::LandscapeSecondary => "landscape-secondary",
        }
    }
}
