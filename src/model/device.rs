/// Device orientation in radians, following the W3C alpha/beta/gamma axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceAngles {
    /// Compass heading around Z
    pub alpha: f32,
    /// Front-back tilt around X
    pub beta: f32,
    /// Left-right tilt around Y
    pub gamma: f32,
}

impl DeviceAngles {
    pub const ZERO: Self = Self { alpha: 0.0, beta: 0.0, gamma: 0.0 };

    pub fn new(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self { alpha, beta, gamma }
    }
}

/// Per-axis radian offsets added to the device angles before composition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisOffsets {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

impl AxisOffsets {
    pub const ZERO: Self = Self { alpha: 0.0, beta: 0.0, gamma: 0.0 };

    pub fn new(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self { alpha, beta, gamma }
    }

    pub fn from_degrees(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self::new(alpha.to_radians(), beta.to_radians(), gamma.to_radians())
    }
}

/// Raw `deviceorientation` payload in degrees. `None` means the field was
/// null or missing, which happens when permission is denied or revoked.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceReading {
    pub alpha: Option<f32>,
    pub beta: Option<f32>,
    pub gamma: Option<f32>,
}

impl DeviceReading {
    pub fn degrees(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self { alpha: Some(alpha), beta: Some(beta), gamma: Some(gamma) }
    }
}

/// Holds the latest device angles and converts raw readings into them.
#[derive(Debug, Clone, Default)]
pub struct DeviceOrientationSampler {
    angles: DeviceAngles,
}

impl DeviceOrientationSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angles(&self) -> DeviceAngles {
        self.angles
    }

    pub fn reset(&mut self) {
        self.angles = DeviceAngles::ZERO;
    }

    /// Store a new reading. A sample with any null or non-finite axis is
    /// invalid as a whole and zeroes all three angles.
    pub fn sample(&mut self, alpha: Option<f32>, beta: Option<f32>, gamma: Option<f32>) -> DeviceAngles {
        let valid = |v: Option<f32>| v.filter(|d| d.is_finite());

        self.angles = match (valid(alpha), valid(beta), valid(gamma)) {
            (Some(a), Some(b), Some(g)) => DeviceAngles::new(a.to_radians(), b.to_radians(), g.to_radians()),
            _ => {
                tracing::debug!(?alpha, ?beta, ?gamma, "device orientation unavailable, zeroing angles");
                DeviceAngles::ZERO
            }
        };
        self.angles
    }

    pub fn sample_reading(&mut self, reading: &DeviceReading) -> DeviceAngles {
        self.sample(reading.alpha, reading.beta, reading.gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_converts_to_radians() {
        let mut sampler = DeviceOrientationSampler::new();
        let angles = sampler.sample(Some(180.0), Some(90.0), Some(-45.0));

        assert!((angles.alpha - std::f32::consts::PI).abs() < 1e-6);
        assert!((angles.beta - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((angles.gamma + std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert_eq!(sampler.angles(), angles);
    }

    #[test]
    fn test_any_null_axis_zeroes_everything() {
        let mut sampler = DeviceOrientationSampler::new();
        for (a, b, g) in [
            (None, Some(10.0), Some(20.0)),
            (Some(10.0), None, Some(20.0)),
            (Some(10.0), Some(20.0), None),
            (None, None, None),
        ] {
            sampler.sample(Some(30.0), Some(40.0), Some(50.0));
            assert_eq!(sampler.sample(a, b, g), DeviceAngles::ZERO);
            assert_eq!(sampler.angles(), DeviceAngles::ZERO);
        }
    }

    #[test]
    fn test_non_finite_axis_is_invalid() {
        let mut sampler = DeviceOrientationSampler::new();
        sampler.sample(Some(30.0), Some(40.0), Some(50.0));
        assert_eq!(sampler.sample(Some(f32::NAN), Some(1.0), Some(1.0)), DeviceAngles::ZERO);
        assert_eq!(sampler.sample_reading(&DeviceReading::default()), DeviceAngles::ZERO);
    }
}
