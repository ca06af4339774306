use tracing::{debug, info, warn};

use super::source::OrientationSource;
use crate::config::OrientationConfig;
use crate::model::{
    compose, AxisOffsets, ComposedRotation, DeviceAngles, DeviceOrientationSampler, DeviceReading, OrientationSnapshot,
    ScreenOrientationAngle, ScreenReading,
};

/// Turns sensor events into a composed orientation.
///
/// Setters only record state; [`DeviceOrientationControls::update`] is the
/// single place where the rotation is recomposed.
pub struct DeviceOrientationControls {
    source: Box<dyn OrientationSource>,
    sampler: DeviceOrientationSampler,
    screen: ScreenOrientationAngle,
    screen_reading: Option<ScreenReading>,
    offsets: AxisOffsets,
    enabled: bool,
    reset_on_disable: bool,
    last: OrientationSnapshot,
}

impl DeviceOrientationControls {
    pub fn new(source: Box<dyn OrientationSource>, config: &OrientationConfig) -> Self {
        let mut controls = Self {
            source,
            sampler: DeviceOrientationSampler::new(),
            screen: ScreenOrientationAngle::default(),
            screen_reading: None,
            offsets: AxisOffsets::from_degrees(
                config.alpha_offset_deg,
                config.beta_offset_deg,
                config.gamma_offset_deg,
            ),
            enabled: false,
            reset_on_disable: config.reset_on_disable,
            last: OrientationSnapshot::default(),
        };

        let initial = controls.source.screen_orientation();
        controls.on_screen_orientation_change(initial);
        controls.set_enabled(config.enabled);
        controls.last = controls.snapshot();
        controls
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Subscribe to or detach from the device orientation source.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            if let Err(err) = self.source.subscribe_device_orientation() {
                warn!(%err, "device orientation unavailable");
            }
        } else {
            self.source.unsubscribe_device_orientation();
            if self.reset_on_disable {
                self.sampler.reset();
            }
        }
        self.enabled = enabled;
    }

    pub fn is_subscribed(&self) -> bool {
        self.source.is_subscribed()
    }

    pub fn device_angles(&self) -> DeviceAngles {
        self.sampler.angles()
    }

    pub fn screen_orientation(&self) -> ScreenOrientationAngle {
        self.screen
    }

    pub fn offsets(&self) -> AxisOffsets {
        self.offsets
    }

    pub fn set_offsets(&mut self, offsets: AxisOffsets) {
        self.offsets = offsets;
    }

    pub fn set_alpha_offset(&mut self, radians: f32) {
        self.offsets.alpha = radians;
    }

    pub fn set_beta_offset(&mut self, radians: f32) {
        self.offsets.beta = radians;
    }

    pub fn set_gamma_offset(&mut self, radians: f32) {
        self.offsets.gamma = radians;
    }

    /// A `deviceorientation` event. Ignored while disabled so a callback
    /// queued before unsubscribing cannot touch the angles.
    pub fn on_device_orientation(&mut self, reading: &DeviceReading) {
        if !self.enabled {
            debug!("device orientation event ignored while disabled");
            return;
        }
        self.sampler.sample_reading(reading);
    }

    /// A screen `change` or `orientationchange` event. `None` means the host
    /// exposes no orientation API.
    pub fn on_screen_orientation_change(&mut self, reading: Option<ScreenReading>) {
        if reading.is_none() {
            warn!("screen orientation API not supported, assuming 0 rad");
        }
        self.screen = ScreenOrientationAngle::normalize(reading.as_ref());
        info!(
            angle = ?reading.as_ref().and_then(|r| r.angle),
            kind = ?reading.as_ref().and_then(|r| r.kind.as_deref()),
            radians = self.screen.radians(),
            "screen orientation changed"
        );
        self.screen_reading = reading;
    }

    /// Re-read the screen orientation straight from the source.
    pub fn refresh_screen_orientation(&mut self) {
        let reading = self.source.screen_orientation();
        self.on_screen_orientation_change(reading);
    }

    /// Recompose the rotation. While disabled the rotation stays at its last
    /// composed value; everything else reflects the current state.
    pub fn update(&mut self) -> OrientationSnapshot {
        let rotation = if self.enabled {
            compose(&self.sampler.angles(), self.screen, &self.offsets)
        } else {
            self.last.rotation
        };
        self.last = self.state_with(rotation);
        self.last
    }

    pub fn last_snapshot(&self) -> OrientationSnapshot {
        self.last
    }

    fn snapshot(&self) -> OrientationSnapshot {
        self.state_with(compose(&self.sampler.angles(), self.screen, &self.offsets))
    }

    fn state_with(&self, rotation: ComposedRotation) -> OrientationSnapshot {
        OrientationSnapshot {
            enabled: self.enabled,
            device: self.sampler.angles(),
            offsets: self.offsets,
            screen: self.screen,
            screen_source_angle: self.screen_reading.as_ref().and_then(|r| r.angle),
            rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::source::ScriptedSource;
    use crate::model::FRAME_CORRECTION;
    use std::f32::consts::FRAC_PI_2;

    fn controls(config: OrientationConfig) -> DeviceOrientationControls {
        DeviceOrientationControls::new(Box::new(ScriptedSource::default()), &config)
    }

    #[test]
    fn test_update_before_any_event_is_neutral() {
        let mut c = controls(OrientationConfig::default());
        let snapshot = c.update();
        assert!(snapshot.enabled);
        assert_eq!(snapshot.device, DeviceAngles::ZERO);
        assert!(snapshot.rotation.quat().abs_diff_eq(FRAME_CORRECTION, 1e-6));
    }

    #[test]
    fn test_initial_screen_orientation_comes_from_source() {
        let source = ScriptedSource::new(Some(ScreenReading::kind("landscape-primary")));
        let c = DeviceOrientationControls::new(Box::new(source), &OrientationConfig::default());
        assert_eq!(c.screen_orientation().radians(), FRAC_PI_2);
        assert_eq!(c.last_snapshot().screen, ScreenOrientationAngle::LandscapePrimary);
    }

    #[test]
    fn test_disable_unsubscribes_and_freezes_angles() {
        let mut c = controls(OrientationConfig { reset_on_disable: false, ..Default::default() });
        assert!(c.is_subscribed());

        c.on_device_orientation(&DeviceReading::degrees(10.0, 20.0, 30.0));
        let before = c.device_angles();
        let snapshot_before = c.update();

        c.set_enabled(false);
        assert!(!c.is_subscribed());
        c.on_device_orientation(&DeviceReading::degrees(50.0, 60.0, 70.0));

        assert_eq!(c.device_angles(), before);
        let frozen = c.update();
        assert!(!frozen.enabled);
        assert_eq!(frozen.device, snapshot_before.device);
        assert_eq!(frozen.rotation, snapshot_before.rotation);
    }

    #[test]
    fn test_disabled_snapshot_shows_current_state() {
        let mut c = controls(OrientationConfig::default());
        c.on_device_orientation(&DeviceReading::degrees(10.0, 20.0, 30.0));
        let enabled = c.update();

        c.set_enabled(false);
        c.set_alpha_offset(1.0);
        c.on_screen_orientation_change(Some(ScreenReading::angle(90.0)));
        let s = c.update();

        assert!(!s.enabled);
        assert_eq!(s.device, DeviceAngles::ZERO);
        assert_eq!(s.offsets.alpha, 1.0);
        assert_eq!(s.screen, ScreenOrientationAngle::LandscapePrimary);
        assert_eq!(s.screen_source_angle, Some(90.0));
        assert_eq!(s.rotation, enabled.rotation);
        assert_eq!(c.last_snapshot(), s);
    }

    #[test]
    fn test_refresh_rereads_source() {
        let source = ScriptedSource::new(Some(ScreenReading::angle(270.0)));
        let mut c = DeviceOrientationControls::new(Box::new(source), &OrientationConfig::default());
        c.on_screen_orientation_change(Some(ScreenReading::angle(0.0)));
        assert_eq!(c.screen_orientation(), ScreenOrientationAngle::Portrait);

        c.refresh_screen_orientation();
        assert_eq!(c.screen_orientation(), ScreenOrientationAngle::LandscapeSecondary);
    }

    #[test]
    fn test_disable_resets_angles_when_configured() {
        let mut c = controls(OrientationConfig::default());
        c.on_device_orientation(&DeviceReading::degrees(10.0, 20.0, 30.0));
        c.set_enabled(false);
        assert_eq!(c.device_angles(), DeviceAngles::ZERO);

        c.set_enabled(true);
        assert!(c.is_subscribed());
        c.on_device_orientation(&DeviceReading::degrees(0.0, 90.0, 0.0));
        assert!((c.device_angles().beta - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_offsets_apply_on_next_update_only() {
        let mut c = controls(OrientationConfig::default());
        let before = c.update();

        c.set_alpha_offset(0.5);
        assert_eq!(c.last_snapshot(), before);

        let after = c.update();
        assert_eq!(after.offsets.alpha, 0.5);
        assert_ne!(after.rotation, before.rotation);
    }

    #[test]
    fn test_configured_offsets_are_degrees() {
        let c = controls(OrientationConfig { beta_offset_deg: 90.0, ..Default::default() });
        assert!((c.offsets().beta - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_unsupported_screen_api_falls_back_to_zero() {
        let mut c = controls(OrientationConfig::default());
        c.on_screen_orientation_change(Some(ScreenReading::angle(90.0)));
        assert_eq!(c.screen_orientation(), ScreenOrientationAngle::LandscapePrimary);

        c.on_screen_orientation_change(None);
        assert_eq!(c.screen_orientation().radians(), 0.0);
        assert_eq!(c.update().screen_source_angle, None);
    }
}
