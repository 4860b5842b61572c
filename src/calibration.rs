//! Soil moisture calibration
//!
//! The sensor is pushed about three quarters of its length into the target
//! soil and read once with the soil completely dry and once completely wet.
//! Those two raw values define a linear scale from 0 to 100 %RH.

use crate::config::{MOISTURE_DRY_PERCENT, MOISTURE_WET_PERCENT};
use crate::error::CalibrationError;
use crate::types::CalibrationSettings;

/// Validated two-point calibration for converting raw readings to %RH.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilMoistureCalibration {
    dry: i32,
    wet: i32,
}

impl SoilMoistureCalibration {
    pub fn new(settings: CalibrationSettings) -> Result<Self, CalibrationError> {
        if settings.dry_reading == settings.wet_reading {
            return Err(CalibrationError::IdenticalReadings(settings.dry_reading));
        }
        Ok(Self {
            dry: settings.dry_reading,
            wet: settings.wet_reading,
        })
    }

    /// Capacitive probes read lower the wetter the soil gets
    pub fn is_inverted(&self) -> bool {
        self.dry > self.wet
    }

    /// Linear interpolation between the endpoints, may fall outside 0..=100
    pub fn percent_unclamped(&self, raw: i32) -> f32 {
        // i64 keeps the subtraction exact for any pair of i32 readings
        let offset = raw as i64 - self.dry as i64;
        let span = self.wet as i64 - self.dry as i64;
        MOISTURE_DRY_PERCENT
            + (offset as f64 * (MOISTURE_WET_PERCENT - MOISTURE_DRY_PERCENT) as f64 / span as f64)
                as f32
    }

    /// Moisture in %RH, clamped to the calibrated range
    pub fn percent(&self, raw: i32) -> f32 {
        self.percent_unclamped(raw)
            .clamp(MOISTURE_DRY_PERCENT, MOISTURE_WET_PERCENT)
    }

    /// Raw reading expected at the given moisture
    pub fn raw_for_percent(&self, percent: f32) -> f32 {
        let span = (self.wet as i64 - self.dry as i64) as f32;
        let scale = MOISTURE_WET_PERCENT - MOISTURE_DRY_PERCENT;
        self.dry as f32 + (percent - MOISTURE_DRY_PERCENT) * span / scale
    }
}

impl TryFrom<CalibrationSettings> for SoilMoistureCalibration {
    type Error = CalibrationError;

    fn try_from(settings: CalibrationSettings) -> Result<Self, Self::Error> {
        Self::new(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibration(dry: i32, wet: i32) -> SoilMoistureCalibration {
        SoilMoistureCalibration::new(CalibrationSettings {
            dry_reading: dry,
            wet_reading: wet,
        })
        .unwrap()
    }

    #[test]
    fn identical_readings_are_rejected() {
        let result = SoilMoistureCalibration::new(CalibrationSettings {
            dry_reading: 512,
            wet_reading: 512,
        });
        assert_eq!(result, Err(CalibrationError::IdenticalReadings(512)));
    }

    #[test]
    fn rising_sensor_endpoints_and_midpoint() {
        let cal = calibration(200, 800);
        assert!(!cal.is_inverted());
        assert!((cal.percent(200) - 0.0).abs() < 1e-4);
        assert!((cal.percent(800) - 100.0).abs() < 1e-4);
        assert!((cal.percent(500) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn inverted_capacitive_sensor() {
        // Typical capacitive probe on a 12-bit ADC
        let cal = calibration(3100, 1250);
        assert!(cal.is_inverted());
        assert!((cal.percent(3100) - 0.0).abs() < 1e-4);
        assert!((cal.percent(1250) - 100.0).abs() < 1e-4);
        assert!((cal.percent(2175) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn percent_clamps_outside_calibrated_range() {
        let cal = calibration(3100, 1250);
        assert_eq!(cal.percent(3500), 0.0);
        assert_eq!(cal.percent(900), 100.0);
        assert!(cal.percent_unclamped(3500) < 0.0);
        assert!(cal.percent_unclamped(900) > 100.0);
    }

    #[test]
    fn extreme_readings_do_not_overflow() {
        let cal = calibration(i32::MIN, i32::MAX);
        assert!((cal.percent(i32::MIN) - 0.0).abs() < 1e-3);
        assert!((cal.percent(i32::MAX) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn raw_for_percent_inverts_conversion() {
        let cal = calibration(3100, 1250);
        assert!((cal.raw_for_percent(0.0) - 3100.0).abs() < 1e-2);
        assert!((cal.raw_for_percent(100.0) - 1250.0).abs() < 1e-2);
        assert!((cal.raw_for_percent(25.0) - 2637.5).abs() < 1e-2);
    }
}
