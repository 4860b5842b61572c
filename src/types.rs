use crate::config::REDACTED;
use std::fmt;

/// A credential value that must never be printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Hand the raw value to whatever needs it (an upload client).
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Soil moisture sensor readings recorded at the two ends of the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationSettings {
    /// Raw reading in completely dry soil (0 %RH)
    pub dry_reading: i32,
    /// Raw reading in completely wet soil (100 %RH)
    pub wet_reading: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThingSpeakCredentials {
    pub channel_id: u64,
    /// Write API key of the channel
    pub api_key: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WundergroundCredentials {
    /// Personal weather station ID
    pub station_id: String,
    /// Account password
    pub password: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherCloudCredentials {
    pub device_id: String,
    pub device_key: Secret,
    /// Software type token, assigned by WeatherCloud staff
    pub api_token: Secret,
}

/// Credentials for every upload destination. The services are independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSet {
    pub thingspeak: ThingSpeakCredentials,
    pub wunderground: WundergroundCredentials,
    pub weathercloud: WeatherCloudCredentials,
}

/// Validated station configuration. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    pub calibration: CalibrationSettings,
    pub credentials: CredentialSet,
}

#[cfg(test)]
pub(crate) fn sample_config() -> StationConfig {
    StationConfig {
        calibration: CalibrationSettings {
            dry_reading: 3100,
            wet_reading: 1250,
        },
        credentials: CredentialSet {
            thingspeak: ThingSpeakCredentials {
                channel_id: 1_234_567,
                api_key: Secret::new("TSWRITEKEY123456"),
            },
            wunderground: WundergroundCredentials {
                station_id: "KCASANFR42".to_string(),
                password: Secret::new("wu-hunter2"),
            },
            weathercloud: WeatherCloudCredentials {
                device_id: "wc-device-7".to_string(),
                device_key: Secret::new("wc-device-key"),
                api_token: Secret::new("wc-software-token"),
            },
        },
    }
}
