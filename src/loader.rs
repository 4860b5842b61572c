//! Station config loading
//!
//! The user copies `pws_template.json` to `pws.json` (git-ignored) and
//! replaces every `"..."` with a real value. Any field may instead come from
//! a `PWS_*` environment variable, which wins over the file. Nothing is
//! accepted until every field passes validation.

use crate::calibration::SoilMoistureCalibration;
use crate::config::{ENV_PREFIX, PLACEHOLDER};
use crate::error::{ConfigError, FieldError};
use crate::types::{
    CalibrationSettings, CredentialSet, Secret, StationConfig, ThingSpeakCredentials,
    WeatherCloudCredentials, WundergroundCredentials,
};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// A field as written by the user: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(serde_json::Number),
    Text(String),
}

impl RawValue {
    fn placeholder() -> Self {
        RawValue::Text(PLACEHOLDER.to_string())
    }

    fn is_placeholder(&self) -> bool {
        match self {
            RawValue::Text(text) => {
                let text = text.trim();
                text.is_empty() || text == PLACEHOLDER
            }
            RawValue::Number(_) => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCalibration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_reading: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wet_reading: Option<RawValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawThingSpeak {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<RawValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWunderground {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<RawValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWeatherCloud {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_key: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<RawValue>,
}

/// Unvalidated config: the on-disk shape, with every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawStationConfig {
    #[serde(default)]
    pub soil_moisture: RawCalibration,
    #[serde(default)]
    pub thingspeak: RawThingSpeak,
    #[serde(default)]
    pub wunderground: RawWunderground,
    #[serde(default)]
    pub weathercloud: RawWeatherCloud,
}

impl RawStationConfig {
    /// Every field set to the placeholder, ready to be filled in
    pub fn template() -> Self {
        let mut raw = Self::default();
        for (_, slot) in raw.fields_mut() {
            *slot = Some(RawValue::placeholder());
        }
        raw
    }

    fn fields_mut(&mut self) -> [(&'static str, &mut Option<RawValue>); 9] {
        [
            ("soil_moisture.dry_reading", &mut self.soil_moisture.dry_reading),
            ("soil_moisture.wet_reading", &mut self.soil_moisture.wet_reading),
            ("thingspeak.channel_id", &mut self.thingspeak.channel_id),
            ("thingspeak.api_key", &mut self.thingspeak.api_key),
            ("wunderground.station_id", &mut self.wunderground.station_id),
            ("wunderground.password", &mut self.wunderground.password),
            ("weathercloud.device_id", &mut self.weathercloud.device_id),
            ("weathercloud.device_key", &mut self.weathercloud.device_key),
            ("weathercloud.api_token", &mut self.weathercloud.api_token),
        ]
    }

    /// Apply `PWS_*` overrides. Returns how many fields were set.
    pub fn overlay_env<F>(&mut self, lookup: F) -> usize
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        for (field, slot) in self.fields_mut() {
            let name = env_var_name(field);
            if let Some(value) = lookup(&name) {
                debug!("Field {} overridden by {}", field, name);
                *slot = Some(RawValue::Text(value));
                applied += 1;
            }
        }
        applied
    }

    /// Check every field and build the immutable config.
    pub fn validate(&self) -> Result<StationConfig, ConfigError> {
        let mut errors = Vec::new();

        let soil = &self.soil_moisture;
        let dry = signed("soil_moisture.dry_reading", &soil.dry_reading, &mut errors);
        let wet = signed("soil_moisture.wet_reading", &soil.wet_reading, &mut errors);

        let ts = &self.thingspeak;
        let channel_id = unsigned("thingspeak.channel_id", &ts.channel_id, &mut errors);
        let api_key = secret("thingspeak.api_key", &ts.api_key, &mut errors);

        let wu = &self.wunderground;
        let station_id = identifier("wunderground.station_id", &wu.station_id, &mut errors);
        let password = secret("wunderground.password", &wu.password, &mut errors);

        let wc = &self.weathercloud;
        let device_id = identifier("weathercloud.device_id", &wc.device_id, &mut errors);
        let device_key = secret("weathercloud.device_key", &wc.device_key, &mut errors);
        let api_token = secret("weathercloud.api_token", &wc.api_token, &mut errors);

        match (
            dry, wet, channel_id, api_key, station_id, password, device_id, device_key, api_token,
        ) {
            (
                Some(dry_reading),
                Some(wet_reading),
                Some(channel_id),
                Some(api_key),
                Some(station_id),
                Some(password),
                Some(device_id),
                Some(device_key),
                Some(api_token),
            ) if errors.is_empty() => {
                let calibration = CalibrationSettings {
                    dry_reading,
                    wet_reading,
                };
                SoilMoistureCalibration::new(calibration)?;

                Ok(StationConfig {
                    calibration,
                    credentials: CredentialSet {
                        thingspeak: ThingSpeakCredentials {
                            channel_id,
                            api_key,
                        },
                        wunderground: WundergroundCredentials {
                            station_id,
                            password,
                        },
                        weathercloud: WeatherCloudCredentials {
                            device_id,
                            device_key,
                            api_token,
                        },
                    },
                })
            }
            _ => Err(ConfigError::Validation(errors)),
        }
    }
}

/// `thingspeak.api_key` -> `PWS_THINGSPEAK_API_KEY`
pub fn env_var_name(field: &str) -> String {
    format!("{}{}", ENV_PREFIX, field.replace('.', "_").to_uppercase())
}

fn present<'a>(
    field: &'static str,
    value: &'a Option<RawValue>,
    errors: &mut Vec<FieldError>,
) -> Option<&'a RawValue> {
    match value {
        None => {
            errors.push(FieldError::Missing { field });
            None
        }
        Some(value) if value.is_placeholder() => {
            errors.push(FieldError::Placeholder { field });
            None
        }
        Some(value) => Some(value),
    }
}

/// Station and device IDs; surrounding whitespace is dropped.
fn identifier(
    field: &'static str,
    value: &Option<RawValue>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match present(field, value, errors)? {
        RawValue::Text(text) => Some(text.trim().to_string()),
        // Numeric station IDs written without quotes
        RawValue::Number(number) => Some(number.to_string()),
    }
}

/// Keys, passwords and tokens are kept byte for byte.
fn secret(
    field: &'static str,
    value: &Option<RawValue>,
    errors: &mut Vec<FieldError>,
) -> Option<Secret> {
    match present(field, value, errors)? {
        RawValue::Text(text) => Some(Secret::new(text.as_str())),
        RawValue::Number(number) => Some(Secret::new(number.to_string())),
    }
}

fn signed(
    field: &'static str,
    value: &Option<RawValue>,
    errors: &mut Vec<FieldError>,
) -> Option<i32> {
    let parsed = match present(field, value, errors)? {
        RawValue::Number(number) => number.as_i64(),
        RawValue::Text(text) => text.trim().parse::<i64>().ok(),
    };
    let Some(parsed) = parsed else {
        errors.push(FieldError::Invalid {
            field,
            reason: "expected an integer reading".to_string(),
        });
        return None;
    };
    match i32::try_from(parsed) {
        Ok(reading) => Some(reading),
        Err(_) => {
            errors.push(FieldError::Invalid {
                field,
                reason: format!("{} does not fit a 32-bit reading", parsed),
            });
            None
        }
    }
}

fn unsigned(
    field: &'static str,
    value: &Option<RawValue>,
    errors: &mut Vec<FieldError>,
) -> Option<u64> {
    let parsed = match present(field, value, errors)? {
        RawValue::Number(number) => number.as_u64(),
        RawValue::Text(text) => text.trim().parse::<u64>().ok(),
    };
    match parsed {
        // ThingSpeak never assigns channel 0; treat it as unset
        Some(0) => {
            errors.push(FieldError::Placeholder { field });
            None
        }
        Some(id) => Some(id),
        None => {
            errors.push(FieldError::Invalid {
                field,
                reason: "expected an unsigned integer".to_string(),
            });
            None
        }
    }
}

/// Read the config file. A missing file is not an error here.
pub async fn read_raw(path: &Path) -> Result<Option<RawStationConfig>, ConfigError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Read, overlay the given environment, validate.
pub async fn load_with_env<F>(path: &Path, lookup: F) -> Result<Arc<StationConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file = read_raw(path).await?;
    let from_file = file.is_some();
    let mut raw = file.unwrap_or_default();

    let applied = raw.overlay_env(lookup);
    if !from_file {
        if applied == 0 {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        warn!(
            "⚠️ {} not found, using {} field(s) from the environment only",
            path.display(),
            applied
        );
    }

    let config = raw.validate()?;
    info!(
        "📄 Station config loaded from {} ({} environment override(s))",
        if from_file { path.display().to_string() } else { "environment".to_string() },
        applied
    );
    Ok(Arc::new(config))
}

/// Load the station config from `path` and the process environment.
pub async fn load_station_config(path: &Path) -> Result<Arc<StationConfig>, ConfigError> {
    load_with_env(path, |name| std::env::var(name).ok()).await
}

/// Write the placeholder template to `path`.
pub async fn write_template(path: &Path, overwrite: bool) -> Result<(), ConfigError> {
    let io_error = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut body = serde_json::to_string_pretty(&RawStationConfig::template()).map_err(|source| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    body.push('\n');

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = match options.open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()))
        }
        Err(e) => return Err(io_error(e)),
    };
    file.write_all(body.as_bytes()).await.map_err(io_error)?;
    file.flush().await.map_err(io_error)?;

    info!("📝 Template written to {}", path.display());
    Ok(())
}
