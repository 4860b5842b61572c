// File locations
pub const DEFAULT_CONFIG_PATH: &str = "pws.json";

// Marker left in every field of the template until the user fills it in
pub const PLACEHOLDER: &str = "...";

// Environment overlay: PWS_<FIELD>, e.g. PWS_THINGSPEAK_API_KEY
pub const ENV_PREFIX: &str = "PWS_";

// Soil moisture scale endpoints (%RH)
pub const MOISTURE_DRY_PERCENT: f32 = 0.0;
pub const MOISTURE_WET_PERCENT: f32 = 100.0;

// Shown instead of credential values in logs and debug output
pub const REDACTED: &str = "********";

pub const DEFAULT_LOG_FILTER: &str = "info";
