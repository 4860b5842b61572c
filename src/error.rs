use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// Dry and wet readings are equal, so no scale can be derived
    IdenticalReadings(i32),
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::IdenticalReadings(value) => write!(
                f,
                "dry and wet soil moisture readings are both {}; recalibrate the sensor",
                value
            ),
        }
    }
}

impl std::error::Error for CalibrationError {}

/// A problem with a single configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Missing { field: &'static str },
    Placeholder { field: &'static str },
    Invalid { field: &'static str, reason: String },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Missing { field }
            | FieldError::Placeholder { field }
            | FieldError::Invalid { field, .. } => *field,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Missing { field } => write!(f, "{}: missing", field),
            FieldError::Placeholder { field } => {
                write!(f, "{}: still holds the template placeholder", field)
            }
            FieldError::Invalid { field, reason } => write!(f, "{}: {}", field, reason),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// No config file and nothing supplied through the environment
    NotFound(PathBuf),
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    /// Refused to overwrite an existing file
    AlreadyExists(PathBuf),
    Validation(Vec<FieldError>),
    Calibration(CalibrationError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(
                f,
                "config file {} not found and no PWS_* environment variables set",
                path.display()
            ),
            ConfigError::Io { path, source } => {
                write!(f, "failed to access {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            ConfigError::AlreadyExists(path) => {
                write!(f, "{} already exists (use --force to overwrite)", path.display())
            }
            ConfigError::Validation(errors) => {
                write!(f, "{} invalid field(s):", errors.len())?;
                for error in errors {
                    write!(f, "\n  - {}", error)?;
                }
                Ok(())
            }
            ConfigError::Calibration(error) => write!(f, "calibration: {}", error),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Calibration(source) => Some(source),
            _ => None,
        }
    }
}

impl From<CalibrationError> for ConfigError {
    fn from(error: CalibrationError) -> Self {
        ConfigError::Calibration(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_field() {
        let error = ConfigError::Validation(vec![
            FieldError::Missing { field: "thingspeak.api_key" },
            FieldError::Placeholder { field: "wunderground.password" },
        ]);
        let message = error.to_string();
        assert!(message.starts_with("2 invalid field(s):"));
        assert!(message.contains("thingspeak.api_key: missing"));
        assert!(message.contains("wunderground.password: still holds the template placeholder"));
    }
}
