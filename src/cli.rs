use crate::config::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: pws-config <command> [options]

Commands:
  init [--path P] [--force]    Write a placeholder config to fill in
  check [--path P]             Load and validate the config
  show [--path P]              Print the validated config, secrets redacted
  moisture <raw>... [--path P] Convert raw soil moisture readings to %RH
  convert [--path P]           Convert raw readings from stdin, one per line
  help                         Show this help

The config path defaults to pws.json. Any field can be overridden with a
PWS_* environment variable, e.g. PWS_THINGSPEAK_API_KEY.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init { path: PathBuf, force: bool },
    Check { path: PathBuf },
    Show { path: PathBuf },
    Moisture { path: PathBuf, readings: Vec<i32> },
    Convert { path: PathBuf },
    Help,
}

pub fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };

    let mut path = None;
    let mut force = false;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--path" | "-p" => match args.next() {
                Some(value) => path = Some(PathBuf::from(value)),
                None => return Err("--path requires a value".to_string()),
            },
            "--force" | "-f" => force = true,
            // Negative readings are values, not flags
            other if other.starts_with('-') && other.parse::<i32>().is_err() => {
                return Err(format!("unknown option: {}", other))
            }
            _ => positional.push(arg),
        }
    }

    if force && command != "init" {
        return Err("--force only applies to init".to_string());
    }
    if command != "moisture" && !positional.is_empty() {
        return Err(format!("unexpected argument: {}", positional[0]));
    }

    let config_path = || path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    match command.as_str() {
        "init" => Ok(Command::Init {
            path: config_path(),
            force,
        }),
        "check" => Ok(Command::Check { path: config_path() }),
        "show" => Ok(Command::Show { path: config_path() }),
        "convert" => Ok(Command::Convert { path: config_path() }),
        "moisture" => {
            if positional.is_empty() {
                return Err("moisture needs at least one raw reading".to_string());
            }
            let readings = positional
                .iter()
                .map(|raw| {
                    raw.parse::<i32>()
                        .map_err(|_| format!("invalid raw reading: {}", raw))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Command::Moisture {
                path: config_path(),
                readings,
            })
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(format!("unknown command: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_shows_help() {
        assert_eq!(parse(&[]), Ok(Command::Help));
    }

    #[test]
    fn init_defaults_to_config_path() {
        // The tracked template stays untouched; init creates the ignored copy
        assert_eq!(
            parse(&["init"]),
            Ok(Command::Init {
                path: PathBuf::from("pws.json"),
                force: false
            })
        );
        assert_eq!(
            parse(&["init", "--path", "station.json", "--force"]),
            Ok(Command::Init {
                path: PathBuf::from("station.json"),
                force: true
            })
        );
    }

    #[test]
    fn check_defaults_to_config_path() {
        assert_eq!(
            parse(&["check"]),
            Ok(Command::Check {
                path: PathBuf::from("pws.json")
            })
        );
    }

    #[test]
    fn moisture_accepts_negative_readings() {
        assert_eq!(
            parse(&["moisture", "1200", "-5", "-p", "x.json"]),
            Ok(Command::Moisture {
                path: PathBuf::from("x.json"),
                readings: vec![1200, -5]
            })
        );
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(parse(&["moisture"]).is_err());
        assert!(parse(&["moisture", "wet"]).is_err());
        assert!(parse(&["check", "--force"]).is_err());
        assert!(parse(&["check", "--path"]).is_err());
        assert!(parse(&["show", "--verbose"]).is_err());
        assert!(parse(&["upload"]).is_err());
    }
}
