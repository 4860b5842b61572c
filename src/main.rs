mod calibration;
mod cli;
mod config;
mod error;
mod loader;
mod types;

use calibration::SoilMoistureCalibration;
use cli::{parse_args, Command, USAGE};
use config::DEFAULT_LOG_FILTER;
use error::ConfigError;
use loader::{env_var_name, load_station_config, write_template};
use types::StationConfig;

use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("error: {}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(command).await {
        error!("❌ Command failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Help => println!("{}", USAGE),
        Command::Init { path, force } => {
            write_template(&path, force).await?;
            println!(
                "Template written to {}. Fill in every \"...\" and keep it out of version control.",
                path.display()
            );
        }
        Command::Check { path } => {
            if let Err(e) = load_station_config(&path).await {
                if let ConfigError::Validation(errors) = &e {
                    for field_error in errors {
                        warn!(
                            "⚠️ Set {} or fix it in {}",
                            env_var_name(field_error.field()),
                            path.display()
                        );
                    }
                }
                return Err(e.into());
            }
            println!("✅ {} is complete and valid", path.display());
        }
        Command::Show { path } => {
            let config = load_station_config(&path).await?;
            print_summary(&config);
        }
        Command::Moisture { path, readings } => {
            let config = load_station_config(&path).await?;
            let calibration = SoilMoistureCalibration::new(config.calibration)?;
            for raw in readings {
                println!("{}\t{:.1} %RH", raw, calibration.percent(raw));
            }
        }
        Command::Convert { path } => {
            let config = load_station_config(&path).await?;
            convert_stdin(&path, &config).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(config: &StationConfig) {
    let cal = &config.calibration;
    let creds = &config.credentials;

    println!("\n🌱 SOIL MOISTURE CALIBRATION:");
    println!("   Dry reading (0 %RH):   {}", cal.dry_reading);
    println!("   Wet reading (100 %RH): {}", cal.wet_reading);
    if let Ok(scale) = SoilMoistureCalibration::new(*cal) {
        let direction = if scale.is_inverted() {
            "falls as soil gets wetter"
        } else {
            "rises as soil gets wetter"
        };
        println!("   Direction:             {}", direction);
        println!("   Reading at 50 %RH:     {:.0}", scale.raw_for_percent(50.0));
    }

    println!("\n📡 UPLOAD CREDENTIALS:");
    println!("   ThingSpeak channel:           {}", creds.thingspeak.channel_id);
    println!("   ThingSpeak API key:           {}", creds.thingspeak.api_key);
    println!("   Weather Underground station:  {}", creds.wunderground.station_id);
    println!("   Weather Underground password: {}", creds.wunderground.password);
    println!("   WeatherCloud device:          {}", creds.weathercloud.device_id);
    println!("   WeatherCloud device key:      {}", creds.weathercloud.device_key);
    println!("   WeatherCloud API token:       {}", creds.weathercloud.api_token);
}

async fn convert_stdin(
    path: &Path,
    config: &StationConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let calibration = SoilMoistureCalibration::new(config.calibration)?;
    info!(
        "🌱 Converting stdin readings with {} (dry={}, wet={})",
        path.display(),
        config.calibration.dry_reading,
        config.calibration.wet_reading
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut converted = 0u64;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line.parse::<i32>() {
                    Ok(raw) => {
                        let percent = calibration.percent_unclamped(raw);
                        if !(0.0..=100.0).contains(&percent) {
                            warn!(
                                "⚠️ Reading {} is outside the calibrated range ({:.1} %RH)",
                                raw, percent
                            );
                        }
                        println!("{}\t{:.1}", raw, calibration.percent(raw));
                        converted += 1;
                    }
                    Err(_) => warn!("⚠️ Skipping non-numeric reading: {:?}", line),
                }
            }
            _ = &mut shutdown => {
                info!("🛑 Interrupted");
                break;
            }
        }
    }

    info!("✅ Converted {} reading(s)", converted);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn failing_commands_surface_readable_errors() {
        let path = std::env::temp_dir()
            .join(format!("pws-config-{}-main.json", std::process::id()));
        write_template(&path, true).await.unwrap();

        for command in [
            Command::Show { path: path.clone() },
            Command::Moisture { path: path.clone(), readings: vec![1500] },
            Command::Convert { path: path.clone() },
        ] {
            let message = run(command).await.unwrap_err().to_string();
            assert!(message.starts_with("9 invalid field(s):"), "{}", message);
            assert!(message.contains("thingspeak.api_key: still holds the template placeholder"));
        }

        let missing = PathBuf::from("/nonexistent/pws.json");
        let message = run(Command::Show { path: missing }).await.unwrap_err().to_string();
        assert!(message.contains("not found"), "{}", message);

        let _ = std::fs::remove_file(&path);
    }
}
