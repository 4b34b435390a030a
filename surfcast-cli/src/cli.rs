use anyhow::Context;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use surfcast_core::{Config, client_from_config};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "surfcast", version, about = "StormGlass surf forecast CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the StormGlass API token and preferred data source.
    Configure,

    /// Show the point forecast for a coordinate pair.
    Forecast {
        /// Latitude in decimal degrees.
        lat: f64,

        /// Longitude in decimal degrees.
        lng: f64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Forecast { lat, lng } => forecast(lat, lng).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let token = inquire::Password::new("StormGlass API token:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API token")?;
    config.set_api_token(token);

    let default_source = config.source.clone();
    let source = inquire::Text::new("Preferred source:")
        .with_default(&default_source)
        .prompt()
        .context("Failed to read preferred source")?;
    config.source = source;

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

async fn forecast(lat: f64, lng: f64) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = client_from_config(&config)?;

    let points = client.fetch_points(lat, lng).await?;

    if points.is_empty() {
        println!("No usable forecast points for {lat}, {lng}.");
        return Ok(());
    }

    for point in points {
        println!(
            "{}  wave {:.2}m @ {:.0}°  swell {:.2}m {:.1}s @ {:.0}°  wind {:.1}m/s @ {:.0}°",
            display_time(&point.time),
            point.wave_height,
            point.wave_direction,
            point.swell_height,
            point.swell_period,
            point.swell_direction,
            point.wind_speed,
            point.wind_direction,
        );
    }

    Ok(())
}

/// Render the provider timestamp in local time when it parses, verbatim otherwise.
fn display_time(time: &str) -> String {
    DateTime::parse_from_rfc3339(time)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|_| time.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_time_falls_back_to_the_raw_string() {
        assert_eq!(display_time("not-a-timestamp"), "not-a-timestamp");
    }

    #[test]
    fn display_time_formats_rfc3339_timestamps() {
        let rendered = display_time("2021-01-01T12:00:00+00:00");
        assert!(rendered.starts_with("2021-01-01") || rendered.starts_with("2020-12-31"));
        assert!(rendered.len() == "2021-01-01 12:00".len());
    }
}
