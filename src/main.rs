//! airgauge: air quality at the current location, drawn in the terminal.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::MoveUp;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use airgauge_core::{AppError, Config, LocationMode};
use airgauge_ui::{render, AirQualityModel, AppServices, RenderOptions};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "airgauge")]
#[command(author, version, about = "Air quality gauge for the current location", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/airgauge/config.toml)
    #[arg(short, long, env = "AIRGAUGE_CONFIG")]
    config: Option<PathBuf>,

    /// Latitude to use instead of locating the host
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude to use instead of locating the host
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            config.location.mode = LocationMode::Fixed;
            config.location.latitude = Some(lat);
            config.location.longitude = Some(lon);
        }
        if self.no_color {
            config.display.color = false;
        }
    }

    fn log_level(&self, config: &Config) -> String {
        match self.verbose {
            0 => config.logging.level.clone(),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path().map_err(fail)?,
    };
    let created = !path.exists();
    let mut config = Config::load_from(&path).map_err(fail)?;
    cli.apply(&mut config);

    airgauge_core::init(&cli.log_level(&config))?;
    if created {
        tracing::info!("Wrote default configuration to {}", path.display());
    }
    let (config, _) = config.into_validated().map_err(fail)?;

    let services = AppServices::init().map_err(fail)?;
    services.init_air_services(&config).map_err(fail)?;
    let air = services
        .air_services()
        .context("Air quality services are not initialized")?;

    let mut model = AirQualityModel::new(air, services.child_token());
    model.mount();
    tracing::info!("airgauge started");

    let result = run(&mut model, RenderOptions::from(&config.display));

    drop(model);
    services.shutdown();
    result
}

/// Lead with the user-facing message, keep the detail as the cause.
fn fail(err: impl Into<AppError>) -> anyhow::Error {
    let err = err.into();
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

/// Redraw whenever the frame changes until nothing more can arrive.
/// Without a terminal only the final frame is written.
fn run(model: &mut AirQualityModel, mut opts: RenderOptions) -> Result<()> {
    let interactive = std::io::stdout().is_terminal();
    opts.color &= interactive;

    let mut stdout = std::io::stdout().lock();
    let mut shown: Option<String> = None;

    loop {
        let settled = model.is_settled();
        let frame = render(&model.view(), &opts);

        if (interactive || settled) && shown.as_deref() != Some(frame.as_str()) {
            if let Some(previous) = &shown {
                let rows = u16::try_from(previous.lines().count()).unwrap_or(u16::MAX);
                queue!(stdout, MoveUp(rows), Clear(ClearType::FromCursorDown))?;
            }
            stdout.write_all(frame.as_bytes())?;
            stdout.flush()?;
            shown = Some(frame);
        }

        if settled {
            return Ok(());
        }
        model.wait_for_update(POLL_INTERVAL);
    }
}
