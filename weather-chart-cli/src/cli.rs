use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Select, Text};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use weather_chart_core::{
    ChartConfig, HostSignal, Mode, ProviderId, Units, Widget, provider_from_config, render_once,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-chart", version, about = "Weather chart widget for smart mirrors")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch once and write the chart as SVG.
    Render {
        /// Output file.
        #[arg(long, short, default_value = "weather-chart.svg")]
        out: PathBuf,

        /// Override the configured mode (hourly, daily, forecast, full).
        #[arg(long)]
        mode: Option<String>,

        /// Override the configured provider (file, demo).
        #[arg(long)]
        provider: Option<String>,
    },

    /// Run the widget and rewrite the SVG on every redraw.
    ///
    /// Type `suspend` or `resume` on stdin to pause and restart updates.
    Watch {
        /// Output file.
        #[arg(long, short, default_value = "weather-chart.svg")]
        out: PathBuf,
    },

    /// Interactively create or update the config file.
    Configure,

    /// Print the effective configuration as TOML.
    ShowConfig,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => ChartConfig::config_file_path()?,
        };

        match self.command {
            Command::Render { out, mode, provider } => {
                let mut cfg = ChartConfig::load_from(&config_path)?;
                if let Some(mode) = mode {
                    cfg.mode = mode;
                }
                if let Some(provider) = provider {
                    cfg.provider = provider;
                }
                render(&cfg, &out).await
            }
            Command::Watch { out } => {
                let cfg = ChartConfig::load_from(&config_path)?;
                watch(cfg, out).await
            }
            Command::Configure => configure(&config_path),
            Command::ShowConfig => {
                let cfg = ChartConfig::load_from(&config_path)?;
                println!("# {}", config_path.display());
                print!("{}", cfg.to_toml()?);
                Ok(())
            }
        }
    }
}

async fn render(cfg: &ChartConfig, out: &Path) -> Result<()> {
    let provider = provider_from_config(cfg)?;

    match render_once(cfg, provider.as_ref()).await? {
        Some(svg) => {
            tokio::fs::write(out, svg)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Chart written to {}", out.display());
        }
        None => log::warn!("Provider returned no samples; nothing written"),
    }

    Ok(())
}

async fn watch(cfg: ChartConfig, out: PathBuf) -> Result<()> {
    let provider = provider_from_config(&cfg)?;
    let widget = Widget::new(cfg, Arc::from(provider))?;
    let mut handle = widget.spawn();
    handle.signal(HostSignal::Start).await;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = handle.redraws.changed() => {
                if changed.is_err() {
                    log::warn!("Widget stopped unexpectedly");
                    break;
                }
                let latest = handle
                    .redraws
                    .borrow_and_update()
                    .as_ref()
                    .map(|r| (Arc::clone(&r.svg), r.rendered_at));
                if let Some((svg, rendered_at)) = latest {
                    tokio::fs::write(&out, svg.as_bytes())
                        .await
                        .with_context(|| format!("Failed to write {}", out.display()))?;
                    log::info!(
                        "Chart written to {} (rendered {})",
                        out.display(),
                        rendered_at.with_timezone(&Local).format("%H:%M:%S")
                    );
                }
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_host_command(&line) {
                    Some(HostSignal::Shutdown) => break,
                    Some(signal) => handle.signal(signal).await,
                    None => log::warn!("Unknown command '{}'", line.trim()),
                },
                Ok(None) => stdin_open = false,
                Err(err) => {
                    log::warn!("Failed to read stdin: {err}");
                    stdin_open = false;
                }
            },
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn parse_host_command(line: &str) -> Option<HostSignal> {
    match line.trim().to_lowercase().as_str() {
        "start" => Some(HostSignal::Start),
        "suspend" | "pause" => Some(HostSignal::Suspend),
        "resume" => Some(HostSignal::Resume),
        "quit" | "exit" | "stop" => Some(HostSignal::Shutdown),
        _ => None,
    }
}

fn configure(path: &Path) -> Result<()> {
    let mut cfg = ChartConfig::load_from(path)?;

    let provider = Select::new("Provider:", ProviderId::all().to_vec()).prompt()?;
    cfg.provider = provider.to_string();

    let mode = Select::new("Mode:", vec![Mode::Full, Mode::Hourly, Mode::Daily]).prompt()?;
    cfg.mode = mode.to_string();

    cfg.latitude = CustomType::<f64>::new("Latitude:")
        .with_default(cfg.latitude)
        .with_error_message("Please enter a number")
        .prompt()?;
    cfg.longitude = CustomType::<f64>::new("Longitude:")
        .with_default(cfg.longitude)
        .with_error_message("Please enter a number")
        .prompt()?;

    let units = Select::new("Units:", vec!["metric", "imperial"]).prompt()?;
    cfg.units = if units == "imperial" { Units::Imperial } else { Units::Metric };

    if provider == ProviderId::File {
        cfg.files.hourly = prompt_path("Hourly samples file (empty to skip):")?;
        cfg.files.forecast = prompt_path("Daily samples file (empty to skip):")?;
        cfg.files.pollution = prompt_path("Pollution samples file (empty to skip):")?;
    }

    cfg.show.air_quality = Confirm::new("Show air quality?")
        .with_default(cfg.show.air_quality)
        .prompt()?;

    cfg.validate()?;

    cfg.save_to(path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn prompt_path(message: &str) -> Result<Option<PathBuf>> {
    let answer = Text::new(message).prompt()?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
}
