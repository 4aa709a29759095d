use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::error::ChartError;
use crate::provider::ProviderId;

/// Smallest width and height that leave room for the margins, the icon band
/// and a readable plot.
pub const MIN_CHART_SIZE: u32 = 120;

/// Which provider series drive the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Hourly,
    Daily,
    Full,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Hourly => "hourly",
            Mode::Daily => "daily",
            Mode::Full => "full",
        }
    }

    /// Parse a configured mode. `forecast` is accepted as an alias of `daily`.
    pub fn parse(value: &str) -> Result<Self, ChartError> {
        match value.to_lowercase().as_str() {
            "hourly" => Ok(Mode::Hourly),
            "daily" | "forecast" => Ok(Mode::Daily),
            "full" => Ok(Mode::Full),
            _ => Err(ChartError::Config(format!(
                "unknown mode '{value}'. Supported modes: hourly, daily, forecast, full."
            ))),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn temperature(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn precipitation(&self) -> &'static str {
        match self {
            Units::Metric => "mm",
            Units::Imperial => "in",
        }
    }

    pub fn wind(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }

    pub fn pressure(&self) -> &'static str {
        match self {
            Units::Metric => "hPa",
            Units::Imperial => "inHg",
        }
    }
}

/// Per-series visibility toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    pub temperature: bool,
    pub min_max_temperature: bool,
    pub feels_like: bool,
    pub precipitation_amount: bool,
    pub precipitation_probability: bool,
    pub snow: bool,
    pub pressure: bool,
    pub humidity: bool,
    pub wind: bool,
    pub uv_index: bool,
    pub air_quality: bool,
    pub night: bool,
    pub icons: bool,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            temperature: true,
            min_max_temperature: true,
            feels_like: false,
            precipitation_amount: true,
            precipitation_probability: false,
            snow: true,
            pressure: false,
            humidity: false,
            wind: false,
            uv_index: false,
            air_quality: false,
            night: true,
            icons: true,
        }
    }
}

/// Data files read by the `file` provider.
///
/// Example TOML:
/// [files]
/// hourly = "/var/lib/mirror/hourly.json"
/// forecast = "/var/lib/mirror/daily.json"
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileSources {
    pub hourly: Option<PathBuf>,
    pub forecast: Option<PathBuf>,
    pub pollution: Option<PathBuf>,
}

/// Widget configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub update_interval_ms: u64,
    pub initial_load_delay_ms: u64,
    pub animation_speed_ms: u64,

    /// Provider id, e.g. "file" or "demo".
    pub provider: String,
    /// Granularity mode; kept as text so an unknown value only disables
    /// fetching instead of failing the whole config.
    pub mode: String,

    pub latitude: f64,
    pub longitude: f64,
    pub units: Units,
    pub locale: String,

    pub width: u32,
    pub height: u32,
    /// Fixed icon size in pixels; chosen from the sample spacing when unset.
    pub icon_size: Option<u32>,
    pub icon_base_url: String,
    /// Share of the plot width given to hourly samples in `full` mode.
    pub hourly_ratio: f64,

    pub show: ShowConfig,
    pub files: FileSources,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 10 * 60 * 1000,
            initial_load_delay_ms: 0,
            animation_speed_ms: 1000,
            provider: ProviderId::Demo.to_string(),
            mode: Mode::Full.to_string(),
            latitude: 52.52,
            longitude: 13.405,
            units: Units::Metric,
            locale: "en".to_string(),
            width: 800,
            height: 300,
            icon_size: None,
            icon_base_url: "icons".to_string(),
            hourly_ratio: 0.5,
            show: ShowConfig::default(),
            files: FileSources::default(),
        }
    }
}

impl ChartConfig {
    pub fn mode(&self) -> Result<Mode, ChartError> {
        Mode::parse(&self.mode)
    }

    pub fn provider_id(&self) -> Result<ProviderId, ChartError> {
        ProviderId::try_from(self.provider.as_str())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn initial_load_delay(&self) -> Duration {
        Duration::from_millis(self.initial_load_delay_ms)
    }

    pub fn animation_speed(&self) -> Duration {
        Duration::from_millis(self.animation_speed_ms)
    }

    /// Decimal separator for chart labels, derived from the locale.
    pub fn decimal_separator(&self) -> char {
        const COMMA_LOCALES: [&str; 8] = ["de", "fr", "es", "it", "nl", "pt", "ru", "pl"];
        let language = self.locale.split(['-', '_']).next().unwrap_or_default().to_lowercase();
        if COMMA_LOCALES.contains(&language.as_str()) { ',' } else { '.' }
    }

    /// Check the geometric and geographic settings.
    ///
    /// The mode is not checked here; an unknown mode is reported when a fetch
    /// cycle is planned.
    pub fn validate(&self) -> Result<(), ChartError> {
        if self.width < MIN_CHART_SIZE || self.height < MIN_CHART_SIZE {
            return Err(ChartError::Config(format!(
                "chart dimensions must be at least {MIN_CHART_SIZE}x{MIN_CHART_SIZE}, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.hourly_ratio > 0.0 && self.hourly_ratio < 1.0) {
            return Err(ChartError::Config(format!(
                "hourly_ratio must be between 0 and 1, got {}",
                self.hourly_ratio
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ChartError::Config(format!("latitude {} out of range", self.latitude)));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ChartError::Config(format!("longitude {} out of range", self.longitude)));
        }
        if self.update_interval_ms == 0 {
            return Err(ChartError::Config("update_interval_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Load config from the platform config directory, or return defaults if
    /// it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: ChartConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = self.to_toml()?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-chart", "weather-chart")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
