use crate::{
    config::ChartConfig,
    error::{ChartError, Result},
    model::WeatherSample,
    provider::{demo::DemoProvider, file::FileProvider},
};
use async_trait::async_trait;
use std::{
    convert::TryFrom,
    fmt::Debug,
    sync::{PoisonError, RwLock},
};

pub mod demo;
pub mod file;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    File,
    Demo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::File => "file",
            ProviderId::Demo => "demo",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::File, ProviderId::Demo]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = ChartError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "file" => Ok(ProviderId::File),
            "demo" => Ok(ProviderId::Demo),
            _ => Err(ChartError::Config(format!(
                "Unknown provider '{value}'. Supported providers: file, demo."
            ))),
        }
    }
}

/// Optional provider features, detected once instead of probed per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub current_pollution: bool,
    pub pollution_forecast: bool,
}

/// Which pollution fetch a cycle should issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollutionFetch {
    Forecast,
    Current,
}

impl Capabilities {
    /// Preferred pollution fetch, if the provider offers any.
    pub fn pollution(&self) -> Option<PollutionFetch> {
        if self.pollution_forecast {
            Some(PollutionFetch::Forecast)
        } else if self.current_pollution {
            Some(PollutionFetch::Current)
        } else {
            None
        }
    }
}

/// A source of forecast samples.
///
/// Fetches refresh the provider's internal series; the synchronous getters
/// return whatever the last successful fetch stored.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    async fn fetch_hourly(&self) -> Result<()>;

    async fn fetch_forecast(&self) -> Result<()>;

    async fn fetch_current_pollution(&self) -> Result<()> {
        Err(ChartError::Unsupported { provider: self.id(), capability: "current pollution" })
    }

    async fn fetch_pollution_forecast(&self) -> Result<()> {
        Err(ChartError::Unsupported { provider: self.id(), capability: "pollution forecast" })
    }

    fn hourly_samples(&self) -> Vec<WeatherSample>;

    fn forecast_samples(&self) -> Vec<WeatherSample>;

    fn pollution_samples(&self) -> Vec<WeatherSample> {
        Vec::new()
    }
}

/// Latest series held by a provider between fetch and render.
#[derive(Debug, Default)]
pub struct SampleStore {
    hourly: RwLock<Vec<WeatherSample>>,
    forecast: RwLock<Vec<WeatherSample>>,
    pollution: RwLock<Vec<WeatherSample>>,
}

impl SampleStore {
    pub fn set_hourly(&self, samples: Vec<WeatherSample>) {
        *self.hourly.write().unwrap_or_else(PoisonError::into_inner) = samples;
    }

    pub fn set_forecast(&self, samples: Vec<WeatherSample>) {
        *self.forecast.write().unwrap_or_else(PoisonError::into_inner) = samples;
    }

    pub fn set_pollution(&self, samples: Vec<WeatherSample>) {
        *self.pollution.write().unwrap_or_else(PoisonError::into_inner) = samples;
    }

    pub fn hourly(&self) -> Vec<WeatherSample> {
        self.hourly.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn forecast(&self) -> Vec<WeatherSample> {
        self.forecast.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn pollution(&self) -> Vec<WeatherSample> {
        self.pollution.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Construct the configured provider.
pub fn provider_from_config(config: &ChartConfig) -> Result<Box<dyn WeatherProvider>> {
    let id = config.provider_id()?;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::File => Box::new(FileProvider::new(config.files.clone())),
        ProviderId::Demo => Box::new(DemoProvider::new()),
    };

    Ok(boxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("openweather").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn pollution_forecast_is_preferred_over_current() {
        let both = Capabilities { current_pollution: true, pollution_forecast: true };
        let current = Capabilities { current_pollution: true, pollution_forecast: false };

        assert_eq!(both.pollution(), Some(PollutionFetch::Forecast));
        assert_eq!(current.pollution(), Some(PollutionFetch::Current));
        assert_eq!(Capabilities::default().pollution(), None);
    }

    #[test]
    fn provider_from_config_uses_configured_id() {
        let cfg = ChartConfig { provider: "file".into(), ..Default::default() };
        let provider = provider_from_config(&cfg).expect("file provider");
        assert_eq!(provider.id(), ProviderId::File);

        let cfg = ChartConfig { provider: "nope".into(), ..Default::default() };
        assert!(provider_from_config(&cfg).is_err());
    }

    #[tokio::test]
    async fn pollution_fetches_are_unsupported_by_default() {
        let cfg = ChartConfig { provider: "file".into(), ..Default::default() };
        let provider = provider_from_config(&cfg).expect("file provider");

        let err = provider.fetch_current_pollution().await.unwrap_err();
        assert!(matches!(err, ChartError::Unsupported { .. }));
    }
}
