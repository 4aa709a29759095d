use async_trait::async_trait;
use std::path::Path;

use crate::{
    config::FileSources,
    error::{ChartError, Result},
    model::WeatherSample,
};

use super::{Capabilities, ProviderId, SampleStore, WeatherProvider};

/// Reads sample lists that another process drops on disk as JSON arrays.
#[derive(Debug, Default)]
pub struct FileProvider {
    sources: FileSources,
    store: SampleStore,
}

impl FileProvider {
    pub fn new(sources: FileSources) -> Self {
        Self { sources, store: SampleStore::default() }
    }

    fn source<'a>(&self, path: Option<&'a Path>, series: &str) -> Result<&'a Path> {
        path.ok_or_else(|| ChartError::Provider {
            provider: ProviderId::File,
            message: format!("no {series} file configured"),
        })
    }
}

async fn read_samples(path: &Path) -> Result<Vec<WeatherSample>> {
    let body = tokio::fs::read_to_string(path).await.map_err(|source| ChartError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let samples: Vec<WeatherSample> =
        serde_json::from_str(&body).map_err(|source| ChartError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    log::debug!("Read {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

#[async_trait]
impl WeatherProvider for FileProvider {
    fn id(&self) -> ProviderId {
        ProviderId::File
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { current_pollution: false, pollution_forecast: self.sources.pollution.is_some() }
    }

    async fn fetch_hourly(&self) -> Result<()> {
        let path = self.source(self.sources.hourly.as_deref(), "hourly")?;
        self.store.set_hourly(read_samples(path).await?);
        Ok(())
    }

    async fn fetch_forecast(&self) -> Result<()> {
        let path = self.source(self.sources.forecast.as_deref(), "forecast")?;
        self.store.set_forecast(read_samples(path).await?);
        Ok(())
    }

    async fn fetch_pollution_forecast(&self) -> Result<()> {
        let path = self.source(self.sources.pollution.as_deref(), "pollution")?;
        self.store.set_pollution(read_samples(path).await?);
        Ok(())
    }

    fn hourly_samples(&self) -> Vec<WeatherSample> {
        self.store.hourly()
    }

    fn forecast_samples(&self) -> Vec<WeatherSample> {
        self.store.forecast()
    }

    fn pollution_samples(&self) -> Vec<WeatherSample> {
        self.store.pollution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HOURLY: &str = r#"[
        { "timestamp": "2026-02-01T10:00:00Z", "temperature": 1.5, "rainAmount": 0.2 },
        { "timestamp": "2026-02-01T11:00:00Z", "temperature": 2.0 }
    ]"#;

    #[tokio::test]
    async fn fetch_hourly_reads_configured_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let hourly = dir.path().join("hourly.json");
        fs::write(&hourly, HOURLY).expect("write");

        let provider = FileProvider::new(FileSources { hourly: Some(hourly), ..Default::default() });
        assert!(provider.hourly_samples().is_empty());

        provider.fetch_hourly().await.expect("fetch");

        let samples = provider.hourly_samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].rain_amount, Some(0.2));
    }

    #[tokio::test]
    async fn missing_source_is_a_provider_error() {
        let provider = FileProvider::new(FileSources::default());

        let err = provider.fetch_forecast().await.unwrap_err();
        assert!(err.to_string().contains("no forecast file configured"));
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let daily = dir.path().join("daily.json");
        fs::write(&daily, "{ not json").expect("write");

        let provider = FileProvider::new(FileSources { forecast: Some(daily), ..Default::default() });

        let err = provider.fetch_forecast().await.unwrap_err();
        assert!(matches!(err, ChartError::Parse { .. }));
    }

    #[test]
    fn pollution_capability_follows_configuration() {
        let without = FileProvider::new(FileSources::default());
        let with = FileProvider::new(FileSources {
            pollution: Some("aqi.json".into()),
            ..Default::default()
        });

        assert!(!without.capabilities().pollution_forecast);
        assert!(with.capabilities().pollution_forecast);
        assert!(!with.capabilities().current_pollution);
    }
}
