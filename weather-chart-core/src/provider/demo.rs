use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, NaiveTime, Timelike, Utc};
use std::f64::consts::PI;

use crate::{error::Result, model::WeatherSample};

use super::{Capabilities, ProviderId, SampleStore, WeatherProvider};

const HOURLY_SAMPLES: i64 = 48;
const DAILY_SAMPLES: i64 = 7;
const POLLUTION_SAMPLES: i64 = 96;

/// Synthetic, deterministic forecast for trying the widget without a data
/// source.
#[derive(Debug, Default)]
pub struct DemoProvider {
    anchor: Option<DateTime<Utc>>,
    store: SampleStore,
}

impl DemoProvider {
    /// Samples start at the current hour of each fetch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples start at a fixed instant.
    pub fn with_anchor(anchor: DateTime<Utc>) -> Self {
        Self { anchor: Some(anchor), store: SampleStore::default() }
    }

    fn anchor(&self) -> DateTime<Utc> {
        let now = self.anchor.unwrap_or_else(Utc::now);
        now.duration_trunc(Duration::hours(1)).unwrap_or(now)
    }
}

/// Daily temperature cycle peaking mid-afternoon.
fn diurnal(hour: f64) -> f64 {
    (2.0 * PI * (hour - 9.0) / 24.0).sin()
}

fn icon_for(rain: f64, hour: u32) -> String {
    let suffix = if (7..19).contains(&hour) { 'd' } else { 'n' };
    let code = match rain {
        r if r >= 1.0 => "10",
        r if r > 0.0 => "09",
        _ if hour % 5 == 0 => "03",
        _ => "01",
    };
    format!("{code}{suffix}")
}

pub(crate) fn hourly_series(start: DateTime<Utc>) -> Vec<WeatherSample> {
    (0..HOURLY_SAMPLES)
        .map(|i| {
            let timestamp = start + Duration::hours(i);
            let hour = timestamp.hour();
            let temperature = 8.0 + 6.0 * diurnal(f64::from(hour)) - 0.05 * i as f64;
            let wind = 3.0 + 2.0 * (i as f64 / 7.0).sin().abs();
            let rain = if (14..22).contains(&i) { ((i - 13) % 4) as f64 * 0.6 } else { 0.0 };

            WeatherSample {
                feels_like_temperature: Some(temperature - 0.7 * wind),
                rain_amount: Some(rain),
                snow_amount: if i == 30 { Some(0.4) } else { None },
                precipitation_probability: Some(if rain > 0.0 { 70.0 } else { 10.0 }),
                pressure: Some(1012.0 + 4.0 * (i as f64 / 12.0).cos()),
                humidity: Some(65.0 - 20.0 * diurnal(f64::from(hour))),
                wind_speed: Some(wind),
                uv_index: Some((5.0 * diurnal(f64::from(hour) + 3.0)).max(0.0)),
                weather_icon_id: Some(icon_for(rain, hour)),
                ..WeatherSample::at(timestamp).with_temperature(temperature)
            }
        })
        .collect()
}

pub(crate) fn daily_series(start: DateTime<Utc>) -> Vec<WeatherSample> {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    let first = start.date_naive().and_time(noon).and_utc();

    (0..DAILY_SAMPLES)
        .map(|d| {
            let swing = 2.0 * (d as f64 * 1.3).sin();
            let rain = if d % 3 == 1 { 4.5 } else { 0.0 };

            WeatherSample {
                min_temperature: Some(3.0 + swing),
                max_temperature: Some(12.0 + swing),
                precipitation_amount: Some(rain),
                precipitation_probability: Some(if rain > 0.0 { 60.0 } else { 15.0 }),
                pressure: Some(1010.0 + swing),
                humidity: Some(70.0 - 5.0 * swing),
                wind_speed: Some(4.0 + swing.abs()),
                uv_index: Some(3.0 + swing.max(0.0)),
                weather_icon_id: Some(icon_for(rain / 6.0, 12)),
                ..WeatherSample::at(first + Duration::days(d))
            }
        })
        .collect()
}

pub(crate) fn pollution_series(start: DateTime<Utc>) -> Vec<WeatherSample> {
    (0..POLLUTION_SAMPLES)
        .map(|i| WeatherSample {
            air_quality_index: Some((1 + (i / 18) % 4) as f64),
            ..WeatherSample::at(start + Duration::hours(i))
        })
        .collect()
}

#[async_trait]
impl WeatherProvider for DemoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Demo
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { current_pollution: false, pollution_forecast: true }
    }

    async fn fetch_hourly(&self) -> Result<()> {
        self.store.set_hourly(hourly_series(self.anchor()));
        Ok(())
    }

    async fn fetch_forecast(&self) -> Result<()> {
        self.store.set_forecast(daily_series(self.anchor()));
        Ok(())
    }

    async fn fetch_pollution_forecast(&self) -> Result<()> {
        self.store.set_pollution(pollution_series(self.anchor()));
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
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn hourly_series_starts_at_truncated_anchor() {
        let provider = DemoProvider::with_anchor(anchor());
        provider.fetch_hourly().await.expect("fetch");

        let samples = provider.hourly_samples();
        assert_eq!(samples.len(), 48);
        assert_eq!(samples[0].timestamp, Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap());
        assert!(samples.windows(2).all(|w| w[1].timestamp - w[0].timestamp == Duration::hours(1)));
    }

    #[tokio::test]
    async fn daily_series_carries_ranges_at_noon() {
        let provider = DemoProvider::with_anchor(anchor());
        provider.fetch_forecast().await.expect("fetch");

        let samples = provider.forecast_samples();
        assert_eq!(samples.len(), 7);
        assert!(samples.iter().all(|s| s.timestamp.hour() == 12));
        assert!(samples.iter().all(|s| s.min_temperature < s.max_temperature));
        assert!(samples.iter().all(|s| s.temperature.is_none()));
    }

    #[test]
    fn demo_supports_pollution_forecast() {
        let provider = DemoProvider::new();
        assert!(provider.capabilities().pollution_forecast);

        let aqi = pollution_series(anchor());
        assert!(aqi.iter().all(|s| matches!(s.air_quality_index, Some(v) if (1.0..=5.0).contains(&v))));
    }

    #[test]
    fn icons_switch_between_day_and_night() {
        assert_eq!(icon_for(0.0, 13), "01d");
        assert_eq!(icon_for(2.0, 2), "10n");
    }
}
