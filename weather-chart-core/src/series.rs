//! Combining hourly and daily series into one plot-ready series.

use chrono::{Duration, TimeDelta};

use crate::model::WeatherSample;

/// Merge an hourly and a daily series.
///
/// The hourly series wins for the period it covers: daily samples at or
/// before the latest hourly timestamp are dropped. With only one non-empty
/// input that input is returned in its original order.
pub fn merge(hourly: &[WeatherSample], daily: &[WeatherSample]) -> Vec<WeatherSample> {
    let Some(last_hourly) = hourly.iter().map(|s| s.timestamp).max() else {
        return daily.to_vec();
    };
    if daily.is_empty() {
        return hourly.to_vec();
    }

    let mut merged: Vec<WeatherSample> = hourly
        .iter()
        .cloned()
        .chain(daily.iter().filter(|s| s.timestamp > last_hourly).cloned())
        .collect();
    merged.sort_by_key(|s| s.timestamp);
    merged
}

/// Time span covered by each sample: the distance to the next sample, or to
/// the previous one for the last sample.
pub fn period_durations(samples: &[WeatherSample]) -> Vec<Duration> {
    (0..samples.len())
        .map(|i| {
            let neighbour = if i + 1 < samples.len() {
                i + 1
            } else if i > 0 {
                i - 1
            } else {
                return TimeDelta::zero();
            };
            (samples[i].timestamp - samples[neighbour].timestamp).abs()
        })
        .collect()
}

/// A sample together with the span it represents.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSample {
    pub sample: WeatherSample,
    pub period: Duration,
}

pub fn annotate(samples: Vec<WeatherSample>) -> Vec<PlotSample> {
    let periods = period_durations(&samples);
    samples
        .into_iter()
        .zip(periods)
        .map(|(sample, period)| PlotSample { sample, period })
        .collect()
}

impl PlotSample {
    pub fn period_hours(&self) -> f64 {
        self.period.num_milliseconds() as f64 / 3_600_000.0
    }

    /// Accumulated amount over the period converted to a per-hour rate.
    fn rate(&self, amount: Option<f64>) -> Option<f64> {
        let hours = self.period_hours();
        if hours <= 0.0 {
            return None;
        }
        amount.map(|a| a / hours)
    }

    /// Rain plus snow, each missing part counting as zero. Falls back to the
    /// provider's total when neither part is reported.
    pub fn combined_precipitation(&self) -> Option<f64> {
        let s = &self.sample;
        match (s.rain_amount, s.snow_amount) {
            (None, None) => s.precipitation_amount,
            (rain, snow) => Some(rain.unwrap_or(0.0) + snow.unwrap_or(0.0)),
        }
    }

    pub fn precipitation_rate(&self) -> Option<f64> {
        self.rate(self.combined_precipitation())
    }

    pub fn snow_rate(&self) -> Option<f64> {
        self.rate(self.sample.snow_amount)
    }

    /// Temperature, or the midpoint of min/max for daily samples that only
    /// carry a range.
    pub fn temperature_or_mean(&self) -> Option<f64> {
        let s = &self.sample;
        s.temperature.or(match (s.min_temperature, s.max_temperature) {
            (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
            _ => None,
        })
    }

    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        Some((self.sample.min_temperature?, self.sample.max_temperature?))
    }
}
