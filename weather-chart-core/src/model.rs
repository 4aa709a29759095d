use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One forecast data point as delivered by a provider.
///
/// Every reading is optional: a provider that does not report a field leaves
/// it `None`, and each plot filters on presence instead of treating the gap
/// as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSample {
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub min_temperature: Option<f64>,
    #[serde(default)]
    pub max_temperature: Option<f64>,
    #[serde(default)]
    pub feels_like_temperature: Option<f64>,

    #[serde(default)]
    pub precipitation_amount: Option<f64>,
    #[serde(default)]
    pub rain_amount: Option<f64>,
    #[serde(default)]
    pub snow_amount: Option<f64>,
    /// Probability in percent (0-100).
    #[serde(default)]
    pub precipitation_probability: Option<f64>,

    #[serde(default)]
    pub pressure: Option<f64>,
    /// Relative humidity in percent (0-100).
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub uv_index: Option<f64>,
    /// Air quality index, only set on pollution samples.
    #[serde(default)]
    pub air_quality_index: Option<f64>,

    #[serde(default)]
    pub weather_icon_id: Option<String>,
}

impl WeatherSample {
    /// A sample with only a timestamp; readings are filled in by the caller.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            temperature: None,
            min_temperature: None,
            max_temperature: None,
            feels_like_temperature: None,
            precipitation_amount: None,
            rain_amount: None,
            snow_amount: None,
            precipitation_probability: None,
            pressure: None,
            humidity: None,
            wind_speed: None,
            uv_index: None,
            air_quality_index: None,
            weather_icon_id: None,
        }
    }

    pub fn with_temperature(mut self, value: f64) -> Self {
        self.temperature = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_as_none() {
        let json = r#"{ "timestamp": "2026-03-01T12:00:00Z", "temperature": 4.5, "weatherIconId": "10d" }"#;
        let sample: WeatherSample = serde_json::from_str(json).expect("valid sample");

        assert_eq!(sample.temperature, Some(4.5));
        assert_eq!(sample.weather_icon_id.as_deref(), Some("10d"));
        assert_eq!(sample.rain_amount, None);
        assert_eq!(sample.humidity, None);
    }

    #[test]
    fn timestamp_is_required() {
        let err = serde_json::from_str::<WeatherSample>(r#"{ "temperature": 1.0 }"#).unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }
}
