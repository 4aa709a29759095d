//! Time-to-pixel mapping for the x axis.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::model::WeatherSample;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    t0: DateTime<Utc>,
    t1: DateTime<Utc>,
    x0: f64,
    x1: f64,
}

impl Segment {
    fn x(&self, t: DateTime<Utc>) -> f64 {
        let span = (self.t1 - self.t0).num_milliseconds();
        if span == 0 {
            return (self.x0 + self.x1) / 2.0;
        }
        let offset = (t - self.t0).num_milliseconds();
        self.x0 + offset as f64 / span as f64 * (self.x1 - self.x0)
    }
}

/// Piecewise-linear time axis.
///
/// In combined hourly+daily charts the hourly part gets a fixed share of
/// the width regardless of how much time it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    segments: Vec<Segment>,
}

impl TimeAxis {
    pub fn linear(start: DateTime<Utc>, end: DateTime<Utc>, x0: f64, x1: f64) -> Self {
        Self { segments: vec![Segment { t0: start, t1: end, x0, x1 }] }
    }

    /// Two segments meeting at `split`, the hourly one taking `ratio` of the
    /// width.
    pub fn split(
        start: DateTime<Utc>,
        split: DateTime<Utc>,
        end: DateTime<Utc>,
        x0: f64,
        x1: f64,
        ratio: f64,
    ) -> Self {
        let xs = x0 + (x1 - x0) * ratio;
        Self {
            segments: vec![
                Segment { t0: start, t1: split, x0, x1: xs },
                Segment { t0: split, t1: end, x0: xs, x1 },
            ],
        }
    }

    /// Axis for a merged series; split when it extends past the hourly data.
    pub fn for_series(
        hourly: &[WeatherSample],
        merged: &[WeatherSample],
        x0: f64,
        x1: f64,
        ratio: f64,
    ) -> Option<Self> {
        let start = merged.first()?.timestamp;
        let end = merged.last()?.timestamp;

        match hourly.iter().map(|s| s.timestamp).max() {
            Some(split) if start < split && split < end => {
                Some(Self::split(start, split, end, x0, x1, ratio))
            }
            _ => Some(Self::linear(start, end, x0, x1)),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.segments[0].t0
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.segments[self.segments.len() - 1].t1
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start() <= t && t <= self.end()
    }

    /// Pixel position of `t`; times outside the axis extrapolate from the
    /// nearest segment.
    pub fn x(&self, t: DateTime<Utc>) -> f64 {
        let segment = self
            .segments
            .iter()
            .find(|s| t <= s.t1)
            .unwrap_or(&self.segments[self.segments.len() - 1]);
        segment.x(t)
    }

    /// UTC midnights strictly inside the axis.
    pub fn day_boundaries(&self) -> Vec<DateTime<Utc>> {
        let mut day = self.start().date_naive().and_time(NaiveTime::MIN).and_utc();
        let mut boundaries = Vec::new();
        loop {
            day += Duration::days(1);
            if day >= self.end() {
                break;
            }
            boundaries.push(day);
        }
        boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn series(times: &[DateTime<Utc>]) -> Vec<WeatherSample> {
        times.iter().map(|t| WeatherSample::at(*t)).collect()
    }

    #[test]
    fn linear_axis_maps_endpoints() {
        let axis = TimeAxis::linear(t(1, 0), t(2, 0), 10.0, 110.0);

        assert_eq!(axis.x(t(1, 0)), 10.0);
        assert_eq!(axis.x(t(1, 12)), 60.0);
        assert_eq!(axis.x(t(2, 0)), 110.0);
    }

    #[test]
    fn split_axis_gives_hourly_part_its_ratio() {
        // One day of hourly data, five days of daily data, split 50/50.
        let axis = TimeAxis::split(t(1, 0), t(2, 0), t(7, 0), 0.0, 200.0, 0.5);

        assert_eq!(axis.x(t(1, 12)), 50.0);
        assert_eq!(axis.x(t(2, 0)), 100.0);
        assert_eq!(axis.x(t(7, 0)), 200.0);
        assert!(axis.x(t(3, 0)) < axis.x(t(4, 0)));
    }

    #[test]
    fn for_series_splits_only_when_daily_extends_past_hourly() {
        let hourly = series(&[t(1, 0), t(1, 12)]);
        let merged = series(&[t(1, 0), t(1, 12), t(3, 12)]);

        let split = TimeAxis::for_series(&hourly, &merged, 0.0, 100.0, 0.25).unwrap();
        assert_eq!(split.x(t(1, 12)), 25.0);

        let linear = TimeAxis::for_series(&hourly, &hourly, 0.0, 100.0, 0.25).unwrap();
        assert_eq!(linear.x(t(1, 12)), 100.0);

        assert!(TimeAxis::for_series(&hourly, &[], 0.0, 100.0, 0.25).is_none());
    }

    #[test]
    fn single_instant_maps_to_middle() {
        let axis = TimeAxis::linear(t(1, 6), t(1, 6), 0.0, 100.0);
        assert_eq!(axis.x(t(1, 6)), 50.0);
    }

    #[test]
    fn day_boundaries_are_interior_midnights() {
        let axis = TimeAxis::linear(t(1, 6), t(4, 0), 0.0, 100.0);

        assert_eq!(axis.day_boundaries(), vec![t(2, 0), t(3, 0)]);
    }
}
