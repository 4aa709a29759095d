//! Sunrise/sunset and night intervals for shading the chart.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

/// Axial tilt in degrees, for telling polar day from polar night.
const AXIAL_TILT_DEG: f64 = 23.44;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunTimes {
    Regular { sunrise: DateTime<Utc>, sunset: DateTime<Utc> },
    PolarDay,
    PolarNight,
}

/// Sun times at a location, `None` for coordinates outside the globe.
pub fn sun_times(date: NaiveDate, latitude: f64, longitude: f64) -> Option<SunTimes> {
    let coords = Coordinates::new(latitude, longitude)?;
    let day = SolarDay::new(coords, date);
    let sunrise = day.event_time(SolarEvent::Sunrise);
    let sunset = day.event_time(SolarEvent::Sunset);

    // The sun never crosses the horizon: both events collapse to one instant.
    if sunrise >= sunset {
        return Some(if latitude * solar_declination(date) > 0.0 {
            SunTimes::PolarDay
        } else {
            SunTimes::PolarNight
        });
    }
    Some(SunTimes::Regular { sunrise, sunset })
}

/// Approximate solar declination in degrees; positive in the northern summer.
fn solar_declination(date: NaiveDate) -> f64 {
    let days_after_solstice = f64::from(date.ordinal0()) + 10.0;
    -AXIAL_TILT_DEG * (2.0 * std::f64::consts::PI / 365.0 * days_after_solstice).cos()
}

/// Night periods between `start` and `end`, clipped to that window.
pub fn night_intervals(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    if end <= start {
        return Vec::new();
    }

    // Daylight intervals for every date that can touch the window; sunrise
    // and sunset can fall on the neighbouring UTC date far from Greenwich.
    let mut days: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    let mut date = start.date_naive() - Duration::days(1);
    let last = end.date_naive() + Duration::days(1);
    while date <= last {
        let Some(times) = sun_times(date, latitude, longitude) else {
            return Vec::new();
        };
        match times {
            SunTimes::Regular { sunrise, sunset } => days.push((sunrise, sunset)),
            SunTimes::PolarDay => {
                let midnight = date.and_time(NaiveTime::MIN).and_utc();
                days.push((midnight, midnight + Duration::days(1)));
            }
            SunTimes::PolarNight => {}
        }
        date += Duration::days(1);
    }
    days.sort();

    let mut nights = Vec::new();
    let mut cursor = start;
    for (rise, set) in days {
        if set <= cursor {
            continue;
        }
        if rise >= end {
            break;
        }
        if rise > cursor {
            nights.push((cursor, rise));
        }
        cursor = set;
    }
    if cursor < end {
        nights.push((cursor, end));
    }
    nights
}
