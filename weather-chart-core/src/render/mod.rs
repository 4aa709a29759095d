//! Turning provider series into an SVG chart.

pub mod axis;
mod chart;
pub mod daylight;
pub mod icons;
pub mod scale;

use crate::config::ChartConfig;
use crate::error::Result;
use crate::model::WeatherSample;
use crate::series::{annotate, merge};
use crate::session::RenderSession;

use chart::Chart;
use icons::{auto_icon_size, image_elements, splice_into_svg};

/// Render the chart for one redraw.
///
/// Returns `None` when there is nothing to plot; the host keeps showing its
/// previous chart in that case.
pub fn render_chart(
    config: &ChartConfig,
    hourly: &[WeatherSample],
    daily: &[WeatherSample],
    pollution: &[WeatherSample],
    session: &mut RenderSession,
) -> Result<Option<String>> {
    let merged = merge(hourly, daily);
    if merged.is_empty() {
        log::debug!("No samples to plot, skipping redraw");
        return Ok(None);
    }
    let samples = annotate(merged.clone());

    let Some(mut chart) = Chart::new(config, &samples, hourly, &merged, pollution) else {
        return Ok(None);
    };

    session.begin_render();
    let has_icons = samples.iter().any(|p| p.sample.weather_icon_id.is_some());
    if config.show.icons && has_icons {
        let size = match (config.icon_size, session.icon_size) {
            (Some(fixed), _) => fixed,
            (None, Some(cached)) => cached,
            (None, None) => {
                let size = auto_icon_size(chart.xs());
                session.icon_size = Some(size);
                size
            }
        };
        chart.reserve_icons(size);
    }

    let (svg, icons) = chart.draw(session)?;
    log::debug!(
        "Rendered {} samples ({} hourly, {} daily) with {} icons",
        samples.len(),
        hourly.len(),
        daily.len(),
        icons.len()
    );

    Ok(Some(splice_into_svg(svg, &image_elements(&icons))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::demo::{daily_series, hourly_series, pollution_series};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 6, 0, 0).unwrap()
    }

    fn sample(hours: i64, temperature: f64) -> WeatherSample {
        WeatherSample::at(anchor() + Duration::hours(hours)).with_temperature(temperature)
    }

    #[test]
    fn empty_inputs_render_nothing() {
        let mut session = RenderSession::new();
        let svg = render_chart(&ChartConfig::default(), &[], &[], &[], &mut session).unwrap();

        assert!(svg.is_none());
        assert_eq!(session.renders(), 0);
    }

    #[test]
    fn full_chart_is_an_svg_document() {
        let config = ChartConfig::default();
        let mut session = RenderSession::new();

        let svg = render_chart(
            &config,
            &hourly_series(anchor()),
            &daily_series(anchor()),
            &pollution_series(anchor()),
            &mut session,
        )
        .unwrap()
        .expect("chart");

        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("<image class=\"weather-icon\""));
        assert_eq!(session.renders(), 1);
    }

    #[test]
    fn temperature_extremes_are_labelled() {
        let mut config = ChartConfig::default();
        config.show.night = false;
        let hourly = [sample(0, 1.0), sample(1, 17.0), sample(2, 3.0), sample(3, 9.0)];
        let mut session = RenderSession::new();

        let svg = render_chart(&config, &hourly, &[], &[], &mut session).unwrap().expect("chart");

        for label in ["17°", "3°", "9°"] {
            assert!(svg.contains(label), "missing label {label}");
        }
    }

    #[test]
    fn auto_icon_size_is_cached_in_session() {
        let config = ChartConfig::default();
        let mut session = RenderSession::new();
        let hourly = hourly_series(anchor());

        render_chart(&config, &hourly, &[], &[], &mut session).unwrap();
        let first = session.icon_size.expect("icon size chosen");

        render_chart(&config, &hourly[..4], &[], &[], &mut session).unwrap();
        assert_eq!(session.icon_size, Some(first));
    }

    #[test]
    fn configured_icon_size_wins() {
        let config = ChartConfig { icon_size: Some(24), ..Default::default() };
        let mut session = RenderSession::new();

        let svg = render_chart(&config, &hourly_series(anchor()), &[], &[], &mut session)
            .unwrap()
            .expect("chart");

        assert!(svg.contains(r#"width="24" height="24""#));
        assert_eq!(session.icon_size, None);
    }

    #[test]
    fn icons_can_be_hidden() {
        let mut config = ChartConfig::default();
        config.show.icons = false;
        let mut session = RenderSession::new();

        let svg = render_chart(&config, &hourly_series(anchor()), &[], &[], &mut session)
            .unwrap()
            .expect("chart");

        assert!(!svg.contains("<image"));
    }
}
