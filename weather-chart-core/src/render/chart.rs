//! Drawing the forecast chart with plotters' SVG backend.

use chrono::{DateTime, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

use crate::config::ChartConfig;
use crate::error::{ChartError, Result};
use crate::extremes::select_extremes;
use crate::model::WeatherSample;
use crate::series::PlotSample;
use crate::session::RenderSession;

use super::axis::TimeAxis;
use super::daylight::night_intervals;
use super::icons::{IconPlacement, place_icons};
use super::scale::{LinearScale, extent, nice_domain, ticks};

type Area<'b> = DrawingArea<SVGBackend<'b>, Shift>;

const BACKGROUND: RGBColor = RGBColor(0, 0, 0);
const LABEL: RGBColor = RGBColor(200, 200, 200);
const GRID: RGBColor = RGBColor(70, 70, 70);
const NIGHT: RGBColor = RGBColor(60, 60, 100);
const TEMPERATURE: RGBColor = RGBColor(255, 140, 0);
const FEELS_LIKE: RGBColor = RGBColor(255, 205, 130);
const PRECIPITATION: RGBColor = RGBColor(80, 160, 255);
const SNOW: RGBColor = RGBColor(240, 240, 255);
const PROBABILITY: RGBColor = RGBColor(120, 190, 255);
const PRESSURE: RGBColor = RGBColor(170, 170, 170);
const HUMIDITY: RGBColor = RGBColor(0, 200, 200);
const WIND: RGBColor = RGBColor(150, 240, 150);
const UV_INDEX: RGBColor = RGBColor(200, 110, 255);
const AIR_QUALITY: RGBColor = RGBColor(255, 90, 90);

const MARGIN_LEFT: f64 = 36.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 20.0;
const MARGIN_TOP: f64 = 14.0;
const LABEL_SIZE: f64 = 11.0;
/// Share of the plot height used by precipitation bars.
const PRECIPITATION_HEIGHT: f64 = 0.35;
/// Minimum width in pixels for a day label to be drawn.
const DAY_LABEL_MIN_WIDTH: f64 = 28.0;

fn render_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Render(err.to_string())
}

fn label_font() -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, LABEL_SIZE, FontStyle::Normal)
}

fn px(v: f64) -> i32 {
    v.round() as i32
}

/// Format a label value with the locale's decimal separator.
pub(crate) fn format_number(value: f64, decimals: usize, separator: char) -> String {
    let mut text = format!("{value:.decimals$}");
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text.remove(0);
    }
    if separator != '.' {
        text = text.replace('.', &separator.to_string());
    }
    text
}

/// Split a series with gaps into contiguous runs of present points.
fn runs(points: impl IntoIterator<Item = Option<(i32, i32)>>) -> Vec<Vec<(i32, i32)>> {
    let mut out: Vec<Vec<(i32, i32)>> = Vec::new();
    let mut current = Vec::new();
    for point in points {
        match point {
            Some(p) => current.push(p),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Plot rectangle in pixels.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Frame {
    fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Scale mapping `domain` onto the full plot height.
    fn vertical(&self, domain: (f64, f64)) -> LinearScale {
        LinearScale::new(domain, (self.bottom, self.top))
    }
}

/// Labels drawn at the local extremes of a line.
#[derive(Debug, Clone, Copy)]
struct Labels {
    min_delta: Option<f64>,
    decimals: usize,
    suffix: &'static str,
}

struct LineStyle {
    color: RGBColor,
    width: u32,
    labels: Option<Labels>,
}

pub(super) struct Chart<'a> {
    config: &'a ChartConfig,
    samples: &'a [PlotSample],
    pollution: &'a [WeatherSample],
    axis: TimeAxis,
    frame: Frame,
    xs: Vec<f64>,
    icon_size: Option<u32>,
}

impl<'a> Chart<'a> {
    /// Lay out a chart for `samples`; `hourly` decides where the time axis
    /// switches to daily resolution.
    pub(super) fn new(
        config: &'a ChartConfig,
        samples: &'a [PlotSample],
        hourly: &[WeatherSample],
        merged: &[WeatherSample],
        pollution: &'a [WeatherSample],
    ) -> Option<Self> {
        let frame = Frame {
            left: MARGIN_LEFT,
            right: f64::from(config.width) - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: f64::from(config.height) - MARGIN_BOTTOM,
        };
        let axis =
            TimeAxis::for_series(hourly, merged, frame.left, frame.right, config.hourly_ratio)?;
        let xs = samples.iter().map(|p| axis.x(p.sample.timestamp)).collect();

        Some(Self { config, samples, pollution, axis, frame, xs, icon_size: None })
    }

    /// Sample x positions, in the order of `samples`.
    pub(super) fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Keep a band of `size` pixels above the plot for weather icons. The
    /// band never takes more than half of the space above the bottom margin.
    pub(super) fn reserve_icons(&mut self, size: u32) {
        self.icon_size = Some(size);
        let band = (f64::from(size) + 4.0).min((self.frame.bottom - MARGIN_TOP) / 2.0);
        self.frame.top = MARGIN_TOP + band;
    }

    /// Draw the chart and return the SVG document plus the icons to add.
    pub(super) fn draw(&self, session: &mut RenderSession) -> Result<(String, Vec<IconPlacement>)> {
        let mut svg = String::new();
        {
            let root =
                SVGBackend::with_string(&mut svg, (self.config.width, self.config.height))
                    .into_drawing_area();
            root.fill(&BACKGROUND).map_err(render_err)?;

            let show = &self.config.show;
            if show.night {
                self.draw_night(&root)?;
            }
            self.draw_days(&root)?;
            if show.precipitation_amount {
                self.draw_precipitation(&root)?;
            }
            if show.precipitation_probability {
                self.draw_probability(&root)?;
            }
            self.draw_temperatures(&root)?;
            self.draw_secondary_lines(&root)?;
            if show.air_quality {
                self.draw_air_quality(&root)?;
            }

            root.draw(&PathElement::new(
                vec![
                    (px(self.frame.left), px(self.frame.bottom)),
                    (px(self.frame.right), px(self.frame.bottom)),
                ],
                LABEL.stroke_width(1),
            ))
            .map_err(render_err)?;
            root.present().map_err(render_err)?;
        }

        let icons = match self.icon_size {
            Some(size) => self.icon_placements(size, session),
            None => Vec::new(),
        };
        Ok((svg, icons))
    }

    fn label_style(&self, h: HPos, v: VPos) -> TextStyle<'static> {
        label_font().color(&LABEL).pos(Pos::new(h, v))
    }

    fn draw_night(&self, root: &Area<'_>) -> Result<()> {
        let nights = night_intervals(
            self.axis.start(),
            self.axis.end(),
            self.config.latitude,
            self.config.longitude,
        );
        for (from, to) in nights {
            root.draw(&Rectangle::new(
                [
                    (px(self.axis.x(from)), px(self.frame.top)),
                    (px(self.axis.x(to)), px(self.frame.bottom)),
                ],
                NIGHT.mix(0.35).filled(),
            ))
            .map_err(render_err)?;
        }
        Ok(())
    }

    /// Midnight grid lines and a weekday label under each day.
    fn draw_days(&self, root: &Area<'_>) -> Result<()> {
        let boundaries = self.axis.day_boundaries();
        for day in &boundaries {
            let x = px(self.axis.x(*day));
            root.draw(&PathElement::new(
                vec![(x, px(self.frame.top)), (x, px(self.frame.bottom))],
                GRID.stroke_width(1),
            ))
            .map_err(render_err)?;
        }

        let edges: Vec<DateTime<Utc>> = std::iter::once(self.axis.start())
            .chain(boundaries)
            .chain(std::iter::once(self.axis.end()))
            .collect();
        let style = self.label_style(HPos::Center, VPos::Top);
        for pair in edges.windows(2) {
            let (x0, x1) = (self.axis.x(pair[0]), self.axis.x(pair[1]));
            if x1 - x0 < DAY_LABEL_MIN_WIDTH {
                continue;
            }
            root.draw(&Text::new(
                pair[0].format("%a").to_string(),
                (px((x0 + x1) / 2.0), px(self.frame.bottom + 4.0)),
                style.clone(),
            ))
            .map_err(render_err)?;
        }
        Ok(())
    }

    /// Bar width for sample `i`, derived from the spacing to its period
    /// neighbour.
    fn bar_width(&self, i: usize) -> f64 {
        let neighbour = if i + 1 < self.xs.len() { i + 1 } else { i.saturating_sub(1) };
        ((self.xs[neighbour] - self.xs[i]).abs() * 0.8).max(1.0)
    }

    fn draw_precipitation(&self, root: &Area<'_>) -> Result<()> {
        let rates: Vec<Option<f64>> = self.samples.iter().map(PlotSample::precipitation_rate).collect();
        let Some((_, max_rate)) = extent(rates.iter().flatten().copied()) else {
            return Ok(());
        };
        let scale = LinearScale::new(
            (0.0, max_rate.max(1.0)),
            (self.frame.bottom, self.frame.bottom - PRECIPITATION_HEIGHT * self.frame.height()),
        );

        let mut wettest: Option<(usize, f64)> = None;
        for (i, (sample, rate)) in self.samples.iter().zip(&rates).enumerate() {
            let Some(rate) = rate.filter(|r| *r > 0.0) else {
                continue;
            };
            let half = self.bar_width(i) / 2.0;
            let (x0, x1) = (px(self.xs[i] - half), px(self.xs[i] + half));
            let snow = if self.config.show.snow { sample.snow_rate().unwrap_or(0.0) } else { 0.0 };
            let rain_top = scale.map((rate - snow).max(0.0));

            root.draw(&Rectangle::new(
                [(x0, px(rain_top)), (x1, px(self.frame.bottom))],
                PRECIPITATION.mix(0.8).filled(),
            ))
            .map_err(render_err)?;
            if snow > 0.0 {
                root.draw(&Rectangle::new(
                    [(x0, px(scale.map(rate))), (x1, px(rain_top))],
                    SNOW.mix(0.8).filled(),
                ))
                .map_err(render_err)?;
            }
            if wettest.is_none_or(|(_, r)| rate > r) {
                wettest = Some((i, rate));
            }
        }

        if let Some((i, rate)) = wettest {
            let text = format!(
                "{}{}/h",
                format_number(rate, 1, self.config.decimal_separator()),
                self.config.units.precipitation()
            );
            root.draw(&Text::new(
                text,
                (px(self.xs[i]), px(scale.map(rate) - 2.0)),
                self.label_style(HPos::Center, VPos::Bottom),
            ))
            .map_err(render_err)?;
        }
        Ok(())
    }

    fn draw_probability(&self, root: &Area<'_>) -> Result<()> {
        let scale = self.frame.vertical((0.0, 100.0));
        let values: Vec<_> =
            self.samples.iter().map(|p| p.sample.precipitation_probability).collect();
        self.draw_line(root, &values, scale, LineStyle { color: PROBABILITY, width: 1, labels: None })
    }

    fn temperature_domain(&self) -> Option<(f64, f64)> {
        let show = &self.config.show;
        let values = self.samples.iter().flat_map(|p| {
            let s = &p.sample;
            [
                p.temperature_or_mean().filter(|_| show.temperature),
                s.min_temperature.filter(|_| show.min_max_temperature),
                s.max_temperature.filter(|_| show.min_max_temperature),
                s.feels_like_temperature.filter(|_| show.feels_like),
            ]
        });
        let (lo, hi) = extent(values.flatten())?;
        Some(nice_domain(lo, hi, 4))
    }

    fn draw_temperatures(&self, root: &Area<'_>) -> Result<()> {
        let Some(domain) = self.temperature_domain() else {
            return Ok(());
        };
        // Leave headroom above the plot for extreme labels.
        let scale = LinearScale::new(
            domain,
            (self.frame.bottom, self.frame.top + LABEL_SIZE + 2.0),
        );
        self.draw_temperature_ticks(root, scale)?;

        let show = &self.config.show;
        if show.min_max_temperature {
            self.draw_range_band(root, scale)?;
        }
        if show.feels_like {
            let values: Vec<_> =
                self.samples.iter().map(|p| p.sample.feels_like_temperature).collect();
            self.draw_line(root, &values, scale, LineStyle { color: FEELS_LIKE, width: 1, labels: None })?;
        }
        if show.temperature {
            let values: Vec<_> = self.samples.iter().map(PlotSample::temperature_or_mean).collect();
            let labels = Labels { min_delta: None, decimals: 0, suffix: "°" };
            self.draw_line(
                root,
                &values,
                scale,
                LineStyle { color: TEMPERATURE, width: 2, labels: Some(labels) },
            )?;
        }
        Ok(())
    }

    fn draw_temperature_ticks(&self, root: &Area<'_>, scale: LinearScale) -> Result<()> {
        let style = self.label_style(HPos::Right, VPos::Center);
        let separator = self.config.decimal_separator();
        for tick in ticks(scale.domain(), 4) {
            root.draw(&Text::new(
                format_number(tick, 0, separator),
                (px(self.frame.left - 4.0), px(scale.map(tick))),
                style.clone(),
            ))
            .map_err(render_err)?;
        }
        root.draw(&Text::new(
            self.config.units.temperature().to_string(),
            (px(self.frame.left - 4.0), px(self.frame.top - 2.0)),
            self.label_style(HPos::Right, VPos::Bottom),
        ))
        .map_err(render_err)?;
        Ok(())
    }

    /// Shaded band between daily min and max temperatures.
    fn draw_range_band(&self, root: &Area<'_>, scale: LinearScale) -> Result<()> {
        let ranges: Vec<Option<(i32, i32, i32)>> = self
            .samples
            .iter()
            .zip(&self.xs)
            .map(|(p, x)| {
                p.temperature_range()
                    .map(|(lo, hi)| (px(*x), px(scale.map(lo)), px(scale.map(hi))))
            })
            .collect();

        let mut start = 0;
        while start < ranges.len() {
            let len = ranges[start..].iter().take_while(|r| r.is_some()).count();
            if len == 0 {
                start += 1;
                continue;
            }
            let run: Vec<(i32, i32, i32)> = ranges[start..start + len].iter().flatten().copied().collect();
            if run.len() == 1 {
                let (x, lo, hi) = run[0];
                root.draw(&PathElement::new(vec![(x, lo), (x, hi)], TEMPERATURE.mix(0.4).stroke_width(3)))
                    .map_err(render_err)?;
            } else {
                let outline: Vec<(i32, i32)> = run
                    .iter()
                    .map(|(x, _, hi)| (*x, *hi))
                    .chain(run.iter().rev().map(|(x, lo, _)| (*x, *lo)))
                    .collect();
                root.draw(&Polygon::new(outline, TEMPERATURE.mix(0.25).filled()))
                    .map_err(render_err)?;
            }
            start += len;
        }
        Ok(())
    }

    /// Pressure, humidity, wind and UV index, each on its own scale.
    fn draw_secondary_lines(&self, root: &Area<'_>) -> Result<()> {
        let show = &self.config.show;
        let series = |f: fn(&WeatherSample) -> Option<f64>| -> Vec<Option<f64>> {
            self.samples.iter().map(|p| f(&p.sample)).collect()
        };

        if show.pressure {
            let values = series(|s| s.pressure);
            if let Some((lo, hi)) = extent(values.iter().flatten().copied()) {
                let labels = Labels { min_delta: Some(2.0), decimals: 0, suffix: "" };
                self.draw_line(
                    root,
                    &values,
                    self.frame.vertical(nice_domain(lo, hi, 4)),
                    LineStyle { color: PRESSURE, width: 1, labels: Some(labels) },
                )?;
            }
        }
        if show.humidity {
            let labels = Labels { min_delta: Some(10.0), decimals: 0, suffix: "%" };
            self.draw_line(
                root,
                &series(|s| s.humidity),
                self.frame.vertical((0.0, 100.0)),
                LineStyle { color: HUMIDITY, width: 1, labels: Some(labels) },
            )?;
        }
        if show.wind {
            let values = series(|s| s.wind_speed);
            if let Some((_, hi)) = extent(values.iter().flatten().copied()) {
                let labels = Labels { min_delta: Some(2.0), decimals: 0, suffix: "" };
                self.draw_line(
                    root,
                    &values,
                    self.frame.vertical(nice_domain(0.0, hi.max(5.0), 4)),
                    LineStyle { color: WIND, width: 1, labels: Some(labels) },
                )?;
            }
        }
        if show.uv_index {
            let values = series(|s| s.uv_index);
            if let Some((_, hi)) = extent(values.iter().flatten().copied()) {
                self.draw_line(
                    root,
                    &values,
                    self.frame.vertical((0.0, hi.max(11.0))),
                    LineStyle { color: UV_INDEX, width: 1, labels: None },
                )?;
            }
        }
        Ok(())
    }

    /// Air quality from the pollution series, limited to the axis span.
    fn draw_air_quality(&self, root: &Area<'_>) -> Result<()> {
        let scale = self.frame.vertical((0.0, 5.0));
        let points = self.pollution.iter().map(|s| {
            let value = s.air_quality_index.filter(|_| self.axis.contains(s.timestamp))?;
            Some((px(self.axis.x(s.timestamp)), px(scale.map(value))))
        });
        for run in runs(points) {
            root.draw(&PathElement::new(run, AIR_QUALITY.stroke_width(1)))
                .map_err(render_err)?;
        }
        Ok(())
    }

    /// Polyline through the present values, broken at gaps, with optional
    /// extreme labels.
    fn draw_line(
        &self,
        root: &Area<'_>,
        values: &[Option<f64>],
        scale: LinearScale,
        style: LineStyle,
    ) -> Result<()> {
        let points = values
            .iter()
            .zip(&self.xs)
            .map(|(v, x)| v.map(|v| (px(*x), px(scale.map(v)))));
        for run in runs(points) {
            root.draw(&PathElement::new(run, style.color.stroke_width(style.width)))
                .map_err(render_err)?;
        }

        let Some(labels) = style.labels else {
            return Ok(());
        };
        let present: Vec<(f64, f64)> = values
            .iter()
            .zip(&self.xs)
            .filter_map(|(v, x)| v.map(|v| (*x, v)))
            .collect();
        let text_style = label_font()
            .color(&style.color)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        let separator = self.config.decimal_separator();
        for (x, v) in select_extremes(&present, |p| p.1, labels.min_delta) {
            root.draw(&Text::new(
                format!("{}{}", format_number(*v, labels.decimals, separator), labels.suffix),
                (px(*x), px(scale.map(*v) - 4.0)),
                text_style.clone(),
            ))
            .map_err(render_err)?;
        }
        Ok(())
    }

    fn icon_placements(&self, size: u32, session: &mut RenderSession) -> Vec<IconPlacement> {
        let candidates = self
            .samples
            .iter()
            .zip(&self.xs)
            .filter_map(|(p, x)| p.sample.weather_icon_id.as_deref().map(|id| (*x, id)));
        place_icons(candidates, size, MARGIN_TOP / 2.0, &self.config.icon_base_url, session)
    }
}
