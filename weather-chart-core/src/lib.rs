//! Core library for the smart-mirror weather chart.
//!
//! This crate defines:
//! - Merging hourly and daily forecast series into one plot-ready series
//! - Picking local extremes for sparse chart labels
//! - Abstraction over weather providers
//! - SVG chart rendering and the scheduled widget lifecycle
//!
//! It is used by `weather-chart-cli`, but can also be embedded by any host
//! that wants a rendered forecast chart.

pub mod config;
pub mod error;
pub mod extremes;
pub mod model;
pub mod provider;
pub mod render;
pub mod schedule;
pub mod series;
pub mod session;
pub mod widget;

pub use config::{ChartConfig, FileSources, Mode, ShowConfig, Units};
pub use error::ChartError;
pub use extremes::select_extremes;
pub use model::WeatherSample;
pub use provider::{Capabilities, ProviderId, WeatherProvider, provider_from_config};
pub use render::render_chart;
pub use series::{PlotSample, merge};
pub use widget::{HostSignal, Redraw, Widget, WidgetHandle, render_once};
