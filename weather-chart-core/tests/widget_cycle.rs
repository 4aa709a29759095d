use std::{fs, sync::Arc, time::Duration};

use chrono::{TimeZone, Utc};
use tokio::time::timeout;
use weather_chart_core::{
    ChartConfig, FileSources, HostSignal, WeatherProvider, Widget, merge,
    provider::demo::DemoProvider, provider_from_config, render_once,
};

const HOURLY: &str = r#"[
    { "timestamp": "2026-02-01T10:00:00Z", "temperature": 1.5, "rainAmount": 0.4, "weatherIconId": "10d" },
    { "timestamp": "2026-02-01T11:00:00Z", "temperature": 4.0, "rainAmount": 0.0, "weatherIconId": "04d" },
    { "timestamp": "2026-02-01T12:00:00Z", "temperature": 2.5, "weatherIconId": "04d" },
    { "timestamp": "2026-02-01T13:00:00Z", "temperature": 6.0 }
]"#;

const DAILY: &str = r#"[
    { "timestamp": "2026-02-01T13:00:00Z", "minTemperature": -9.0, "maxTemperature": 30.0 },
    { "timestamp": "2026-02-02T12:00:00Z", "minTemperature": -1.0, "maxTemperature": 5.0, "precipitationAmount": 3.0 },
    { "timestamp": "2026-02-03T12:00:00Z", "minTemperature": 0.0, "maxTemperature": 7.0 }
]"#;

#[tokio::test(start_paused = true)]
async fn demo_widget_publishes_full_chart() {
    let anchor = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap();
    let mut config = ChartConfig::default();
    config.show.air_quality = true;

    let widget = Widget::new(config, Arc::new(DemoProvider::with_anchor(anchor))).expect("widget");
    assert_eq!(widget.plan().expected_updates(), 3);

    let mut handle = widget.spawn();
    handle.signal(HostSignal::Start).await;
    timeout(Duration::from_secs(1), handle.redraws.changed())
        .await
        .expect("redraw in time")
        .expect("widget alive");

    let redraw = handle.redraws.borrow().clone().expect("chart");
    assert!(redraw.svg.contains("</svg>"));
    assert_eq!(redraw.animation, Duration::from_millis(1000));
    handle.shutdown().await;
}

#[tokio::test]
async fn file_provider_renders_merged_series() {
    let dir = tempfile::tempdir().expect("tempdir");
    let hourly = dir.path().join("hourly.json");
    let daily = dir.path().join("daily.json");
    fs::write(&hourly, HOURLY).expect("write hourly");
    fs::write(&daily, DAILY).expect("write daily");

    let mut config = ChartConfig {
        provider: "file".to_string(),
        files: FileSources { hourly: Some(hourly), forecast: Some(daily), pollution: None },
        ..Default::default()
    };
    config.show.night = false;
    let provider = provider_from_config(&config).expect("provider");

    let svg = render_once(&config, provider.as_ref()).await.expect("render").expect("chart");
    let hourly = provider.hourly_samples();
    let daily = provider.forecast_samples();

    // The daily sample at the last hourly timestamp loses to the hourly one.
    let merged = merge(&hourly, &daily);
    assert_eq!(merged.len(), 6);
    assert!(merged.iter().all(|s| s.max_temperature != Some(30.0)));

    assert!(svg.contains("10d.svg"));
    assert!(svg.contains("6°"));
}

#[tokio::test]
async fn empty_files_skip_rendering() {
    let dir = tempfile::tempdir().expect("tempdir");
    let hourly = dir.path().join("hourly.json");
    fs::write(&hourly, "[]").expect("write");

    let config = ChartConfig {
        provider: "file".to_string(),
        mode: "hourly".to_string(),
        files: FileSources { hourly: Some(hourly), ..Default::default() },
        ..Default::default()
    };
    let provider = provider_from_config(&config).expect("provider");

    assert!(render_once(&config, provider.as_ref()).await.expect("render").is_none());
}
