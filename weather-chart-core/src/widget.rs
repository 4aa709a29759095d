//! Widget lifecycle: scheduled fetch cycles and redraw publication.

use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    config::{ChartConfig, Mode},
    error::Result,
    model::WeatherSample,
    provider::{PollutionFetch, WeatherProvider},
    render::render_chart,
    schedule::DelayedTask,
    session::{CyclePlan, RenderSession},
};

/// Lifecycle calls from the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    Start,
    Suspend,
    Resume,
    Shutdown,
}

/// A finished chart handed to the host.
#[derive(Debug, Clone)]
pub struct Redraw {
    pub svg: Arc<str>,
    /// How long the host should take to fade the new chart in.
    pub animation: Duration,
    pub rendered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fetch {
    Hourly,
    Forecast,
    Pollution(PollutionFetch),
}

impl Fetch {
    fn as_str(&self) -> &'static str {
        match self {
            Fetch::Hourly => "hourly",
            Fetch::Forecast => "forecast",
            Fetch::Pollution(PollutionFetch::Forecast) => "pollution forecast",
            Fetch::Pollution(PollutionFetch::Current) => "current pollution",
        }
    }

    fn for_plan(plan: CyclePlan) -> Vec<Fetch> {
        let mut fetches = Vec::new();
        if plan.hourly {
            fetches.push(Fetch::Hourly);
        }
        if plan.forecast {
            fetches.push(Fetch::Forecast);
        }
        if let Some(pollution) = plan.pollution {
            fetches.push(Fetch::Pollution(pollution));
        }
        fetches
    }

    async fn run(self, provider: &dyn WeatherProvider) -> Result<()> {
        match self {
            Fetch::Hourly => provider.fetch_hourly().await,
            Fetch::Forecast => provider.fetch_forecast().await,
            Fetch::Pollution(PollutionFetch::Forecast) => provider.fetch_pollution_forecast().await,
            Fetch::Pollution(PollutionFetch::Current) => provider.fetch_current_pollution().await,
        }
    }
}

/// The chart widget: owns the provider, the timer and the render session.
pub struct Widget {
    config: ChartConfig,
    mode: Option<Mode>,
    provider: Arc<dyn WeatherProvider>,
    session: RenderSession,
    timer: DelayedTask,
    updates_tx: mpsc::UnboundedSender<u64>,
    updates_rx: mpsc::UnboundedReceiver<u64>,
    redraws: watch::Sender<Option<Redraw>>,
}

impl Widget {
    pub fn new(config: ChartConfig, provider: Arc<dyn WeatherProvider>) -> Result<Self> {
        config.validate()?;
        let mode = match config.mode() {
            Ok(mode) => Some(mode),
            Err(err) => {
                log::error!("{err}");
                None
            }
        };
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let (redraws, _) = watch::channel(None);

        Ok(Self {
            config,
            mode,
            provider,
            session: RenderSession::new(),
            timer: DelayedTask::new(),
            updates_tx,
            updates_rx,
            redraws,
        })
    }

    /// CSS assets the host should load for this widget.
    pub fn stylesheets() -> &'static [&'static str] {
        &["weather-chart.css"]
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Redraw>> {
        self.redraws.subscribe()
    }

    pub fn session(&self) -> &RenderSession {
        &self.session
    }

    pub fn start(&mut self) {
        log::info!(
            "Starting weather chart ({} provider, mode {})",
            self.provider.id(),
            self.config.mode
        );
        self.timer.arm(self.config.initial_load_delay());
    }

    pub fn suspend(&mut self) {
        log::debug!("Suspended, cancelling scheduled update");
        self.timer.cancel();
    }

    pub fn resume(&mut self) {
        log::debug!("Resumed, updating now");
        self.timer.arm(Duration::ZERO);
    }

    /// The fetches the current mode and provider call for.
    pub fn plan(&self) -> CyclePlan {
        match self.mode {
            Some(mode) => {
                CyclePlan::for_mode(mode, self.config.show.air_quality, self.provider.capabilities())
            }
            None => CyclePlan::IDLE,
        }
    }

    /// Start a fetch cycle. The next one is scheduled now in case a fetch
    /// fails, and again once the cycle has rendered.
    fn begin_cycle(&mut self) {
        let plan = self.plan();
        let cycle = self.session.begin_cycle(plan.expected_updates());
        self.timer.arm(self.config.update_interval());

        if self.mode.is_none() {
            log::error!("Unknown mode '{}', not fetching", self.config.mode);
            return;
        }
        log::debug!("Cycle {cycle}: expecting {} updates", plan.expected_updates());

        for fetch in Fetch::for_plan(plan) {
            let provider = Arc::clone(&self.provider);
            let updates = self.updates_tx.clone();
            tokio::spawn(async move {
                match fetch.run(provider.as_ref()).await {
                    Ok(()) => {
                        let _ = updates.send(cycle);
                    }
                    Err(err) => log::warn!("{} fetch failed: {err}", fetch.as_str()),
                }
            });
        }
    }

    fn on_update(&mut self, cycle: u64) {
        if !self.session.update_available(cycle) {
            return;
        }
        if let Err(err) = self.redraw() {
            log::error!("Redraw failed: {err}");
        }
        if self.timer.is_armed() {
            self.timer.arm(self.config.update_interval());
        }
    }

    /// Series to plot for the current mode: (hourly, daily, pollution).
    fn series(&self) -> (Vec<WeatherSample>, Vec<WeatherSample>, Vec<WeatherSample>) {
        let pollution = if self.plan().pollution.is_some() {
            self.provider.pollution_samples()
        } else {
            Vec::new()
        };
        match self.mode {
            Some(Mode::Hourly) => (self.provider.hourly_samples(), Vec::new(), pollution),
            Some(Mode::Daily) => (Vec::new(), self.provider.forecast_samples(), pollution),
            Some(Mode::Full) => {
                (self.provider.hourly_samples(), self.provider.forecast_samples(), pollution)
            }
            None => (Vec::new(), Vec::new(), Vec::new()),
        }
    }

    /// Render from the provider's current series and publish the result.
    /// Returns `None` when there was nothing to draw.
    pub fn redraw(&mut self) -> Result<Option<Redraw>> {
        let (hourly, daily, pollution) = self.series();
        let Some(svg) = render_chart(&self.config, &hourly, &daily, &pollution, &mut self.session)?
        else {
            return Ok(None);
        };

        let redraw = Redraw {
            svg: Arc::from(svg),
            animation: self.config.animation_speed(),
            rendered_at: Utc::now(),
        };
        self.redraws.send_replace(Some(redraw.clone()));
        log::info!("Chart updated ({} renders)", self.session.renders());
        Ok(Some(redraw))
    }

    /// Drive the widget until `Shutdown` arrives or the host drops its
    /// sender.
    pub async fn run(mut self, mut signals: mpsc::Receiver<HostSignal>) {
        loop {
            tokio::select! {
                signal = signals.recv() => match signal {
                    Some(HostSignal::Start) => self.start(),
                    Some(HostSignal::Suspend) => self.suspend(),
                    Some(HostSignal::Resume) => self.resume(),
                    Some(HostSignal::Shutdown) | None => break,
                },
                _ = self.timer.fired() => self.begin_cycle(),
                Some(cycle) = self.updates_rx.recv() => self.on_update(cycle),
            }
        }
        log::info!("Weather chart stopped");
    }

    /// Run the widget on a background task.
    pub fn spawn(self) -> WidgetHandle {
        let (signals, signal_rx) = mpsc::channel(8);
        let redraws = self.subscribe();
        let task = tokio::spawn(self.run(signal_rx));
        WidgetHandle { signals, redraws, task }
    }
}

/// Host-side handle to a spawned widget.
pub struct WidgetHandle {
    signals: mpsc::Sender<HostSignal>,
    /// Latest chart; `None` until the first successful redraw.
    pub redraws: watch::Receiver<Option<Redraw>>,
    task: JoinHandle<()>,
}

impl WidgetHandle {
    /// Forward a lifecycle call. Signals sent after shutdown are dropped.
    pub async fn signal(&self, signal: HostSignal) {
        let _ = self.signals.send(signal).await;
    }

    pub async fn shutdown(self) {
        self.signal(HostSignal::Shutdown).await;
        let _ = self.task.await;
    }
}

/// Fetch everything the configured mode needs, then render once.
pub async fn render_once(
    config: &ChartConfig,
    provider: &dyn WeatherProvider,
) -> Result<Option<String>> {
    config.validate()?;
    let mode = config.mode()?;
    let plan = CyclePlan::for_mode(mode, config.show.air_quality, provider.capabilities());
    for fetch in Fetch::for_plan(plan) {
        fetch.run(provider).await?;
    }

    let hourly = if plan.hourly { provider.hourly_samples() } else { Vec::new() };
    let daily = if plan.forecast { provider.forecast_samples() } else { Vec::new() };
    let pollution = if plan.pollution.is_some() { provider.pollution_samples() } else { Vec::new() };

    render_chart(config, &hourly, &daily, &pollution, &mut RenderSession::new())
}
