//! Per-instance state threaded through fetch cycles and render passes.

use crate::config::Mode;
use crate::provider::{Capabilities, PollutionFetch};

/// The fetches one cycle issues and how many completions it waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePlan {
    pub hourly: bool,
    pub forecast: bool,
    pub pollution: Option<PollutionFetch>,
}

impl CyclePlan {
    /// A plan that fetches nothing; used when the mode is not recognized.
    pub const IDLE: CyclePlan = CyclePlan { hourly: false, forecast: false, pollution: None };

    pub fn for_mode(mode: Mode, air_quality: bool, capabilities: Capabilities) -> Self {
        match mode {
            Mode::Hourly => CyclePlan { hourly: true, ..Self::IDLE },
            Mode::Daily => CyclePlan { forecast: true, ..Self::IDLE },
            Mode::Full => CyclePlan {
                hourly: true,
                forecast: true,
                pollution: if air_quality { capabilities.pollution() } else { None },
            },
        }
    }

    pub fn expected_updates(&self) -> usize {
        usize::from(self.hourly) + usize::from(self.forecast) + usize::from(self.pollution.is_some())
    }
}

/// Where the previous icon landed, so the next one can avoid overlapping it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnIcon {
    pub id: String,
    pub x: f64,
}

/// Render-session context owned by one widget instance.
#[derive(Debug, Default)]
pub struct RenderSession {
    cycle: u64,
    pending_updates: usize,
    /// Icon size chosen on the first render, reused afterwards.
    pub icon_size: Option<u32>,
    /// Reset at the start of every render pass.
    pub last_icon: Option<DrawnIcon>,
    renders: u64,
}

impl RenderSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch cycle expecting `expected` update notifications.
    /// Returns the cycle id that notifications must carry.
    pub fn begin_cycle(&mut self, expected: usize) -> u64 {
        self.cycle += 1;
        self.pending_updates = expected;
        self.cycle
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn pending_updates(&self) -> usize {
        self.pending_updates
    }

    /// Record one update for `cycle`. Returns true when this completes the
    /// current cycle; stale or surplus updates are ignored.
    pub fn update_available(&mut self, cycle: u64) -> bool {
        if cycle != self.cycle || self.pending_updates == 0 {
            return false;
        }
        self.pending_updates -= 1;
        self.pending_updates == 0
    }

    pub fn begin_render(&mut self) {
        self.last_icon = None;
        self.renders += 1;
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }
}
