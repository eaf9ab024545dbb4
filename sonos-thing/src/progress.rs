//! Local playback position estimate between authoritative updates
//!
//! Sonos does not push position telemetry, so while a track plays the
//! interpolator advances its own position once per tick. Any authoritative
//! update (`resync`) discards the running timer.

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolatorState {
    Idle,
    Ticking,
}

#[derive(Debug)]
pub struct ProgressInterpolator {
    period: Duration,
    duration_secs: u64,
    position_secs: u64,
    timer: Option<Interval>,
}

impl ProgressInterpolator {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            duration_secs: 0,
            position_secs: 0,
            timer: None,
        }
    }

    pub fn state(&self) -> InterpolatorState {
        if self.timer.is_some() {
            InterpolatorState::Ticking
        } else {
            InterpolatorState::Idle
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.timer.is_some()
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn position_secs(&self) -> u64 {
        self.position_secs
    }

    /// Progress as a percentage in `[0, 100]`, rounded to two decimals
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        let percent = self.position_secs as f64 / self.duration_secs as f64 * 100.0;
        (percent.clamp(0.0, 100.0) * 100.0).round() / 100.0
    }

    /// Idle -> Ticking, only with a known duration
    ///
    /// Returns whether a new timer was started.
    pub fn start(&mut self) -> bool {
        if self.timer.is_some() || self.duration_secs == 0 {
            return false;
        }
        let mut timer = time::interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
        tracing::trace!("Progress timer started at {}/{}s", self.position_secs, self.duration_secs);
        true
    }

    /// Ticking -> Idle; returns whether a timer was running
    pub fn stop(&mut self) -> bool {
        let was_ticking = self.timer.take().is_some();
        if was_ticking {
            tracing::trace!("Progress timer stopped at {}/{}s", self.position_secs, self.duration_secs);
        }
        was_ticking
    }

    /// Replace the estimate with authoritative values, dropping any timer
    pub fn resync(&mut self, duration_secs: u64, position_secs: u64) {
        self.stop();
        self.duration_secs = duration_secs;
        self.position_secs = position_secs;
    }

    /// Forget the track entirely
    pub fn clear(&mut self) {
        self.resync(0, 0);
    }

    /// Move the estimate without touching the timer (after a seek)
    pub fn set_position(&mut self, position_secs: u64) {
        self.position_secs = position_secs;
    }

    /// Advance one period; returns the new progress while ticking
    pub fn tick(&mut self) -> Option<f64> {
        if self.timer.is_none() {
            return None;
        }
        self.position_secs = self.position_secs.saturating_add(self.period.as_secs());
        Some(self.progress())
    }

    /// Wait for the next timer tick; pending forever while idle
    pub async fn next_tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
