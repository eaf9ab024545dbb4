//! Configuration for a speaker instance

use sonos_session::{DeviceEvent, RetryPolicy};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::{Result, SpeakerError};

/// Tuning for one [`Speaker`](crate::Speaker)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerConfig {
    /// Period of the progress interpolation timer; the interpolated
    /// position advances by this many whole seconds per tick
    /// Default: 1 second
    pub tick_interval: Duration,

    /// Capacity of the device event channel created by [`SpeakerConfig::event_channel`]
    /// Default: 64
    pub event_buffer_size: usize,

    /// Capacity of the handle-to-speaker command channel
    /// Default: 32
    pub command_buffer_size: usize,

    /// Timeout and retry applied to every remote call
    /// Default: 5 second timeout, retries after 200/500/1000 ms
    pub retry: RetryPolicy,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            event_buffer_size: 64,
            command_buffer_size: 32,
            retry: RetryPolicy::default(),
        }
    }
}

impl SpeakerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single attempt per remote call, for callers that do their own retrying
    pub fn no_retry() -> Self {
        Self {
            retry: RetryPolicy::no_retry(Duration::from_secs(5)),
            ..Default::default()
        }
    }

    /// Smaller channels for hosts running many speakers
    pub fn resource_efficient() -> Self {
        Self {
            event_buffer_size: 16,
            command_buffer_size: 8,
            ..Default::default()
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    pub fn with_command_buffer_size(mut self, size: usize) -> Self {
        self.command_buffer_size = size;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Channel for the transport layer to push [`DeviceEvent`]s into
    pub fn event_channel(&self) -> (mpsc::Sender<DeviceEvent>, mpsc::Receiver<DeviceEvent>) {
        mpsc::channel(self.event_buffer_size.max(1))
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval < Duration::from_secs(1) || self.tick_interval.subsec_nanos() != 0 {
            return Err(SpeakerError::Configuration(
                "Tick interval must be a whole number of seconds".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(SpeakerError::Configuration(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.command_buffer_size == 0 {
            return Err(SpeakerError::Configuration(
                "Command buffer size must be greater than 0".to_string(),
            ));
        }

        if self.retry.call_timeout == Duration::ZERO {
            return Err(SpeakerError::Configuration(
                "Remote call timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
