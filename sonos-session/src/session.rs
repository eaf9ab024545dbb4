use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{PlayMode, TrackInfo, TransportState, ZoneGroup, ZoneInfo};

/// Request/response control of one physical device
///
/// Push events are not part of this trait; the transport layer delivers
/// them separately as [`DeviceEvent`](crate::DeviceEvent)s.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    // Queries

    /// Room name shown in the Sonos app
    async fn name(&self) -> Result<String>;

    /// Master volume, 0-100
    async fn volume(&self) -> Result<u8>;

    async fn current_state(&self) -> Result<TransportState>;

    /// Current track with authoritative position and duration
    async fn current_track(&self) -> Result<TrackInfo>;

    async fn play_mode(&self) -> Result<PlayMode>;

    /// All zone groups in the household, in the order the device reports them
    async fn all_groups(&self) -> Result<Vec<ZoneGroup>>;

    async fn zone_info(&self) -> Result<ZoneInfo>;

    /// Whether the device can be switched to fixed (line-level) output
    async fn supports_fixed_volume(&self) -> Result<bool>;

    /// Whether output is currently fixed
    async fn fixed_volume(&self) -> Result<bool>;

    async fn crossfade_mode(&self) -> Result<bool>;

    // Commands

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn set_volume(&self, volume: u8) -> Result<()>;

    async fn set_play_mode(&self, mode: PlayMode) -> Result<()>;

    /// Seek within the current track to `position_secs`
    async fn seek(&self, position_secs: u64) -> Result<()>;

    async fn next(&self) -> Result<()>;

    async fn previous(&self) -> Result<()>;

    /// Leave the current group and become a standalone coordinator
    async fn leave_group(&self) -> Result<()>;

    /// Join the group coordinated by the device whose UUID is `coordinator_id`
    async fn join_group(&self, coordinator_id: &str) -> Result<()>;

    async fn set_crossfade_mode(&self, enabled: bool) -> Result<()>;
}

/// Opens sessions to other devices in the household
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Connect to the device at `address` (IP or host name)
    async fn connect(&self, address: &str) -> Result<Arc<dyn DeviceSession>>;
}

#[async_trait]
impl<T: DeviceSession + ?Sized> DeviceSession for Arc<T> {
    async fn name(&self) -> Result<String> {
        (**self).name().await
    }

    async fn volume(&self) -> Result<u8> {
        (**self).volume().await
    }

    async fn current_state(&self) -> Result<TransportState> {
        (**self).current_state().await
    }

    async fn current_track(&self) -> Result<TrackInfo> {
        (**self).current_track().await
    }

    async fn play_mode(&self) -> Result<PlayMode> {
        (**self).play_mode().await
    }

    async fn all_groups(&self) -> Result<Vec<ZoneGroup>> {
        (**self).all_groups().await
    }

    async fn zone_info(&self) -> Result<ZoneInfo> {
        (**self).zone_info().await
    }

    async fn supports_fixed_volume(&self) -> Result<bool> {
        (**self).supports_fixed_volume().await
    }

    async fn fixed_volume(&self) -> Result<bool> {
        (**self).fixed_volume().await
    }

    async fn crossfade_mode(&self) -> Result<bool> {
        (**self).crossfade_mode().await
    }

    async fn play(&self) -> Result<()> {
        (**self).play().await
    }

    async fn pause(&self) -> Result<()> {
        (**self).pause().await
    }

    async fn set_volume(&self, volume: u8) -> Result<()> {
        (**self).set_volume(volume).await
    }

    async fn set_play_mode(&self, mode: PlayMode) -> Result<()> {
        (**self).set_play_mode(mode).await
    }

    async fn seek(&self, position_secs: u64) -> Result<()> {
        (**self).seek(position_secs).await
    }

    async fn next(&self) -> Result<()> {
        (**self).next().await
    }

    async fn previous(&self) -> Result<()> {
        (**self).previous().await
    }

    async fn leave_group(&self) -> Result<()> {
        (**self).leave_group().await
    }

    async fn join_group(&self, coordinator_id: &str) -> Result<()> {
        (**self).join_group(coordinator_id).await
    }

    async fn set_crossfade_mode(&self, enabled: bool) -> Result<()> {
        (**self).set_crossfade_mode(enabled).await
    }
}

#[async_trait]
impl<T: SessionConnector + ?Sized> SessionConnector for Arc<T> {
    async fn connect(&self, address: &str) -> Result<Arc<dyn DeviceSession>> {
        (**self).connect(address).await
    }
}
