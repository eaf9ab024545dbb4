//! Two-way synchronization between a device session and the property registry
//!
//! Device -> model: [`StateSynchronizer::apply_device_event`] maps push
//! events onto property updates. Model -> device:
//! [`StateSynchronizer::apply_property_write`] validates a consumer write,
//! issues the matching remote command and only then stores the value.
//!
//! All methods take `&mut self`; the owning [`Speaker`](crate::Speaker) task
//! serializes events, writes, actions and ticks, so no locking happens here.

use serde_json::Value;
use sonos_session::{
    DeviceEvent, DeviceSession, PlayMode, SessionConnector, SessionError, TrackMetadata,
    TransportEvent, TransportState,
};
use state_store::{PropertyRegistry, PropertyValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::actions::{Action, ActionName};
use crate::error::{Result, SpeakerError};
use crate::play_mode;
use crate::progress::ProgressInterpolator;
use crate::properties::{self, ALBUM, ARTIST, CROSSFADE, PLAYING, PROGRESS, REPEAT, SHUFFLE, TRACK, VOLUME};
use crate::topology::{self, ActionSchema, GroupTopology};

pub struct StateSynchronizer {
    session: Arc<dyn DeviceSession>,
    connector: Arc<dyn SessionConnector>,
    registry: PropertyRegistry,
    interpolator: ProgressInterpolator,
    name: String,
    fixed_volume: bool,
    local_id: Option<String>,
}

impl StateSynchronizer {
    /// Register the speaker properties on `registry` with their initial values
    pub fn new(
        session: Arc<dyn DeviceSession>,
        connector: Arc<dyn SessionConnector>,
        registry: PropertyRegistry,
        tick_interval: Duration,
    ) -> Result<Self> {
        properties::register_all(&registry)?;
        Ok(Self {
            session,
            connector,
            registry,
            interpolator: ProgressInterpolator::new(tick_interval),
            name: String::new(),
            fixed_volume: false,
            local_id: None,
        })
    }

    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_fixed_volume(&self) -> bool {
        self.fixed_volume
    }

    pub fn interpolator(&self) -> &ProgressInterpolator {
        &self.interpolator
    }

    /// Resolves on the next interpolation tick; never while idle
    pub async fn next_tick(&mut self) {
        self.interpolator.next_tick().await
    }

    /// Stop interpolating, e.g. when the owner shuts down
    pub fn stop_progress(&mut self) {
        self.interpolator.stop();
    }

    /// Initial poll of the device
    ///
    /// Reads name, fixed-volume capability, volume, play state, current
    /// track, play mode and crossfade, in that order. On fixed-volume
    /// devices `volume` becomes read-only and is never polled.
    pub async fn initialize(&mut self) -> Result<()> {
        self.name = self.session.name().await?;

        self.fixed_volume = if self.session.supports_fixed_volume().await? {
            self.session.fixed_volume().await?
        } else {
            false
        };
        if self.fixed_volume {
            info!("{} has fixed volume output; volume is read-only", self.name);
            self.registry.mark_read_only(VOLUME)?;
        } else {
            let volume = self.session.volume().await?;
            self.set(VOLUME, f64::from(volume))?;
        }

        let state = self.session.current_state().await?;
        self.set(PLAYING, state.is_playing())?;

        let track = self.session.current_track().await?;
        if track.has_track() {
            self.set(TRACK, track.title.as_str())?;
            self.set(ALBUM, track.album.as_str())?;
            self.set(ARTIST, track.artist.as_str())?;
            self.interpolator.resync(track.duration_secs, track.position_secs);
            self.publish_progress()?;
            if state.is_playing() {
                self.interpolator.start();
            }
        }

        let mode = self.session.play_mode().await?;
        self.apply_play_mode(mode)?;

        let crossfade = match self.session.crossfade_mode().await {
            Ok(enabled) => enabled,
            Err(SessionError::Unsupported(action)) => {
                debug!("{} does not support {}", self.name, action);
                false
            }
            Err(e) => return Err(e.into()),
        };
        self.set(CROSSFADE, crossfade)?;

        info!("Initialized speaker {}", self.name);
        Ok(())
    }

    /// Apply a push event from the device
    pub async fn apply_device_event(&mut self, event: DeviceEvent) -> Result<()> {
        debug!("{}: {} event", self.name, event.kind());
        match event {
            DeviceEvent::PlayState(state) => self.on_play_state(state),
            DeviceEvent::PlaybackStopped => {
                self.set(PLAYING, false)?;
                self.interpolator.stop();
                self.interpolator.set_position(0);
                self.set(PROGRESS, 0.0)
            }
            DeviceEvent::AVTransport(transport) => self.on_transport(transport).await,
            DeviceEvent::Volume(volume) => {
                if self.fixed_volume {
                    debug!("{}: ignoring volume event on fixed output", self.name);
                    return Ok(());
                }
                self.set(VOLUME, f64::from(volume))
            }
        }
    }

    fn on_play_state(&mut self, state: TransportState) -> Result<()> {
        let playing = state.is_playing();
        self.set(PLAYING, playing)?;
        if playing {
            // start() is a no-op without a duration or with a live timer
            self.interpolator.start();
        } else {
            self.interpolator.stop();
        }
        Ok(())
    }

    async fn on_transport(&mut self, transport: TransportEvent) -> Result<()> {
        if let Some(raw) = transport.play_mode.as_deref() {
            match PlayMode::parse(raw) {
                Some(mode) => self.apply_play_mode(mode)?,
                None => warn!("{}: unknown play mode '{}'", self.name, raw),
            }
        }
        if let Some(crossfade) = transport.crossfade_mode.as_deref() {
            self.set(CROSSFADE, crossfade.trim() != "0")?;
        }

        match transport.track {
            Some(track) => self.on_track_metadata(track).await,
            None => {
                self.set(TRACK, "")?;
                self.set(ARTIST, "")?;
                self.set(ALBUM, "")?;
                self.interpolator.clear();
                self.set(PROGRESS, 0.0)
            }
        }
    }

    async fn on_track_metadata(&mut self, track: TrackMetadata) -> Result<()> {
        self.set(TRACK, track.title.as_str())?;
        self.set(ARTIST, track.artist.as_str())?;
        self.set(ALBUM, track.album.as_str())?;

        self.interpolator.stop();
        if let Some(duration) = track.duration_secs {
            let position = track
                .position_secs
                .unwrap_or_else(|| self.interpolator.position_secs());
            self.interpolator.resync(duration, position);
            self.publish_progress()?;
        }

        self.resync_position().await
    }

    /// Replace the interpolated position with the device's own
    async fn resync_position(&mut self) -> Result<()> {
        let current = self.session.current_track().await?;
        self.interpolator
            .resync(current.duration_secs, current.position_secs);
        self.publish_progress()?;

        if current.has_track() && self.registry.get_bool(PLAYING) == Some(true) {
            self.interpolator.start();
        }
        Ok(())
    }

    /// Route a consumer write to the device, then store it
    ///
    /// Returns whether the stored value changed (and a change was announced).
    /// On failure the registry is left untouched.
    pub async fn apply_property_write(&mut self, key: &str, value: PropertyValue) -> Result<bool> {
        self.registry.validate_write(key, &value)?;
        debug!("{}: write {} = {}", self.name, key, value);

        match key {
            PLAYING => {
                if expect_bool(key, &value)? {
                    self.session.play().await?;
                } else {
                    self.session.pause().await?;
                }
            }
            VOLUME => {
                if self.fixed_volume {
                    return Err(SpeakerError::RejectedWrite(key.to_string()));
                }
                let level = volume_level(expect_number(key, &value)?)?;
                self.session.set_volume(level).await?;
            }
            SHUFFLE | REPEAT => {
                let state = play_mode::resolve(&self.registry, key, &value)?;
                self.session.set_play_mode(state.mode()).await?;
            }
            CROSSFADE => {
                self.session
                    .set_crossfade_mode(expect_bool(key, &value)?)
                    .await?;
            }
            PROGRESS => {
                let target = seek_target(
                    expect_number(key, &value)?,
                    self.interpolator.duration_secs(),
                )?;
                self.session.seek(target).await?;
                self.interpolator.set_position(target);
            }
            _ => return Err(SpeakerError::RejectedWrite(key.to_string())),
        }

        Ok(self.registry.update(key, value)?)
    }

    /// Advance the interpolated position by one tick
    pub fn on_tick(&mut self) -> Result<()> {
        if let Some(progress) = self.interpolator.tick() {
            self.set(PROGRESS, progress)?;
        }
        Ok(())
    }

    /// Input schema of the `group` action for the current topology
    pub async fn build_group_action(&mut self) -> Result<ActionSchema> {
        let groups = self.session.all_groups().await?;
        let local_id = self.local_id().await?;
        let topology = GroupTopology::from_groups(&groups);
        Ok(topology::build_group_action(&topology, &local_id))
    }

    /// Run an action through its start/perform/finish lifecycle
    ///
    /// A failed perform leaves the action `Failed` and returns the error.
    pub async fn perform_action(&mut self, action: &mut Action) -> Result<()> {
        action.start();
        info!("{}: performing {}", self.name, action.name);

        let outcome = match action.name {
            ActionName::Next => self.session.next().await.map_err(SpeakerError::from),
            ActionName::Prev => self.session.previous().await.map_err(SpeakerError::from),
            ActionName::Group => self.regroup(&action.input).await,
        };

        match outcome {
            Ok(()) => {
                action.finish();
                Ok(())
            }
            Err(e) => {
                warn!("{}: {} failed: {}", self.name, action.name, e);
                action.fail();
                Err(e)
            }
        }
    }

    /// Leave the current group, then have every selected coordinator join us
    async fn regroup(&mut self, input: &Value) -> Result<()> {
        let selected = selected_zones(input)?;
        let local_id = self.local_id().await?;

        let current = GroupTopology::from_groups(&self.session.all_groups().await?);
        if let Some(unknown) = selected.iter().find(|name| current.find_by_name(name).is_none()) {
            return Err(SpeakerError::InvalidInput(format!("unknown zone '{}'", unknown)));
        }

        self.session.leave_group().await?;

        let groups = self.session.all_groups().await?;
        let topology = GroupTopology::from_groups(&groups);
        let local_uuid = topology.member_id(&local_id).map(str::to_string).ok_or_else(|| {
            SpeakerError::InvalidOperation(format!("{} is missing from the topology", local_id))
        })?;

        for zone_name in selected {
            let zone = topology
                .find_by_name(&zone_name)
                .ok_or_else(|| SpeakerError::InvalidInput(format!("unknown zone '{}'", zone_name)))?;
            if zone.group_id.starts_with(&local_id) {
                debug!("{}: {} is already our group", self.name, zone.zone_name);
                continue;
            }
            let address = zone.coordinator_address.as_deref().ok_or_else(|| {
                SpeakerError::InvalidOperation(format!("no address for zone '{}'", zone.zone_name))
            })?;

            debug!("{}: asking {} ({}) to join", self.name, zone.zone_name, address);
            let peer = self.connector.connect(address).await?;
            peer.join_group(&local_uuid).await?;
        }
        Ok(())
    }

    async fn local_id(&mut self) -> Result<String> {
        if let Some(id) = &self.local_id {
            return Ok(id.clone());
        }
        let id = self.session.zone_info().await?.local_id();
        self.local_id = Some(id.clone());
        Ok(id)
    }

    fn apply_play_mode(&mut self, mode: PlayMode) -> Result<()> {
        let state = play_mode::decode(mode);
        self.set(SHUFFLE, state.shuffle)?;
        self.set(REPEAT, state.repeat.as_str())
    }

    fn publish_progress(&mut self) -> Result<()> {
        let progress = self.interpolator.progress();
        self.set(PROGRESS, progress)
    }

    /// Device -> model update; announces only real changes
    fn set(&self, key: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let value = value.into();
        if self.registry.update(key, value.clone())? {
            debug!("{}: {} -> {}", self.name, key, value);
        }
        Ok(())
    }
}

/// Seek target in whole seconds for a progress percentage
pub fn seek_target(percent: f64, duration_secs: u64) -> Result<u64> {
    if duration_secs == 0 {
        return Err(SpeakerError::InvalidOperation(
            "Can't change progress without a track".to_string(),
        ));
    }
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(SpeakerError::InvalidInput(format!(
            "progress {} is outside 0..=100",
            percent
        )));
    }
    Ok((percent / 100.0 * duration_secs as f64).floor() as u64)
}

fn volume_level(value: f64) -> Result<u8> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(SpeakerError::InvalidInput(format!(
            "volume {} is outside 0..=100",
            value
        )));
    }
    Ok(value.round() as u8)
}

fn expect_bool(key: &str, value: &PropertyValue) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| SpeakerError::InvalidInput(format!("{} expects a boolean", key)))
}

fn expect_number(key: &str, value: &PropertyValue) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| SpeakerError::InvalidInput(format!("{} expects a number", key)))
}

/// Zone names set to `true` in a `group` action input
fn selected_zones(input: &Value) -> Result<Vec<String>> {
    let fields = match input {
        Value::Null => return Ok(Vec::new()),
        Value::Object(fields) => fields,
        other => {
            return Err(SpeakerError::InvalidInput(format!(
                "group input must be an object, got {}",
                other
            )))
        }
    };

    let mut selected = Vec::new();
    for (name, flag) in fields {
        match flag {
            Value::Bool(true) => selected.push(name.clone()),
            Value::Bool(false) => {}
            other => {
                return Err(SpeakerError::InvalidInput(format!(
                    "'{}' must be a boolean, got {}",
                    name, other
                )))
            }
        }
    }
    Ok(selected)
}
