//! In-memory device session used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use sonos_session::{
    DeviceSession, PlayMode, SessionConnector, SessionError, TrackInfo, TransportState, ZoneGroup,
    ZoneInfo, ZoneMember,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const LOCAL_MAC: &str = "00:0E:58:A0:00:01";
pub const LOCAL_UUID: &str = "RINCON_000E58A0000101400";
pub const DEN_UUID: &str = "RINCON_000E58B0000201400";
pub const OFFICE_UUID: &str = "RINCON_000E58C0000301400";
pub const OFFICE_IP: &str = "10.0.0.3";

/// Commands (and failing attempts) seen by a [`MockSession`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Play,
    Pause,
    SetVolume(u8),
    SetPlayMode(PlayMode),
    Seek(u64),
    Next,
    Previous,
    LeaveGroup,
    JoinGroup(String),
    SetCrossfadeMode(bool),
}

#[derive(Debug, Clone)]
pub struct MockState {
    pub name: String,
    pub volume: u8,
    pub transport: TransportState,
    pub track: TrackInfo,
    pub play_mode: PlayMode,
    pub groups: Vec<ZoneGroup>,
    pub mac_address: String,
    pub supports_fixed: bool,
    pub fixed: bool,
    pub crossfade: Result<bool, SessionError>,
    /// Errors returned by the next commands, in order
    pub command_failures: Vec<SessionError>,
    pub calls: Vec<Call>,
    pub track_queries: usize,
}

pub struct MockSession {
    state: Mutex<MockState>,
}

pub fn member(uuid: &str, zone_name: &str, ip: &str, invisible: bool) -> ZoneMember {
    ZoneMember {
        uuid: uuid.to_string(),
        zone_name: zone_name.to_string(),
        location: format!("http://{}:1400/xml/device_description.xml", ip),
        invisible,
    }
}

/// Local speaker coordinating "Living Room" + "Den", plus a separate "Office"
pub fn household() -> Vec<ZoneGroup> {
    vec![
        ZoneGroup {
            id: format!("{}:12", LOCAL_UUID),
            coordinator: LOCAL_UUID.to_string(),
            members: vec![
                member(LOCAL_UUID, "Living Room", "10.0.0.1", false),
                member(DEN_UUID, "Den", "10.0.0.2", false),
            ],
        },
        ZoneGroup {
            id: format!("{}:4", OFFICE_UUID),
            coordinator: OFFICE_UUID.to_string(),
            members: vec![member(OFFICE_UUID, "Office", OFFICE_IP, false)],
        },
    ]
}

pub fn track(title: &str, duration_secs: u64, position_secs: u64) -> TrackInfo {
    TrackInfo {
        title: title.to_string(),
        artist: format!("{} Artist", title),
        album: format!("{} Album", title),
        duration_secs,
        position_secs,
    }
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                name: "Living Room".to_string(),
                volume: 25,
                transport: TransportState::Stopped,
                track: TrackInfo::default(),
                play_mode: PlayMode::Normal,
                groups: household(),
                mac_address: LOCAL_MAC.to_string(),
                supports_fixed: false,
                fixed: false,
                crossfade: Ok(false),
                command_failures: Vec::new(),
                calls: Vec::new(),
                track_queries: 0,
            }),
        }
    }

    pub fn playing(self, track: TrackInfo) -> Self {
        self.update(|s| {
            s.transport = TransportState::Playing;
            s.track = track;
        });
        self
    }

    pub fn with_fixed_volume(self) -> Self {
        self.update(|s| {
            s.supports_fixed = true;
            s.fixed = true;
        });
        self
    }

    pub fn update(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn set_track(&self, track: TrackInfo) {
        self.update(|s| s.track = track);
    }

    pub fn fail_next_command(&self, error: SessionError) {
        self.update(|s| s.command_failures.push(error));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn track_queries(&self) -> usize {
        self.state.lock().unwrap().track_queries
    }

    fn command(&self, call: Call) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.clone());
        if !state.command_failures.is_empty() {
            return Err(state.command_failures.remove(0));
        }
        match call {
            Call::Play => state.transport = TransportState::Playing,
            Call::Pause => state.transport = TransportState::Paused,
            Call::SetVolume(v) => state.volume = v,
            Call::SetPlayMode(mode) => state.play_mode = mode,
            Call::Seek(position) => state.track.position_secs = position,
            Call::SetCrossfadeMode(enabled) => state.crossfade = Ok(enabled),
            _ => {}
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceSession for MockSession {
    async fn name(&self) -> Result<String, SessionError> {
        Ok(self.state.lock().unwrap().name.clone())
    }

    async fn volume(&self) -> Result<u8, SessionError> {
        Ok(self.state.lock().unwrap().volume)
    }

    async fn current_state(&self) -> Result<TransportState, SessionError> {
        Ok(self.state.lock().unwrap().transport)
    }

    async fn current_track(&self) -> Result<TrackInfo, SessionError> {
        let mut state = self.state.lock().unwrap();
        state.track_queries += 1;
        Ok(state.track.clone())
    }

    async fn play_mode(&self) -> Result<PlayMode, SessionError> {
        Ok(self.state.lock().unwrap().play_mode)
    }

    async fn all_groups(&self) -> Result<Vec<ZoneGroup>, SessionError> {
        Ok(self.state.lock().unwrap().groups.clone())
    }

    async fn zone_info(&self) -> Result<ZoneInfo, SessionError> {
        Ok(ZoneInfo {
            mac_address: self.state.lock().unwrap().mac_address.clone(),
        })
    }

    async fn supports_fixed_volume(&self) -> Result<bool, SessionError> {
        Ok(self.state.lock().unwrap().supports_fixed)
    }

    async fn fixed_volume(&self) -> Result<bool, SessionError> {
        Ok(self.state.lock().unwrap().fixed)
    }

    async fn crossfade_mode(&self) -> Result<bool, SessionError> {
        self.state.lock().unwrap().crossfade.clone()
    }

    async fn play(&self) -> Result<(), SessionError> {
        self.command(Call::Play)
    }

    async fn pause(&self) -> Result<(), SessionError> {
        self.command(Call::Pause)
    }

    async fn set_volume(&self, volume: u8) -> Result<(), SessionError> {
        self.command(Call::SetVolume(volume))
    }

    async fn set_play_mode(&self, mode: PlayMode) -> Result<(), SessionError> {
        self.command(Call::SetPlayMode(mode))
    }

    async fn seek(&self, position_secs: u64) -> Result<(), SessionError> {
        self.command(Call::Seek(position_secs))
    }

    async fn next(&self) -> Result<(), SessionError> {
        self.command(Call::Next)
    }

    async fn previous(&self) -> Result<(), SessionError> {
        self.command(Call::Previous)
    }

    async fn leave_group(&self) -> Result<(), SessionError> {
        self.command(Call::LeaveGroup)
    }

    async fn join_group(&self, coordinator_id: &str) -> Result<(), SessionError> {
        self.command(Call::JoinGroup(coordinator_id.to_string()))
    }

    async fn set_crossfade_mode(&self, enabled: bool) -> Result<(), SessionError> {
        self.command(Call::SetCrossfadeMode(enabled))
    }
}

/// Hands out one [`MockSession`] per address and remembers who was contacted
#[derive(Default)]
pub struct MockConnector {
    peers: Mutex<HashMap<String, Arc<MockSession>>>,
    connected: Mutex<Vec<String>>,
}

impl MockConnector {
    pub fn peer(&self, address: &str) -> Arc<MockSession> {
        self.peers
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_insert_with(|| Arc::new(MockSession::new()))
            .clone()
    }

    pub fn connected(&self) -> Vec<String> {
        self.connected.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionConnector for MockConnector {
    async fn connect(&self, address: &str) -> Result<Arc<dyn DeviceSession>, SessionError> {
        self.connected.lock().unwrap().push(address.to_string());
        Ok(self.peer(address))
    }
}
