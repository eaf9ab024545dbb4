//! Wire-level types exchanged with a device session

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SessionError;

/// Transport state reported by AVTransport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportState {
    Playing,
    Paused,
    Stopped,
    Transitioning,
}

impl TransportState {
    /// Parse a UPnP transport state string (`PLAYING`, `PAUSED_PLAYBACK`, ...)
    ///
    /// Unknown values are treated as stopped.
    pub fn from_upnp(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PLAYING" => TransportState::Playing,
            "PAUSED_PLAYBACK" | "PAUSED" => TransportState::Paused,
            "TRANSITIONING" => TransportState::Transitioning,
            _ => TransportState::Stopped,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportState::Playing => "playing",
            TransportState::Paused => "paused",
            TransportState::Stopped => "stopped",
            TransportState::Transitioning => "transitioning",
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native play modes understood by AVTransport `SetPlayMode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayMode {
    Normal,
    ShuffleNorepeat,
    Shuffle,
    RepeatAll,
    ShuffleRepeatOne,
    RepeatOne,
}

impl PlayMode {
    pub const ALL: [PlayMode; 6] = [
        PlayMode::Normal,
        PlayMode::ShuffleNorepeat,
        PlayMode::Shuffle,
        PlayMode::RepeatAll,
        PlayMode::ShuffleRepeatOne,
        PlayMode::RepeatOne,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "NORMAL" => Some(PlayMode::Normal),
            "SHUFFLE_NOREPEAT" => Some(PlayMode::ShuffleNorepeat),
            "SHUFFLE" => Some(PlayMode::Shuffle),
            "REPEAT_ALL" => Some(PlayMode::RepeatAll),
            "SHUFFLE_REPEAT_ONE" => Some(PlayMode::ShuffleRepeatOne),
            "REPEAT_ONE" => Some(PlayMode::RepeatOne),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayMode::Normal => "NORMAL",
            PlayMode::ShuffleNorepeat => "SHUFFLE_NOREPEAT",
            PlayMode::Shuffle => "SHUFFLE",
            PlayMode::RepeatAll => "REPEAT_ALL",
            PlayMode::ShuffleRepeatOne => "SHUFFLE_REPEAT_ONE",
            PlayMode::RepeatOne => "REPEAT_ONE",
        }
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayMode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayMode::parse(s).ok_or_else(|| SessionError::Parse(format!("unknown play mode '{}'", s)))
    }
}

/// Authoritative track position as returned by `GetPositionInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_secs: u64,
    pub position_secs: u64,
}

impl TrackInfo {
    /// A zero duration means nothing is loaded
    pub fn has_track(&self) -> bool {
        self.duration_secs > 0
    }
}

/// Track metadata carried by an AVTransport event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_secs: Option<u64>,
    pub position_secs: Option<u64>,
}

/// Parsed AVTransport `LastChange` fields relevant to synchronization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportEvent {
    /// Raw `CurrentPlayMode` value
    pub play_mode: Option<String>,

    /// Raw `CurrentCrossfadeMode` value (`"0"` or `"1"`)
    pub crossfade_mode: Option<String>,

    pub track: Option<TrackMetadata>,
}

/// Push events delivered by the transport layer for one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    PlayState(TransportState),
    PlaybackStopped,
    AVTransport(TransportEvent),
    Volume(u8),
}

impl DeviceEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            DeviceEvent::PlayState(_) => "PlayState",
            DeviceEvent::PlaybackStopped => "PlaybackStopped",
            DeviceEvent::AVTransport(_) => "AVTransport",
            DeviceEvent::Volume(_) => "Volume",
        }
    }
}

/// A member of a zone group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMember {
    /// `RINCON_<MAC>01400` identifier
    pub uuid: String,
    pub zone_name: String,
    /// Device description URL, e.g. `http://192.168.1.20:1400/xml/device_description.xml`
    pub location: String,
    pub invisible: bool,
}

impl ZoneMember {
    /// Host part of the member's location URL
    pub fn address(&self) -> Option<&str> {
        let rest = self
            .location
            .strip_prefix("http://")
            .or_else(|| self.location.strip_prefix("https://"))?;
        let authority = rest.split('/').next()?;
        let host = authority.split(':').next()?;
        if host.is_empty() {
            None
        } else {
            Some(host)
        }
    }
}

/// A group of zones playing together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneGroup {
    /// Group identifier, `<coordinator uuid>:<n>`
    pub id: String,
    /// UUID of the coordinating member
    pub coordinator: String,
    pub members: Vec<ZoneMember>,
}

impl ZoneGroup {
    pub fn coordinator_member(&self) -> Option<&ZoneMember> {
        self.members.iter().find(|m| m.uuid == self.coordinator)
    }

    /// Whether any member UUID starts with `uuid_prefix`
    pub fn contains(&self, uuid_prefix: &str) -> bool {
        self.members.iter().any(|m| m.uuid.starts_with(uuid_prefix))
    }
}

/// Network identity reported by `DeviceProperties.GetZoneInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    pub mac_address: String,
}

impl ZoneInfo {
    /// Identifier prefix shared by this device's UUID and its group ids
    pub fn local_id(&self) -> String {
        format!("RINCON_{}", self.mac_address.replace(':', ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PLAYING", TransportState::Playing)]
    #[case("PAUSED_PLAYBACK", TransportState::Paused)]
    #[case("STOPPED", TransportState::Stopped)]
    #[case("TRANSITIONING", TransportState::Transitioning)]
    #[case("NO_MEDIA_PRESENT", TransportState::Stopped)]
    fn test_transport_state_from_upnp(#[case] raw: &str, #[case] expected: TransportState) {
        assert_eq!(TransportState::from_upnp(raw), expected);
    }

    #[test]
    fn test_play_mode_strings() {
        for mode in PlayMode::ALL {
            assert_eq!(PlayMode::parse(mode.as_str()), Some(mode));
            assert_eq!(mode.to_string().parse::<PlayMode>().unwrap(), mode);
        }
        assert!(PlayMode::parse("SHUFFLE_ALL").is_none());
        assert!("bogus".parse::<PlayMode>().is_err());
    }

    #[test]
    fn test_member_address() {
        let member = ZoneMember {
            uuid: "RINCON_000E58A0123401400".to_string(),
            zone_name: "Kitchen".to_string(),
            location: "http://192.168.1.20:1400/xml/device_description.xml".to_string(),
            invisible: false,
        };
        assert_eq!(member.address(), Some("192.168.1.20"));

        let broken = ZoneMember {
            location: "not a url".to_string(),
            ..member
        };
        assert_eq!(broken.address(), None);
    }

    #[test]
    fn test_local_id() {
        let info = ZoneInfo {
            mac_address: "00:0E:58:A0:12:34".to_string(),
        };
        assert_eq!(info.local_id(), "RINCON_000E58A01234");
    }

    #[test]
    fn test_group_membership() {
        let group = ZoneGroup {
            id: "RINCON_B01400:12".to_string(),
            coordinator: "RINCON_B01400".to_string(),
            members: vec![
                ZoneMember {
                    uuid: "RINCON_B01400".to_string(),
                    zone_name: "Den".to_string(),
                    location: "http://10.0.0.2:1400/xml/device_description.xml".to_string(),
                    invisible: false,
                },
                ZoneMember {
                    uuid: "RINCON_A01400".to_string(),
                    zone_name: "Office".to_string(),
                    location: "http://10.0.0.1:1400/xml/device_description.xml".to_string(),
                    invisible: false,
                },
            ],
        };
        assert!(group.contains("RINCON_A"));
        assert!(!group.contains("RINCON_C"));
        assert_eq!(group.coordinator_member().map(|m| m.zone_name.as_str()), Some("Den"));
    }
}
