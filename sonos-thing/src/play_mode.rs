//! Mapping between the `shuffle`/`repeat` properties and native play modes

use sonos_session::PlayMode;
use state_store::{PropertyRegistry, PropertyValue};
use std::fmt;

use crate::error::{Result, SpeakerError};
use crate::properties::{REPEAT, SHUFFLE};

/// Value of the `repeat` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repeat {
    None,
    One,
    All,
}

impl Repeat {
    pub const ALL: [Repeat; 3] = [Repeat::None, Repeat::One, Repeat::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            Repeat::None => "None",
            Repeat::One => "One",
            Repeat::All => "All",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Repeat::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(shuffle, repeat)` pair a native play mode decomposes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayModeState {
    pub shuffle: bool,
    pub repeat: Repeat,
}

impl PlayModeState {
    pub fn new(shuffle: bool, repeat: Repeat) -> Self {
        Self { shuffle, repeat }
    }

    /// Build from raw property values
    ///
    /// Fails with `UndefinedPlayMode` unless `shuffle` is a boolean and
    /// `repeat` one of the three repeat strings.
    pub fn from_values(shuffle: Option<&PropertyValue>, repeat: Option<&PropertyValue>) -> Result<Self> {
        let parsed_shuffle = shuffle.and_then(PropertyValue::as_bool);
        let parsed_repeat = repeat.and_then(PropertyValue::as_str).and_then(Repeat::parse);

        match (parsed_shuffle, parsed_repeat) {
            (Some(shuffle), Some(repeat)) => Ok(Self { shuffle, repeat }),
            _ => Err(SpeakerError::UndefinedPlayMode {
                shuffle: describe(shuffle),
                repeat: describe(repeat),
            }),
        }
    }

    pub fn mode(&self) -> PlayMode {
        encode(self.shuffle, self.repeat)
    }
}

fn describe(value: Option<&PropertyValue>) -> String {
    value.map_or_else(|| "<unset>".to_string(), |v| v.to_string())
}

/// Split a native mode into `(shuffle, repeat)`
pub fn decode(mode: PlayMode) -> PlayModeState {
    match mode {
        PlayMode::Normal => PlayModeState::new(false, Repeat::None),
        PlayMode::ShuffleNorepeat => PlayModeState::new(true, Repeat::None),
        PlayMode::Shuffle => PlayModeState::new(true, Repeat::All),
        PlayMode::RepeatAll => PlayModeState::new(false, Repeat::All),
        PlayMode::ShuffleRepeatOne => PlayModeState::new(true, Repeat::One),
        PlayMode::RepeatOne => PlayModeState::new(false, Repeat::One),
    }
}

/// Native mode for `(shuffle, repeat)`; total over all six combinations
pub fn encode(shuffle: bool, repeat: Repeat) -> PlayMode {
    match (shuffle, repeat) {
        (false, Repeat::None) => PlayMode::Normal,
        (true, Repeat::None) => PlayMode::ShuffleNorepeat,
        (true, Repeat::All) => PlayMode::Shuffle,
        (false, Repeat::All) => PlayMode::RepeatAll,
        (true, Repeat::One) => PlayMode::ShuffleRepeatOne,
        (false, Repeat::One) => PlayMode::RepeatOne,
    }
}

/// Resolve the mode to send when `pending_key` is about to become `pending_value`
///
/// The other half of the pair is read from `registry`.
pub fn resolve(
    registry: &PropertyRegistry,
    pending_key: &str,
    pending_value: &PropertyValue,
) -> Result<PlayModeState> {
    let shuffle = if pending_key == SHUFFLE {
        Some(pending_value.clone())
    } else {
        registry.get(SHUFFLE)
    };
    let repeat = if pending_key == REPEAT {
        Some(pending_value.clone())
    } else {
        registry.get(REPEAT)
    };
    PlayModeState::from_values(shuffle.as_ref(), repeat.as_ref())
}
