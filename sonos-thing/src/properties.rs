//! Property keys and descriptors exposed for a speaker

use state_store::{PropertyDescriptor, PropertyRegistry, PropertyValue};

use crate::error::Result;
use crate::play_mode::Repeat;

pub const VOLUME: &str = "volume";
pub const PLAYING: &str = "playing";
pub const SHUFFLE: &str = "shuffle";
pub const REPEAT: &str = "repeat";
pub const CROSSFADE: &str = "crossfade";
pub const TRACK: &str = "track";
pub const ALBUM: &str = "album";
pub const ARTIST: &str = "artist";
pub const PROGRESS: &str = "progress";

/// Semantic device types advertised for a speaker
pub const DEVICE_TYPES: [&str; 2] = ["Speaker", "MediaPlayer"];

/// All property keys in registration order
pub const ALL: [&str; 9] = [
    VOLUME, PLAYING, SHUFFLE, REPEAT, CROSSFADE, TRACK, ALBUM, ARTIST, PROGRESS,
];

/// Descriptor and initial value for every speaker property
pub fn definitions() -> Vec<(&'static str, PropertyDescriptor, PropertyValue)> {
    vec![
        (
            VOLUME,
            PropertyDescriptor::number("Volume")
                .with_unit("percent")
                .with_semantic_type("LevelProperty"),
            PropertyValue::Number(100.0),
        ),
        (
            PLAYING,
            PropertyDescriptor::boolean("Play/Pause").with_semantic_type("BooleanProperty"),
            PropertyValue::Bool(false),
        ),
        (
            SHUFFLE,
            PropertyDescriptor::boolean("Shuffle").with_semantic_type("BooleanProperty"),
            PropertyValue::Bool(false),
        ),
        (
            REPEAT,
            PropertyDescriptor::string("Repeat")
                .with_semantic_type("EnumProperty")
                .with_enum(Repeat::ALL.iter().map(|r| r.as_str())),
            PropertyValue::from(Repeat::None.as_str()),
        ),
        (
            CROSSFADE,
            PropertyDescriptor::boolean("Crossfade").with_semantic_type("BooleanProperty"),
            PropertyValue::Bool(false),
        ),
        (
            TRACK,
            PropertyDescriptor::string("Track")
                .with_semantic_type("StringProperty")
                .read_only(),
            PropertyValue::from(""),
        ),
        (
            ALBUM,
            PropertyDescriptor::string("Album")
                .with_semantic_type("StringProperty")
                .read_only(),
            PropertyValue::from(""),
        ),
        (
            ARTIST,
            PropertyDescriptor::string("Artist")
                .with_semantic_type("StringProperty")
                .read_only(),
            PropertyValue::from(""),
        ),
        (
            PROGRESS,
            PropertyDescriptor::number("Progress")
                .with_unit("percent")
                .with_semantic_type("LevelProperty"),
            PropertyValue::Number(0.0),
        ),
    ]
}

/// Register every speaker property on `registry`
pub fn register_all(registry: &PropertyRegistry) -> Result<()> {
    for (key, descriptor, initial) in definitions() {
        registry.register(key, descriptor, initial)?;
    }
    Ok(())
}
