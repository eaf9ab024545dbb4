//! DIDL-Lite track metadata
//!
//! Sonos describes the current track as a DIDL-Lite document, either inside
//! `GetPositionInfo` (`TrackMetaData`) or inside AVTransport events:
//!
//! ```xml
//! <DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" ...>
//!   <item id="-1" parentID="-1">
//!     <dc:title>Song Title</dc:title>
//!     <dc:creator>Artist Name</dc:creator>
//!     <upnp:album>Album Name</upnp:album>
//!     <res duration="0:03:58">uri</res>
//!   </item>
//! </DIDL-Lite>
//! ```

use serde::Deserialize;

use crate::error::Result;
use crate::types::TrackMetadata;
use crate::xml;

#[derive(Debug, Deserialize)]
struct DidlLite {
    #[serde(rename = "item", default)]
    item: Option<DidlItem>,
}

#[derive(Debug, Deserialize)]
struct DidlItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    creator: Option<String>,
    #[serde(default)]
    album: Option<String>,
    /// Radio streams put the now-playing text here instead of the title
    #[serde(rename = "streamContent", default)]
    stream_content: Option<String>,
    #[serde(default)]
    res: Option<DidlResource>,
}

#[derive(Debug, Deserialize)]
struct DidlResource {
    #[serde(rename = "@duration", default)]
    duration: Option<String>,
}

/// Parse a DIDL-Lite document into track metadata
///
/// Empty documents and the `NOT_IMPLEMENTED` placeholder yield `None`.
pub fn parse_track_metadata(didl: &str) -> Result<Option<TrackMetadata>> {
    let didl = didl.trim();
    if didl.is_empty() || didl == "NOT_IMPLEMENTED" {
        return Ok(None);
    }

    let parsed: DidlLite = xml::parse(didl)?;
    let Some(item) = parsed.item else {
        return Ok(None);
    };

    let stream_content = item.stream_content.filter(|s| !s.trim().is_empty());
    let title = match (item.title, stream_content) {
        (_, Some(content)) => content,
        (Some(title), None) => title,
        (None, None) => String::new(),
    };

    Ok(Some(TrackMetadata {
        title,
        artist: item.creator.unwrap_or_default(),
        album: item.album.unwrap_or_default(),
        duration_secs: item
            .res
            .and_then(|r| r.duration)
            .and_then(|d| xml::parse_hms(&d)),
        position_secs: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_music_track() {
        let didl = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"><item id="-1" parentID="-1" restricted="true"><res protocolInfo="sonos.com-http:*:audio/mpeg:*" duration="0:03:58">x-sonos-http:track.mp3</res><upnp:albumArtURI>/getaa?s=1</upnp:albumArtURI><upnp:class>object.item.audioItem.musicTrack</upnp:class><dc:title>Test Song</dc:title><dc:creator>Test Artist</dc:creator><upnp:album>Test Album</upnp:album></item></DIDL-Lite>"#;

        let track = parse_track_metadata(didl).unwrap().unwrap();
        assert_eq!(track.title, "Test Song");
        assert_eq!(track.artist, "Test Artist");
        assert_eq!(track.album, "Test Album");
        assert_eq!(track.duration_secs, Some(238));
        assert_eq!(track.position_secs, None);
    }

    #[test]
    fn test_parse_radio_stream() {
        let didl = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/"><item id="-1" parentID="-1"><res protocolInfo="x-rincon-mp3radio:*:*:*">x-rincon-mp3radio://stream</res><r:streamContent>Band - Live Song</r:streamContent><dc:title>stream</dc:title></item></DIDL-Lite>"#;

        let track = parse_track_metadata(didl).unwrap().unwrap();
        assert_eq!(track.title, "Band - Live Song");
        assert_eq!(track.artist, "");
        assert_eq!(track.duration_secs, None);
    }

    #[test]
    fn test_parse_empty_metadata() {
        assert_eq!(parse_track_metadata("").unwrap(), None);
        assert_eq!(parse_track_metadata("NOT_IMPLEMENTED").unwrap(), None);
        assert_eq!(parse_track_metadata("<DIDL-Lite></DIDL-Lite>").unwrap(), None);
    }

    #[test]
    fn test_parse_invalid_metadata() {
        assert!(parse_track_metadata("<DIDL-Lite><item>").is_err());
    }
}
