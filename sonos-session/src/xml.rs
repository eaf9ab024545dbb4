//! XML helpers shared by the DIDL-Lite and zone group parsers

use serde::de::DeserializeOwned;

use crate::error::{Result, SessionError};

/// Deserialize XML after dropping namespace prefixes from element names
pub fn parse<T: DeserializeOwned>(xml: &str) -> Result<T> {
    let stripped = strip_namespaces(xml);
    quick_xml::de::from_str(&stripped).map_err(|e| SessionError::Parse(e.to_string()))
}

/// Remove `prefix:` from element names, leaving attributes and text alone
///
/// `<dc:title>Song</dc:title>` becomes `<title>Song</title>`.
pub fn strip_namespaces(xml: &str) -> String {
    let mut result = String::with_capacity(xml.len());
    let mut rest = xml;

    while let Some(start) = rest.find('<') {
        result.push_str(&rest[..start]);
        rest = &rest[start + 1..];
        result.push('<');

        // Declarations, comments and CDATA pass through untouched
        if rest.starts_with('?') || rest.starts_with('!') {
            continue;
        }
        if let Some(stripped) = rest.strip_prefix('/') {
            result.push('/');
            rest = stripped;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        let local = name.rsplit(':').next().unwrap_or(name);
        result.push_str(local);
        rest = &rest[name_end..];
    }

    result.push_str(rest);
    result
}

/// Parse `H:MM:SS` (optionally with fractional seconds) into whole seconds
///
/// Returns `None` for `NOT_IMPLEMENTED` and anything else that is not a time.
pub fn parse_hms(value: &str) -> Option<u64> {
    let mut parts = value.trim().split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let seconds: u64 = seconds.split('.').next()?.parse().ok()?;
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Format whole seconds as `H:MM:SS`
pub fn format_hms(total_secs: u64) -> String {
    format!(
        "{}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}
