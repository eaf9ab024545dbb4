//! `ZoneGroupTopology.GetZoneGroupState` parsing
//!
//! Current firmware wraps the groups in `<ZoneGroupState>`; older firmware
//! returns `<ZoneGroups>` as the root. Both are accepted.

use serde::Deserialize;

use crate::error::Result;
use crate::types::{ZoneGroup, ZoneMember};
use crate::xml;

#[derive(Debug, Deserialize)]
struct ZoneGroupStateXml {
    #[serde(rename = "ZoneGroups")]
    zone_groups: ZoneGroupsXml,
}

#[derive(Debug, Deserialize)]
struct ZoneGroupsXml {
    #[serde(rename = "ZoneGroup", default)]
    groups: Vec<ZoneGroupXml>,
}

#[derive(Debug, Deserialize)]
struct ZoneGroupXml {
    #[serde(rename = "@Coordinator")]
    coordinator: String,
    #[serde(rename = "@ID")]
    id: String,
    #[serde(rename = "ZoneGroupMember", default)]
    members: Vec<ZoneGroupMemberXml>,
}

#[derive(Debug, Deserialize)]
struct ZoneGroupMemberXml {
    #[serde(rename = "@UUID")]
    uuid: String,
    #[serde(rename = "@Location", default)]
    location: String,
    #[serde(rename = "@ZoneName", default)]
    zone_name: String,
    #[serde(rename = "@Invisible", default)]
    invisible: Option<String>,
}

impl From<ZoneGroupXml> for ZoneGroup {
    fn from(group: ZoneGroupXml) -> Self {
        ZoneGroup {
            id: group.id,
            coordinator: group.coordinator,
            members: group
                .members
                .into_iter()
                .map(|m| ZoneMember {
                    uuid: m.uuid,
                    zone_name: m.zone_name,
                    location: m.location,
                    invisible: m.invisible.as_deref() == Some("1"),
                })
                .collect(),
        }
    }
}

/// Parse the decoded `ZoneGroupState` document, preserving group order
pub fn parse_zone_groups(state: &str) -> Result<Vec<ZoneGroup>> {
    let groups = match xml::parse::<ZoneGroupStateXml>(state) {
        Ok(wrapped) => wrapped.zone_groups.groups,
        Err(wrapped_err) => match xml::parse::<ZoneGroupsXml>(state) {
            Ok(bare) => bare.groups,
            Err(_) => return Err(wrapped_err),
        },
    };
    Ok(groups.into_iter().map(ZoneGroup::from).collect())
}
