//! Group topology snapshot and the `group` action input schema

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use sonos_session::ZoneGroup;

/// One zone group as seen from a topology query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub group_id: String,
    pub coordinator_id: String,
    /// Display name of the coordinator
    pub zone_name: String,
    pub member_ids: Vec<String>,
    /// False when the coordinator is flagged invisible (e.g. a Boost or satellite)
    pub visible: bool,
    /// Host of the coordinator, if its location URL is usable
    pub coordinator_address: Option<String>,
}

impl Zone {
    pub fn has_member(&self, id_prefix: &str) -> bool {
        self.member_ids.iter().any(|id| id.starts_with(id_prefix))
    }
}

/// Zones in the order the device reported them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTopology {
    zones: Vec<Zone>,
}

impl GroupTopology {
    /// Build from raw zone groups; groups without a coordinator member are skipped
    pub fn from_groups(groups: &[ZoneGroup]) -> Self {
        let zones = groups
            .iter()
            .filter_map(|group| {
                let Some(coordinator) = group.coordinator_member() else {
                    tracing::warn!("Zone group {} has no coordinator member", group.id);
                    return None;
                };
                Some(Zone {
                    group_id: group.id.clone(),
                    coordinator_id: group.coordinator.clone(),
                    zone_name: coordinator.zone_name.clone(),
                    member_ids: group.members.iter().map(|m| m.uuid.clone()).collect(),
                    visible: !coordinator.invisible,
                    coordinator_address: coordinator.address().map(str::to_string),
                })
            })
            .collect();
        Self { zones }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Coordinator zone whose name matches, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&Zone> {
        self.zones
            .iter()
            .find(|z| z.zone_name.to_lowercase() == name.to_lowercase())
    }

    /// Full UUID of the member whose id starts with `id_prefix`
    pub fn member_id(&self, id_prefix: &str) -> Option<&str> {
        self.zones
            .iter()
            .flat_map(|z| z.member_ids.iter())
            .find(|id| id.starts_with(id_prefix))
            .map(String::as_str)
    }
}

/// A boolean input of the `group` action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupField {
    pub name: String,
    pub default: bool,
}

/// JSON object schema for the `group` action input
///
/// Serializes as
/// `{"type":"object","required":[..],"properties":{name:{"type":"boolean","default":..}}}`
/// with properties in topology order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSchema {
    fields: Vec<GroupField>,
}

impl ActionSchema {
    pub fn fields(&self) -> &[GroupField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&GroupField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn push(&mut self, name: &str, default: bool) {
        if self.field(name).is_some() {
            tracing::warn!("Duplicate zone name '{}' in group schema, keeping the first", name);
            return;
        }
        self.fields.push(GroupField {
            name: name.to_string(),
            default,
        });
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

struct FieldProperties<'a>(&'a [GroupField]);

impl Serialize for FieldProperties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct BooleanField {
            #[serde(rename = "type")]
            kind: &'static str,
            default: bool,
        }

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(
                &field.name,
                &BooleanField {
                    kind: "boolean",
                    default: field.default,
                },
            )?;
        }
        map.end()
    }
}

impl Serialize for ActionSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let required: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();

        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "object")?;
        map.serialize_entry("required", &required)?;
        map.serialize_entry("properties", &FieldProperties(&self.fields))?;
        map.end()
    }
}

/// Group action schema for the device identified by `local_id`
///
/// Zones whose id starts with `local_id` (the device's own group) and
/// invisible coordinators are left out. Each remaining coordinator becomes a
/// boolean field, defaulting to whether the local device is in that group.
pub fn build_group_action(topology: &GroupTopology, local_id: &str) -> ActionSchema {
    let mut schema = ActionSchema::default();
    for zone in topology.zones() {
        if zone.group_id.starts_with(local_id) || !zone.visible {
            continue;
        }
        schema.push(&zone.zone_name, zone.has_member(local_id));
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sonos_session::ZoneMember;

    const LOCAL: &str = "RINCON_A";

    fn member(uuid: &str, zone_name: &str, ip: &str, invisible: bool) -> ZoneMember {
        ZoneMember {
            uuid: uuid.to_string(),
            zone_name: zone_name.to_string(),
            location: format!("http://{}:1400/xml/device_description.xml", ip),
            invisible,
        }
    }

    fn group(coordinator: &str, id_suffix: u32, members: Vec<ZoneMember>) -> ZoneGroup {
        ZoneGroup {
            id: format!("{}:{}", coordinator, id_suffix),
            coordinator: coordinator.to_string(),
            members,
        }
    }

    fn household() -> Vec<ZoneGroup> {
        vec![
            group(
                "RINCON_A01400",
                1,
                vec![
                    member("RINCON_A01400", "Kitchen", "10.0.0.1", false),
                    member("RINCON_B01400", "Den", "10.0.0.2", false),
                ],
            ),
            group(
                "RINCON_C01400",
                2,
                vec![member("RINCON_C01400", "Office", "10.0.0.3", false)],
            ),
        ]
    }

    #[test]
    fn test_own_group_excluded() {
        let topology = GroupTopology::from_groups(&household());
        let schema = build_group_action(&topology, LOCAL);

        assert_eq!(
            schema.fields(),
            &[GroupField {
                name: "Office".to_string(),
                default: false
            }]
        );
    }

    #[test]
    fn test_default_reflects_membership_and_invisible_skipped() {
        let groups = vec![
            group(
                "RINCON_C01400",
                7,
                vec![
                    member("RINCON_C01400", "Office", "10.0.0.3", false),
                    member("RINCON_A01400", "Kitchen", "10.0.0.1", false),
                ],
            ),
            group(
                "RINCON_E01400",
                1,
                vec![member("RINCON_E01400", "BOOST", "10.0.0.9", true)],
            ),
            group(
                "RINCON_D01400",
                3,
                vec![member("RINCON_D01400", "Patio", "10.0.0.4", false)],
            ),
        ];
        let schema = build_group_action(&GroupTopology::from_groups(&groups), LOCAL);

        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Office", "Patio"]);
        assert!(schema.field("Office").unwrap().default);
        assert!(!schema.field("Patio").unwrap().default);
    }

    #[test]
    fn test_schema_json_is_stable() {
        let mut groups = household();
        groups.push(group(
            "RINCON_0001400",
            4,
            vec![member("RINCON_0001400", "Attic", "10.0.0.5", false)],
        ));
        let topology = GroupTopology::from_groups(&groups);

        let first = serde_json::to_string(&build_group_action(&topology, LOCAL)).unwrap();
        let second = serde_json::to_string(&build_group_action(&topology, LOCAL)).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            r#"{"type":"object","required":["Office","Attic"],"properties":{"Office":{"type":"boolean","default":false},"Attic":{"type":"boolean","default":false}}}"#
        );
    }

    #[test]
    fn test_empty_schema_json() {
        let schema = build_group_action(&GroupTopology::default(), LOCAL);
        assert!(schema.is_empty());
        assert_eq!(
            schema.to_json(),
            json!({"type": "object", "required": [], "properties": {}})
        );
    }

    #[test]
    fn test_topology_lookups() {
        let topology = GroupTopology::from_groups(&household());
        let office = topology.find_by_name("office").unwrap();
        assert_eq!(office.coordinator_address.as_deref(), Some("10.0.0.3"));
        assert_eq!(topology.member_id(LOCAL), Some("RINCON_A01400"));
        assert!(topology.find_by_name("Garage").is_none());

        let orphan = vec![ZoneGroup {
            id: "RINCON_X:1".to_string(),
            coordinator: "RINCON_X".to_string(),
            members: vec![],
        }];
        assert!(GroupTopology::from_groups(&orphan).zones().is_empty());
    }
}
