//! UPnP/SOAP binding of [`DeviceSession`]
//!
//! `soap-client` is blocking, so every call runs on tokio's blocking pool.

use async_trait::async_trait;
use soap_client::{child_text, escape_xml, SoapClient, DEFAULT_PORT};
use std::sync::Arc;
use xmltree::Element;

use crate::didl;
use crate::error::{Result, SessionError};
use crate::service::Service;
use crate::session::{DeviceSession, SessionConnector};
use crate::topology;
use crate::types::{PlayMode, TrackInfo, TransportState, ZoneGroup, ZoneInfo};
use crate::xml;

/// UPnP fault for an action the device does not implement
const FAULT_INVALID_ACTION: u16 = 401;

/// Session talking SOAP to a device at a fixed address
#[derive(Debug, Clone)]
pub struct SoapSession {
    client: SoapClient,
    ip: String,
    port: u16,
}

impl SoapSession {
    pub fn new(ip: impl Into<String>) -> Self {
        Self::with_client(SoapClient::new(), ip, DEFAULT_PORT)
    }

    pub fn with_client(client: SoapClient, ip: impl Into<String>, port: u16) -> Self {
        Self {
            client,
            ip: ip.into(),
            port,
        }
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    async fn call(&self, service: Service, action: &'static str, args: &[(&str, &str)]) -> Result<Element> {
        let payload = build_payload(args);
        let client = self.client.clone();
        let ip = self.ip.clone();
        let port = self.port;
        let info = service.info();

        tracing::debug!("{} {}.{}", ip, service.name(), action);

        tokio::task::spawn_blocking(move || {
            client.call(&ip, port, info.endpoint, info.service_uri, action, &payload)
        })
        .await
        .map_err(|e| SessionError::Network(format!("{} task failed: {}", action, e)))?
        .map_err(SessionError::from)
    }

    async fn command(&self, service: Service, action: &'static str, args: &[(&str, &str)]) -> Result<()> {
        self.call(service, action, args).await.map(|_| ())
    }
}

fn build_payload(args: &[(&str, &str)]) -> String {
    args.iter()
        .map(|(name, value)| format!("<{name}>{}</{name}>", escape_xml(value), name = name))
        .collect()
}

fn required_text(response: &Element, name: &str) -> Result<String> {
    child_text(response, name)
        .ok_or_else(|| SessionError::Parse(format!("missing {} in {}", name, response.name)))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "True")
}

#[async_trait]
impl DeviceSession for SoapSession {
    async fn name(&self) -> Result<String> {
        let response = self
            .call(Service::DeviceProperties, "GetZoneAttributes", &[])
            .await?;
        required_text(&response, "CurrentZoneName")
    }

    async fn volume(&self) -> Result<u8> {
        let response = self
            .call(
                Service::RenderingControl,
                "GetVolume",
                &[("InstanceID", "0"), ("Channel", "Master")],
            )
            .await?;
        let raw = required_text(&response, "CurrentVolume")?;
        raw.trim()
            .parse::<u8>()
            .map_err(|_| SessionError::Parse(format!("invalid volume '{}'", raw)))
    }

    async fn current_state(&self) -> Result<TransportState> {
        let response = self
            .call(Service::AVTransport, "GetTransportInfo", &[("InstanceID", "0")])
            .await?;
        let state = required_text(&response, "CurrentTransportState")?;
        Ok(TransportState::from_upnp(&state))
    }

    async fn current_track(&self) -> Result<TrackInfo> {
        let response = self
            .call(Service::AVTransport, "GetPositionInfo", &[("InstanceID", "0")])
            .await?;

        let duration_secs = child_text(&response, "TrackDuration")
            .and_then(|d| xml::parse_hms(&d))
            .unwrap_or(0);
        let position_secs = child_text(&response, "RelTime")
            .and_then(|t| xml::parse_hms(&t))
            .unwrap_or(0);
        let metadata = match child_text(&response, "TrackMetaData") {
            Some(didl) => didl::parse_track_metadata(&didl)?,
            None => None,
        }
        .unwrap_or_default();

        Ok(TrackInfo {
            title: metadata.title,
            artist: metadata.artist,
            album: metadata.album,
            duration_secs,
            position_secs,
        })
    }

    async fn play_mode(&self) -> Result<PlayMode> {
        let response = self
            .call(Service::AVTransport, "GetTransportSettings", &[("InstanceID", "0")])
            .await?;
        required_text(&response, "PlayMode")?.parse()
    }

    async fn all_groups(&self) -> Result<Vec<ZoneGroup>> {
        let response = self
            .call(Service::ZoneGroupTopology, "GetZoneGroupState", &[])
            .await?;
        topology::parse_zone_groups(&required_text(&response, "ZoneGroupState")?)
    }

    async fn zone_info(&self) -> Result<ZoneInfo> {
        let response = self
            .call(Service::DeviceProperties, "GetZoneInfo", &[])
            .await?;
        Ok(ZoneInfo {
            mac_address: required_text(&response, "MACAddress")?,
        })
    }

    async fn supports_fixed_volume(&self) -> Result<bool> {
        match self
            .call(
                Service::RenderingControl,
                "GetSupportsOutputFixed",
                &[("InstanceID", "0")],
            )
            .await
        {
            Ok(response) => Ok(parse_flag(&required_text(&response, "CurrentSupportsFixed")?)),
            // Older players do not know the action at all
            Err(SessionError::Fault(FAULT_INVALID_ACTION)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn fixed_volume(&self) -> Result<bool> {
        let response = self
            .call(Service::RenderingControl, "GetOutputFixed", &[("InstanceID", "0")])
            .await?;
        Ok(parse_flag(&required_text(&response, "CurrentFixed")?))
    }

    async fn crossfade_mode(&self) -> Result<bool> {
        match self
            .call(Service::AVTransport, "GetCrossfadeMode", &[("InstanceID", "0")])
            .await
        {
            Ok(response) => Ok(parse_flag(&required_text(&response, "CrossfadeMode")?)),
            Err(SessionError::Fault(FAULT_INVALID_ACTION)) => {
                Err(SessionError::Unsupported("GetCrossfadeMode".to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn play(&self) -> Result<()> {
        self.command(
            Service::AVTransport,
            "Play",
            &[("InstanceID", "0"), ("Speed", "1")],
        )
        .await
    }

    async fn pause(&self) -> Result<()> {
        self.command(Service::AVTransport, "Pause", &[("InstanceID", "0")])
            .await
    }

    async fn set_volume(&self, volume: u8) -> Result<()> {
        if volume > 100 {
            return Err(SessionError::InvalidParameter(format!(
                "volume {} exceeds 100",
                volume
            )));
        }
        let volume = volume.to_string();
        self.command(
            Service::RenderingControl,
            "SetVolume",
            &[
                ("InstanceID", "0"),
                ("Channel", "Master"),
                ("DesiredVolume", &volume),
            ],
        )
        .await
    }

    async fn set_play_mode(&self, mode: PlayMode) -> Result<()> {
        self.command(
            Service::AVTransport,
            "SetPlayMode",
            &[("InstanceID", "0"), ("NewPlayMode", mode.as_str())],
        )
        .await
    }

    async fn seek(&self, position_secs: u64) -> Result<()> {
        let target = xml::format_hms(position_secs);
        self.command(
            Service::AVTransport,
            "Seek",
            &[("InstanceID", "0"), ("Unit", "REL_TIME"), ("Target", &target)],
        )
        .await
    }

    async fn next(&self) -> Result<()> {
        self.command(Service::AVTransport, "Next", &[("InstanceID", "0")])
            .await
    }

    async fn previous(&self) -> Result<()> {
        self.command(Service::AVTransport, "Previous", &[("InstanceID", "0")])
            .await
    }

    async fn leave_group(&self) -> Result<()> {
        self.command(
            Service::AVTransport,
            "BecomeCoordinatorOfStandaloneGroup",
            &[("InstanceID", "0")],
        )
        .await
    }

    async fn join_group(&self, coordinator_id: &str) -> Result<()> {
        if coordinator_id.is_empty() {
            return Err(SessionError::InvalidParameter(
                "coordinator id is empty".to_string(),
            ));
        }
        let uri = format!("x-rincon:{}", coordinator_id);
        self.command(
            Service::AVTransport,
            "SetAVTransportURI",
            &[
                ("InstanceID", "0"),
                ("CurrentURI", &uri),
                ("CurrentURIMetaData", ""),
            ],
        )
        .await
    }

    async fn set_crossfade_mode(&self, enabled: bool) -> Result<()> {
        self.command(
            Service::AVTransport,
            "SetCrossfadeMode",
            &[
                ("InstanceID", "0"),
                ("CrossfadeMode", if enabled { "1" } else { "0" }),
            ],
        )
        .await
    }
}

/// Opens [`SoapSession`]s sharing one HTTP agent
#[derive(Debug, Clone, Default)]
pub struct SoapConnector {
    client: SoapClient,
}

impl SoapConnector {
    pub fn new(client: SoapClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionConnector for SoapConnector {
    async fn connect(&self, address: &str) -> Result<Arc<dyn DeviceSession>> {
        if address.is_empty() {
            return Err(SessionError::InvalidParameter("empty device address".to_string()));
        }
        Ok(Arc::new(SoapSession::with_client(
            self.client.clone(),
            address,
            DEFAULT_PORT,
        )))
    }
}
