//! Device session boundary for sonos-thing
//!
//! A [`DeviceSession`] is the request/response contract the synchronizer
//! drives a speaker through. [`SoapSession`] implements it over UPnP/SOAP,
//! and [`ResilientSession`] wraps any session with a timeout and bounded
//! retry on transient failures.
//!
//! ```rust,ignore
//! use sonos_session::{DeviceSession, ResilientSession, RetryPolicy, SoapSession};
//!
//! let session = ResilientSession::new(SoapSession::new("192.168.1.20"), RetryPolicy::default());
//! println!("{} at volume {}", session.name().await?, session.volume().await?);
//! ```

pub mod didl;
pub mod error;
pub mod retry;
pub mod service;
pub mod session;
pub mod soap;
pub mod topology;
pub mod types;
pub mod xml;

pub use error::{Result, SessionError};
pub use retry::{ResilientConnector, ResilientSession, RetryPolicy};
pub use service::{Service, ServiceInfo};
pub use session::{DeviceSession, SessionConnector};
pub use soap::{SoapConnector, SoapSession};
pub use types::{
    DeviceEvent, PlayMode, TrackInfo, TrackMetadata, TransportEvent, TransportState, ZoneGroup,
    ZoneInfo, ZoneMember,
};
