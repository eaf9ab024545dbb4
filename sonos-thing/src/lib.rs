//! # sonos-thing
//!
//! Keeps a typed, observable property model in step with a live Sonos
//! speaker and turns property writes into device commands.
//!
//! Three sources feed the model: the initial poll when a speaker starts,
//! push events from the device, and writes from consumers. Playback progress
//! is not pushed by the device, so it is interpolated locally between
//! authoritative updates.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sonos_session::{SoapConnector, SoapSession};
//! use sonos_thing::{Speaker, SpeakerConfig};
//! use std::sync::Arc;
//!
//! let config = SpeakerConfig::default();
//! let (event_tx, event_rx) = config.event_channel();
//! // hand event_tx to whatever delivers UPnP events for this device
//!
//! let speaker = Speaker::spawn(
//!     Arc::new(SoapSession::new("192.168.1.20")),
//!     Arc::new(SoapConnector::default()),
//!     event_rx,
//!     config,
//! )
//! .await?;
//!
//! speaker.registry().watch_all()?;
//! speaker.set_property("volume", 30.0).await?;
//! for change in speaker.registry().iter().try_iter() {
//!     println!("{} changed", change.property_key);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! DeviceEvent ──► StateSynchronizer ──► PropertyRegistry
//!                   ▲         │
//!  SpeakerHandle ───┘         └──► DeviceSession (ResilientSession)
//!  (writes, actions)
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod logging;
pub mod play_mode;
pub mod progress;
pub mod properties;
pub mod speaker;
pub mod synchronizer;
pub mod topology;

pub use actions::{Action, ActionDescriptor, ActionName, ActionStatus};
pub use config::SpeakerConfig;
pub use error::{Result, SpeakerError};
pub use play_mode::{PlayModeState, Repeat};
pub use progress::{InterpolatorState, ProgressInterpolator};
pub use speaker::{Speaker, SpeakerHandle};
pub use synchronizer::StateSynchronizer;
pub use topology::{ActionSchema, GroupField, GroupTopology, Zone};

pub use sonos_session::{DeviceEvent, DeviceSession, SessionConnector};
pub use state_store::{PropertyRegistry, PropertyValue};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actions::{Action, ActionStatus};
    pub use crate::config::SpeakerConfig;
    pub use crate::error::{Result, SpeakerError};
    pub use crate::speaker::{Speaker, SpeakerHandle};
    pub use sonos_session::{DeviceEvent, TransportEvent, TransportState};
    pub use state_store::PropertyValue;
}
