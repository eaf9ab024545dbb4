//! Per-device task and the handle used to talk to it
//!
//! Each speaker runs one tokio task that owns its [`StateSynchronizer`].
//! Device events, property writes, actions and interpolation ticks are
//! all handled inside that task's `select!` loop, one at a time.

use serde_json::{json, Value};
use sonos_session::{
    DeviceEvent, DeviceSession, ResilientConnector, ResilientSession, SessionConnector,
};
use state_store::{PropertyRegistry, PropertyValue};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::actions::{Action, ActionDescriptor, ActionName};
use crate::config::SpeakerConfig;
use crate::error::{Result, SpeakerError};
use crate::properties::DEVICE_TYPES;
use crate::synchronizer::StateSynchronizer;

enum Command {
    SetProperty {
        key: String,
        value: PropertyValue,
        reply: oneshot::Sender<Result<bool>>,
    },
    PerformAction {
        name: ActionName,
        input: Value,
        reply: oneshot::Sender<Result<Action>>,
    },
    Shutdown,
}

/// The task side of a speaker
pub struct Speaker {
    sync: StateSynchronizer,
    events: mpsc::Receiver<DeviceEvent>,
    commands: mpsc::Receiver<Command>,
}

impl Speaker {
    /// Poll the device, build the group action and start the speaker task
    ///
    /// Every remote call made through `session` and `connector` gets the
    /// timeout and retry of `config.retry`. `events` carries the push
    /// events for this device; when it closes the task stops.
    pub async fn spawn(
        session: Arc<dyn DeviceSession>,
        connector: Arc<dyn SessionConnector>,
        events: mpsc::Receiver<DeviceEvent>,
        config: SpeakerConfig,
    ) -> Result<SpeakerHandle> {
        config.validate()?;

        let session: Arc<dyn DeviceSession> =
            Arc::new(ResilientSession::new(session, config.retry.clone()));
        let connector: Arc<dyn SessionConnector> =
            Arc::new(ResilientConnector::new(connector, config.retry.clone()));

        let registry = PropertyRegistry::new();
        let mut sync =
            StateSynchronizer::new(session, connector, registry.clone(), config.tick_interval)?;
        sync.initialize().await?;
        let schema = sync.build_group_action().await?;

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size);
        let handle = SpeakerHandle {
            name: sync.name().to_string(),
            registry,
            fixed_volume: sync.has_fixed_volume(),
            actions: Arc::new(vec![
                ActionDescriptor::next(),
                ActionDescriptor::prev(),
                ActionDescriptor::group(&schema),
            ]),
            commands: command_tx,
        };

        let speaker = Speaker {
            sync,
            events,
            commands: command_rx,
        };
        tokio::spawn(speaker.run());

        info!("Speaker {} ready", handle.name);
        Ok(handle)
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.sync.apply_device_event(event).await {
                            warn!("{}: failed to apply device event: {}", self.sync.name(), e);
                        }
                    }
                    None => {
                        info!("{}: event stream closed", self.sync.name());
                        break;
                    }
                },
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                _ = self.sync.next_tick() => {
                    if let Err(e) = self.sync.on_tick() {
                        warn!("{}: failed to publish progress: {}", self.sync.name(), e);
                    }
                }
            }
        }

        self.sync.stop_progress();
        info!("Speaker {} stopped", self.sync.name());
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetProperty { key, value, reply } => {
                let result = self.sync.apply_property_write(&key, value).await;
                if let Err(e) = &result {
                    warn!("{}: write to {} rejected: {}", self.sync.name(), key, e);
                }
                let _ = reply.send(result);
            }
            Command::PerformAction { name, input, reply } => {
                let mut action = Action::new(name, input);
                let result = self
                    .sync
                    .perform_action(&mut action)
                    .await
                    .map(|()| action);
                let _ = reply.send(result);
            }
            Command::Shutdown => {}
        }
    }
}

/// Cloneable handle to a running speaker
#[derive(Clone)]
pub struct SpeakerHandle {
    name: String,
    registry: PropertyRegistry,
    fixed_volume: bool,
    actions: Arc<Vec<ActionDescriptor>>,
    commands: mpsc::Sender<Command>,
}

impl SpeakerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The speaker's properties; `watch` keys, then read changes from `registry().iter()`
    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    pub fn has_fixed_volume(&self) -> bool {
        self.fixed_volume
    }

    pub fn actions(&self) -> &[ActionDescriptor] {
        &self.actions
    }

    /// The `group` action, with its input schema built when the speaker started
    pub fn group_action(&self) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|a| a.name == ActionName::Group)
    }

    /// Name, semantic types, properties and actions as one JSON document
    pub fn describe(&self) -> Value {
        let actions: serde_json::Map<String, Value> = self
            .actions
            .iter()
            .map(|a| {
                (
                    a.name.to_string(),
                    serde_json::to_value(a).unwrap_or(Value::Null),
                )
            })
            .collect();

        json!({
            "title": self.name,
            "@type": DEVICE_TYPES,
            "properties": self.registry.describe(),
            "actions": actions,
        })
    }

    /// Write a property through to the device
    ///
    /// Returns whether the stored value changed.
    pub async fn set_property(&self, key: &str, value: impl Into<PropertyValue>) -> Result<bool> {
        let key = key.to_string();
        let value = value.into();
        self.request(|reply| Command::SetProperty { key, value, reply })
            .await
    }

    /// Run `next`, `prev` or `group`; returns the completed action
    pub async fn perform_action(&self, name: &str, input: Value) -> Result<Action> {
        let name: ActionName = name.parse()?;
        self.request(|reply| Command::PerformAction { name, input, reply })
            .await
    }

    /// Stop the speaker task and wait for it to exit
    pub async fn shutdown(&self) {
        if self.commands.send(Command::Shutdown).await.is_err() {
            debug!("{}: already stopped", self.name);
            return;
        }
        self.commands.closed().await;
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| SpeakerError::Closed)?;
        reply_rx.await.map_err(|_| SpeakerError::Closed)?
    }
}

impl std::fmt::Debug for SpeakerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeakerHandle")
            .field("name", &self.name)
            .field("fixed_volume", &self.fixed_volume)
            .field("running", &self.is_running())
            .finish()
    }
}
