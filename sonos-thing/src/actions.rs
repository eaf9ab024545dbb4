//! Speaker actions and their lifecycle

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use crate::error::SpeakerError;
use crate::topology::ActionSchema;

/// Actions a speaker understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionName {
    Next,
    Prev,
    Group,
}

impl ActionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::Next => "next",
            ActionName::Prev => "prev",
            ActionName::Group => "group",
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionName {
    type Err = SpeakerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(ActionName::Next),
            "prev" => Ok(ActionName::Prev),
            "group" => Ok(ActionName::Group),
            other => Err(SpeakerError::UnknownAction(other.to_string())),
        }
    }
}

/// Advertised description of an action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDescriptor {
    #[serde(skip)]
    pub name: ActionName,
    #[serde(rename = "title")]
    pub label: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
}

impl ActionDescriptor {
    pub fn next() -> Self {
        Self {
            name: ActionName::Next,
            label: "Next".to_string(),
            description: "Skip current track and start playing next track in the queue".to_string(),
            input: None,
        }
    }

    pub fn prev() -> Self {
        Self {
            name: ActionName::Prev,
            label: "Previous".to_string(),
            description: "Play previous track in the queue".to_string(),
            input: None,
        }
    }

    pub fn group(schema: &ActionSchema) -> Self {
        Self {
            name: ActionName::Group,
            label: "Group/Ungroup".to_string(),
            description: "Group Sonos players".to_string(),
            input: Some(schema.to_json()),
        }
    }
}

/// Where an action is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Created,
    Pending,
    Completed,
    Failed,
}

/// One requested execution of an action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub name: ActionName,
    pub input: serde_json::Value,
    pub status: ActionStatus,
    #[serde(skip)]
    pub time_requested: SystemTime,
    #[serde(skip)]
    pub time_completed: Option<SystemTime>,
}

impl Action {
    pub fn new(name: ActionName, input: serde_json::Value) -> Self {
        Self {
            name,
            input,
            status: ActionStatus::Created,
            time_requested: SystemTime::now(),
            time_completed: None,
        }
    }

    pub fn start(&mut self) {
        self.status = ActionStatus::Pending;
    }

    pub fn finish(&mut self) {
        self.status = ActionStatus::Completed;
        self.time_completed = Some(SystemTime::now());
    }

    /// Perform failed; the action is never finished
    pub fn fail(&mut self) {
        self.status = ActionStatus::Failed;
    }

    pub fn is_completed(&self) -> bool {
        self.status == ActionStatus::Completed
    }
}
