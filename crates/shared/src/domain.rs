use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(EventId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMode {
    Online,
    #[default]
    Offline,
    Hybrid,
}

impl EventMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event mode '{0}'")]
pub struct UnknownEventMode(pub String);

impl FromStr for EventMode {
    type Err = UnknownEventMode;

    /// Accepts any casing, matching the lowercasing the form applies to its select.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(UnknownEventMode(raw.to_string())),
        }
    }
}

/// One scheduled slot. Immutable once it has been added to a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub time: String,
    pub topic: String,
}

impl AgendaItem {
    pub fn new(time: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            topic: topic.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub size_bytes: u64,
}

/// A persisted event as the API hands it back. Image bytes are never inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: EventId,
    pub title: String,
    pub description: String,
    pub overview: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: EventMode,
    pub audience: String,
    pub organizer: String,
    pub tags: Vec<String>,
    pub agenda: Vec<AgendaItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSummary>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_to_offline() {
        assert_eq!(EventMode::default(), EventMode::Offline);
        assert_eq!(EventMode::default().to_string(), "offline");
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Hybrid".parse::<EventMode>(), Ok(EventMode::Hybrid));
        assert_eq!(" ONLINE ".parse::<EventMode>(), Ok(EventMode::Online));
        assert!("in-person".parse::<EventMode>().is_err());
    }

    #[test]
    fn mode_serializes_as_lowercase_string() {
        let json = serde_json::to_string(&EventMode::Hybrid).expect("json");
        assert_eq!(json, "\"hybrid\"");
    }
}
