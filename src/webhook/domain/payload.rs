//! Typed payloads carried by webhook deliveries.

use crate::clockify::domain::{Client, Project, Tag, TimeEntry, WebhookEvent};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Shape of the body delivered for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// A time entry.
    TimeEntry,
    /// A client.
    Client,
    /// A project.
    Project,
    /// A tag.
    Tag,
}

impl PayloadKind {
    /// Returns the payload shape delivered for `event`.
    #[must_use]
    pub const fn for_event(event: WebhookEvent) -> Self {
        match event {
            WebhookEvent::NewTimerStarted | WebhookEvent::TimerStopped => Self::TimeEntry,
            WebhookEvent::NewClient => Self::Client,
            WebhookEvent::NewProject => Self::Project,
            WebhookEvent::NewTag => Self::Tag,
        }
    }

    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimeEntry => "time_entry",
            Self::Client => "client",
            Self::Project => "project",
            Self::Tag => "tag",
        }
    }

    /// Decodes a JSON body into a fresh payload of this kind.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the body is malformed or does not match
    /// the shape.
    pub fn decode(self, body: &[u8]) -> serde_json::Result<EventPayload> {
        match self {
            Self::TimeEntry => serde_json::from_slice(body).map(EventPayload::TimeEntry),
            Self::Client => serde_json::from_slice(body).map(EventPayload::Client),
            Self::Project => serde_json::from_slice(body).map(EventPayload::Project),
            Self::Tag => serde_json::from_slice(body).map(EventPayload::Tag),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded body of a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "object", rename_all = "snake_case")]
pub enum EventPayload {
    /// A started or stopped timer.
    TimeEntry(TimeEntry),
    /// A new client.
    Client(Client),
    /// A new project.
    Project(Project),
    /// A new tag.
    Tag(Tag),
}

impl EventPayload {
    /// Returns the kind of the payload.
    #[must_use]
    pub const fn kind(&self) -> PayloadKind {
        match self {
            Self::TimeEntry(_) => PayloadKind::TimeEntry,
            Self::Client(_) => PayloadKind::Client,
            Self::Project(_) => PayloadKind::Project,
            Self::Tag(_) => PayloadKind::Tag,
        }
    }
}

/// An authenticated, decoded delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedEvent {
    /// Event named by the delivery headers.
    pub event: WebhookEvent,
    /// Decoded body.
    pub payload: EventPayload,
}

/// Read-only table from event to the payload shape it delivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadRegistry {
    kinds: BTreeMap<WebhookEvent, PayloadKind>,
}

impl PayloadRegistry {
    /// Builds the table for every supported event.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            kinds: WebhookEvent::ALL
                .into_iter()
                .map(|event| (event, PayloadKind::for_event(event)))
                .collect(),
        }
    }

    /// Looks up an event by its wire name.
    #[must_use]
    pub fn lookup(&self, event_type: &str) -> Option<(WebhookEvent, PayloadKind)> {
        let event = WebhookEvent::try_from(event_type).ok()?;
        self.kinds.get(&event).map(|kind| (event, *kind))
    }

    /// Returns the registered events in registration order.
    pub fn events(&self) -> impl Iterator<Item = WebhookEvent> + '_ {
        self.kinds.keys().copied()
    }
}

impl Default for PayloadRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
