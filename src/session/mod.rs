//! Session event model: payload shapes emitted by the transport layer.
//!
//! The real transport (session establishment, pairing, encryption) is an
//! external collaborator. This module defines the read-only event contract
//! the pipeline consumes, with NDJSON line helpers for capture files.
//!
//! CHANGELOG:
//! - 08/23/2026 - Initial event contract

pub mod replay;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A contact record fragment as delivered by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPayload {
    /// Service JID (e.g., `14155551234@s.whatsapp.net`)
    pub id: String,
    /// User-set address-book name, highest precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Self-reported display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<String>,
    /// Verified business/organization name
    #[serde(
        default,
        rename = "verifiedName",
        skip_serializing_if = "Option::is_none"
    )]
    pub verified_name: Option<String>,
}

/// Conversation metadata fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Historical-sync payload combining contacts and conversation metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySyncPayload {
    #[serde(default)]
    pub contacts: Vec<ContactPayload>,
    #[serde(default)]
    pub chats: Vec<ChatPayload>,
}

/// Transport connection states the pipeline cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Why a connection closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DisconnectReason {
    /// Session explicitly invalidated by the server; not recoverable.
    LoggedOut,
    /// Anything else; recovered by restarting the orchestration.
    Transient { reason: String },
}

/// Connection state update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionUpdate {
    pub state: ConnectionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disconnect: Option<DisconnectReason>,
}

/// Events emitted by the session transport.
///
/// NDJSON captures carry one event per line, tagged with the transport's
/// event name: `{"event":"contacts.upsert","data":[...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum SessionEvent {
    #[serde(rename = "connection.update")]
    Connection(ConnectionUpdate),
    /// Bulk contact-list snapshot
    #[serde(rename = "contacts.upsert")]
    ContactsUpsert(Vec<ContactPayload>),
    /// Incremental contact update
    #[serde(rename = "contacts.update")]
    ContactsUpdate(Vec<ContactPayload>),
    /// Bulk history delivery; the primary "enough data arrived" signal
    #[serde(rename = "messaging-history.set")]
    HistorySync(HistorySyncPayload),
    /// Conversation creation notices
    #[serde(rename = "chats.upsert")]
    ChatsUpsert(Vec<ChatPayload>),
}

impl SessionEvent {
    /// Event tag for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::Connection(_) => "connection.update",
            SessionEvent::ContactsUpsert(_) => "contacts.upsert",
            SessionEvent::ContactsUpdate(_) => "contacts.update",
            SessionEvent::HistorySync(_) => "messaging-history.set",
            SessionEvent::ChatsUpsert(_) => "chats.upsert",
        }
    }

    /// Parse an event from one NDJSON capture line.
    pub fn from_ndjson_line(line: &str) -> Result<Self> {
        serde_json::from_str(line).context("Failed to parse session event JSON")
    }

    /// Serialize the event to one NDJSON line.
    pub fn to_ndjson_line(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}
