//! Contact reconciliation: one authoritative record per canonical identifier.
//!
//! Contact fragments arrive from four event categories (bulk snapshots,
//! incremental updates, history sync, chat notices). The roster merges them
//! by source precedence and guarantees every record carries a non-empty name.
//!
//! CHANGELOG:
//! - 08/23/2026 - Initial implementation

use serde::Serialize;
use std::collections::HashMap;

use crate::jid;
use crate::session::{ChatPayload, ContactPayload};

/// Where a record's display name came from, best first.
///
/// The derived ordering is the merge precedence: a candidate may replace the
/// stored name only when its source ranks equal or better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// Explicit user-set name field
    UserSet,
    /// Self-reported display name
    Notify,
    /// Verified business/organization name
    Verified,
    /// Conversation metadata (presence-gated insert only)
    Chat,
    /// Canonical phone number fallback
    Phone,
}

/// The authoritative reconciled contact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactRecord {
    /// Canonical external identifier (service JID)
    pub jid: String,
    /// Best-known human-readable name; never empty
    pub display_name: String,
    /// `+<digits>` string, derived once from the JID and never recomputed
    pub phone: String,
    /// Precedence rank of `display_name`
    pub name_source: NameSource,
}

/// In-memory keyed store mapping JID -> reconciled record.
///
/// Iteration order is irrelevant; the exporter sorts the final snapshot.
#[derive(Debug, Default)]
pub struct Roster {
    records: HashMap<String, ContactRecord>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Priority-merge contact fragments (bulk, incremental, or history sync).
    ///
    /// Idempotent: re-applying the same fragments leaves the store unchanged.
    /// Non-individual JIDs are dropped silently.
    pub fn apply_contacts(&mut self, contacts: &[ContactPayload]) {
        for contact in contacts {
            let Some(phone) = jid::phone_from_jid(&contact.id) else {
                continue;
            };
            let candidate = best_candidate(contact);
            match self.records.get_mut(&contact.id) {
                Some(record) => {
                    if let Some((name, source)) = candidate {
                        if source <= record.name_source {
                            record.display_name = name.to_string();
                            record.name_source = source;
                        }
                    }
                    // No usable candidate: keep the previously stored name.
                }
                None => {
                    let (display_name, name_source) = match candidate {
                        Some((name, source)) => (name.to_string(), source),
                        None => (phone.clone(), NameSource::Phone),
                    };
                    self.records.insert(
                        contact.id.clone(),
                        ContactRecord {
                            jid: contact.id.clone(),
                            display_name,
                            phone,
                            name_source,
                        },
                    );
                }
            }
        }
    }

    /// Presence-gated insert from conversation metadata.
    ///
    /// Only creates records for unknown JIDs; never touches a name already
    /// known from a richer contact source.
    pub fn apply_chats(&mut self, chats: &[ChatPayload]) {
        for chat in chats {
            if self.records.contains_key(&chat.id) {
                continue;
            }
            let Some(phone) = jid::phone_from_jid(&chat.id) else {
                continue;
            };
            let (display_name, name_source) =
                match chat.name.as_deref().filter(|n| !n.trim().is_empty()) {
                    Some(name) => (name.to_string(), NameSource::Chat),
                    None => (phone.clone(), NameSource::Phone),
                };
            self.records.insert(
                chat.id.clone(),
                ContactRecord {
                    jid: chat.id.clone(),
                    display_name,
                    phone,
                    name_source,
                },
            );
        }
    }

    /// Clone the current records for export.
    pub fn snapshot(&self) -> Vec<ContactRecord> {
        self.records.values().cloned().collect()
    }
}

/// Best name candidate carried by a single fragment, with its precedence.
fn best_candidate(contact: &ContactPayload) -> Option<(&str, NameSource)> {
    let fields = [
        (contact.name.as_deref(), NameSource::UserSet),
        (contact.notify.as_deref(), NameSource::Notify),
        (contact.verified_name.as_deref(), NameSource::Verified),
    ];
    fields.into_iter().find_map(|(value, source)| {
        value.filter(|v| !v.trim().is_empty()).map(|v| (v, source))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "15551230001@s.whatsapp.net";
    const BOB: &str = "15551230002@s.whatsapp.net";

    fn contact(
        id: &str,
        name: Option<&str>,
        notify: Option<&str>,
        verified: Option<&str>,
    ) -> ContactPayload {
        ContactPayload {
            id: id.to_string(),
            name: name.map(String::from),
            notify: notify.map(String::from),
            verified_name: verified.map(String::from),
        }
    }

    fn chat(id: &str, name: Option<&str>) -> ChatPayload {
        ChatPayload {
            id: id.to_string(),
            name: name.map(String::from),
        }
    }

    fn sorted_snapshot(roster: &Roster) -> Vec<ContactRecord> {
        let mut records = roster.snapshot();
        records.sort_by(|a, b| a.jid.cmp(&b.jid));
        records
    }

    fn display_name(roster: &Roster, id: &str) -> String {
        roster
            .snapshot()
            .into_iter()
            .find(|r| r.jid == id)
            .expect("record present")
            .display_name
    }

    #[test]
    fn test_one_record_per_jid() {
        let mut roster = Roster::new();
        roster.apply_contacts(&[contact(ALICE, Some("Alice"), None, None)]);
        roster.apply_contacts(&[contact(ALICE, None, Some("Al"), None)]);
        roster.apply_chats(&[chat(ALICE, Some("Alice chat"))]);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_merge_idempotent() {
        let batch = vec![
            contact(ALICE, Some("Alice"), None, None),
            contact(BOB, None, Some("Bobby"), None),
        ];
        let mut once = Roster::new();
        once.apply_contacts(&batch);
        let mut twice = Roster::new();
        twice.apply_contacts(&batch);
        twice.apply_contacts(&batch);
        assert_eq!(sorted_snapshot(&once), sorted_snapshot(&twice));
    }

    #[test]
    fn test_name_beats_notify_in_either_order() {
        let mut roster = Roster::new();
        roster.apply_contacts(&[contact(ALICE, None, Some("Al"), None)]);
        roster.apply_contacts(&[contact(ALICE, Some("Alice"), None, None)]);
        assert_eq!(display_name(&roster, ALICE), "Alice");

        let mut reversed = Roster::new();
        reversed.apply_contacts(&[contact(ALICE, Some("Alice"), None, None)]);
        reversed.apply_contacts(&[contact(ALICE, None, Some("Al"), None)]);
        assert_eq!(display_name(&reversed, ALICE), "Alice");
    }

    #[test]
    fn test_verified_never_demotes_notify() {
        let mut roster = Roster::new();
        roster.apply_contacts(&[contact(ALICE, None, Some("Al"), None)]);
        roster.apply_contacts(&[contact(ALICE, None, None, Some("Acme Corp"))]);
        assert_eq!(display_name(&roster, ALICE), "Al");
    }

    #[test]
    fn test_notify_upgrades_phone_fallback() {
        let mut roster = Roster::new();
        roster.apply_contacts(&[contact(ALICE, None, None, None)]);
        assert_eq!(display_name(&roster, ALICE), "+15551230001");
        roster.apply_contacts(&[contact(ALICE, None, Some("Al"), None)]);
        assert_eq!(display_name(&roster, ALICE), "Al");
    }

    #[test]
    fn test_fallback_name_is_phone() {
        let mut roster = Roster::new();
        roster.apply_contacts(&[contact(ALICE, None, None, None)]);
        let record = &sorted_snapshot(&roster)[0];
        assert_eq!(record.display_name, record.phone);
        assert_eq!(record.name_source, NameSource::Phone);
    }

    #[test]
    fn test_empty_name_fields_are_ignored() {
        let mut roster = Roster::new();
        roster.apply_contacts(&[contact(ALICE, Some("  "), Some(""), None)]);
        assert_eq!(display_name(&roster, ALICE), "+15551230001");
    }

    #[test]
    fn test_chat_never_overwrites_contact_name() {
        let mut roster = Roster::new();
        roster.apply_contacts(&[contact(ALICE, Some("Alice"), None, None)]);
        roster.apply_chats(&[chat(ALICE, Some("Alice (group nick)"))]);
        assert_eq!(display_name(&roster, ALICE), "Alice");
    }

    #[test]
    fn test_chat_creates_record_when_absent() {
        let mut roster = Roster::new();
        roster.apply_chats(&[chat(BOB, Some("Bobby"))]);
        assert_eq!(display_name(&roster, BOB), "Bobby");
        // A later, richer contact source still wins.
        roster.apply_contacts(&[contact(BOB, None, Some("Bob"), None)]);
        assert_eq!(display_name(&roster, BOB), "Bob");
    }

    #[test]
    fn test_non_individual_jids_excluded() {
        let mut roster = Roster::new();
        roster.apply_contacts(&[contact("12036304123@g.us", Some("Group"), None, None)]);
        roster.apply_chats(&[chat("status@broadcast", Some("Status"))]);
        assert!(roster.is_empty());
    }
}
