//! WhatsApp JID normalization.
//!
//! Individual contacts are addressed as `<digits>@s.whatsapp.net`, optionally
//! with a `:<device>` suffix on the local part. Groups (`@g.us`), broadcast
//! lists (`@broadcast`), and anything else are not exportable.
//!
//! CHANGELOG:
//! - 08/23/2026 - Initial implementation

/// Suffix that marks an individual contact JID.
pub const INDIVIDUAL_SUFFIX: &str = "@s.whatsapp.net";

/// Derive the canonical `+<digits>` phone string from a service JID.
///
/// Returns `None` for group/broadcast/malformed identifiers; callers drop
/// those silently instead of failing the run.
pub fn phone_from_jid(jid: &str) -> Option<String> {
    let local = jid.strip_suffix(INDIVIDUAL_SUFFIX)?;
    // Multi-device JIDs carry a `:<device>` suffix on the local part.
    let local = local.split(':').next().unwrap_or(local);
    if local.is_empty() || !local.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("+{}", local))
}

/// Whether a JID addresses an individual contact.
pub fn is_individual(jid: &str) -> bool {
    phone_from_jid(jid).is_some()
}
