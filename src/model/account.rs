//! Registry projection of an account.

use url::Url;

/// The fixed projection of an account that the registry serves to the UI.
///
/// Immutable once built and keyed by [`uri`](AccountEntry::uri); the full
/// account record lives with whichever backend registered the entry. The
/// URI set is fixed: every operation surface the UI may need on the account
/// is addressed here, so the enumeration query never grows per-backend
/// columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountEntry {
    /// Row id for UI adapters.
    pub id: i64,

    /// Account display name.
    pub name: String,

    /// Globally-unique account URI; the registry key.
    pub uri: Url,

    /// Capability bitmask declared by the backend.
    pub capabilities: u64,

    /// URI that enumerates the account's folders.
    pub folder_list_uri: Option<Url>,

    /// URI of the account's search surface.
    pub search_uri: Option<Url>,

    /// URI that enumerates the addresses the account may send from.
    pub from_addresses_uri: Option<Url>,

    /// URI that accepts draft saves.
    pub save_draft_uri: Option<Url>,

    /// URI that accepts outgoing messages.
    pub send_mail_uri: Option<Url>,

    /// URI that expunges a message.
    pub expunge_message_uri: Option<Url>,

    /// URI that undoes the most recent operation.
    pub undo_uri: Option<Url>,

    /// URI of the account settings screen.
    pub settings_intent_uri: Option<Url>,

    /// URI the settings record is queried from.
    pub settings_query_uri: Option<Url>,

    /// URI of the account's help surface.
    pub help_intent_uri: Option<Url>,

    /// URI of the compose screen.
    pub compose_intent_uri: Option<Url>,

    /// Backend sync status bits.
    pub sync_status: i32,
}

impl AccountEntry {
    /// Minimal entry: id, name and key URI, everything else empty. Builders
    /// fill the rest with plain field assignment.
    pub fn new(id: i64, name: impl Into<String>, uri: Url) -> Self {
        Self {
            id,
            name: name.into(),
            uri,
            capabilities: 0,
            folder_list_uri: None,
            search_uri: None,
            from_addresses_uri: None,
            save_draft_uri: None,
            send_mail_uri: None,
            expunge_message_uri: None,
            undo_uri: None,
            settings_intent_uri: None,
            settings_query_uri: None,
            help_intent_uri: None,
            compose_intent_uri: None,
            sync_status: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_minimal() {
        let uri = Url::parse("content://mail/account/1").unwrap();
        let e = AccountEntry::new(1, "work", uri.clone());
        assert_eq!(e.uri, uri);
        assert_eq!(e.capabilities, 0);
        assert!(e.folder_list_uri.is_none());
        assert_eq!(e.sync_status, 0);
    }

    #[test]
    fn test_equality_covers_all_fields() {
        let uri = Url::parse("content://mail/account/1").unwrap();
        let a = AccountEntry::new(1, "work", uri.clone());
        let mut b = AccountEntry::new(1, "work", uri);
        assert_eq!(a, b);
        b.sync_status = 4;
        assert_ne!(a, b);
    }
}
