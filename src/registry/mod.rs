//! Concurrent account registry with change broadcast.
//!
//! Backends register [`AccountEntry`] projections so the UI has a single
//! place to enumerate accounts. The registry is an explicit object with an
//! explicit subscriber list — construction and teardown belong to whoever
//! owns it, not to process-wide statics.
//!
//! Locking protocol: the entry map is the critical section. Change
//! notifications are delivered strictly after the map lock (and the
//! subscriber-list lock) are released, so an observer invoked synchronously
//! may re-enter the registry — `query`, `add`, even `subscribe` — without
//! deadlocking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;
use url::Url;

use crate::codec::row::{Row, RowValue};
use crate::model::account::AccountEntry;

/// Column identifiers for the registry's projection query.
pub mod columns {
    pub const ID: &str = "_id";
    pub const NAME: &str = "name";
    pub const URI: &str = "uri";
    pub const CAPABILITIES: &str = "capabilities";
    pub const FOLDER_LIST_URI: &str = "folder_list_uri";
    pub const SEARCH_URI: &str = "search_uri";
    pub const FROM_ADDRESSES_URI: &str = "from_addresses_uri";
    pub const SAVE_DRAFT_URI: &str = "save_draft_uri";
    pub const SEND_MAIL_URI: &str = "send_mail_uri";
    pub const EXPUNGE_MESSAGE_URI: &str = "expunge_message_uri";
    pub const UNDO_URI: &str = "undo_uri";
    pub const SETTINGS_INTENT_URI: &str = "settings_intent_uri";
    pub const SETTINGS_QUERY_URI: &str = "settings_query_uri";
    pub const HELP_INTENT_URI: &str = "help_intent_uri";
    pub const COMPOSE_INTENT_URI: &str = "compose_intent_uri";
    pub const SYNC_STATUS: &str = "sync_status";
}

/// The full projection, served when a query names no columns of its own.
pub const DEFAULT_PROJECTION: &[&str] = &[
    columns::ID,
    columns::NAME,
    columns::URI,
    columns::CAPABILITIES,
    columns::FOLDER_LIST_URI,
    columns::SEARCH_URI,
    columns::FROM_ADDRESSES_URI,
    columns::SAVE_DRAFT_URI,
    columns::SEND_MAIL_URI,
    columns::EXPUNGE_MESSAGE_URI,
    columns::UNDO_URI,
    columns::SETTINGS_INTENT_URI,
    columns::SETTINGS_QUERY_URI,
    columns::HELP_INTENT_URI,
    columns::COMPOSE_INTENT_URI,
    columns::SYNC_STATUS,
];

/// Receives the registry's change signal.
///
/// Handlers may be invoked from whichever thread performed the mutation and
/// may re-enter the registry; the signal carries no payload — subscribers
/// re-query for current contents.
pub trait RegistryObserver: Send + Sync {
    fn on_registry_changed(&self);
}

/// Handle returned by [`AccountRegistry::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Concurrent keyed store of account projections.
///
/// Entries are keyed by account URI; `add` is an upsert. Every `add` or
/// `remove` call broadcasts exactly one change notification, even when the
/// visible contents did not change.
#[derive(Default)]
pub struct AccountRegistry {
    entries: Mutex<HashMap<Url, AccountEntry>>,
    observers: Mutex<Vec<(SubscriptionId, Arc<dyn RegistryObserver>)>>,
    next_subscription: AtomicU64,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for change notifications. The observer is held
    /// until [`unsubscribe`](Self::unsubscribe) is called with the returned
    /// handle.
    pub fn subscribe(&self, observer: Arc<dyn RegistryObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.observers).push((id, observer));
        id
    }

    /// Drop an observer. Unknown handles are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        lock(&self.observers).retain(|(sub, _)| *sub != id);
    }

    /// Upsert an entry by its URI key, then broadcast.
    pub fn add(&self, entry: AccountEntry) {
        {
            let mut entries = lock(&self.entries);
            debug!(uri = %entry.uri, name = %entry.name, "Registering account");
            entries.insert(entry.uri.clone(), entry);
        }
        // Broadcast outside the lock: observers may re-enter synchronously.
        self.notify_changed();
    }

    /// Remove the entry under `uri`, if any, then broadcast. The broadcast
    /// happens whether or not an entry was removed.
    pub fn remove(&self, uri: &Url) {
        {
            let mut entries = lock(&self.entries);
            if entries.remove(uri).is_some() {
                debug!(uri = %uri, "Unregistered account");
            }
        }
        self.notify_changed();
    }

    /// Consistent copy of every entry, in no particular order. Safe to call
    /// concurrently with mutation; never observes a half-written entry.
    pub fn snapshot(&self) -> Vec<AccountEntry> {
        lock(&self.entries).values().cloned().collect()
    }

    /// Tabular enumeration of every entry, one row per account, restricted
    /// to `projection` (the full [`DEFAULT_PROJECTION`] when `None`).
    ///
    /// # Panics
    ///
    /// Panics if the projection names a column outside the fixed set: the
    /// projection shape is part of the query contract, and an unknown
    /// column is a programming error, not a query variant.
    pub fn query(&self, projection: Option<&[&str]>) -> Vec<Row> {
        let projection = projection.unwrap_or(DEFAULT_PROJECTION);
        lock(&self.entries)
            .values()
            .map(|entry| project(entry, projection))
            .collect()
    }

    /// Number of registered accounts.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    fn notify_changed(&self) {
        // Clone the list so a handler that (un)subscribes re-entrantly does
        // not deadlock against the observer lock.
        let observers: Vec<Arc<dyn RegistryObserver>> = lock(&self.observers)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer.on_registry_changed();
        }
    }
}

impl std::fmt::Debug for AccountRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRegistry")
            .field("entries", &self.len())
            .field("observers", &lock(&self.observers).len())
            .finish()
    }
}

/// Build one projection row for an entry.
///
/// # Panics
///
/// Panics on a column outside the fixed projection set.
fn project(entry: &AccountEntry, projection: &[&str]) -> Row {
    let mut row = Row::new();
    for &column in projection {
        let value = match column {
            columns::ID => RowValue::Integer(entry.id),
            columns::NAME => RowValue::Text(entry.name.clone()),
            columns::URI => RowValue::Text(entry.uri.as_str().to_string()),
            columns::CAPABILITIES => RowValue::Integer(entry.capabilities as i64),
            columns::FOLDER_LIST_URI => RowValue::opt_uri(entry.folder_list_uri.as_ref()),
            columns::SEARCH_URI => RowValue::opt_uri(entry.search_uri.as_ref()),
            columns::FROM_ADDRESSES_URI => RowValue::opt_uri(entry.from_addresses_uri.as_ref()),
            columns::SAVE_DRAFT_URI => RowValue::opt_uri(entry.save_draft_uri.as_ref()),
            columns::SEND_MAIL_URI => RowValue::opt_uri(entry.send_mail_uri.as_ref()),
            columns::EXPUNGE_MESSAGE_URI => RowValue::opt_uri(entry.expunge_message_uri.as_ref()),
            columns::UNDO_URI => RowValue::opt_uri(entry.undo_uri.as_ref()),
            columns::SETTINGS_INTENT_URI => RowValue::opt_uri(entry.settings_intent_uri.as_ref()),
            columns::SETTINGS_QUERY_URI => RowValue::opt_uri(entry.settings_query_uri.as_ref()),
            columns::HELP_INTENT_URI => RowValue::opt_uri(entry.help_intent_uri.as_ref()),
            columns::COMPOSE_INTENT_URI => RowValue::opt_uri(entry.compose_intent_uri.as_ref()),
            columns::SYNC_STATUS => RowValue::Integer(entry.sync_status.into()),
            other => panic!("column not found: {other}"),
        };
        row.push(column, value);
    }
    row
}

/// Mutex acquisition; a poisoned lock means a panic already tore through a
/// critical section, so propagating the panic is the only sound option.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().expect("registry mutex poisoned")
}
