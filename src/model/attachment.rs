//! Attachment record and download lifecycle.
//!
//! An [`AttachmentRecord`] is a mutable value object describing one message
//! part. Unlike [`SettingsRecord`](super::settings::SettingsRecord) it is
//! owned and mutated by a single caller at a time; the only transition the
//! type itself enforces is the `downloaded_size` reset on
//! [`set_state`](AttachmentRecord::set_state). The two derived values
//! (inferred content type, identifier URI) live in explicit lazily-filled
//! cache cells; the setters that can change their inputs clear them.

use std::cell::OnceCell;
use std::hash::{Hash, Hasher};

use url::Url;

use crate::mime::MimeClassifier;

/// Download state of an attachment.
///
/// Caller-directed transitions: `NotSaved → Downloading ⇄ Paused → Saved`,
/// any state `→ Failed`. Wire value: `NotSaved = 0`, `Downloading = 1`,
/// `Saved = 2`, `Failed = 3`, `Paused = 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentState {
    #[default]
    NotSaved,
    Downloading,
    Saved,
    Failed,
    Paused,
}

impl AttachmentState {
    /// Wire integer used by every format.
    pub fn as_wire(self) -> i32 {
        match self {
            Self::NotSaved => 0,
            Self::Downloading => 1,
            Self::Saved => 2,
            Self::Failed => 3,
            Self::Paused => 4,
        }
    }

    /// Decode a wire integer. Unknown values decode as `None`.
    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::NotSaved),
            1 => Some(Self::Downloading),
            2 => Some(Self::Saved),
            3 => Some(Self::Failed),
            4 => Some(Self::Paused),
            _ => None,
        }
    }
}

/// Where a download is (or was) written.
///
/// Wire value: `Cache = 0`, `External = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentDestination {
    /// App-private cache storage.
    #[default]
    Cache,
    /// Shared external storage visible to other apps.
    External,
}

impl AttachmentDestination {
    pub fn as_wire(self) -> i32 {
        match self {
            Self::Cache => 0,
            Self::External => 1,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Cache),
            1 => Some(Self::External),
            _ => None,
        }
    }
}

/// Metadata for one attachment of one message.
///
/// Equality and hashing cover all persisted fields — not `part_id` and not
/// the memoized caches — so two records decoded from the same wire data
/// compare equal regardless of which derived values have been computed.
#[derive(Debug, Clone, Default)]
pub struct AttachmentRecord {
    /// MIME part id within the containing message. Identification only;
    /// excluded from equality.
    pub part_id: String,

    /// Attachment file name, when the message declared one. Reassign through
    /// [`set_name`](AttachmentRecord::set_name).
    name: Option<String>,

    /// Declared size in bytes.
    pub size: i64,

    /// Provider-generated globally-unique URI. Absent for local attachments
    /// composed but not yet sent or saved.
    pub uri: Option<Url>,

    /// Declared MIME type, as written by the sender. Reassign through
    /// [`set_content_type`](AttachmentRecord::set_content_type); consumers
    /// wanting a usable type call
    /// [`content_type`](AttachmentRecord::content_type) instead.
    declared_content_type: Option<String>,

    /// Download state. Reassign through [`set_state`](AttachmentRecord::set_state).
    state: AttachmentState,

    /// Where the download is written.
    pub destination: AttachmentDestination,

    /// Bytes downloaded so far. Reset to 0 by [`set_state`] on
    /// [`AttachmentState::Failed`] and [`AttachmentState::NotSaved`].
    ///
    /// [`set_state`]: AttachmentRecord::set_state
    pub downloaded_size: i64,

    /// Shareable, openable URI for the materialized content.
    pub content_uri: Option<Url>,

    /// Thumbnail URI, if the provider rendered one.
    pub thumbnail_uri: Option<Url>,

    /// URI of a rich preview intent, if the provider supports one.
    pub preview_intent_uri: Option<Url>,

    /// Opaque provider-private payload (conventionally JSON text).
    pub provider_data: Option<String>,

    /// Whether the backing store can re-materialize the bytes after they are
    /// discarded. Documents that predate this field decode it as `true`.
    pub supports_download_again: bool,

    /// Cache for [`content_type`](AttachmentRecord::content_type). Cleared by
    /// `set_name` and `set_content_type`.
    inferred_content_type: OnceCell<String>,

    /// Cache for [`identifier_uri`](AttachmentRecord::identifier_uri).
    identifier_uri: OnceCell<Option<Url>>,
}

impl AttachmentRecord {
    /// New empty record: `NotSaved`, cache destination, zero sizes, no URIs.
    /// `supports_download_again` starts `false`; only document decode applies
    /// the `true` default, for blobs written before the field existed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attachment file name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Reassign the file name, invalidating the inferred content type.
    /// Returns `true` if the stored value actually changed.
    pub fn set_name(&mut self, name: Option<String>) -> bool {
        if self.name == name {
            return false;
        }
        self.inferred_content_type = OnceCell::new();
        self.name = name;
        true
    }

    /// The declared MIME type, unmodified. Most consumers want
    /// [`content_type`](Self::content_type).
    pub fn declared_content_type(&self) -> Option<&str> {
        self.declared_content_type.as_deref()
    }

    /// Reassign the declared MIME type, invalidating the inferred one.
    pub fn set_content_type(&mut self, content_type: Option<String>) {
        if self.declared_content_type == content_type {
            return;
        }
        self.inferred_content_type = OnceCell::new();
        self.declared_content_type = content_type;
    }

    /// The usable MIME type: inferred once from the name and the declared
    /// type via the classifier, then memoized until `set_name` or
    /// `set_content_type` invalidates it.
    pub fn content_type(&self, classifier: &dyn MimeClassifier) -> &str {
        self.inferred_content_type.get_or_init(|| {
            classifier.infer(self.name.as_deref(), self.declared_content_type.as_deref())
        })
    }

    /// Current download state.
    pub fn state(&self) -> AttachmentState {
        self.state
    }

    /// Set the download state. Side effect: entering
    /// [`AttachmentState::Failed`] or [`AttachmentState::NotSaved`] resets
    /// `downloaded_size` to 0. No other transition is validated; the caller
    /// directs the lifecycle.
    pub fn set_state(&mut self, state: AttachmentState) {
        self.state = state;
        if state == AttachmentState::Failed || state == AttachmentState::NotSaved {
            self.downloaded_size = 0;
        }
    }

    /// A stable identifier for this attachment across state changes: the
    /// provider URI with its query stripped, else the content URI, else
    /// nothing. Memoized on first call; `uri`/`content_uri` are fixed by the
    /// time consumers identify attachments.
    pub fn identifier_uri(&self) -> Option<&Url> {
        self.identifier_uri
            .get_or_init(|| match &self.uri {
                Some(uri) => {
                    let mut id = uri.clone();
                    id.set_query(None);
                    Some(id)
                }
                None => self.content_uri.clone(),
            })
            .as_ref()
    }

    // ── Derived predicates ──────────────────────────────────────────

    /// The bytes are materialized locally.
    pub fn is_present_locally(&self) -> bool {
        self.state == AttachmentState::Saved
    }

    /// A download is in flight (or paused mid-flight).
    pub fn is_downloading(&self) -> bool {
        self.state == AttachmentState::Downloading || self.state == AttachmentState::Paused
    }

    /// Saved to shared external storage.
    pub fn is_saved_to_external(&self) -> bool {
        self.state == AttachmentState::Saved && self.destination == AttachmentDestination::External
    }

    /// The last download attempt failed.
    pub fn is_download_failed(&self) -> bool {
        self.state == AttachmentState::Failed
    }

    /// The download reached a terminal state, successfully or not.
    pub fn is_download_finished_or_failed(&self) -> bool {
        self.state == AttachmentState::Failed || self.state == AttachmentState::Saved
    }

    /// A determinate progress bar is meaningful: downloading with a known
    /// total and a positive count no greater than it.
    pub fn should_show_progress(&self) -> bool {
        self.is_downloading()
            && self.size > 0
            && self.downloaded_size > 0
            && self.downloaded_size <= self.size
    }

    /// The attachment's type is installable (e.g. an application package),
    /// per the classifier.
    pub fn is_installable(&self, classifier: &dyn MimeClassifier) -> bool {
        classifier.is_installable(self.content_type(classifier))
    }

    /// The UI may offer "save": not already on external storage, not an
    /// installable package, and not a blocked type.
    pub fn can_save(&self, classifier: &dyn MimeClassifier) -> bool {
        !self.is_saved_to_external()
            && !self.is_installable(classifier)
            && !classifier.is_blocked(self.content_type(classifier))
    }

    /// The UI may offer "share": present locally with a shareable URI.
    pub fn can_share(&self) -> bool {
        self.is_present_locally() && self.content_uri.is_some()
    }

    /// The UI may offer a rich preview.
    pub fn can_preview(&self) -> bool {
        self.preview_intent_uri.is_some()
    }
}

impl PartialEq for AttachmentRecord {
    fn eq(&self, other: &Self) -> bool {
        // part_id and the memoized caches are deliberately excluded.
        self.name == other.name
            && self.size == other.size
            && self.uri == other.uri
            && self.declared_content_type == other.declared_content_type
            && self.state == other.state
            && self.destination == other.destination
            && self.downloaded_size == other.downloaded_size
            && self.content_uri == other.content_uri
            && self.thumbnail_uri == other.thumbnail_uri
            && self.preview_intent_uri == other.preview_intent_uri
            && self.provider_data == other.provider_data
            && self.supports_download_again == other.supports_download_again
    }
}

impl Eq for AttachmentRecord {}

impl Hash for AttachmentRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.hash(state);
        self.uri.hash(state);
        self.declared_content_type.hash(state);
        self.state.hash(state);
        self.destination.hash(state);
        self.downloaded_size.hash(state);
        self.content_uri.hash(state);
        self.thumbnail_uri.hash(state);
        self.preview_intent_uri.hash(state);
        self.provider_data.hash(state);
        self.supports_download_again.hash(state);
    }
}
