//! Per-account user preference settings.
//!
//! A [`SettingsRecord`] is an immutable value object, one per account, with a
//! single runtime-only exception: the transient auto-advance override, which
//! is layered over the persisted value and never serialized. Consumers must
//! read effective values through the accessors ([`effective_auto_advance`],
//! [`effective_max_attachment_size`]) rather than the raw fields.
//!
//! [`effective_auto_advance`]: SettingsRecord::effective_auto_advance
//! [`effective_max_attachment_size`]: SettingsRecord::effective_max_attachment_size

use url::Url;

/// Fallback for [`SettingsRecord::effective_max_attachment_size`] when the
/// account declares no limit (5 MiB). Never written back into a record.
pub const DEFAULT_MAX_ATTACHMENT_SIZE: i64 = 5 * 1024 * 1024;

/// Which conversation the UI advances to after the current one is destroyed.
///
/// Wire value (all three formats): `Unset = 0`, `Older = 1`, `Newer = 2`,
/// `List = 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AutoAdvance {
    /// No preference recorded for the account.
    Unset,
    /// Advance to the next older conversation.
    Older,
    /// Advance to the next newer conversation.
    Newer,
    /// Return to the conversation list.
    #[default]
    List,
}

impl AutoAdvance {
    /// Wire integer used by every format.
    pub fn as_wire(self) -> i32 {
        match self {
            Self::Unset => 0,
            Self::Older => 1,
            Self::Newer => 2,
            Self::List => 3,
        }
    }

    /// Decode a wire integer. Unknown values decode as `None`.
    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unset),
            1 => Some(Self::Older),
            2 => Some(Self::Newer),
            3 => Some(Self::List),
            _ => None,
        }
    }
}

/// Text size for the message body view.
///
/// Wire value: `Tiny = -2` through `Huge = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageTextSize {
    Tiny,
    Small,
    #[default]
    Normal,
    Large,
    Huge,
}

impl MessageTextSize {
    pub fn as_wire(self) -> i32 {
        match self {
            Self::Tiny => -2,
            Self::Small => -1,
            Self::Normal => 0,
            Self::Large => 1,
            Self::Huge => 2,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            -2 => Some(Self::Tiny),
            -1 => Some(Self::Small),
            0 => Some(Self::Normal),
            1 => Some(Self::Large),
            2 => Some(Self::Huge),
            _ => None,
        }
    }
}

/// When the conversation view pins ("snaps") the message header bar.
///
/// Wire value: `Always = 0`, `PortraitOnly = 1`, `Never = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SnapHeaders {
    #[default]
    Always,
    PortraitOnly,
    Never,
}

impl SnapHeaders {
    pub fn as_wire(self) -> i32 {
        match self {
            Self::Always => 0,
            Self::PortraitOnly => 1,
            Self::Never => 2,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Always),
            1 => Some(Self::PortraitOnly),
            2 => Some(Self::Never),
            _ => None,
        }
    }
}

/// Default action for the reply button.
///
/// Wire value: `Reply = 0`, `ReplyAll = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReplyBehavior {
    #[default]
    Reply,
    ReplyAll,
}

impl ReplyBehavior {
    pub fn as_wire(self) -> i32 {
        match self {
            Self::Reply => 0,
            Self::ReplyAll => 1,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Reply),
            1 => Some(Self::ReplyAll),
            _ => None,
        }
    }
}

/// How the conversation view opens a conversation.
///
/// Wire value: `Undefined = -1`, `Reading = 0`, `Overview = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConversationViewMode {
    #[default]
    Undefined,
    Reading,
    Overview,
}

impl ConversationViewMode {
    pub fn as_wire(self) -> i32 {
        match self {
            Self::Undefined => -1,
            Self::Reading => 0,
            Self::Overview => 1,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::Undefined),
            0 => Some(Self::Reading),
            1 => Some(Self::Overview),
            _ => None,
        }
    }
}

/// Action bound to swiping a conversation away in the list.
///
/// Wire value: `Archive = 0`, `Delete = 1`, `Disabled = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwipeAction {
    #[default]
    Archive,
    Delete,
    Disabled,
}

impl SwipeAction {
    pub fn as_wire(self) -> i32 {
        match self {
            Self::Archive => 0,
            Self::Delete => 1,
            Self::Disabled => 2,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Archive),
            1 => Some(Self::Delete),
            2 => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// User preference settings for one account.
///
/// Every field except the auto-advance override is fixed at construction
/// (records are built by the codecs in [`crate::codec::settings`]). The
/// override is runtime-only state: it participates in equality and hashing —
/// two records differing only by override-presence compare unequal — but is
/// never serialized by any format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SettingsRecord {
    /// Signature appended to outgoing messages.
    pub signature: String,

    /// Persisted auto-advance preference. Read through
    /// [`effective_auto_advance`](Self::effective_auto_advance), which applies
    /// the transient override.
    pub auto_advance: AutoAdvance,

    /// Runtime-only override of [`auto_advance`](Self::auto_advance).
    /// Set via [`set_auto_advance_override`](Self::set_auto_advance_override);
    /// never serialized.
    auto_advance_override: Option<AutoAdvance>,

    /// Text size for the message body view.
    pub message_text_size: MessageTextSize,

    /// Header-snapping behavior of the conversation view.
    pub snap_headers: SnapHeaders,

    /// Default reply-vs-reply-all behavior.
    pub reply_behavior: ReplyBehavior,

    /// How conversations open from the list.
    pub conversation_view_mode: ConversationViewMode,

    /// Hide the per-conversation selection checkboxes.
    pub hide_checkboxes: bool,

    /// Ask before deleting a conversation.
    pub confirm_delete: bool,

    /// Ask before archiving a conversation.
    pub confirm_archive: bool,

    /// Ask before sending a message.
    pub confirm_send: bool,

    /// Reply from the account's default address regardless of the recipient
    /// address the original was delivered to.
    pub force_reply_from_default: bool,

    /// Arrows on priority-inbox conversations.
    pub priority_arrows_enabled: bool,

    /// URI of the folder the UI should open first.
    pub default_inbox: Option<Url>,

    /// Display name of the default inbox ("Inbox", "Priority Inbox", ...,
    /// already internationalized by the provider).
    pub default_inbox_name: String,

    /// URI of the account setup flow to launch when setup is incomplete.
    pub setup_intent_uri: Option<Url>,

    /// Declared per-account attachment size limit in bytes. Zero or negative
    /// means unset; consumers must call
    /// [`effective_max_attachment_size`](Self::effective_max_attachment_size).
    pub max_attachment_size: i64,

    /// Swipe action in the conversation list.
    pub swipe: SwipeAction,
}

impl SettingsRecord {
    /// The "empty settings" record: the field-by-field fallback source used
    /// when decoding a document with missing keys.
    ///
    /// Same as [`Default::default`], named for call-site clarity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The auto-advance value consumers should act on: the transient override
    /// when one is set, else the persisted value.
    pub fn effective_auto_advance(&self) -> AutoAdvance {
        self.auto_advance_override.unwrap_or(self.auto_advance)
    }

    /// The transient override, if any. Exposed so codecs and equality tests
    /// can distinguish "no override" from "override equal to the persisted
    /// value" — the two are intentionally not collapsed.
    pub fn auto_advance_override(&self) -> Option<AutoAdvance> {
        self.auto_advance_override
    }

    /// Set the runtime-only auto-advance override. The only mutation this
    /// type supports after construction.
    pub fn set_auto_advance_override(&mut self, auto_advance: AutoAdvance) {
        self.auto_advance_override = Some(auto_advance);
    }

    /// Null-safe form of [`effective_auto_advance`](Self::effective_auto_advance):
    /// returns [`AutoAdvance::List`] when no record is available.
    pub fn auto_advance_of(settings: Option<&SettingsRecord>) -> AutoAdvance {
        match settings {
            Some(s) => s.effective_auto_advance(),
            None => AutoAdvance::List,
        }
    }

    /// Null-safe swipe accessor: returns [`SwipeAction::Archive`] when no
    /// record is available.
    pub fn swipe_of(settings: Option<&SettingsRecord>) -> SwipeAction {
        match settings {
            Some(s) => s.swipe,
            None => SwipeAction::default(),
        }
    }

    /// Null-safe default-inbox accessor.
    pub fn default_inbox_of(settings: Option<&SettingsRecord>) -> Option<&Url> {
        settings.and_then(|s| s.default_inbox.as_ref())
    }

    /// Maximum attachment size in bytes: the declared limit when positive,
    /// else [`DEFAULT_MAX_ATTACHMENT_SIZE`].
    pub fn effective_max_attachment_size(&self) -> i64 {
        if self.max_attachment_size > 0 {
            self.max_attachment_size
        } else {
            DEFAULT_MAX_ATTACHMENT_SIZE
        }
    }
}
