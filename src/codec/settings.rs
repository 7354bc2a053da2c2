//! Three-format codec for [`SettingsRecord`].
//!
//! The transient auto-advance override is runtime-only state and is never
//! serialized: binary and row carry the persisted auto-advance value, and
//! the document format folds the effective value into the `auto_advance` key
//! (what a settings blob persists is the preference the user last acted on).
//! No format emits a distinct override field, so decoding always yields a
//! record without an override.

use serde_json::Value;
use tracing::warn;

use crate::codec::binary::{RecordReader, RecordWriter};
use crate::codec::document::{self, Document};
use crate::codec::row::{Row, RowValue};
use crate::error::{RecordError, Result};
use crate::model::settings::{
    AutoAdvance, ConversationViewMode, MessageTextSize, ReplyBehavior, SettingsRecord,
    SnapHeaders, SwipeAction,
};

/// Field identifiers shared verbatim by the row columns and the document
/// keys. The binary stream uses no names, only the order of [`encode_binary`].
pub mod columns {
    pub const SIGNATURE: &str = "signature";
    pub const AUTO_ADVANCE: &str = "auto_advance";
    pub const MESSAGE_TEXT_SIZE: &str = "message_text_size";
    pub const SNAP_HEADERS: &str = "snap_headers";
    pub const REPLY_BEHAVIOR: &str = "reply_behavior";
    pub const CONVERSATION_VIEW_MODE: &str = "conversation_view_mode";
    pub const HIDE_CHECKBOXES: &str = "hide_checkboxes";
    pub const CONFIRM_DELETE: &str = "confirm_delete";
    pub const CONFIRM_ARCHIVE: &str = "confirm_archive";
    pub const CONFIRM_SEND: &str = "confirm_send";
    pub const FORCE_REPLY_FROM_DEFAULT: &str = "force_reply_from_default";
    pub const PRIORITY_ARROWS_ENABLED: &str = "priority_arrows_enabled";
    pub const DEFAULT_INBOX: &str = "default_inbox";
    pub const DEFAULT_INBOX_NAME: &str = "default_inbox_name";
    pub const SETUP_INTENT_URI: &str = "setup_intent_uri";
    pub const MAX_ATTACHMENT_SIZE: &str = "max_attachment_size";
    pub const SWIPE: &str = "swipe";
}

/// All settings columns, in the binary field order.
pub const PROJECTION: &[&str] = &[
    columns::SIGNATURE,
    columns::AUTO_ADVANCE,
    columns::MESSAGE_TEXT_SIZE,
    columns::SNAP_HEADERS,
    columns::REPLY_BEHAVIOR,
    columns::CONVERSATION_VIEW_MODE,
    columns::HIDE_CHECKBOXES,
    columns::CONFIRM_DELETE,
    columns::CONFIRM_ARCHIVE,
    columns::CONFIRM_SEND,
    columns::FORCE_REPLY_FROM_DEFAULT,
    columns::PRIORITY_ARROWS_ENABLED,
    columns::DEFAULT_INBOX,
    columns::DEFAULT_INBOX_NAME,
    columns::SETUP_INTENT_URI,
    columns::MAX_ATTACHMENT_SIZE,
    columns::SWIPE,
];

// ── Binary ──────────────────────────────────────────────────────────

/// Encode to the positional binary stream. Field order is [`PROJECTION`].
pub fn encode_binary(record: &SettingsRecord) -> Vec<u8> {
    let mut w = RecordWriter::new();
    w.write_str(&record.signature);
    w.write_i32(record.auto_advance.as_wire());
    w.write_i32(record.message_text_size.as_wire());
    w.write_i32(record.snap_headers.as_wire());
    w.write_i32(record.reply_behavior.as_wire());
    w.write_i32(record.conversation_view_mode.as_wire());
    w.write_bool(record.hide_checkboxes);
    w.write_bool(record.confirm_delete);
    w.write_bool(record.confirm_archive);
    w.write_bool(record.confirm_send);
    w.write_bool(record.force_reply_from_default);
    w.write_bool(record.priority_arrows_enabled);
    w.write_opt_uri(record.default_inbox.as_ref());
    w.write_str(&record.default_inbox_name);
    w.write_opt_uri(record.setup_intent_uri.as_ref());
    w.write_i64(record.max_attachment_size);
    w.write_i32(record.swipe.as_wire());
    w.into_bytes()
}

/// Decode the positional binary stream written by [`encode_binary`].
///
/// # Panics
///
/// Panics on a truncated or corrupt stream; callers must not feed untrusted
/// bytes (see [`RecordReader`]).
pub fn decode_binary(data: &[u8]) -> SettingsRecord {
    let mut r = RecordReader::new(data);
    let mut record = SettingsRecord::empty();
    record.signature = r.read_string();
    record.auto_advance = auto_advance(r.read_i32().into());
    record.message_text_size = message_text_size(r.read_i32().into());
    record.snap_headers = snap_headers(r.read_i32().into());
    record.reply_behavior = reply_behavior(r.read_i32().into());
    record.conversation_view_mode = view_mode(r.read_i32().into());
    record.hide_checkboxes = r.read_bool();
    record.confirm_delete = r.read_bool();
    record.confirm_archive = r.read_bool();
    record.confirm_send = r.read_bool();
    record.force_reply_from_default = r.read_bool();
    record.priority_arrows_enabled = r.read_bool();
    record.default_inbox = r.read_opt_uri();
    record.default_inbox_name = r.read_string();
    record.setup_intent_uri = r.read_opt_uri();
    record.max_attachment_size = r.read_i64();
    record.swipe = swipe(r.read_i32().into());
    record
}

// ── Row ─────────────────────────────────────────────────────────────

/// Encode to a tabular row, one column per field.
pub fn encode_row(record: &SettingsRecord) -> Row {
    let mut row = Row::new();
    row.push(columns::SIGNATURE, record.signature.as_str());
    row.push(columns::AUTO_ADVANCE, record.auto_advance.as_wire());
    row.push(columns::MESSAGE_TEXT_SIZE, record.message_text_size.as_wire());
    row.push(columns::SNAP_HEADERS, record.snap_headers.as_wire());
    row.push(columns::REPLY_BEHAVIOR, record.reply_behavior.as_wire());
    row.push(
        columns::CONVERSATION_VIEW_MODE,
        record.conversation_view_mode.as_wire(),
    );
    row.push(columns::HIDE_CHECKBOXES, record.hide_checkboxes);
    row.push(columns::CONFIRM_DELETE, record.confirm_delete);
    row.push(columns::CONFIRM_ARCHIVE, record.confirm_archive);
    row.push(columns::CONFIRM_SEND, record.confirm_send);
    row.push(
        columns::FORCE_REPLY_FROM_DEFAULT,
        record.force_reply_from_default,
    );
    row.push(
        columns::PRIORITY_ARROWS_ENABLED,
        record.priority_arrows_enabled,
    );
    row.push(
        columns::DEFAULT_INBOX,
        RowValue::opt_uri(record.default_inbox.as_ref()),
    );
    row.push(columns::DEFAULT_INBOX_NAME, record.default_inbox_name.as_str());
    row.push(
        columns::SETUP_INTENT_URI,
        RowValue::opt_uri(record.setup_intent_uri.as_ref()),
    );
    row.push(columns::MAX_ATTACHMENT_SIZE, record.max_attachment_size);
    row.push(columns::SWIPE, record.swipe.as_wire());
    row
}

/// Decode a row holding every settings column.
///
/// # Panics
///
/// Panics if a column is missing: the row schema is controlled by this
/// system, so absence is a programming error.
pub fn decode_row(row: &Row) -> SettingsRecord {
    let mut record = SettingsRecord::empty();
    record.signature = row.get_str(columns::SIGNATURE).to_string();
    record.auto_advance = auto_advance(row.get_i64(columns::AUTO_ADVANCE));
    record.message_text_size = message_text_size(row.get_i64(columns::MESSAGE_TEXT_SIZE));
    record.snap_headers = snap_headers(row.get_i64(columns::SNAP_HEADERS));
    record.reply_behavior = reply_behavior(row.get_i64(columns::REPLY_BEHAVIOR));
    record.conversation_view_mode = view_mode(row.get_i64(columns::CONVERSATION_VIEW_MODE));
    record.hide_checkboxes = row.get_bool(columns::HIDE_CHECKBOXES);
    record.confirm_delete = row.get_bool(columns::CONFIRM_DELETE);
    record.confirm_archive = row.get_bool(columns::CONFIRM_ARCHIVE);
    record.confirm_send = row.get_bool(columns::CONFIRM_SEND);
    record.force_reply_from_default = row.get_bool(columns::FORCE_REPLY_FROM_DEFAULT);
    record.priority_arrows_enabled = row.get_bool(columns::PRIORITY_ARROWS_ENABLED);
    record.default_inbox = row.get_opt_uri(columns::DEFAULT_INBOX);
    record.default_inbox_name = row.get_str(columns::DEFAULT_INBOX_NAME).to_string();
    record.setup_intent_uri = row.get_opt_uri(columns::SETUP_INTENT_URI);
    record.max_attachment_size = row.get_i64(columns::MAX_ATTACHMENT_SIZE);
    record.swipe = swipe(row.get_i64(columns::SWIPE));
    record
}

// ── Document ────────────────────────────────────────────────────────

/// Encode to a JSON document, one key per field.
///
/// Every defaulted field is always written (no `null`s); absent URIs are
/// omitted. The `auto_advance` key carries the effective value, folding in
/// any transient override.
pub fn encode_document(record: &SettingsRecord) -> Document {
    let mut doc = Document::new();
    doc.insert(
        columns::SIGNATURE.into(),
        Value::String(record.signature.clone()),
    );
    doc.insert(
        columns::AUTO_ADVANCE.into(),
        record.effective_auto_advance().as_wire().into(),
    );
    doc.insert(
        columns::MESSAGE_TEXT_SIZE.into(),
        record.message_text_size.as_wire().into(),
    );
    doc.insert(
        columns::SNAP_HEADERS.into(),
        record.snap_headers.as_wire().into(),
    );
    doc.insert(
        columns::REPLY_BEHAVIOR.into(),
        record.reply_behavior.as_wire().into(),
    );
    doc.insert(
        columns::CONVERSATION_VIEW_MODE.into(),
        record.conversation_view_mode.as_wire().into(),
    );
    doc.insert(
        columns::HIDE_CHECKBOXES.into(),
        record.hide_checkboxes.into(),
    );
    doc.insert(columns::CONFIRM_DELETE.into(), record.confirm_delete.into());
    doc.insert(
        columns::CONFIRM_ARCHIVE.into(),
        record.confirm_archive.into(),
    );
    doc.insert(columns::CONFIRM_SEND.into(), record.confirm_send.into());
    doc.insert(
        columns::FORCE_REPLY_FROM_DEFAULT.into(),
        record.force_reply_from_default.into(),
    );
    doc.insert(
        columns::PRIORITY_ARROWS_ENABLED.into(),
        record.priority_arrows_enabled.into(),
    );
    document::put_uri(&mut doc, columns::DEFAULT_INBOX, record.default_inbox.as_ref());
    doc.insert(
        columns::DEFAULT_INBOX_NAME.into(),
        Value::String(record.default_inbox_name.clone()),
    );
    document::put_uri(
        &mut doc,
        columns::SETUP_INTENT_URI,
        record.setup_intent_uri.as_ref(),
    );
    doc.insert(
        columns::MAX_ATTACHMENT_SIZE.into(),
        record.max_attachment_size.into(),
    );
    doc.insert(columns::SWIPE.into(), record.swipe.as_wire().into());
    doc
}

/// Decode a JSON document. Any key may be absent: each missing field takes
/// the empty record's value, so blobs written before a field existed still
/// decode cleanly.
pub fn decode_document(doc: &Document) -> SettingsRecord {
    let default = SettingsRecord::empty();
    let mut record = SettingsRecord::empty();
    record.signature = document::opt_str(doc, columns::SIGNATURE)
        .unwrap_or(&default.signature)
        .to_string();
    record.auto_advance = document::opt_i64(doc, columns::AUTO_ADVANCE)
        .map(auto_advance)
        .unwrap_or(default.auto_advance);
    record.message_text_size = document::opt_i64(doc, columns::MESSAGE_TEXT_SIZE)
        .map(message_text_size)
        .unwrap_or(default.message_text_size);
    record.snap_headers = document::opt_i64(doc, columns::SNAP_HEADERS)
        .map(snap_headers)
        .unwrap_or(default.snap_headers);
    record.reply_behavior = document::opt_i64(doc, columns::REPLY_BEHAVIOR)
        .map(reply_behavior)
        .unwrap_or(default.reply_behavior);
    record.conversation_view_mode = document::opt_i64(doc, columns::CONVERSATION_VIEW_MODE)
        .map(view_mode)
        .unwrap_or(default.conversation_view_mode);
    record.hide_checkboxes =
        document::opt_bool(doc, columns::HIDE_CHECKBOXES).unwrap_or(default.hide_checkboxes);
    record.confirm_delete =
        document::opt_bool(doc, columns::CONFIRM_DELETE).unwrap_or(default.confirm_delete);
    record.confirm_archive =
        document::opt_bool(doc, columns::CONFIRM_ARCHIVE).unwrap_or(default.confirm_archive);
    record.confirm_send =
        document::opt_bool(doc, columns::CONFIRM_SEND).unwrap_or(default.confirm_send);
    record.force_reply_from_default = document::opt_bool(doc, columns::FORCE_REPLY_FROM_DEFAULT)
        .unwrap_or(default.force_reply_from_default);
    record.priority_arrows_enabled = document::opt_bool(doc, columns::PRIORITY_ARROWS_ENABLED)
        .unwrap_or(default.priority_arrows_enabled);
    record.default_inbox = document::opt_uri(doc, columns::DEFAULT_INBOX);
    record.default_inbox_name = document::opt_str(doc, columns::DEFAULT_INBOX_NAME)
        .unwrap_or(&default.default_inbox_name)
        .to_string();
    record.setup_intent_uri = document::opt_uri(doc, columns::SETUP_INTENT_URI);
    record.max_attachment_size = document::opt_i64(doc, columns::MAX_ATTACHMENT_SIZE)
        .unwrap_or(default.max_attachment_size);
    record.swipe = document::opt_i64(doc, columns::SWIPE)
        .map(swipe)
        .unwrap_or(default.swipe);
    record
}

/// Serialize to document text, the form persisted by account blobs.
pub fn to_serialized(record: &SettingsRecord) -> String {
    Value::Object(encode_document(record)).to_string()
}

/// Strict parse of document text.
pub fn from_json_str(serialized: &str) -> Result<SettingsRecord> {
    let value: Value = serde_json::from_str(serialized)?;
    match value {
        Value::Object(doc) => Ok(decode_document(&doc)),
        _ => Err(RecordError::UnexpectedShape { expected: "object" }),
    }
}

/// Tolerant parse of a persisted settings blob: malformed input yields no
/// record (logged), never an error the caller must handle.
pub fn from_serialized(serialized: &str) -> Option<SettingsRecord> {
    match from_json_str(serialized) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, "Could not decode settings from serialized blob");
            None
        }
    }
}

// Unknown wire values decode to the empty record's value; provider-written
// integers are trusted but not fatal.
fn auto_advance(wire: i64) -> AutoAdvance {
    AutoAdvance::from_wire(wire).unwrap_or_default()
}

fn message_text_size(wire: i64) -> MessageTextSize {
    MessageTextSize::from_wire(wire).unwrap_or_default()
}

fn snap_headers(wire: i64) -> SnapHeaders {
    SnapHeaders::from_wire(wire).unwrap_or_default()
}

fn reply_behavior(wire: i64) -> ReplyBehavior {
    ReplyBehavior::from_wire(wire).unwrap_or_default()
}

fn view_mode(wire: i64) -> ConversationViewMode {
    ConversationViewMode::from_wire(wire).unwrap_or_default()
}

fn swipe(wire: i64) -> SwipeAction {
    SwipeAction::from_wire(wire).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn sample() -> SettingsRecord {
        let mut s = SettingsRecord::empty();
        s.signature = "-- \nSent from my terminal".into();
        s.auto_advance = AutoAdvance::Older;
        s.message_text_size = MessageTextSize::Large;
        s.snap_headers = SnapHeaders::Never;
        s.reply_behavior = ReplyBehavior::ReplyAll;
        s.conversation_view_mode = ConversationViewMode::Reading;
        s.hide_checkboxes = true;
        s.confirm_delete = true;
        s.confirm_send = true;
        s.force_reply_from_default = true;
        s.priority_arrows_enabled = true;
        s.default_inbox = Some(Url::parse("content://mail/folder/inbox").unwrap());
        s.default_inbox_name = "Inbox".into();
        s.setup_intent_uri = Some(Url::parse("content://mail/setup").unwrap());
        s.max_attachment_size = 10 * 1024 * 1024;
        s.swipe = SwipeAction::Delete;
        s
    }

    #[test]
    fn test_binary_round_trip() {
        let s = sample();
        assert_eq!(decode_binary(&encode_binary(&s)), s);
        let empty = SettingsRecord::empty();
        assert_eq!(decode_binary(&encode_binary(&empty)), empty);
    }

    #[test]
    fn test_row_round_trip() {
        let s = sample();
        assert_eq!(decode_row(&encode_row(&s)), s);
    }

    #[test]
    fn test_document_round_trip() {
        let s = sample();
        assert_eq!(decode_document(&encode_document(&s)), s);
    }

    #[test]
    fn test_serialized_round_trip() {
        let s = sample();
        assert_eq!(from_serialized(&to_serialized(&s)), Some(s));
    }

    #[test]
    fn test_document_missing_keys_take_defaults() {
        let doc = match serde_json::json!({ "signature": "sig" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let s = decode_document(&doc);
        assert_eq!(s.signature, "sig");
        let empty = SettingsRecord::empty();
        assert_eq!(s.auto_advance, empty.auto_advance);
        assert_eq!(s.message_text_size, empty.message_text_size);
        assert_eq!(s.max_attachment_size, empty.max_attachment_size);
        assert_eq!(s.default_inbox, empty.default_inbox);
    }

    #[test]
    fn test_document_never_emits_null() {
        let doc = encode_document(&SettingsRecord::empty());
        assert!(doc.values().all(|v| !v.is_null()));
        // Absent URIs are omitted outright.
        assert!(!doc.contains_key(columns::DEFAULT_INBOX));
        assert!(!doc.contains_key(columns::SETUP_INTENT_URI));
    }

    #[test]
    fn test_document_encode_folds_override() {
        let mut s = sample();
        s.set_auto_advance_override(AutoAdvance::Newer);
        let doc = encode_document(&s);
        assert_eq!(
            document::opt_i64(&doc, columns::AUTO_ADVANCE),
            Some(AutoAdvance::Newer.as_wire() as i64)
        );
        // Binary keeps the persisted value: the override is runtime-only.
        let decoded = decode_binary(&encode_binary(&s));
        assert_eq!(decoded.auto_advance, AutoAdvance::Older);
        assert!(decoded.auto_advance_override().is_none());
    }

    #[test]
    fn test_malformed_blob_yields_none() {
        assert_eq!(from_serialized("{not json"), None);
        assert_eq!(from_serialized("[1,2,3]"), None);
        assert!(from_json_str("[1,2,3]").is_err());
    }

    #[test]
    fn test_unknown_enum_wire_value_decodes_to_default() {
        let row = encode_row(&sample());
        // Cells are append-only; rebuild the row with one bad value.
        let mut bad = Row::new();
        for col in row.columns() {
            if col == columns::AUTO_ADVANCE {
                bad.push(col, 99i64);
            } else {
                bad.push(col, row.get(col).cloned().unwrap());
            }
        }
        let s = decode_row(&bad);
        assert_eq!(s.auto_advance, AutoAdvance::List);
    }
}
