//! Three-format codec for [`AttachmentRecord`], plus the array-of-documents
//! batch form used for attachment collections and the pipe-joined one-line
//! summary used for logging and display.

use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::codec::binary::{RecordReader, RecordWriter};
use crate::codec::document::{self, Document};
use crate::codec::row::{Row, RowValue};
use crate::error::{RecordError, Result};
use crate::mime::MimeClassifier;
use crate::model::attachment::{AttachmentDestination, AttachmentRecord, AttachmentState};

/// Field identifiers shared verbatim by the row columns and the document
/// keys. The binary stream uses no names, only the order of [`encode_binary`].
pub mod columns {
    pub const PART_ID: &str = "part_id";
    pub const NAME: &str = "name";
    pub const SIZE: &str = "size";
    pub const URI: &str = "uri";
    pub const CONTENT_TYPE: &str = "content_type";
    pub const STATE: &str = "state";
    pub const DESTINATION: &str = "destination";
    pub const DOWNLOADED_SIZE: &str = "downloaded_size";
    pub const CONTENT_URI: &str = "content_uri";
    pub const THUMBNAIL_URI: &str = "thumbnail_uri";
    pub const PREVIEW_INTENT_URI: &str = "preview_intent_uri";
    pub const PROVIDER_DATA: &str = "provider_data";
    pub const SUPPORTS_DOWNLOAD_AGAIN: &str = "supports_download_again";
}

/// All attachment columns, in the binary field order.
pub const PROJECTION: &[&str] = &[
    columns::PART_ID,
    columns::NAME,
    columns::SIZE,
    columns::URI,
    columns::CONTENT_TYPE,
    columns::STATE,
    columns::DESTINATION,
    columns::DOWNLOADED_SIZE,
    columns::CONTENT_URI,
    columns::THUMBNAIL_URI,
    columns::PREVIEW_INTENT_URI,
    columns::PROVIDER_DATA,
    columns::SUPPORTS_DOWNLOAD_AGAIN,
];

/// Origin tag in the joined summary: the provider can serve the bytes.
const SERVER_ATTACHMENT: &str = "SERVER_ATTACHMENT";
/// Origin tag in the joined summary: a locally composed file.
const LOCAL_FILE: &str = "LOCAL_FILE";

// ── Binary ──────────────────────────────────────────────────────────

/// Encode to the positional binary stream. Field order is [`PROJECTION`].
pub fn encode_binary(record: &AttachmentRecord) -> Vec<u8> {
    let mut w = RecordWriter::new();
    w.write_str(&record.part_id);
    w.write_opt_str(record.name());
    w.write_i64(record.size);
    w.write_opt_uri(record.uri.as_ref());
    w.write_opt_str(record.declared_content_type());
    w.write_i32(record.state().as_wire());
    w.write_i32(record.destination.as_wire());
    w.write_i64(record.downloaded_size);
    w.write_opt_uri(record.content_uri.as_ref());
    w.write_opt_uri(record.thumbnail_uri.as_ref());
    w.write_opt_uri(record.preview_intent_uri.as_ref());
    w.write_opt_str(record.provider_data.as_deref());
    w.write_bool(record.supports_download_again);
    w.into_bytes()
}

/// Decode the positional binary stream written by [`encode_binary`].
///
/// # Panics
///
/// Panics on a truncated or corrupt stream; callers must not feed untrusted
/// bytes (see [`RecordReader`]).
pub fn decode_binary(data: &[u8]) -> AttachmentRecord {
    let mut r = RecordReader::new(data);
    let mut record = AttachmentRecord::new();
    record.part_id = r.read_string();
    record.set_name(r.read_opt_string());
    record.size = r.read_i64();
    record.uri = r.read_opt_uri();
    record.set_content_type(r.read_opt_string());
    record.set_state(state(r.read_i32().into()));
    record.destination = destination(r.read_i32().into());
    record.downloaded_size = r.read_i64();
    record.content_uri = r.read_opt_uri();
    record.thumbnail_uri = r.read_opt_uri();
    record.preview_intent_uri = r.read_opt_uri();
    record.provider_data = r.read_opt_string();
    record.supports_download_again = r.read_bool();
    record
}

// ── Row ─────────────────────────────────────────────────────────────

/// Encode to a tabular row, one column per field.
pub fn encode_row(record: &AttachmentRecord) -> Row {
    let mut row = Row::new();
    row.push(columns::PART_ID, record.part_id.as_str());
    row.push(columns::NAME, RowValue::opt_text(record.name()));
    row.push(columns::SIZE, record.size);
    row.push(columns::URI, RowValue::opt_uri(record.uri.as_ref()));
    row.push(
        columns::CONTENT_TYPE,
        RowValue::opt_text(record.declared_content_type()),
    );
    row.push(columns::STATE, record.state().as_wire());
    row.push(columns::DESTINATION, record.destination.as_wire());
    row.push(columns::DOWNLOADED_SIZE, record.downloaded_size);
    row.push(
        columns::CONTENT_URI,
        RowValue::opt_uri(record.content_uri.as_ref()),
    );
    row.push(
        columns::THUMBNAIL_URI,
        RowValue::opt_uri(record.thumbnail_uri.as_ref()),
    );
    row.push(
        columns::PREVIEW_INTENT_URI,
        RowValue::opt_uri(record.preview_intent_uri.as_ref()),
    );
    row.push(
        columns::PROVIDER_DATA,
        RowValue::opt_text(record.provider_data.as_deref()),
    );
    row.push(
        columns::SUPPORTS_DOWNLOAD_AGAIN,
        record.supports_download_again,
    );
    row
}

/// Decode a row holding every attachment column.
///
/// # Panics
///
/// Panics if a column is missing: the row schema is controlled by this
/// system, so absence is a programming error.
pub fn decode_row(row: &Row) -> AttachmentRecord {
    let mut record = AttachmentRecord::new();
    record.part_id = row.get_str(columns::PART_ID).to_string();
    record.set_name(row.get_opt_str(columns::NAME).map(str::to_string));
    record.size = row.get_i64(columns::SIZE);
    record.uri = row.get_opt_uri(columns::URI);
    record.set_content_type(row.get_opt_str(columns::CONTENT_TYPE).map(str::to_string));
    record.set_state(state(row.get_i64(columns::STATE)));
    record.destination = destination(row.get_i64(columns::DESTINATION));
    record.downloaded_size = row.get_i64(columns::DOWNLOADED_SIZE);
    record.content_uri = row.get_opt_uri(columns::CONTENT_URI);
    record.thumbnail_uri = row.get_opt_uri(columns::THUMBNAIL_URI);
    record.preview_intent_uri = row.get_opt_uri(columns::PREVIEW_INTENT_URI);
    record.provider_data = row.get_opt_str(columns::PROVIDER_DATA).map(str::to_string);
    record.supports_download_again = row.get_bool(columns::SUPPORTS_DOWNLOAD_AGAIN);
    record
}

// ── Document ────────────────────────────────────────────────────────

/// Encode to a JSON document, one key per field; absent optional fields are
/// omitted rather than written as `null`.
pub fn encode_document(record: &AttachmentRecord) -> Document {
    let mut doc = Document::new();
    doc.insert(
        columns::PART_ID.into(),
        Value::String(record.part_id.clone()),
    );
    document::put_opt_str(&mut doc, columns::NAME, record.name());
    doc.insert(columns::SIZE.into(), record.size.into());
    document::put_uri(&mut doc, columns::URI, record.uri.as_ref());
    document::put_opt_str(
        &mut doc,
        columns::CONTENT_TYPE,
        record.declared_content_type(),
    );
    doc.insert(columns::STATE.into(), record.state().as_wire().into());
    doc.insert(
        columns::DESTINATION.into(),
        record.destination.as_wire().into(),
    );
    doc.insert(
        columns::DOWNLOADED_SIZE.into(),
        record.downloaded_size.into(),
    );
    document::put_uri(&mut doc, columns::CONTENT_URI, record.content_uri.as_ref());
    document::put_uri(
        &mut doc,
        columns::THUMBNAIL_URI,
        record.thumbnail_uri.as_ref(),
    );
    document::put_uri(
        &mut doc,
        columns::PREVIEW_INTENT_URI,
        record.preview_intent_uri.as_ref(),
    );
    document::put_opt_str(
        &mut doc,
        columns::PROVIDER_DATA,
        record.provider_data.as_deref(),
    );
    doc.insert(
        columns::SUPPORTS_DOWNLOAD_AGAIN.into(),
        record.supports_download_again.into(),
    );
    doc
}

/// Decode a JSON document. Any key may be absent; missing fields take the
/// empty record's value, except `supports_download_again`, which defaults to
/// `true`: the field post-dates most persisted blobs, and every attachment
/// written before it existed did support re-downloading.
pub fn decode_document(doc: &Document) -> AttachmentRecord {
    let mut record = AttachmentRecord::new();
    record.part_id = document::opt_str(doc, columns::PART_ID)
        .unwrap_or_default()
        .to_string();
    record.set_name(document::opt_str(doc, columns::NAME).map(str::to_string));
    record.size = document::opt_i64(doc, columns::SIZE).unwrap_or(0);
    record.uri = document::opt_uri(doc, columns::URI);
    record.set_content_type(document::opt_str(doc, columns::CONTENT_TYPE).map(str::to_string));
    record.set_state(state(document::opt_i64(doc, columns::STATE).unwrap_or(0)));
    record.destination = destination(document::opt_i64(doc, columns::DESTINATION).unwrap_or(0));
    record.downloaded_size = document::opt_i64(doc, columns::DOWNLOADED_SIZE).unwrap_or(0);
    record.content_uri = document::opt_uri(doc, columns::CONTENT_URI);
    record.thumbnail_uri = document::opt_uri(doc, columns::THUMBNAIL_URI);
    record.preview_intent_uri = document::opt_uri(doc, columns::PREVIEW_INTENT_URI);
    record.provider_data = document::opt_str(doc, columns::PROVIDER_DATA).map(str::to_string);
    record.supports_download_again =
        document::opt_bool(doc, columns::SUPPORTS_DOWNLOAD_AGAIN).unwrap_or(true);
    record
}

/// Strict parse of one attachment document.
pub fn from_json_str(serialized: &str) -> Result<AttachmentRecord> {
    let value: Value = serde_json::from_str(serialized)?;
    match value {
        Value::Object(doc) => Ok(decode_document(&doc)),
        _ => Err(RecordError::UnexpectedShape { expected: "object" }),
    }
}

// ── Batch form ──────────────────────────────────────────────────────

/// Encode a sequence of attachments into one array-valued document,
/// preserving order.
pub fn encode_document_array(records: &[AttachmentRecord]) -> String {
    let array: Vec<Value> = records
        .iter()
        .map(|r| Value::Object(encode_document(r)))
        .collect();
    Value::Array(array).to_string()
}

/// Decode an array-valued document back into a sequence, preserving order.
///
/// Absent or empty input yields an empty sequence; so does malformed input
/// (logged), and malformed elements are skipped (logged) rather than
/// discarding the rest of the batch.
pub fn decode_document_array(serialized: Option<&str>) -> Vec<AttachmentRecord> {
    let serialized = match serialized {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Vec::new(),
    };
    let value: Value = match serde_json::from_str(serialized) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Could not decode attachment array document");
            return Vec::new();
        }
    };
    let array = match value {
        Value::Array(array) => array,
        other => {
            warn!(found = %kind(&other), "Attachment array document is not an array");
            return Vec::new();
        }
    };
    array
        .iter()
        .filter_map(|element| match element {
            Value::Object(doc) => Some(decode_document(doc)),
            other => {
                warn!(found = %kind(other), "Skipping non-object attachment element");
                None
            }
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Joined summary ──────────────────────────────────────────────────

/// One-line pipe-delimited summary for logging and display. Not
/// round-trippable:
///
/// ```text
/// partId|name|contentType|size|contentType|SERVER_ATTACHMENT|contentUri
/// ```
///
/// The name is stripped of pipe and newline characters before joining; the
/// origin tag is `SERVER_ATTACHMENT` iff a content URI is present, else
/// `LOCAL_FILE` with an empty trailing cell.
pub fn to_joined_string(record: &AttachmentRecord, classifier: &dyn MimeClassifier) -> String {
    let name = record
        .name()
        .map(|n| n.replace(['|', '\n'], ""))
        .unwrap_or_default();
    let content_type = record.content_type(classifier);
    let origin = if record.content_uri.is_some() {
        SERVER_ATTACHMENT
    } else {
        LOCAL_FILE
    };
    let content_uri = record
        .content_uri
        .as_ref()
        .map(Url::as_str)
        .unwrap_or_default();
    let size = record.size.to_string();
    [
        record.part_id.as_str(),
        name.as_str(),
        content_type,
        size.as_str(),
        content_type,
        origin,
        content_uri,
    ]
    .join("|")
}

// Unknown wire values decode to the empty record's value.
fn state(wire: i64) -> AttachmentState {
    AttachmentState::from_wire(wire).unwrap_or_default()
}

fn destination(wire: i64) -> AttachmentDestination {
    AttachmentDestination::from_wire(wire).unwrap_or_default()
}
