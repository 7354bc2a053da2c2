//! Integration tests for the record codecs, defaulting rules, lifecycle
//! invariants and the account registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use url::Url;

use mailrecord::codec::{attachment as attachment_codec, settings as settings_codec};
use mailrecord::mime::ExtensionClassifier;
use mailrecord::model::account::AccountEntry;
use mailrecord::model::attachment::{AttachmentDestination, AttachmentRecord, AttachmentState};
use mailrecord::model::settings::{
    AutoAdvance, ConversationViewMode, MessageTextSize, ReplyBehavior, SettingsRecord,
    SnapHeaders, SwipeAction, DEFAULT_MAX_ATTACHMENT_SIZE,
};
use mailrecord::registry::{columns, AccountRegistry, RegistryObserver};

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn sample_settings() -> SettingsRecord {
    let mut s = SettingsRecord::empty();
    s.signature = "Regards,\nAlice".into();
    s.auto_advance = AutoAdvance::Newer;
    s.message_text_size = MessageTextSize::Small;
    s.snap_headers = SnapHeaders::PortraitOnly;
    s.reply_behavior = ReplyBehavior::ReplyAll;
    s.conversation_view_mode = ConversationViewMode::Overview;
    s.hide_checkboxes = true;
    s.confirm_archive = true;
    s.force_reply_from_default = true;
    s.default_inbox = Some(url("content://mail/account/1/folder/inbox"));
    s.default_inbox_name = "Priority Inbox".into();
    s.setup_intent_uri = Some(url("content://mail/account/1/setup"));
    s.max_attachment_size = 25 * 1024 * 1024;
    s.swipe = SwipeAction::Disabled;
    s
}

fn sample_attachment() -> AttachmentRecord {
    let mut a = AttachmentRecord::new();
    a.part_id = "1.2".into();
    a.set_name(Some("minutes.docx".into()));
    a.size = 82_944;
    a.uri = Some(url("content://mail/message/5/attachment/2?acct=1"));
    a.set_content_type(Some(
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document".into(),
    ));
    a.set_state(AttachmentState::Saved);
    a.destination = AttachmentDestination::External;
    a.downloaded_size = 82_944;
    a.content_uri = Some(url("content://mail/content/5-2"));
    a.thumbnail_uri = Some(url("content://mail/thumb/5-2"));
    a.provider_data = Some("{\"server_id\":\"abc\"}".into());
    a.supports_download_again = true;
    a
}

// ─── Property 1: round-trips ────────────────────────────────────────

#[test]
fn settings_round_trip_all_formats() {
    let s = sample_settings();
    assert_eq!(
        settings_codec::decode_binary(&settings_codec::encode_binary(&s)),
        s
    );
    assert_eq!(settings_codec::decode_row(&settings_codec::encode_row(&s)), s);
    assert_eq!(
        settings_codec::decode_document(&settings_codec::encode_document(&s)),
        s
    );
}

#[test]
fn attachment_round_trip_all_formats() {
    let a = sample_attachment();
    assert_eq!(
        attachment_codec::decode_binary(&attachment_codec::encode_binary(&a)),
        a
    );
    assert_eq!(
        attachment_codec::decode_row(&attachment_codec::encode_row(&a)),
        a
    );
    assert_eq!(
        attachment_codec::decode_document(&attachment_codec::encode_document(&a)),
        a
    );
}

#[test]
fn attachment_batch_round_trip() {
    let mut second = sample_attachment();
    second.part_id = "1.3".into();
    second.set_name(Some("photo.jpg".into()));
    second.set_state(AttachmentState::NotSaved);
    let batch = vec![sample_attachment(), second];

    let serialized = attachment_codec::encode_document_array(&batch);
    let decoded = attachment_codec::decode_document_array(Some(&serialized));
    assert_eq!(decoded, batch);
    assert_eq!(decoded[0].part_id, "1.2");
    assert_eq!(decoded[1].part_id, "1.3");

    assert!(attachment_codec::decode_document_array(None).is_empty());
    assert!(attachment_codec::decode_document_array(Some("[]")).is_empty());
}

// ─── Property 2: document defaulting ────────────────────────────────

#[test]
fn settings_document_missing_keys_take_empty_record_values() {
    let decoded = settings_codec::from_serialized(r#"{"signature":"only this"}"#).unwrap();
    let empty = SettingsRecord::empty();
    assert_eq!(decoded.signature, "only this");
    assert_eq!(decoded.auto_advance, empty.auto_advance);
    assert_eq!(decoded.snap_headers, empty.snap_headers);
    assert_eq!(decoded.swipe, empty.swipe);
    assert_eq!(decoded.max_attachment_size, empty.max_attachment_size);
    assert_eq!(decoded.confirm_send, empty.confirm_send);
    assert!(decoded.default_inbox.is_none());
}

#[test]
fn attachment_document_defaults_supports_download_again_to_true() {
    let decoded = attachment_codec::from_json_str(r#"{"name":"a.txt","size":3}"#).unwrap();
    assert!(decoded.supports_download_again, "asymmetric default is true");
    assert_eq!(decoded.size, 3);
    assert_eq!(decoded.state(), AttachmentState::NotSaved);

    // An explicit false is preserved.
    let explicit =
        attachment_codec::from_json_str(r#"{"supports_download_again":false}"#).unwrap();
    assert!(!explicit.supports_download_again);
}

#[test]
fn malformed_documents_yield_absence_not_errors() {
    // Surface the codec's warn! output when running with --nocapture.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    assert!(settings_codec::from_serialized("###").is_none());
    assert!(settings_codec::from_serialized("42").is_none());
    assert!(attachment_codec::decode_document_array(Some("###")).is_empty());
}

// ─── Property 3: auto-advance override precedence ───────────────────

#[test]
fn auto_advance_override_precedence() {
    let mut s = SettingsRecord::empty();
    s.auto_advance = AutoAdvance::List;
    assert_eq!(s.effective_auto_advance(), AutoAdvance::List);

    s.set_auto_advance_override(AutoAdvance::Newer);
    assert_eq!(s.effective_auto_advance(), AutoAdvance::Newer);

    assert_eq!(SettingsRecord::auto_advance_of(Some(&s)), AutoAdvance::Newer);
    assert_eq!(SettingsRecord::auto_advance_of(None), AutoAdvance::List);
}

// ─── Property 4: max attachment size fallback ───────────────────────

#[test]
fn max_attachment_size_fallback() {
    let mut s = SettingsRecord::empty();
    s.max_attachment_size = 0;
    assert_eq!(s.effective_max_attachment_size(), 5_242_880);
    assert_eq!(s.effective_max_attachment_size(), DEFAULT_MAX_ATTACHMENT_SIZE);
    s.max_attachment_size = 1000;
    assert_eq!(s.effective_max_attachment_size(), 1000);
}

// ─── Property 5: state-reset invariant ──────────────────────────────

#[test]
fn state_reset_invariant() {
    for terminal in [AttachmentState::Failed, AttachmentState::NotSaved] {
        let mut a = sample_attachment();
        a.set_state(AttachmentState::Downloading);
        a.downloaded_size = 500;
        a.set_state(terminal);
        assert_eq!(a.downloaded_size, 0, "reset on {terminal:?}");
    }
    for benign in [
        AttachmentState::Downloading,
        AttachmentState::Paused,
        AttachmentState::Saved,
    ] {
        let mut a = sample_attachment();
        a.set_state(AttachmentState::Downloading);
        a.downloaded_size = 500;
        a.set_state(benign);
        assert_eq!(a.downloaded_size, 500, "unchanged on {benign:?}");
    }
}

// ─── Property 6: registry notify-exactly-once ───────────────────────

struct OrderedObserver {
    events: Mutex<Vec<usize>>,
    registry: Arc<AccountRegistry>,
}

impl RegistryObserver for OrderedObserver {
    fn on_registry_changed(&self) {
        // Record the size observed at each signal; re-entering query() here
        // must not deadlock.
        self.events.lock().unwrap().push(self.registry.len());
    }
}

#[test]
fn registry_notifies_exactly_once_per_mutation() {
    let registry = Arc::new(AccountRegistry::new());
    let observer = Arc::new(OrderedObserver {
        events: Mutex::new(Vec::new()),
        registry: Arc::clone(&registry),
    });
    registry.subscribe(observer.clone());

    let entry = AccountEntry::new(1, "work", url("content://mail/account/1"));
    registry.add(entry.clone());
    registry.remove(&entry.uri);

    let events = observer.events.lock().unwrap().clone();
    assert_eq!(events, vec![1, 0], "two signals, observed in order");
    assert!(registry.snapshot().is_empty());
}

#[test]
fn registry_notifies_even_when_contents_unchanged() {
    let registry = AccountRegistry::new();
    let count = Arc::new(CountingObserver::default());
    registry.subscribe(count.clone());

    let entry = AccountEntry::new(1, "work", url("content://mail/account/1"));
    registry.add(entry.clone());
    registry.add(entry.clone());
    registry.remove(&url("content://mail/account/404"));
    assert_eq!(count.0.load(Ordering::SeqCst), 3);
    assert_eq!(registry.len(), 1);
}

#[derive(Default)]
struct CountingObserver(AtomicUsize);

impl RegistryObserver for CountingObserver {
    fn on_registry_changed(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn registry_projection_query() {
    let registry = AccountRegistry::new();
    let mut entry = AccountEntry::new(3, "personal", url("content://mail/account/3"));
    entry.capabilities = 0x11;
    entry.settings_query_uri = Some(url("content://mail/account/3/settings"));
    registry.add(entry);

    let rows = registry.query(Some(&[columns::NAME, columns::SETTINGS_QUERY_URI]));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_str(columns::NAME), "personal");
    assert_eq!(
        rows[0]
            .get_opt_uri(columns::SETTINGS_QUERY_URI)
            .unwrap()
            .as_str(),
        "content://mail/account/3/settings"
    );
}

// ─── Property 7: equality contract ──────────────────────────────────

#[test]
fn settings_equality_contract() {
    let blob = settings_codec::to_serialized(&sample_settings());
    let a = settings_codec::from_serialized(&blob).unwrap();
    let mut b = settings_codec::from_serialized(&blob).unwrap();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));

    b.set_auto_advance_override(AutoAdvance::Older);
    assert_ne!(a, b, "override presence breaks equality");
    assert_ne!(hash_of(&a), hash_of(&b));
}

#[test]
fn attachment_equality_ignores_part_id() {
    let mut a = sample_attachment();
    let mut b = sample_attachment();
    b.part_id = "different".into();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));

    b.downloaded_size += 1;
    assert_ne!(a, b);
    a.downloaded_size += 1;
    assert_eq!(a, b);
}

fn hash_of<T: std::hash::Hash>(value: &T) -> u64 {
    use std::hash::Hasher;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// ─── Joined summary ─────────────────────────────────────────────────

#[test]
fn joined_summary_shape() {
    let classifier = ExtensionClassifier::default();
    let a = sample_attachment();
    let joined = attachment_codec::to_joined_string(&a, &classifier);
    let cells: Vec<&str> = joined.split('|').collect();
    assert_eq!(cells.len(), 7);
    assert_eq!(cells[0], "1.2");
    assert_eq!(cells[1], "minutes.docx");
    assert_eq!(cells[3], "82944");
    assert_eq!(cells[5], "SERVER_ATTACHMENT");
    assert_eq!(cells[6], "content://mail/content/5-2");

    let mut local = AttachmentRecord::new();
    local.set_name(Some("pipe|in|name.txt".into()));
    let joined = attachment_codec::to_joined_string(&local, &classifier);
    let cells: Vec<&str> = joined.split('|').collect();
    assert_eq!(cells[1], "pipeinname.txt");
    assert_eq!(cells[5], "LOCAL_FILE");
}
