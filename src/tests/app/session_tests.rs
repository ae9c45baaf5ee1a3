use serde_json::{Value, json};

use crate::{
    app::{DictionarySession, Request, SessionOptions},
    form::{CollectionKind, EditorState, SubmittedValues},
};

const STORED: &str = r#"{
    "identifier": "customers",
    "title": "Customers",
    "data": {
        "fields": [
            {"name": "id", "title": "ID", "type": "integer", "format": "default", "description": "Primary key"},
            {"name": "email", "title": "Email", "type": "string", "format": "email", "description": "Contact"}
        ],
        "indexes": [
            {"type": "index", "description": "id"}
        ]
    }
}"#;

fn stored_session() -> DictionarySession {
    DictionarySession::load(Some(STORED))
}

fn parse(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

#[test]
fn load_reads_both_collections() {
    let session = stored_session();
    assert_eq!(session.identifier(), "customers");
    assert_eq!(session.fields().committed().len(), 2);
    assert_eq!(session.indexes().committed().len(), 1);
    assert!(session.notices().is_empty());
}

#[test]
fn empty_or_null_value_starts_blank() {
    for raw in [None, Some(""), Some("  "), Some("null")] {
        let session = DictionarySession::load(raw);
        assert!(session.fields().committed().is_empty());
        assert!(session.notices().is_empty(), "{raw:?} should load silently");
        let view = session.view();
        assert!(!view.fields.table_visible);
        assert!(view.fields.add_trigger.is_some());
    }
}

#[test]
fn malformed_value_starts_blank_with_notice() {
    let session = DictionarySession::load(Some("{not json"));
    assert!(session.fields().committed().is_empty());
    assert_eq!(session.notices().len(), 1);
}

#[test]
fn edit_then_update_commits_new_name() {
    let mut session = stored_session();
    session.apply(&Request::new("edit_0"));
    assert_eq!(session.state(CollectionKind::Fields), EditorState::Editing);

    let view = session.apply(&Request::new("update_0").with_value("/data/0/name", "customer_id"));
    assert!(view.notices.is_empty());
    assert_eq!(session.fields().committed()[0].name, "customer_id");

    let raw = session.commit(&SubmittedValues::new()).unwrap();
    assert_eq!(parse(&raw)["data"]["fields"][0]["name"], "customer_id");
}

#[test]
fn delete_shifts_later_rows() {
    let mut session = stored_session();
    let view = session.apply(&Request::new("delete_0"));
    assert_eq!(view.fields.rows.len(), 1);
    assert_eq!(view.fields.rows[0].index(), 0);
    assert_eq!(session.fields().committed()[0].name, "email");
    assert!(view.fields.tokens().contains(&"edit_0"));
}

#[test]
fn bare_tokens_follow_the_posting_widget() {
    let mut session = stored_session();
    session.apply(&Request::for_collection(CollectionKind::Indexes, "edit_0"));
    assert_eq!(session.state(CollectionKind::Indexes), EditorState::Editing);
    assert_eq!(session.state(CollectionKind::Fields), EditorState::Idle);

    session.apply(&Request::new("edit_1"));
    assert!(session.fields().is_open(1), "default collection is fields");

    let mut indexes_first =
        stored_session().with_options(SessionOptions::default().with_default_collection(CollectionKind::Indexes));
    indexes_first.apply(&Request::new("add_new"));
    assert_eq!(indexes_first.state(CollectionKind::Indexes), EditorState::Adding);
}

#[test]
fn add_new_index_ignores_posting_widget() {
    let mut session = stored_session();
    session.apply(&Request::for_collection(CollectionKind::Fields, "add_new_index"));
    assert_eq!(session.state(CollectionKind::Indexes), EditorState::Adding);
    assert_eq!(session.state(CollectionKind::Fields), EditorState::Idle);
}

#[test]
fn add_new_then_cancel_marks_view() {
    let mut session = stored_session();
    let view = session.apply(&Request::new("add_new_field"));
    assert!(view.fields.add_form.is_some());
    assert!(view.fields.add_trigger.is_none());

    let view = session.apply(&Request::new("cancel"));
    assert!(view.fields.add_form.is_none());
    assert!(view.fields.cancelled);
    assert_eq!(session.fields().committed().len(), 2);
}

#[test]
fn invalid_token_leaves_state_untouched() {
    let mut session = stored_session();
    session.apply(&Request::new("edit_1"));
    let before = session.view();

    let after = session.apply(&Request::new("explode_1"));
    assert_eq!(after.notices.len(), 1);
    assert_eq!(after.fields, before.fields);
    assert_eq!(after.indexes, before.indexes);

    let after = session.apply(&Request::new("update_x"));
    assert_eq!(after.notices.len(), 1);
    assert!(session.fields().is_open(1));

    let after = session.apply(
        &Request::new("explode_1")
            .with_value("/identifier", "changed")
            .with_value("/title", "Changed"),
    );
    assert_eq!(after.notices.len(), 1);
    assert_eq!(session.identifier(), "customers");
    assert_eq!(session.title(), "Customers");
    assert_eq!(after.identifier.value, "customers");
}

#[test]
fn failed_add_surfaces_issue_and_keeps_draft() {
    let mut session = stored_session();
    session.apply(&Request::new("add_new_field"));
    let values = SubmittedValues::new()
        .with("/draft/name", "born")
        .with("/draft/title", "Born")
        .with("/draft/type", "date")
        .with("/draft/format", "other")
        .with("/draft/description", "Birth date");
    let view = session.apply(&Request::new("add").with_values(values));
    assert_eq!(view.notices.len(), 1);
    assert_eq!(session.state(CollectionKind::Fields), EditorState::Adding);

    let form = view.fields.add_form.unwrap();
    let other = form.input("/draft/format_other").unwrap();
    assert!(other.visible);
    assert!(other.error.is_some());
    assert_eq!(form.input("/draft/name").unwrap().value, "born");
}

#[test]
fn values_are_trimmed_unless_disabled() {
    let mut session = stored_session();
    session.apply(&Request::new("edit_0"));
    session.apply(&Request::new("update_0").with_value("/data/0/title", "  Key  "));
    assert_eq!(session.fields().committed()[0].title, "Key");

    let mut raw = stored_session().with_options(SessionOptions::default().with_trim_values(false));
    raw.apply(&Request::new("edit_0"));
    raw.apply(&Request::new("update_0").with_value("/data/0/title", " Key "));
    assert_eq!(raw.fields().committed()[0].title, " Key ");
}

#[test]
fn header_values_are_kept_on_every_round_trip() {
    let mut session = DictionarySession::default();
    session.apply(
        &Request::new("add_new_field")
            .with_value("/identifier", "orders")
            .with_value("/title", "Orders"),
    );
    assert_eq!(session.identifier(), "orders");
    assert_eq!(session.title(), "Orders");
}

#[test]
fn identifier_is_optional_while_a_form_is_open() {
    let mut session = DictionarySession::default();
    session.apply(&Request::new("add_new_index"));
    assert!(!session.view().identifier.required);

    let raw = session.commit(&SubmittedValues::new()).unwrap();
    let stored = parse(&raw);
    assert_eq!(stored["identifier"], "");
    assert_eq!(stored["data"]["indexes"], json!([]));
    assert!(!session.has_open_form());
}

#[test]
fn identifier_is_required_when_idle() {
    let mut session = DictionarySession::default();
    assert!(session.view().identifier.required);
    let err = session.commit(&SubmittedValues::new()).unwrap_err();
    let pointers: Vec<&str> = err.issues().iter().map(|i| i.pointer.as_str()).collect();
    assert_eq!(pointers, ["/identifier", "/title"]);
    assert_eq!(session.notices().len(), 1);

    let values = SubmittedValues::new()
        .with("/identifier", "orders")
        .with("/title", "Orders");
    assert!(session.commit(&values).is_ok());
}

#[test]
fn commit_appends_touched_draft_and_drops_open_edits() {
    let mut session = stored_session();
    session.apply(&Request::new("edit_1"));
    session.apply(&Request::new("add_new_field"));
    let values = SubmittedValues::new()
        .with("/data/1/name", "ignored")
        .with("/draft/name", "born")
        .with("/draft/title", "Born")
        .with("/draft/type", "date")
        .with("/draft/format", "%Y-%m-%d")
        .with("/draft/description", "Birth date");

    let stored = parse(&session.commit(&values).unwrap());
    let fields = stored["data"]["fields"].as_array().unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["id", "email", "born"]);
    assert_eq!(session.state(CollectionKind::Fields), EditorState::Idle);
}

#[test]
fn commit_rejects_invalid_touched_draft() {
    let mut session = stored_session();
    session.apply(&Request::new("add_new_field"));
    let values = SubmittedValues::new().with("/draft/name", "born");
    let err = session.commit(&values).unwrap_err();
    assert!(err.issues().iter().any(|issue| issue.pointer == "/draft/title"));
    assert_eq!(session.state(CollectionKind::Fields), EditorState::Adding);
}

#[test]
fn committed_output_has_canonical_shape() {
    let mut session = stored_session();
    let raw = session.commit(&SubmittedValues::new()).unwrap();
    let stored = parse(&raw);
    let keys: Vec<&String> = stored.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["identifier", "title", "data"]);
    let field_keys: Vec<&String> = stored["data"]["fields"][0].as_object().unwrap().keys().collect();
    assert_eq!(field_keys, ["name", "title", "type", "format", "description"]);
    assert_eq!(
        DictionarySession::load(Some(raw.as_str())).envelope(),
        stored_session().envelope()
    );
}

#[test]
fn status_line_tracks_last_change() {
    let mut session = stored_session();
    let view = session.apply(&Request::new("edit_1"));
    assert_eq!(view.status, "Editing field #2");
    let view = session.apply(&Request::new("abort_1"));
    assert_eq!(view.status, "Closed field #2 without saving");
}

#[test]
fn session_state_survives_serialization() {
    let mut session = stored_session();
    session.apply(&Request::new("edit_1"));
    session.apply(&Request::new("add_new_index"));
    let saved = serde_json::to_string(&session).unwrap();
    let mut restored: DictionarySession = serde_json::from_str(&saved).unwrap();
    assert!(restored.fields().is_open(1));
    assert_eq!(restored.state(CollectionKind::Indexes), EditorState::Adding);

    restored.apply(&Request::new("delete_0"));
    assert!(restored.fields().is_open(0));
}

#[test]
fn rebuild_is_flagged_after_apply() {
    let mut session = stored_session();
    assert!(!session.take_rebuild());
    session.apply(&Request::new("add_new_index"));
    assert!(session.take_rebuild());
    assert!(!session.take_rebuild());
}
