use crate::{
    domain::{FieldDescriptor, FieldType, IndexDescriptor, IndexType},
    error::DictionaryError,
    form::{
        Change, CollectionEditor, EditPolicy, EditorState, FormScope, OTHER_FORMAT_REQUIRED,
        SubmittedValues, Transition,
    },
};

fn mk_field(name: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, name.to_uppercase(), FieldType::String)
        .with_description(format!("{name} column"))
}

fn editor_with(names: &[&str]) -> CollectionEditor<FieldDescriptor> {
    CollectionEditor::new(names.iter().map(|name| mk_field(name)).collect())
}

fn apply(
    editor: &mut CollectionEditor<FieldDescriptor>,
    transition: Transition,
    values: &SubmittedValues,
) -> Result<Change, DictionaryError> {
    editor.apply(transition, values, EditPolicy::default())
}

fn names(editor: &CollectionEditor<FieldDescriptor>) -> Vec<&str> {
    editor.committed().iter().map(|f| f.name.as_str()).collect()
}

fn draft_values(name: &str) -> SubmittedValues {
    SubmittedValues::new()
        .with("/draft/name", name)
        .with("/draft/title", "Title")
        .with("/draft/type", "integer")
        .with("/draft/format", "default")
        .with("/draft/description", "Some description")
}

#[test]
fn add_new_then_cancel_leaves_committed_untouched() {
    let mut editor = editor_with(&["a"]);
    let none = SubmittedValues::new();
    assert_eq!(apply(&mut editor, Transition::AddNew, &none).unwrap(), Change::DraftOpened);
    assert_eq!(editor.state(), EditorState::Adding);
    assert_eq!(editor.draft(), Some(&FieldDescriptor::default()));

    assert_eq!(apply(&mut editor, Transition::Cancel, &none).unwrap(), Change::DraftDiscarded);
    assert_eq!(editor.state(), EditorState::Idle);
    assert!(editor.was_cancelled());
    assert_eq!(names(&editor), ["a"]);

    apply(&mut editor, Transition::Edit(0), &none).unwrap();
    assert!(!editor.was_cancelled(), "cancel flag only lasts one transition");
}

#[test]
fn add_appends_valid_draft() {
    let mut editor = editor_with(&["a"]);
    apply(&mut editor, Transition::AddNew, &SubmittedValues::new()).unwrap();
    let change = apply(&mut editor, Transition::Add, &draft_values("b")).unwrap();
    assert_eq!(change, Change::DraftAdded(1));
    assert_eq!(names(&editor), ["a", "b"]);
    assert_eq!(editor.committed()[1].kind, FieldType::Integer);
    assert_eq!(editor.state(), EditorState::Idle);
}

#[test]
fn add_without_open_draft_is_a_no_op() {
    let mut editor = editor_with(&[]);
    let change = apply(&mut editor, Transition::Add, &draft_values("b")).unwrap();
    assert_eq!(change, Change::Unchanged);
    assert!(editor.committed().is_empty());
}

#[test]
fn other_format_without_text_blocks_add_and_update() {
    let mut editor = editor_with(&["a"]);
    apply(&mut editor, Transition::AddNew, &SubmittedValues::new()).unwrap();
    let values = draft_values("b").with("/draft/format", "other");
    let err = apply(&mut editor, Transition::Add, &values).unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].pointer, "/draft/format_other");
    assert_eq!(editor.state(), EditorState::Adding, "draft stays open");
    assert_eq!(
        editor.errors().get("/draft/format_other").map(String::as_str),
        Some(OTHER_FORMAT_REQUIRED)
    );
    assert_eq!(editor.draft().unwrap().name, "b", "form keeps submitted values");

    apply(&mut editor, Transition::Edit(0), &SubmittedValues::new()).unwrap();
    let values = SubmittedValues::new()
        .with("/data/0/format", "other")
        .with("/data/0/format_other", "");
    let err = apply(&mut editor, Transition::Update(0), &values).unwrap_err();
    assert!(matches!(err, DictionaryError::ValidationFailure(_)));
    assert!(editor.is_open(0));
    assert_eq!(editor.committed()[0], mk_field("a"));
}

#[test]
fn other_format_is_resolved_on_commit() {
    let mut editor = editor_with(&[]);
    apply(&mut editor, Transition::AddNew, &SubmittedValues::new()).unwrap();
    let values = draft_values("b")
        .with("/draft/format", "other")
        .with("/draft/format_other", "0.00");
    apply(&mut editor, Transition::Add, &values).unwrap();
    let stored = &editor.committed()[0];
    assert_eq!(stored.format, "0.00");
    assert_eq!(stored.format_other, None);
}

#[test]
fn edit_then_update_replaces_entry() {
    let mut editor = editor_with(&["a"]);
    let change = apply(&mut editor, Transition::Edit(0), &SubmittedValues::new()).unwrap();
    assert_eq!(change, Change::EditOpened(0));
    assert_eq!(editor.state(), EditorState::Editing);
    assert_eq!(editor.snapshot(0), Some(&mk_field("a")));

    let values = SubmittedValues::new().with("/data/0/name", "b");
    let change = apply(&mut editor, Transition::Update(0), &values).unwrap();
    assert_eq!(change, Change::EntryUpdated(0));
    assert_eq!(names(&editor), ["b"]);
    assert_eq!(editor.state(), EditorState::Idle);
}

#[test]
fn update_ignores_values_of_other_entries() {
    let mut editor = editor_with(&["a", "b"]);
    apply(&mut editor, Transition::Edit(1), &SubmittedValues::new()).unwrap();
    let values = SubmittedValues::new()
        .with("/data/0/name", "wrong")
        .with("/data/1/title", "Bee");
    apply(&mut editor, Transition::Update(1), &values).unwrap();
    assert_eq!(names(&editor), ["a", "b"]);
    assert_eq!(editor.committed()[1].title, "Bee");
}

#[test]
fn update_of_closed_entry_is_a_no_op() {
    let mut editor = editor_with(&["a"]);
    let values = SubmittedValues::new().with("/data/0/name", "b");
    let change = apply(&mut editor, Transition::Update(0), &values).unwrap();
    assert_eq!(change, Change::Unchanged);
    assert_eq!(names(&editor), ["a"]);
}

#[test]
fn delete_redensifies_indices() {
    let mut editor = editor_with(&["f0", "f1", "f2", "f3"]);
    let none = SubmittedValues::new();
    apply(&mut editor, Transition::Edit(3), &none).unwrap();
    apply(&mut editor, Transition::Edit(1), &none).unwrap();
    let change = apply(&mut editor, Transition::Delete(1), &none).unwrap();
    assert_eq!(change, Change::EntryDeleted(1));
    assert_eq!(names(&editor), ["f0", "f2", "f3"]);
    assert_eq!(editor.open_indices(), vec![2], "open edit follows its entry");
    assert_eq!(editor.snapshot(2).unwrap().name, "f3");

    let view = editor.view();
    let indices: Vec<usize> = view.rows.iter().map(|row| row.index()).collect();
    assert_eq!(indices, [0, 1, 2]);
    assert!(view.tokens().iter().all(|token| !token.ends_with("_3")));
}

#[test]
fn resubmitted_delete_past_the_end_is_a_no_op() {
    let mut editor = editor_with(&["f0", "f1"]);
    let none = SubmittedValues::new();
    apply(&mut editor, Transition::Delete(1), &none).unwrap();
    let change = apply(&mut editor, Transition::Delete(1), &none).unwrap();
    assert_eq!(change, Change::Unchanged);
    assert_eq!(names(&editor), ["f0"]);
}

#[test]
fn delete_moves_pending_errors_with_their_entry() {
    let mut editor = editor_with(&["f0", "f1", "f2"]);
    let none = SubmittedValues::new();
    apply(&mut editor, Transition::Edit(0), &none).unwrap();
    apply(&mut editor, Transition::Edit(2), &none).unwrap();
    let bad = SubmittedValues::new()
        .with("/data/0/title", "")
        .with("/data/2/name", "");
    assert!(apply(&mut editor, Transition::Update(2), &bad).is_err());
    assert!(apply(&mut editor, Transition::Update(0), &bad).is_err());

    apply(&mut editor, Transition::Delete(0), &none).unwrap();
    assert!(editor.errors().contains_key("/data/1/name"));
    assert!(!editor.errors().keys().any(|pointer| pointer.starts_with("/data/0/")));
    assert!(!editor.errors().contains_key("/data/2/name"));
}

#[test]
fn abort_is_idempotent() {
    let mut editor = editor_with(&["a", "b"]);
    let none = SubmittedValues::new();
    apply(&mut editor, Transition::Edit(0), &none).unwrap();
    apply(&mut editor, Transition::Edit(1), &none).unwrap();

    assert_eq!(apply(&mut editor, Transition::Abort(0), &none).unwrap(), Change::EditClosed(0));
    let once = editor.clone();
    assert_eq!(apply(&mut editor, Transition::Abort(0), &none).unwrap(), Change::Unchanged);
    assert_eq!(editor.open_indices(), once.open_indices());
    assert_eq!(editor.committed(), once.committed());
    assert_eq!(editor.state(), EditorState::Editing);
}

#[test]
fn several_entries_may_be_open_at_once() {
    let mut editor = editor_with(&["a", "b", "c"]);
    let none = SubmittedValues::new();
    apply(&mut editor, Transition::Edit(2), &none).unwrap();
    apply(&mut editor, Transition::Edit(0), &none).unwrap();
    assert_eq!(editor.open_indices(), vec![0, 2]);

    let view = editor.view();
    let inline: Vec<usize> = view
        .rows
        .iter()
        .filter(|row| row.is_inline_form())
        .map(|row| row.index())
        .collect();
    assert_eq!(inline, [0, 2]);
    let tokens = view.tokens();
    for token in ["update_0", "abort_0", "update_2", "abort_2", "edit_1"] {
        assert!(tokens.contains(&token), "{token} missing");
    }
}

#[test]
fn single_edit_policy_closes_other_forms() {
    let mut editor = editor_with(&["a", "b"]);
    let none = SubmittedValues::new();
    let policy = EditPolicy { single_edit: true };
    editor.apply(Transition::Edit(0), &none, policy).unwrap();
    editor.apply(Transition::Edit(1), &none, policy).unwrap();
    assert_eq!(editor.open_indices(), vec![1]);
}

#[test]
fn edit_out_of_range_is_a_no_op() {
    let mut editor = editor_with(&["a"]);
    let change = apply(&mut editor, Transition::Edit(5), &SubmittedValues::new()).unwrap();
    assert_eq!(change, Change::Unchanged);
    assert_eq!(editor.state(), EditorState::Idle);
}

#[test]
fn format_refresh_follows_type_change_without_committing() {
    let mut editor = editor_with(&["a"]);
    apply(&mut editor, Transition::Edit(0), &SubmittedValues::new()).unwrap();
    let values = SubmittedValues::new()
        .with("/data/0/type", "date")
        .with("/data/0/format", "email");
    let change = apply(&mut editor, Transition::Format(FormScope::Entry(0)), &values).unwrap();
    assert_eq!(change, Change::FormatRefreshed(FormScope::Entry(0)));
    let snapshot = editor.snapshot(0).unwrap();
    assert_eq!(snapshot.kind, FieldType::Date);
    assert_eq!(snapshot.format, "default", "email is not a date format");
    assert_eq!(editor.committed()[0], mk_field("a"));

    let view = editor.view();
    let crate::form::RowView::InlineForm { form, .. } = &view.rows[0] else {
        panic!("entry 0 should render inline");
    };
    let format = form.input("/data/0/format").unwrap();
    match &format.control {
        crate::form::Control::Select { options, .. } => assert!(options.contains_key("%Y-%m-%d")),
        crate::form::Control::Text => panic!("format should be a select"),
    }
}

#[test]
fn format_refresh_without_open_form_is_a_no_op() {
    let mut editor = editor_with(&["a"]);
    let none = SubmittedValues::new();
    assert_eq!(
        apply(&mut editor, Transition::Format(FormScope::Draft), &none).unwrap(),
        Change::Unchanged
    );
    assert_eq!(
        apply(&mut editor, Transition::Format(FormScope::Entry(0)), &none).unwrap(),
        Change::Unchanged
    );
}

#[test]
fn custom_format_round_trips_through_inline_edit() {
    let stored = FieldDescriptor::new("born", "Born", FieldType::Date)
        .with_format("%d.%m.%Y")
        .with_description("Birth date");
    let mut editor = CollectionEditor::new(vec![stored.clone()]);
    let none = SubmittedValues::new();
    apply(&mut editor, Transition::Edit(0), &none).unwrap();
    let snapshot = editor.snapshot(0).unwrap();
    assert_eq!(snapshot.format, "other");
    assert_eq!(snapshot.format_other.as_deref(), Some("%d.%m.%Y"));

    apply(&mut editor, Transition::Update(0), &none).unwrap();
    assert_eq!(editor.committed()[0], stored);
}

#[test]
fn index_collection_shares_the_protocol() {
    let mut editor = CollectionEditor::new(vec![IndexDescriptor::new(IndexType::Index, "pk")]);
    let none = SubmittedValues::new();
    editor.apply(Transition::AddNew, &none, EditPolicy::default()).unwrap();
    let values = SubmittedValues::new()
        .with("/draft/type", "fulltext")
        .with("/draft/description", "search");
    editor.apply(Transition::Add, &values, EditPolicy::default()).unwrap();
    assert_eq!(editor.committed().len(), 2);
    assert_eq!(editor.committed()[1].kind, IndexType::Fulltext);

    editor.apply(Transition::Edit(1), &none, EditPolicy::default()).unwrap();
    let change = editor
        .apply(Transition::Format(FormScope::Entry(1)), &none, EditPolicy::default())
        .unwrap();
    assert_eq!(change, Change::Unchanged, "indexes have no format");

    editor.apply(Transition::Delete(0), &none, EditPolicy::default()).unwrap();
    assert_eq!(editor.open_indices(), vec![0]);
}

#[test]
fn every_transition_requests_a_rebuild() {
    let mut editor = editor_with(&["a"]);
    assert!(!editor.take_rebuild());
    apply(&mut editor, Transition::Abort(0), &SubmittedValues::new()).unwrap();
    assert!(editor.take_rebuild());
    assert!(!editor.take_rebuild());
}

#[test]
fn indices_stay_dense_under_mixed_sequences() {
    let mut editor = editor_with(&["a", "b", "c", "d", "e", "f"]);
    let none = SubmittedValues::new();
    let mut seed = 17usize;
    for _ in 0..40 {
        seed = (seed * 31 + 7) % 101;
        let target = seed % 7;
        let transition = match seed % 4 {
            0 => Transition::Delete(target),
            1 => Transition::Edit(target),
            2 => Transition::Abort(target),
            _ => Transition::AddNew,
        };
        apply(&mut editor, transition, &none).unwrap();
        if editor.draft().is_some() {
            apply(&mut editor, Transition::Add, &draft_values("z")).unwrap();
        }
        let len = editor.committed().len();
        assert!(editor.open_indices().iter().all(|index| *index < len));
        let rows: Vec<usize> = editor.view().rows.iter().map(|row| row.index()).collect();
        assert_eq!(rows, (0..len).collect::<Vec<_>>());
    }
}

#[test]
fn format_refresh_rejects_unknown_type() {
    let mut editor = editor_with(&["a", "b"]);
    apply(&mut editor, Transition::Edit(1), &SubmittedValues::new()).unwrap();
    let values = SubmittedValues::new().with("/data/1/type", "Boolean");
    let err = apply(&mut editor, Transition::Format(FormScope::Entry(1)), &values).unwrap_err();
    assert!(matches!(err, DictionaryError::ValidationFailure(_)));
    assert_eq!(err.issues()[0].pointer, "/data/1");
    assert!(editor.errors().contains_key("/data/1"));
    assert_eq!(editor.snapshot(1), Some(&mk_field("b")), "snapshot is untouched");

    let values = SubmittedValues::new().with("/data/1/type", "date");
    apply(&mut editor, Transition::Format(FormScope::Entry(1)), &values).unwrap();
    assert!(!editor.errors().contains_key("/data/1"));
}

#[test]
fn submitted_type_names_ignore_case() {
    let mut editor = editor_with(&["a"]);
    apply(&mut editor, Transition::Edit(0), &SubmittedValues::new()).unwrap();
    let values = SubmittedValues::new().with("/data/0/type", "Integer");
    apply(&mut editor, Transition::Update(0), &values).unwrap();
    assert_eq!(editor.committed()[0].kind, FieldType::Integer);
}
