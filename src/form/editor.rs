use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DictionaryError, FieldIssue, Result};

use super::{
    descriptor::Descriptor,
    operation::{FormScope, Transition},
    values::{SubmittedValues, classify_pointer},
    view::{ButtonView, CollectionView, FormView, RowView},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Adding,
    Editing,
}

/// Knobs that change how transitions treat open forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditPolicy {
    /// Close other inline edits when a new one is opened.
    pub single_edit: bool,
}

/// What a transition did, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    DraftOpened,
    DraftAdded(usize),
    DraftDiscarded,
    EditOpened(usize),
    EditClosed(usize),
    EntryUpdated(usize),
    EntryDeleted(usize),
    FormatRefreshed(FormScope),
    Unchanged,
}

/// An entry open for inline edit and the values its form currently shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenEdit<D> {
    pub index: usize,
    pub values: D,
}

/// Working state of one descriptor collection during an edit session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEditor<D> {
    committed: Vec<D>,
    #[serde(default)]
    editing: Vec<OpenEdit<D>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    draft: Option<D>,
    #[serde(default)]
    cancelled: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    errors: IndexMap<String, String>,
    #[serde(skip)]
    rebuild: bool,
}

impl<D> Default for CollectionEditor<D> {
    fn default() -> Self {
        Self {
            committed: Vec::new(),
            editing: Vec::new(),
            draft: None,
            cancelled: false,
            errors: IndexMap::new(),
            rebuild: false,
        }
    }
}

impl<D: Descriptor> CollectionEditor<D> {
    pub fn new(committed: Vec<D>) -> Self {
        Self {
            committed,
            ..Self::default()
        }
    }

    pub fn committed(&self) -> &[D] {
        &self.committed
    }

    pub fn draft(&self) -> Option<&D> {
        self.draft.as_ref()
    }

    pub fn open_indices(&self) -> Vec<usize> {
        self.editing.iter().map(|edit| edit.index).collect()
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.position(index).is_some()
    }

    /// Values currently shown in the inline form of `index`.
    pub fn snapshot(&self, index: usize) -> Option<&D> {
        self.position(index).map(|pos| &self.editing[pos].values)
    }

    pub fn errors(&self) -> &IndexMap<String, String> {
        &self.errors
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn state(&self) -> EditorState {
        if self.draft.is_some() {
            EditorState::Adding
        } else if !self.editing.is_empty() {
            EditorState::Editing
        } else {
            EditorState::Idle
        }
    }

    pub fn has_open_form(&self) -> bool {
        self.state() != EditorState::Idle
    }

    /// Returns and clears the rebuild marker set by every transition.
    pub fn take_rebuild(&mut self) -> bool {
        std::mem::take(&mut self.rebuild)
    }

    pub fn apply(
        &mut self,
        transition: Transition,
        values: &SubmittedValues,
        policy: EditPolicy,
    ) -> Result<Change> {
        self.rebuild = true;
        self.cancelled = false;
        let change = match transition {
            Transition::AddNew => self.open_draft(),
            Transition::Add => self.add_draft(values)?,
            Transition::Cancel => self.cancel_draft(),
            Transition::Edit(index) => self.open_edit(index, policy),
            Transition::Abort(index) => self.abort_edit(index),
            Transition::Update(index) => self.update_entry(index, values)?,
            Transition::Delete(index) => self.delete_entry(index),
            Transition::Format(scope) => self.refresh_format(scope, values)?,
        };
        debug!(collection = %D::COLLECTION, ?transition, ?change, "applied transition");
        Ok(change)
    }

    fn open_draft(&mut self) -> Change {
        if self.draft.is_some() {
            return Change::Unchanged;
        }
        self.clear_errors(FormScope::Draft);
        self.draft = Some(D::default());
        Change::DraftOpened
    }

    fn add_draft(&mut self, values: &SubmittedValues) -> Result<Change> {
        let Some(draft) = self.draft.clone() else {
            return Ok(Change::Unchanged);
        };
        let mut candidate = self.stage(&draft, values, FormScope::Draft)?;
        self.draft = Some(candidate.clone());
        self.check(&candidate, FormScope::Draft)?;
        candidate.normalize();
        self.committed.push(candidate);
        self.draft = None;
        Ok(Change::DraftAdded(self.committed.len() - 1))
    }

    fn cancel_draft(&mut self) -> Change {
        if self.draft.take().is_none() {
            return Change::Unchanged;
        }
        self.clear_errors(FormScope::Draft);
        self.cancelled = true;
        Change::DraftDiscarded
    }

    fn open_edit(&mut self, index: usize, policy: EditPolicy) -> Change {
        if index >= self.committed.len() || self.is_open(index) {
            return Change::Unchanged;
        }
        if policy.single_edit {
            for edit in std::mem::take(&mut self.editing) {
                self.clear_errors(FormScope::Entry(edit.index));
            }
        }
        let mut values = self.committed[index].clone();
        values.prepare_for_edit();
        let at = self.editing.partition_point(|edit| edit.index < index);
        self.editing.insert(at, OpenEdit { index, values });
        Change::EditOpened(index)
    }

    fn abort_edit(&mut self, index: usize) -> Change {
        let Some(pos) = self.position(index) else {
            return Change::Unchanged;
        };
        self.editing.remove(pos);
        self.clear_errors(FormScope::Entry(index));
        Change::EditClosed(index)
    }

    fn update_entry(&mut self, index: usize, values: &SubmittedValues) -> Result<Change> {
        let Some(pos) = self.position(index) else {
            return Ok(Change::Unchanged);
        };
        if index >= self.committed.len() {
            self.editing.remove(pos);
            return Ok(Change::Unchanged);
        }
        let scope = FormScope::Entry(index);
        let current = self.editing[pos].values.clone();
        let mut candidate = self.stage(&current, values, scope)?;
        self.editing[pos].values = candidate.clone();
        self.check(&candidate, scope)?;
        candidate.normalize();
        self.committed[index] = candidate;
        self.editing.remove(pos);
        Ok(Change::EntryUpdated(index))
    }

    fn delete_entry(&mut self, index: usize) -> Change {
        if index >= self.committed.len() {
            return Change::Unchanged;
        }
        self.committed.remove(index);
        self.editing.retain(|edit| edit.index != index);
        for edit in &mut self.editing {
            if edit.index > index {
                edit.index -= 1;
            }
        }
        self.errors = std::mem::take(&mut self.errors)
            .into_iter()
            .filter_map(|(pointer, message)| {
                let target =
                    classify_pointer(&pointer).map(|(scope, key)| (scope, key.to_string()));
                match target {
                    Some((FormScope::Entry(at), _)) if at == index => None,
                    Some((FormScope::Entry(at), key)) if at > index => {
                        Some((FormScope::Entry(at - 1).input(&key), message))
                    }
                    _ => Some((pointer, message)),
                }
            })
            .collect();
        Change::EntryDeleted(index)
    }

    fn refresh_format(&mut self, scope: FormScope, values: &SubmittedValues) -> Result<Change> {
        let current = match scope {
            FormScope::Draft => self.draft.clone(),
            FormScope::Entry(index) => self.snapshot(index).cloned(),
        };
        let Some(current) = current else {
            return Ok(Change::Unchanged);
        };
        let mut refreshed = self.stage(&current, values, scope)?;
        let changed = refreshed.refresh_format();
        self.errors.shift_remove(&scope.pointer());
        match scope {
            FormScope::Draft => self.draft = Some(refreshed),
            FormScope::Entry(index) => {
                if let Some(pos) = self.position(index) {
                    self.editing[pos].values = refreshed;
                }
            }
        }
        Ok(if changed {
            Change::FormatRefreshed(scope)
        } else {
            Change::Unchanged
        })
    }

    /// Merge the submitted draft values and report whether the draft would
    /// commit. A draft nobody touched is not an error.
    pub fn check_draft(&mut self, values: &SubmittedValues) -> Vec<FieldIssue> {
        let Some(draft) = self.draft.clone() else {
            return Vec::new();
        };
        let candidate = match self.stage(&draft, values, FormScope::Draft) {
            Ok(candidate) => candidate,
            Err(err) => return err.issues().to_vec(),
        };
        let untouched = candidate == D::default();
        self.draft = Some(candidate.clone());
        if untouched {
            return Vec::new();
        }
        match self.check(&candidate, FormScope::Draft) {
            Ok(()) => Vec::new(),
            Err(err) => err.issues().to_vec(),
        }
    }

    /// Fold the working state into the committed list: a valid, touched draft
    /// is appended and every inline edit is dropped.
    pub fn collapse(&mut self) {
        if let Some(mut draft) = self.draft.take()
            && draft != D::default()
            && draft.validate(FormScope::Draft).is_empty()
        {
            draft.normalize();
            self.committed.push(draft);
        }
        self.editing.clear();
        self.errors.clear();
        self.cancelled = false;
    }

    pub fn view(&self) -> CollectionView {
        let collection = D::COLLECTION;
        let rows = self
            .committed
            .iter()
            .enumerate()
            .map(|(index, entry)| match self.snapshot(index) {
                Some(values) => RowView::InlineForm {
                    index,
                    form: FormView {
                        title: format!("Edit {} #{}", D::NOUN, index + 1),
                        inputs: values.inputs(FormScope::Entry(index), &self.errors),
                        actions: vec![
                            ButtonView::new("Save", Transition::Update(index).token(collection)),
                            ButtonView::new("Cancel", Transition::Abort(index).token(collection)),
                            ButtonView::new("Delete", Transition::Delete(index).token(collection)),
                        ],
                    },
                },
                None => RowView::EditButton {
                    index,
                    cells: entry.cells(),
                    button: ButtonView::new("Edit", Transition::Edit(index).token(collection)),
                },
            })
            .collect();
        let add_form = self.draft.as_ref().map(|draft| FormView {
            title: format!("Add new {}", D::NOUN),
            inputs: draft.inputs(FormScope::Draft, &self.errors),
            actions: vec![
                ButtonView::new("Add", Transition::Add.token(collection)),
                ButtonView::new("Cancel", Transition::Cancel.token(collection)),
            ],
        });
        CollectionView {
            collection,
            title: D::TITLE.to_string(),
            header: D::header(),
            table_visible: !self.committed.is_empty(),
            rows,
            add_trigger: self.draft.is_none().then(|| {
                ButtonView::new(
                    format!("Add {}", D::NOUN),
                    Transition::AddNew.token(collection),
                )
            }),
            add_form,
            cancelled: self.cancelled,
        }
    }

    fn position(&self, index: usize) -> Option<usize> {
        self.editing.iter().position(|edit| edit.index == index)
    }

    fn stage(&mut self, base: &D, values: &SubmittedValues, scope: FormScope) -> Result<D> {
        base.merge(values.scope(scope), scope)
            .map_err(|issues| self.reject(scope, issues))
    }

    fn check(&mut self, candidate: &D, scope: FormScope) -> Result<()> {
        let issues = candidate.validate(scope);
        if issues.is_empty() {
            self.clear_errors(scope);
            Ok(())
        } else {
            Err(self.reject(scope, issues))
        }
    }

    fn reject(&mut self, scope: FormScope, issues: Vec<FieldIssue>) -> DictionaryError {
        self.clear_errors(scope);
        for issue in &issues {
            self.errors.insert(issue.pointer.clone(), issue.message.clone());
        }
        DictionaryError::ValidationFailure(issues)
    }

    fn clear_errors(&mut self, scope: FormScope) {
        let root = scope.pointer();
        let prefix = format!("{root}/");
        self.errors
            .retain(|pointer, _| *pointer != root && !pointer.starts_with(&prefix));
    }
}
