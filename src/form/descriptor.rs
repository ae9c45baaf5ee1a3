use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    domain::{FieldDescriptor, FieldType, FormatRule, IndexDescriptor, IndexType, formats},
    error::FieldIssue,
};

use super::{
    operation::{CollectionKind, FormScope, Transition},
    validation::{validate_field, validate_index},
    view::InputView,
};

/// An entry type a [`CollectionEditor`](super::CollectionEditor) can manage.
pub trait Descriptor:
    Clone + fmt::Debug + Default + PartialEq + Serialize + DeserializeOwned
{
    const COLLECTION: CollectionKind;
    /// Heading of the collection's fieldset.
    const TITLE: &'static str;
    /// Singular noun used in labels and status messages.
    const NOUN: &'static str;

    fn header() -> Vec<String>;

    /// Read-only table cells.
    fn cells(&self) -> Vec<String>;

    /// Inputs of the add or inline-edit form rendered for `scope`.
    fn inputs(&self, scope: FormScope, errors: &IndexMap<String, String>) -> Vec<InputView>;

    fn validate(&self, scope: FormScope) -> Vec<FieldIssue>;

    /// Fold edit-only state into the stored representation.
    fn normalize(&mut self) {}

    /// Adjust a committed entry before it is shown in an inline form.
    fn prepare_for_edit(&mut self) {}

    /// Recompute type-dependent choices; `false` when the entry has none.
    fn refresh_format(&mut self) -> bool {
        false
    }

    /// Overlay submitted values on `self`.
    fn merge(&self, submitted: Map<String, Value>, scope: FormScope) -> Result<Self, Vec<FieldIssue>> {
        if submitted.is_empty() {
            return Ok(self.clone());
        }
        let mut base = serde_json::to_value(self)
            .map_err(|err| vec![FieldIssue::new(scope.pointer(), err.to_string())])?;
        if let Value::Object(map) = &mut base {
            map.extend(submitted);
        }
        serde_json::from_value(base)
            .map_err(|err| vec![FieldIssue::new(scope.pointer(), err.to_string())])
    }
}

fn select_options<I>(items: I) -> IndexMap<String, String>
where
    I: IntoIterator<Item = (&'static str, &'static str)>,
{
    items
        .into_iter()
        .map(|(value, label)| (value.to_string(), label.to_string()))
        .collect()
}

impl Descriptor for FieldDescriptor {
    const COLLECTION: CollectionKind = CollectionKind::Fields;
    const TITLE: &'static str = "Data Dictionary Fields";
    const NOUN: &'static str = "field";

    fn header() -> Vec<String> {
        vec!["NAME".into(), "TITLE".into(), "DETAILS".into()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.title.clone(),
            format!(
                "Type: {}\nFormat: {}\nDescription: {}",
                self.kind,
                self.effective_format(),
                self.description
            ),
        ]
    }

    fn inputs(&self, scope: FormScope, errors: &IndexMap<String, String>) -> Vec<InputView> {
        let FormatRule {
            description: format_help,
            options: format_options,
        } = formats(self.kind);
        let type_options = select_options(FieldType::ALL.map(|kind| (kind.as_str(), kind.label())));
        vec![
            InputView::text(scope.input("name"), "Name", &self.name)
                .required(true)
                .described("Machine name of the column."),
            InputView::text(scope.input("title"), "Title", &self.title).required(true),
            InputView::select(scope.input("type"), "Data type", self.kind.as_str(), type_options)
                .required(true)
                .triggers(Transition::Format(scope).token(Self::COLLECTION)),
            InputView::select(scope.input("format"), "Format", &self.format, format_options)
                .required(true)
                .described(format_help),
            InputView::text(
                scope.input("format_other"),
                "Other format",
                self.format_other.clone().unwrap_or_default(),
            )
            .visible(FormatRule::requires_free_text(&self.format))
            .described("A supported format"),
            InputView::text(scope.input("description"), "Description", &self.description)
                .required(true)
                .described("Information about the field data."),
        ]
        .into_iter()
        .map(|input| input.with_errors(errors))
        .collect()
    }

    fn validate(&self, scope: FormScope) -> Vec<FieldIssue> {
        validate_field(self, scope)
    }

    fn normalize(&mut self) {
        FieldDescriptor::normalize(self);
    }

    fn prepare_for_edit(&mut self) {
        self.expand_custom_format();
    }

    fn refresh_format(&mut self) -> bool {
        self.reconcile_format();
        true
    }
}

impl Descriptor for IndexDescriptor {
    const COLLECTION: CollectionKind = CollectionKind::Indexes;
    const TITLE: &'static str = "Dictionary Indexes";
    const NOUN: &'static str = "index";

    fn header() -> Vec<String> {
        vec!["TYPE".into(), "DESCRIPTION".into()]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.kind.to_string(), self.description.clone()]
    }

    fn inputs(&self, scope: FormScope, errors: &IndexMap<String, String>) -> Vec<InputView> {
        let type_options = select_options(IndexType::ALL.map(|kind| (kind.as_str(), kind.as_str())));
        vec![
            InputView::select(scope.input("type"), "Type", self.kind.as_str(), type_options)
                .required(true)
                .described("Index type."),
            InputView::text(scope.input("description"), "Description", &self.description)
                .described("Description of index purpose or functionality."),
        ]
        .into_iter()
        .map(|input| input.with_errors(errors))
        .collect()
    }

    fn validate(&self, scope: FormScope) -> Vec<FieldIssue> {
        validate_index(self, scope)
    }
}
