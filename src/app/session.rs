use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    domain::{Envelope, FieldDescriptor, IndexDescriptor},
    error::{DictionaryError, FieldIssue, Result},
    form::{
        CollectionEditor, CollectionKind, Descriptor, DictionaryView, EditorState, InputView,
        SubmittedValues, Transition,
    },
    io::envelope,
};

use super::{options::SessionOptions, status::StatusLine};

const IDENTIFIER_POINTER: &str = "/identifier";
const TITLE_POINTER: &str = "/title";

/// One round trip from the UI: the triggering token plus every posted value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Collection whose widget posted the token; `add_new_*` tokens override it.
    pub collection: Option<CollectionKind>,
    pub token: String,
    pub values: SubmittedValues,
}

impl Request {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn for_collection(collection: CollectionKind, token: impl Into<String>) -> Self {
        Self {
            collection: Some(collection),
            ..Self::new(token)
        }
    }

    pub fn with_values(mut self, values: SubmittedValues) -> Self {
        self.values = values;
        self
    }

    pub fn with_value(mut self, pointer: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(pointer, value);
        self
    }
}

/// Working state of one edit session.
///
/// The session is plain data: hosts keep it between round trips (see
/// [`crate::session_to_string`]) and nothing here is shared process-wide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionarySession {
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    fields: CollectionEditor<FieldDescriptor>,
    #[serde(default)]
    indexes: CollectionEditor<IndexDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    notices: Vec<String>,
    #[serde(skip)]
    options: SessionOptions,
    #[serde(skip)]
    status: StatusLine,
}

impl DictionarySession {
    pub fn from_envelope(envelope: Envelope) -> Self {
        let Envelope {
            identifier,
            title,
            data,
        } = envelope;
        Self {
            identifier,
            title,
            fields: CollectionEditor::new(data.fields),
            indexes: CollectionEditor::new(data.indexes),
            ..Self::default()
        }
    }

    /// Start a session from the stored value of the host record. A malformed
    /// value yields an empty dictionary and a notice instead of an error.
    pub fn load(raw: Option<&str>) -> Self {
        match envelope::deserialize(raw) {
            Ok(envelope) => Self::from_envelope(envelope),
            Err(err) => {
                let mut session = Self::default();
                session.notices.push(err.to_string());
                session
            }
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn set_options(&mut self, options: SessionOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &CollectionEditor<FieldDescriptor> {
        &self.fields
    }

    pub fn indexes(&self) -> &CollectionEditor<IndexDescriptor> {
        &self.indexes
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn status(&self) -> &str {
        self.status.message()
    }

    pub fn state(&self, collection: CollectionKind) -> EditorState {
        match collection {
            CollectionKind::Fields => self.fields.state(),
            CollectionKind::Indexes => self.indexes.state(),
        }
    }

    /// True while any add or inline-edit sub-form is open.
    pub fn has_open_form(&self) -> bool {
        self.fields.has_open_form() || self.indexes.has_open_form()
    }

    /// Apply one request and return the view model for the next render.
    /// Errors never escape: they become notices and the state stays as it was.
    pub fn apply(&mut self, request: &Request) -> DictionaryView {
        self.notices.clear();
        let (named, transition) = match Transition::parse(&request.token) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.report(&request.token, err);
                return self.view();
            }
        };
        let values = self.prepare(&request.values);
        self.absorb_header(&values);

        let collection = named
            .or(request.collection)
            .unwrap_or(self.options.default_collection);
        debug!(token = %request.token, %collection, "routing operation");
        let outcome = match collection {
            CollectionKind::Fields => Self::drive(
                &mut self.fields,
                &mut self.status,
                transition,
                &values,
                &self.options,
            ),
            CollectionKind::Indexes => Self::drive(
                &mut self.indexes,
                &mut self.status,
                transition,
                &values,
                &self.options,
            ),
        };

        if let Err(err) = outcome {
            self.report(&request.token, err);
        }
        self.view()
    }

    fn drive<D: Descriptor>(
        editor: &mut CollectionEditor<D>,
        status: &mut StatusLine,
        transition: Transition,
        values: &SubmittedValues,
        options: &SessionOptions,
    ) -> Result<()> {
        let change = editor.apply(transition, values, options.edit_policy())?;
        status.record(D::NOUN, change);
        Ok(())
    }

    fn report(&mut self, token: &str, err: DictionaryError) {
        match &err {
            DictionaryError::InvalidOperation { .. } => {
                warn!(%token, error = %err, "ignoring operation");
                self.status.set_raw("Unrecognized action ignored");
            }
            DictionaryError::ValidationFailure(issues) => {
                debug!(%token, issues = issues.len(), "transition rejected");
                self.status.issues_remaining(issues.len());
            }
            _ => self.status.set_raw("Action failed"),
        }
        self.notices.push(err.to_string());
    }

    /// Collapse the working state and produce the canonical envelope for the
    /// host to store. Identifier and title are only required when no
    /// sub-form was open.
    pub fn commit(&mut self, values: &SubmittedValues) -> Result<String> {
        self.notices.clear();
        let values = self.prepare(values);
        self.absorb_header(&values);
        let relaxed = self.has_open_form();

        let mut issues = self.fields.check_draft(&values);
        issues.extend(self.indexes.check_draft(&values));
        if !relaxed {
            if self.identifier.is_empty() {
                issues.push(FieldIssue::new(IDENTIFIER_POINTER, "Identifier field is required."));
            }
            if self.title.is_empty() {
                issues.push(FieldIssue::new(TITLE_POINTER, "Title field is required."));
            }
        }
        if !issues.is_empty() {
            let err = DictionaryError::ValidationFailure(issues);
            self.status.issues_remaining(err.issues().len());
            self.notices.push(err.to_string());
            return Err(err);
        }

        self.fields.collapse();
        self.indexes.collapse();
        let envelope = self.envelope();
        let raw = envelope::serialize(&envelope)?;
        info!(
            identifier = %envelope.identifier,
            fields = envelope.data.fields.len(),
            indexes = envelope.data.indexes.len(),
            "committed data dictionary"
        );
        self.status
            .committed(envelope.data.fields.len(), envelope.data.indexes.len());
        Ok(raw)
    }

    /// The committed state as an envelope; open forms are not included.
    pub fn envelope(&self) -> Envelope {
        Envelope::new(self.identifier.clone(), self.title.clone())
            .with_fields(self.fields.committed().to_vec())
            .with_indexes(self.indexes.committed().to_vec())
    }

    pub fn view(&self) -> DictionaryView {
        let relaxed = self.has_open_form();
        DictionaryView {
            identifier: InputView::text(IDENTIFIER_POINTER, "Identifier", &self.identifier)
                .required(!relaxed),
            title: InputView::text(TITLE_POINTER, "Title", &self.title).required(!relaxed),
            fields: self.fields.view(),
            indexes: self.indexes.view(),
            status: self.status.message().to_string(),
            notices: self.notices.clone(),
        }
    }

    /// Whether either editor changed since the last call; hosts use it to
    /// decide if the widget must be re-rendered.
    pub fn take_rebuild(&mut self) -> bool {
        let fields = self.fields.take_rebuild();
        let indexes = self.indexes.take_rebuild();
        fields || indexes
    }

    fn prepare(&self, values: &SubmittedValues) -> SubmittedValues {
        if self.options.trim_values {
            values.trimmed()
        } else {
            values.clone()
        }
    }

    fn absorb_header(&mut self, values: &SubmittedValues) {
        if let Some(identifier) = values.get(IDENTIFIER_POINTER) {
            self.identifier = identifier.to_string();
        }
        if let Some(title) = values.get(TITLE_POINTER) {
            self.title = title.to_string();
        }
    }
}
