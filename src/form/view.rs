use indexmap::IndexMap;
use serde::Serialize;

use super::operation::CollectionKind;

/// Control rendered for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    Text,
    Select {
        options: IndexMap<String, String>,
        /// Token posted when the selection changes.
        #[serde(skip_serializing_if = "Option::is_none")]
        trigger: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputView {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub control: Control,
    pub value: String,
    pub required: bool,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InputView {
    pub fn text(name: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            control: Control::Text,
            value: value.into(),
            required: false,
            visible: true,
            description: None,
            error: None,
        }
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
        options: IndexMap<String, String>,
    ) -> Self {
        Self {
            control: Control::Select {
                options,
                trigger: None,
            },
            ..Self::text(name, label, value)
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn triggers(mut self, token: impl Into<String>) -> Self {
        if let Control::Select { trigger, .. } = &mut self.control {
            *trigger = Some(token.into());
        }
        self
    }

    pub fn with_errors(mut self, errors: &IndexMap<String, String>) -> Self {
        self.error = errors.get(&self.name).cloned();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    pub label: String,
    pub token: String,
}

impl ButtonView {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub title: String,
    pub inputs: Vec<InputView>,
    pub actions: Vec<ButtonView>,
}

impl FormView {
    pub fn input(&self, name: &str) -> Option<&InputView> {
        self.inputs.iter().find(|input| input.name == name)
    }
}

/// A committed entry, shown either read-only with an edit button or as an
/// inline form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowView {
    EditButton {
        index: usize,
        cells: Vec<String>,
        button: ButtonView,
    },
    InlineForm {
        index: usize,
        form: FormView,
    },
}

impl RowView {
    pub fn index(&self) -> usize {
        match self {
            RowView::EditButton { index, .. } | RowView::InlineForm { index, .. } => *index,
        }
    }

    pub fn is_inline_form(&self) -> bool {
        matches!(self, RowView::InlineForm { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionView {
    pub collection: CollectionKind,
    pub title: String,
    pub header: Vec<String>,
    /// The table is only shown once there is at least one entry.
    pub table_visible: bool,
    pub rows: Vec<RowView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_trigger: Option<ButtonView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_form: Option<FormView>,
    pub cancelled: bool,
}

impl CollectionView {
    /// Every token a client may post back for this collection.
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens = Vec::new();
        for row in &self.rows {
            match row {
                RowView::EditButton { button, .. } => tokens.push(button.token.as_str()),
                RowView::InlineForm { form, .. } => collect_form_tokens(form, &mut tokens),
            }
        }
        if let Some(trigger) = &self.add_trigger {
            tokens.push(trigger.token.as_str());
        }
        if let Some(form) = &self.add_form {
            collect_form_tokens(form, &mut tokens);
        }
        tokens
    }
}

fn collect_form_tokens<'a>(form: &'a FormView, tokens: &mut Vec<&'a str>) {
    for input in &form.inputs {
        if let Control::Select {
            trigger: Some(token),
            ..
        } = &input.control
        {
            tokens.push(token.as_str());
        }
    }
    tokens.extend(form.actions.iter().map(|action| action.token.as_str()));
}

/// Everything the host needs to re-render the dictionary widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryView {
    pub identifier: InputView,
    pub title: InputView,
    pub fields: CollectionView,
    pub indexes: CollectionView,
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

impl DictionaryView {
    pub fn collection(&self, kind: CollectionKind) -> &CollectionView {
        match kind {
            CollectionKind::Fields => &self.fields,
            CollectionKind::Indexes => &self.indexes,
        }
    }
}
