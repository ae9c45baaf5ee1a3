use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DictionaryError, Result};

/// Which of the two descriptor collections a request targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    #[default]
    Fields,
    Indexes,
}

impl CollectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Fields => "fields",
            CollectionKind::Indexes => "indexes",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fields" | "field" => Some(CollectionKind::Fields),
            "indexes" | "index" | "indices" => Some(CollectionKind::Indexes),
            _ => None,
        }
    }

    fn add_new_token(self) -> &'static str {
        match self {
            CollectionKind::Fields => ADD_NEW_FIELD,
            CollectionKind::Indexes => ADD_NEW_INDEX,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ADD_NEW_FIELD: &str = "add_new_field";
const ADD_NEW_INDEX: &str = "add_new_index";
const ADD_NEW: &str = "add_new";

/// The fixed action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Add,
    AddNew,
    Edit,
    Update,
    Abort,
    Delete,
    Cancel,
    Format,
}

impl Action {
    pub const VOCABULARY: [Action; 8] = [
        Action::Add,
        Action::AddNew,
        Action::Edit,
        Action::Update,
        Action::Abort,
        Action::Delete,
        Action::Cancel,
        Action::Format,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::AddNew => ADD_NEW,
            Action::Edit => "edit",
            Action::Update => "update",
            Action::Abort => "abort",
            Action::Delete => "delete",
            Action::Cancel => "cancel",
            Action::Format => "format",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::VOCABULARY
            .into_iter()
            .find(|action| action.as_str() == segment)
    }
}

/// A decoded operation token: `<action>[_<index>]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub action: Action,
    pub index: Option<usize>,
    /// Set only by the `add_new_field` / `add_new_index` literals.
    pub collection: Option<CollectionKind>,
}

impl Operation {
    pub fn decode(token: &str) -> Result<Self> {
        let token = token.trim();
        match token {
            "" => return Err(DictionaryError::invalid_operation(token, "empty token")),
            ADD_NEW_FIELD => return Ok(Self::literal(Action::AddNew, CollectionKind::Fields)),
            ADD_NEW_INDEX => return Ok(Self::literal(Action::AddNew, CollectionKind::Indexes)),
            ADD_NEW => return Ok(Self::bare(Action::AddNew, None)),
            "cancel" => return Ok(Self::bare(Action::Cancel, None)),
            _ => {}
        }

        let segments: Vec<&str> = token.split('_').collect();

        let action = Action::from_segment(segments[0])
            .ok_or_else(|| DictionaryError::invalid_operation(token, "unknown action"))?;
        match segments.as_slice() {
            [_] => Ok(Self::bare(action, None)),
            [_, raw] => Ok(Self::bare(action, Some(parse_index(token, raw)?))),
            _ => Err(DictionaryError::invalid_operation(
                token,
                "too many token segments",
            )),
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    fn bare(action: Action, index: Option<usize>) -> Self {
        Self {
            action,
            index,
            collection: None,
        }
    }

    fn literal(action: Action, collection: CollectionKind) -> Self {
        Self {
            action,
            index: None,
            collection: Some(collection),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.action, self.collection, self.index) {
            (Action::AddNew, Some(collection), _) => f.write_str(collection.add_new_token()),
            (action, _, Some(index)) => write!(f, "{}_{index}", action.as_str()),
            (action, _, None) => f.write_str(action.as_str()),
        }
    }
}

fn parse_index(token: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>()
        .map_err(|_| DictionaryError::invalid_operation(token, format!("`{raw}` is not an entry index")))
}

/// Where a `format` refresh applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormScope {
    Draft,
    Entry(usize),
}

impl FormScope {
    /// JSON pointer prefix of the inputs belonging to this form.
    pub fn pointer(self) -> String {
        match self {
            FormScope::Draft => "/draft".to_string(),
            FormScope::Entry(index) => format!("/data/{index}"),
        }
    }

    pub fn input(self, key: &str) -> String {
        format!("{}/{}", self.pointer(), key.trim_start_matches('/'))
    }
}

/// Typed editor transition, built once from a token at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    AddNew,
    Add,
    Cancel,
    Edit(usize),
    Update(usize),
    Abort(usize),
    Delete(usize),
    Format(FormScope),
}

impl Transition {
    /// Decode `token`, returning the collection it names, if any.
    pub fn parse(token: &str) -> Result<(Option<CollectionKind>, Transition)> {
        let operation = Operation::decode(token)?;
        let transition = Self::try_from_operation(token, operation)?;
        Ok((operation.collection, transition))
    }

    fn try_from_operation(token: &str, operation: Operation) -> Result<Self> {
        let needs_index = |index: Option<usize>| {
            index.ok_or_else(|| {
                DictionaryError::invalid_operation(token, "action requires an entry index")
            })
        };
        let no_index = |transition: Transition| match operation.index {
            None => Ok(transition),
            Some(_) => Err(DictionaryError::invalid_operation(
                token,
                "action does not take an entry index",
            )),
        };
        match operation.action {
            Action::AddNew => no_index(Transition::AddNew),
            Action::Add => no_index(Transition::Add),
            Action::Cancel => no_index(Transition::Cancel),
            Action::Edit => needs_index(operation.index).map(Transition::Edit),
            Action::Update => needs_index(operation.index).map(Transition::Update),
            Action::Abort => needs_index(operation.index).map(Transition::Abort),
            Action::Delete => needs_index(operation.index).map(Transition::Delete),
            Action::Format => Ok(Transition::Format(
                operation.index.map_or(FormScope::Draft, FormScope::Entry),
            )),
        }
    }

    /// Token that triggers this transition on `collection`.
    pub fn token(self, collection: CollectionKind) -> String {
        let operation = match self {
            Transition::AddNew => Operation::literal(Action::AddNew, collection),
            Transition::Add => Operation::bare(Action::Add, None),
            Transition::Cancel => Operation::bare(Action::Cancel, None),
            Transition::Edit(index) => Operation::bare(Action::Edit, Some(index)),
            Transition::Update(index) => Operation::bare(Action::Update, Some(index)),
            Transition::Abort(index) => Operation::bare(Action::Abort, Some(index)),
            Transition::Delete(index) => Operation::bare(Action::Delete, Some(index)),
            Transition::Format(FormScope::Draft) => Operation::bare(Action::Format, None),
            Transition::Format(FormScope::Entry(index)) => {
                Operation::bare(Action::Format, Some(index))
            }
        };
        operation.encode()
    }
}
