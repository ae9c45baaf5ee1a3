use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, de};

use super::formats::{DEFAULT_FORMAT, OTHER_FORMAT, formats};

/// Data type of a dictionary field.
///
/// Names are matched case-insensitively both by [`FieldType::parse`] and when
/// deserializing submitted or stored values; they always serialize lowercase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Date,
    Integer,
    Number,
}

impl FieldType {
    pub const ALL: [FieldType; 4] = [
        FieldType::String,
        FieldType::Date,
        FieldType::Integer,
        FieldType::Number,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Date => "Date",
            FieldType::Integer => "Integer",
            FieldType::Number => "Number",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| {
            <D::Error as de::Error>::custom(format!(
                "unknown field type `{raw}`, expected string, date, integer or number"
            ))
        })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a dictionary index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    #[default]
    Index,
    Fulltext,
}

impl IndexType {
    pub const ALL: [IndexType; 2] = [IndexType::Index, IndexType::Fulltext];

    pub fn as_str(self) -> &'static str {
        match self {
            IndexType::Index => "index",
            IndexType::Fulltext => "fulltext",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl<'de> Deserialize<'de> for IndexType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| {
            <D::Error as de::Error>::custom(format!(
                "unknown index type `{raw}`, expected index or fulltext"
            ))
        })
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column definition of the dictionary.
///
/// `format_other` only carries a value while the entry is being edited with
/// `format == "other"`; [`FieldDescriptor::normalize`] folds it into `format`
/// before the descriptor is committed, so stored descriptors never emit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FieldDescriptor {
    /// Machine name of the column.
    #[schemars(length(min = 1))]
    pub name: String,
    /// Human readable title.
    #[schemars(length(min = 1))]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    /// Format of the values, see the per-type format table.
    #[schemars(length(min = 1))]
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_other: Option<String>,
    /// Information about the field data.
    #[schemars(length(min = 1))]
    pub description: String,
}

impl Default for FieldDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            kind: FieldType::default(),
            format: DEFAULT_FORMAT.to_string(),
            format_other: None,
            description: String::new(),
        }
    }
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, title: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_format_other(mut self, value: impl Into<String>) -> Self {
        self.format = OTHER_FORMAT.to_string();
        self.format_other = Some(value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn uses_other_format(&self) -> bool {
        self.format == OTHER_FORMAT
    }

    /// The format that ends up in storage.
    pub fn effective_format(&self) -> &str {
        if self.uses_other_format() {
            self.format_other.as_deref().unwrap_or_default()
        } else {
            &self.format
        }
    }

    pub fn normalize(&mut self) {
        if self.uses_other_format() {
            self.format = self.format_other.take().unwrap_or_default();
        } else {
            self.format_other = None;
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Split a stored format that is not part of the type's option table into
    /// `other` + free text, so the inline form shows it in the companion input.
    pub fn expand_custom_format(&mut self) {
        if self.format.is_empty() || self.uses_other_format() {
            return;
        }
        if !formats(self.kind).contains(&self.format) {
            let custom = std::mem::replace(&mut self.format, OTHER_FORMAT.to_string());
            self.format_other = Some(custom);
        }
    }

    /// Keep the selected format only if the current type still offers it.
    pub fn reconcile_format(&mut self) {
        if !formats(self.kind).contains(&self.format) {
            self.format = DEFAULT_FORMAT.to_string();
            self.format_other = None;
        }
    }
}

/// One index definition of the dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IndexDescriptor {
    #[serde(rename = "type")]
    pub kind: IndexType,
    /// Description of index purpose or functionality.
    pub description: String,
}

impl IndexDescriptor {
    pub fn new(kind: IndexType, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}
