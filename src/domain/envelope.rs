use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::descriptor::{FieldDescriptor, IndexDescriptor};

/// The single JSON document a host record stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Envelope {
    pub identifier: String,
    pub title: String,
    pub data: DictionaryData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DictionaryData {
    pub fields: Vec<FieldDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
}

impl Envelope {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            data: DictionaryData::default(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.data.fields = fields;
        self
    }

    pub fn with_indexes(mut self, indexes: Vec<IndexDescriptor>) -> Self {
        self.data.indexes = indexes;
        self
    }

    /// Copy with every field's `format_other` folded into `format`.
    pub fn normalized(&self) -> Self {
        let mut envelope = self.clone();
        envelope
            .data
            .fields
            .iter_mut()
            .for_each(FieldDescriptor::normalize);
        envelope
    }
}
