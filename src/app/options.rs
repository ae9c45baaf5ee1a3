use crate::form::{CollectionKind, EditPolicy};

/// Per-session behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Trim surrounding whitespace from every submitted value.
    pub trim_values: bool,
    pub single_edit: bool,
    /// Collection used when a token does not name one.
    pub default_collection: CollectionKind,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            trim_values: true,
            single_edit: false,
            default_collection: CollectionKind::Fields,
        }
    }
}

impl SessionOptions {
    pub fn with_trim_values(mut self, enabled: bool) -> Self {
        self.trim_values = enabled;
        self
    }

    pub fn with_single_edit(mut self, enabled: bool) -> Self {
        self.single_edit = enabled;
        self
    }

    pub fn with_default_collection(mut self, collection: CollectionKind) -> Self {
        self.default_collection = collection;
        self
    }

    pub(crate) fn edit_policy(&self) -> EditPolicy {
        EditPolicy {
            single_edit: self.single_edit,
        }
    }
}
