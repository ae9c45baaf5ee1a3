mod descriptor;
mod envelope;
mod formats;

pub use descriptor::{FieldDescriptor, FieldType, IndexDescriptor, IndexType};
pub use envelope::{DictionaryData, Envelope};
pub use formats::{FormatRule, OTHER_FORMAT, formats};
