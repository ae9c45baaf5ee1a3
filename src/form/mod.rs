mod descriptor;
mod editor;
mod operation;
mod validation;
mod values;
mod view;

pub use descriptor::Descriptor;
pub use editor::{Change, CollectionEditor, EditPolicy, EditorState, OpenEdit};
pub use operation::{Action, CollectionKind, FormScope, Operation, Transition};
pub use validation::{OTHER_FORMAT_REQUIRED, validate_field, validate_index};
pub use values::SubmittedValues;
pub use view::{ButtonView, CollectionView, Control, DictionaryView, FormView, InputView, RowView};
