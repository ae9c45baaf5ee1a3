#![deny(rust_2018_idioms)]
//! Incremental editing of JSON data dictionaries.
//!
//! A dictionary is an [`Envelope`] holding an identifier, a title and two
//! ordered descriptor collections (fields and indexes). A host keeps one
//! [`DictionarySession`] per open form, feeds it the [`Request`] produced by
//! every UI interaction and renders the returned [`DictionaryView`]. When the
//! form is saved, [`DictionarySession::commit`] yields the canonical JSON the
//! host stores.

mod app;
mod domain;
mod error;
mod form;
mod io;
mod presentation;


pub use app::{DictionarySession, READY_STATUS, Request, SessionOptions, StatusLine};
pub use domain::{
    DictionaryData, Envelope, FieldDescriptor, FieldType, FormatRule, IndexDescriptor, IndexType,
    OTHER_FORMAT, formats,
};
pub use error::{DictionaryError, FieldIssue, Result};
pub use form::{
    Action, ButtonView, Change, CollectionEditor, CollectionKind, CollectionView, Control,
    Descriptor, DictionaryView, EditPolicy, EditorState, FormScope, FormView, InputView, OpenEdit,
    Operation, OTHER_FORMAT_REQUIRED, RowView, SubmittedValues, Transition, validate_field,
    validate_index,
};
pub use io::{
    DocumentFormat, OutputDestination, OutputOptions, deserialize, emit, load_session,
    parse_session_str, save_session, serialize, serialize_pretty, session_to_string,
};
pub use presentation::render_text;

pub mod prelude {
    pub use super::{
        CollectionKind, DictionarySession, DictionaryView, Envelope, Request, SessionOptions,
        SubmittedValues,
    };
}
