pub(crate) mod envelope;
mod format;
mod input;
mod output;

pub use envelope::{deserialize, serialize, serialize_pretty};
pub use format::DocumentFormat;
pub use input::{load_session, parse_session_str};
pub use output::{OutputDestination, OutputOptions, emit, save_session, session_to_string};
