mod options;
mod session;
mod status;

pub use options::SessionOptions;
pub use session::{DictionarySession, Request};
pub use status::{READY_STATUS, StatusLine};
