use crate::form::{Change, FormScope};

#[derive(Debug, Clone)]
pub struct StatusLine {
    message: String,
}

pub const READY_STATUS: &str = "Ready.";

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
        }
    }
}

impl StatusLine {
    pub fn set_raw(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
    }

    pub fn record(&mut self, noun: &str, change: Change) {
        self.message = match change {
            Change::DraftOpened => format!("Adding a new {noun}"),
            Change::DraftAdded(index) => format!("Added {noun} #{}", index + 1),
            Change::DraftDiscarded => format!("Discarded the new {noun}"),
            Change::EditOpened(index) => format!("Editing {noun} #{}", index + 1),
            Change::EditClosed(index) => format!("Closed {noun} #{} without saving", index + 1),
            Change::EntryUpdated(index) => format!("Updated {noun} #{}", index + 1),
            Change::EntryDeleted(index) => format!("Deleted {noun} #{}", index + 1),
            Change::FormatRefreshed(FormScope::Draft) => {
                format!("Format options refreshed for the new {noun}")
            }
            Change::FormatRefreshed(FormScope::Entry(index)) => {
                format!("Format options refreshed for {noun} #{}", index + 1)
            }
            Change::Unchanged => "Nothing to do".to_string(),
        };
    }

    pub fn issues_remaining(&mut self, count: usize) {
        self.message = format!("{count} issue(s) remaining");
    }

    pub fn committed(&mut self, fields: usize, indexes: usize) {
        self.message = format!("Saved {fields} field(s) and {indexes} index(es)");
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
