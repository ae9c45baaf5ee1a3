use indexmap::IndexMap;
use serde::Serialize;

use super::descriptor::FieldType;

pub const DEFAULT_FORMAT: &str = "default";
pub const OTHER_FORMAT: &str = "other";

const GENERAL_DESCRIPTION: &str = "The format of the data in this field. Supported formats depend on the specified field type:";

const STRING_FORMATS: &[(&str, &str, &str)] = &[
    ("default", "default", "Any valid string."),
    ("email", "email", "A valid email address."),
    ("uri", "uri", "A valid URI."),
    ("binary", "binary", "A base64 encoded string representing binary data."),
    ("uuid", "uuid", "A string that is a uuid."),
    ("other", "other", "A custom format."),
];

const DATE_FORMATS: &[(&str, &str, &str)] = &[
    ("default", "default", "An ISO8601 format string of YYYY-MM-DD."),
    ("any", "any", "Any parsable representation of a date."),
    ("%Y-%m-%d", "%Y-%m-%d", "Four digit year, month and day separated by dashes."),
    (
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "Date followed by a 24 hour time with seconds.",
    ),
    ("%m/%d/%Y", "%m/%d/%Y", "Month, day and four digit year separated by slashes."),
    ("other", "other", "A custom strptime pattern such as %d.%m.%Y."),
];

const INTEGER_FORMATS: &[(&str, &str, &str)] = &[
    ("default", "default", "A whole number without a fractional part."),
    ("other", "other", "A custom format."),
];

const NUMBER_FORMATS: &[(&str, &str, &str)] = &[
    ("default", "default", "A number, optionally with a fractional part."),
    ("other", "other", "A custom format."),
];

/// Allowed `format` choices for one field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatRule {
    pub description: String,
    pub options: IndexMap<String, String>,
}

impl FormatRule {
    pub fn contains(&self, format: &str) -> bool {
        self.options.contains_key(format)
    }

    pub fn requires_free_text(format: &str) -> bool {
        format == OTHER_FORMAT
    }
}

/// Look up the closed format table for `kind`.
pub fn formats(kind: FieldType) -> FormatRule {
    let table = match kind {
        FieldType::String => STRING_FORMATS,
        FieldType::Date => DATE_FORMATS,
        FieldType::Integer => INTEGER_FORMATS,
        FieldType::Number => NUMBER_FORMATS,
    };
    let details = table
        .iter()
        .map(|(value, _, help)| format!("{value}: {help}"))
        .collect::<Vec<_>>()
        .join("\n");
    // Date formats are described on their own, without the general preamble.
    let description = match kind {
        FieldType::Date => format!("Supported date formats:\n{details}"),
        _ => format!("{GENERAL_DESCRIPTION}\n{details}"),
    };
    FormatRule {
        description,
        options: table
            .iter()
            .map(|(value, label, _)| (value.to_string(), label.to_string()))
            .collect(),
    }
}
