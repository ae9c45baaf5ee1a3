use std::sync::LazyLock;

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::operation::FormScope;

static INPUT_POINTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:(draft)|data/(\d+))/([A-Za-z_]+)$").expect("input pointer pattern")
});

/// Raw values posted by the UI, keyed by input pointer
/// (`/identifier`, `/draft/name`, `/data/2/format`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedValues(IndexMap<String, String>);

impl SubmittedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pointer: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(pointer, value);
        self
    }

    pub fn insert(&mut self, pointer: impl Into<String>, value: impl Into<String>) {
        self.0.insert(pointer.into(), value.into());
    }

    pub fn get(&self, pointer: &str) -> Option<&str> {
        self.0.get(pointer).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse an `application/x-www-form-urlencoded` body.
    pub fn from_urlencoded(body: &str) -> Self {
        let mut values = Self::new();
        for pair in body.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            values.insert(decode_component(key), decode_component(value));
        }
        values
    }

    pub fn trimmed(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.trim().to_string()))
                .collect(),
        )
    }

    /// Values addressed to one form, keyed by descriptor property.
    pub fn scope(&self, scope: FormScope) -> Map<String, Value> {
        self.0
            .iter()
            .filter_map(|(pointer, value)| {
                let (target, key) = classify_pointer(pointer)?;
                (target == scope).then(|| (key.to_string(), Value::String(value.clone())))
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubmittedValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Split an input pointer into its form and the descriptor key.
pub(crate) fn classify_pointer(pointer: &str) -> Option<(FormScope, &str)> {
    let captures = INPUT_POINTER.captures(pointer)?;
    let key = captures.get(3)?.as_str();
    if captures.get(1).is_some() {
        return Some((FormScope::Draft, key));
    }
    let index = captures.get(2)?.as_str().parse().ok()?;
    Some((FormScope::Entry(index), key))
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
