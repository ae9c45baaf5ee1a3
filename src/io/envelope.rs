use tracing::warn;

use crate::{
    domain::Envelope,
    error::{DictionaryError, Result},
};

/// Read a stored envelope. Absent, blank and `null` values are an empty
/// dictionary rather than an error.
pub fn deserialize(raw: Option<&str>) -> Result<Envelope> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(Envelope::default());
    };
    serde_json::from_str::<Option<Envelope>>(raw)
        .map(Option::unwrap_or_default)
        .map_err(|err| {
            warn!(error = %err, "stored data dictionary is not valid JSON");
            DictionaryError::MalformedEnvelope(err)
        })
}

/// Canonical compact JSON: `identifier, title, data.fields, data.indexes`,
/// with every field's format already resolved.
pub fn serialize(envelope: &Envelope) -> Result<String> {
    serde_json::to_string(&envelope.normalized()).map_err(DictionaryError::EncodeEnvelope)
}

pub fn serialize_pretty(envelope: &Envelope) -> Result<String> {
    serde_json::to_string_pretty(&envelope.normalized()).map_err(DictionaryError::EncodeEnvelope)
}
