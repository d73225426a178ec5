use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Error payload returned by the prediction service. Depending on the
/// endpoint the text arrives under `error` or under `msg`. A field holding
/// anything other than a string is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub msg: Option<String>,
}

fn text_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

impl ErrorBody {
    /// Best available message: `error` first, then `msg`.
    pub fn message(&self) -> Option<&str> {
        let present = |message: &&str| !message.trim().is_empty();
        self.error
            .as_deref()
            .filter(present)
            .or_else(|| self.msg.as_deref().filter(present))
    }

    /// Decodes a raw response body. Returns `None` only when the body is not
    /// JSON; JSON that is not an object yields an empty body.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(bytes).ok()?;
        Some(serde_json::from_value(value).unwrap_or_default())
    }
}
