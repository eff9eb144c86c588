use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Caller-supplied key/value data describing the current request.
///
/// The backing map is key-sorted, so [`RequestContext::fingerprint`] is a
/// canonical serialization: two contexts with the same entries always
/// fingerprint identically regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RequestContext(Map<String, Value>);

impl RequestContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::InvalidContext(format!(
                "context must be a JSON object, got {other}"
            ))),
        }
    }

    /// Inserts an entry, replacing any existing value under the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Builder-style insert for fixture construction.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns whether the context carries no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a value by dotted path, e.g. `"user.department"`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Canonical serialization used for cache keying.
    ///
    /// The full rendering is kept rather than a digest so distinct contexts
    /// can never collide on a cache entry.
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}
