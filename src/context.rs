//! Request-scoped values and the extra fields derived from them.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

/// Extra key/value pairs attached to a record.
///
/// Keys are kept sorted, so records always serialize their fields in
/// lexicographic key order regardless of insertion order.
pub type Fields = BTreeMap<String, Value>;

/// Callback that derives extra fields from a [`Context`] at log time.
pub type FieldFn = Arc<dyn Fn(&Context, &mut Fields) + Send + Sync>;

/// Values scoped to a unit of work, such as a request ID.
///
/// A context is cheap to clone and is never modified in place: `with_value`
/// returns a new context that shares the parent's values.
///
/// ```rust
/// use tierlog::Context;
///
/// let ctx = Context::new().with_value("req_id", "abc");
/// assert_eq!(ctx.value("req_id").and_then(|v| v.as_str()), Some("abc"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Arc<BTreeMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context carrying `key = value` in addition to this one's values.
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut values = (*self.values).clone();
        values.insert(key.into(), value.into());
        Self {
            values: Arc::new(values),
        }
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
