use crate::router::Handler;

use std::fmt;
use std::sync::Arc;

/// A captured or default value.
///
/// Placeholders always capture strings. Defaults may also carry the handler
/// a route dispatches to, stored under the `cb` key by [`RouteMut::to`](crate::RouteMut::to).
#[derive(Clone)]
pub enum Value {
    Str(String),
    Handler(Arc<dyn Handler>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Handler(_) => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Arc<dyn Handler>> {
        match self {
            Value::Handler(h) => Some(h),
            Value::Str(_) => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Handler(a), Value::Handler(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Arc<dyn Handler>> for Value {
    fn from(h: Arc<dyn Handler>) -> Self {
        Value::Handler(h)
    }
}

/// An ordered list of named values, as captured by a pattern or merged into
/// the stash of a dispatch.
///
/// Inserting an existing key replaces its value in place, so the order is
/// the order in which keys were first seen.
///
/// ```rust
/// use routeplan::Captures;
///
/// let mut captures = Captures::new();
/// captures.insert("controller", "users");
/// captures.insert("action", "index");
/// captures.insert("controller", "widgets");
///
/// assert_eq!(captures.str("controller"), Some("widgets"));
/// assert_eq!(captures.keys().collect::<Vec<_>>(), ["controller", "action"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Captures(Vec<(String, Value)>);

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the value for `key` if it is a string.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();

        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(i).1)
    }

    /// Copies every entry of `other` into `self`, overwriting shared keys.
    pub fn merge(&mut self, other: &Captures) {
        for (k, v) in other.iter() {
            self.insert(k, v.clone());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> std::iter::FromIterator<(K, V)> for Captures
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut captures = Captures::new();
        for (k, v) in iter {
            captures.insert(k, v);
        }
        captures
    }
}
