//! Option values, ordered option maps, and the option classifier
//!
//! Options arrive as loosely-spelled key/value bags (`cloudName`,
//! `cloud_name` and `cloud-name` all mean the same thing). This module
//! provides:
//!
//! - [`canonical`] - key canonicalization onto lower-camel-case
//! - [`classify`] - splitting a bag into recognized and pass-through options
//!
//! Values are stored behind an [`Arc`], so copying a map between scopes only
//! bumps reference counts and never walks the value itself.

pub mod canonical;
pub mod classify;

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

pub use canonical::{canonicalize, is_canonical};
pub use classify::{classify, Classified, ScopeFlags, SCOPE_ONLY_KEYS};

/// Options whose canonical key is part of the vocabulary.
pub type RecognizedOptionSet = OptionMap;

/// Options the engine does not interpret, keyed by their original spelling.
pub type PassthroughOptionSet = OptionMap;

/// A shared, immutable option value.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionValue(Arc<Value>);

impl OptionValue {
    /// Wrap a JSON value.
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the underlying JSON value.
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &OptionValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Render a scalar value as plain text.
    ///
    /// Strings are returned as-is, whole numbers render without a fraction
    /// and booleans become `true`/`false`. Null, arrays and objects yield `None`.
    pub fn to_plain_string(&self) -> Option<String> {
        scalar_to_string(&self.0)
    }

    /// Loose truthiness used for boolean flags such as `secure` or `responsive`.
    ///
    /// `true`, non-zero numbers, and any non-empty string other than
    /// `"false"`/`"0"` are truthy. Arrays and objects are truthy.
    pub fn is_truthy(&self) -> bool {
        match self.0.as_ref() {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Value::String(s) => !(s.is_empty() || s == "false" || s == "0"),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_string(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Whole floats render without a fraction so `300.0` and `300` agree.
fn number_to_string(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

impl Deref for OptionValue {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_ref() {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::new(Value::String(value.to_string()))
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::new(Value::String(value))
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::new(Value::Bool(value))
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        Self::new(Value::from(value))
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::new(Value::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::new(Value::from(value))
    }
}

/// Insertion-ordered string-keyed map of option values.
///
/// Re-inserting an existing key replaces its value but keeps its original
/// position. Lookups are linear; option maps hold a handful of entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    pub(crate) const EMPTY: OptionMap = OptionMap { entries: Vec::new() };

    /// Create an empty map.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Overlay every entry of `other` onto this map; `other` wins on conflicts.
    pub fn overlay(&mut self, other: &OptionMap) {
        for (key, value) in &other.entries {
            self.insert(key.clone(), value.clone());
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (k, v) in iter {
            map.insert(k, v.into());
        }
        map
    }
}

impl Serialize for OptionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Raw option input: keys in any spelling, in the order they were supplied.
///
/// Unlike [`OptionMap`], a bag may contain the same key (or several spellings
/// of one option) more than once; the classifier decides what wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionBag {
    entries: Vec<(String, OptionValue)>,
}

impl OptionBag {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Append an entry.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.push(key, value);
        self
    }

    /// Build a bag from a JSON object, keeping the object's key order.
    ///
    /// Returns `None` if `value` is not an object.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(object.iter().map(|(k, v)| (k.clone(), OptionValue::new(v.clone()))).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl<K: Into<String>, V: Into<OptionValue>> Extend<(K, V)> for OptionBag {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}
