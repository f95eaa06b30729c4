use std::fmt;

/// A decoded JSON string. Stored as raw bytes rather than `String` because
/// `\uXXXX` escapes are substituted as raw bytes, not decoded Unicode
/// scalar values (see [`crate::parser`]), so the byte sequence is not
/// guaranteed to be valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonString(pub Vec<u8>);

impl JsonString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl From<&str> for JsonString {
    fn from(s: &str) -> Self {
        JsonString(s.as_bytes().to_vec())
    }
}

impl From<String> for JsonString {
    fn from(s: String) -> Self {
        JsonString(s.into_bytes())
    }
}

impl PartialEq<str> for JsonString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for JsonString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for JsonString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

/// A JSON number: either a signed 64-bit integer or a 64-bit float,
/// matching which form the token on the wire actually took.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Lossily coerces to `i64`, truncating a float.
    pub fn as_int(&self) -> i64 {
        match *self {
            Number::Int(i) => i,
            Number::Float(f) => f as i64,
        }
    }

    /// Lossily coerces to `f64`.
    pub fn as_float(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Returns `Some` only if the number was tagged integer on the wire.
    pub fn strict_int(&self) -> Option<i64> {
        match *self {
            Number::Int(i) => Some(i),
            Number::Float(_) => None,
        }
    }

    /// Returns `Some` only if the number was tagged float on the wire.
    pub fn strict_float(&self) -> Option<f64> {
        match *self {
            Number::Float(f) => Some(f),
            Number::Int(_) => None,
        }
    }
}

/// An ordered `key -> value` map preserving first-seen key position; a
/// repeated key overwrites the value in place rather than appending,
/// matching the "last wins, insertion-order" duplicate-key rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonObject {
    entries: Vec<(JsonString, Value)>,
}

impl JsonObject {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Inserts `key -> value`, overwriting in place if `key` already exists.
    pub fn insert(&mut self, key: JsonString, value: Value) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| *k == *key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JsonString, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed JSON value. Note there is no boolean variant: the decoder this
/// is ported from never recognized bare `true`/`false`/`null` literals
/// (`parse_value` only dispatches on `{`, `[`, `"`, a leading `0`, or a
/// digit/`-`), so neither does this one. `null` is likewise only reachable
/// as a field being absent, never as a parsed token.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(JsonString),
    Number(Number),
    Array(Vec<Value>),
    Object(JsonObject),
}

impl Value {
    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&JsonString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}
