//! Typed request-input validation.
//!
//! Request bodies and query strings are normalised into a [`RawInput`], then
//! read field by field through a [`FieldReader`]. Each model input type lists
//! its fields in order; the first failing field stops validation. Fields that
//! were supplied but never read are reported as unknown by
//! [`FieldReader::finish`].

use serde_json::{Map, Value};
use thiserror::Error;

/// Input validation failure, rendered as a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' was required and not present")]
    Missing { field: &'static str },

    #[error("Field '{field}' with value '{value}' failed filtering, message '{reason}'")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Field '{field}' with value '{value}' is unknown")]
    Unknown { field: String, value: String },

    #[error("Malformed request input: {0}")]
    Malformed(String),
}

/// Raw key/value input as received from a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    fields: Map<String, Value>,
}

impl RawInput {
    /// Build from a decoded JSON document. Only objects (or `null`) are accepted.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Ok(Self::default()),
            other => Err(ValidationError::Malformed(format!(
                "expected a JSON object, got '{}'",
                display(&other)
            ))),
        }
    }

    /// Build from decoded form or query pairs.
    ///
    /// A key written as `key[]` or `key[n]` appends to a list under `key`;
    /// a repeated plain key keeps its last value.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut fields = Map::new();

        for (key, value) in pairs {
            match list_key(&key) {
                Some(base) => {
                    let entry = fields
                        .entry(base.to_string())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    match entry {
                        Value::Array(items) => items.push(Value::String(value)),
                        other => *other = Value::Array(vec![Value::String(value)]),
                    }
                }
                None => {
                    fields.insert(key, Value::String(value));
                }
            }
        }

        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// `photoUrls[]` and `photoUrls[3]` both name the list `photoUrls`.
fn list_key(key: &str) -> Option<&str> {
    let open = key.find('[')?;
    if open == 0 || !key.ends_with(']') {
        return None;
    }
    Some(&key[..open])
}

/// Reads declared fields out of a [`RawInput`], remembering which ones were
/// consumed.
pub struct FieldReader<'a> {
    input: &'a RawInput,
    declared: Vec<&'static str>,
}

impl<'a> FieldReader<'a> {
    pub fn new(input: &'a RawInput) -> Self {
        Self {
            input,
            declared: Vec::new(),
        }
    }

    fn take(&mut self, field: &'static str) -> Option<&'a Value> {
        self.declared.push(field);
        self.input.get(field)
    }

    /// A non-empty string that must be present.
    pub fn required_string(&mut self, field: &'static str) -> Result<String, ValidationError> {
        let value = self
            .take(field)
            .ok_or(ValidationError::Missing { field })?;
        check(field, value, string_value)
    }

    /// A non-empty string that may be absent but not null.
    pub fn string(&mut self, field: &'static str) -> Result<Option<String>, ValidationError> {
        self.take(field)
            .map(|value| check(field, value, string_value))
            .transpose()
    }

    /// A non-empty string that may be absent or explicitly null.
    ///
    /// The outer `Option` is presence, the inner one is nullness.
    pub fn nullable_string(
        &mut self,
        field: &'static str,
    ) -> Result<Option<Option<String>>, ValidationError> {
        self.take(field)
            .map(|value| check(field, value, nullable(string_value)))
            .transpose()
    }

    /// A non-negative integer that may be absent or explicitly null.
    pub fn nullable_uint(
        &mut self,
        field: &'static str,
    ) -> Result<Option<Option<u32>>, ValidationError> {
        self.take(field)
            .map(|value| check(field, value, nullable(uint_value)))
            .transpose()
    }

    /// A list of non-empty strings, defaulting to an empty list when absent.
    pub fn string_list_or_default(
        &mut self,
        field: &'static str,
    ) -> Result<Vec<String>, ValidationError> {
        match self.take(field) {
            Some(value) => check(field, value, string_list_value),
            None => Ok(Vec::new()),
        }
    }

    /// Fails on the first supplied field that was never read.
    pub fn finish(self) -> Result<(), ValidationError> {
        let unknown = self
            .input
            .fields
            .iter()
            .find(|(key, _)| !self.declared.iter().any(|d| *d == key.as_str()));

        match unknown {
            Some((field, value)) => Err(ValidationError::Unknown {
                field: field.clone(),
                value: display(value),
            }),
            None => Ok(()),
        }
    }
}

fn check<T>(
    field: &'static str,
    value: &Value,
    filter: impl Fn(&Value) -> Result<T, String>,
) -> Result<T, ValidationError> {
    filter(value).map_err(|reason| ValidationError::Invalid {
        field,
        value: display(value),
        reason,
    })
}

fn nullable<T>(
    filter: impl Fn(&Value) -> Result<T, String>,
) -> impl Fn(&Value) -> Result<Option<T>, String> {
    move |value| match value {
        Value::Null => Ok(None),
        other => filter(other).map(Some),
    }
}

fn string_value(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) if s.is_empty() => Err("Value '' is shorter than 1 character".to_string()),
        Value::String(s) => Ok(s.clone()),
        other => Err(format!("Value '{}' is not a string", display(other))),
    }
}

fn uint_value(value: &Value) -> Result<u32, String> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse::<u64>().ok()
        }
        _ => None,
    };

    let Some(n) = parsed else {
        return Err(format!(
            "Value '{}' is not a non-negative integer",
            display(value)
        ));
    };

    u32::try_from(n).map_err(|_| format!("Value '{}' is greater than {}", n, u32::MAX))
}

fn string_list_value(value: &Value) -> Result<Vec<String>, String> {
    let Value::Array(items) = value else {
        return Err(format!("Value '{}' is not an array", display(value)));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| string_value(item).map_err(|reason| format!("Item {}: {}", index, reason)))
        .collect()
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
