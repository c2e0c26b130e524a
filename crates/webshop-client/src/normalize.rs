//! Normalization of raw response envelopes into a uniform [`Payload`].
//!
//! The remote service wraps every result under `"<procedure>Result"` but does
//! not agree with itself on the shape underneath: multi-result calls usually
//! carry a collection wrapper, single-result calls usually do not, and
//! mutations answer with a bare boolean. Classification here looks only at the
//! shape of the value, never at the procedure name. Callers know whether they
//! invoked a singular or a collection procedure and pick the matching accessor
//! on [`NormalizedResult`].

use serde_json::Value;

use crate::error::ShopError;

/// A flat record: remote field name to scalar or nested value.
pub type Record = serde_json::Map<String, Value>;

/// Key under which collection envelopes list their members.
const ITEM_KEY: &str = "item";

/// The classified payload of a single remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Bool(bool),
    Record(Record),
    /// Records in the order the remote collection listed them.
    Sequence(Vec<Record>),
}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Payload::Bool(_) => "boolean",
            Payload::Record(_) => "record",
            Payload::Sequence(_) => "sequence",
        }
    }
}

/// A [`Payload`] together with the procedure that produced it, so accessor
/// failures can name the call.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    procedure: String,
    payload: Payload,
}

impl NormalizedResult {
    #[must_use]
    pub fn new(procedure: &str, payload: Payload) -> Self {
        Self {
            procedure: procedure.to_owned(),
            payload,
        }
    }

    #[must_use]
    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the boolean result of a mutation or projection call.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TypeMismatch`] if the payload is not a boolean.
    pub fn as_bool(&self) -> Result<bool, ShopError> {
        match &self.payload {
            Payload::Bool(value) => Ok(*value),
            other => Err(mismatch(&self.procedure, "boolean", other)),
        }
    }

    /// Returns the single record of a singular-entity call.
    ///
    /// A sequence yields its first record.
    ///
    /// # Errors
    ///
    /// - [`ShopError::EmptyResult`] if the payload is an empty sequence.
    /// - [`ShopError::TypeMismatch`] if the payload is a boolean.
    pub fn into_record(self) -> Result<Record, ShopError> {
        let Self { procedure, payload } = self;
        match payload {
            Payload::Record(record) => Ok(record),
            Payload::Sequence(records) => records
                .into_iter()
                .next()
                .ok_or(ShopError::EmptyResult { procedure }),
            other @ Payload::Bool(_) => Err(mismatch(&procedure, "record", &other)),
        }
    }

    /// Returns the records of a collection call. A bare record becomes a
    /// one-element sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TypeMismatch`] if the payload is a boolean.
    pub fn into_sequence(self) -> Result<Vec<Record>, ShopError> {
        let Self { procedure, payload } = self;
        match payload {
            Payload::Sequence(records) => Ok(records),
            Payload::Record(record) => Ok(vec![record]),
            other @ Payload::Bool(_) => Err(mismatch(&procedure, "sequence", &other)),
        }
    }
}

fn mismatch(procedure: &str, expected: &'static str, actual: &Payload) -> ShopError {
    ShopError::TypeMismatch {
        procedure: procedure.to_owned(),
        expected,
        actual: actual.kind(),
    }
}

/// Extracts `"<procedure>Result"` from `envelope` and classifies it.
///
/// # Errors
///
/// Returns [`ShopError::MalformedResponse`] if the envelope lacks the result
/// key or the value is neither a boolean, a record nor a collection of
/// records.
pub fn normalize(procedure: &str, envelope: Value) -> Result<NormalizedResult, ShopError> {
    let malformed = |reason: String| ShopError::MalformedResponse {
        procedure: procedure.to_owned(),
        reason,
    };

    let result_key = format!("{procedure}Result");
    let Value::Object(mut fields) = envelope else {
        return Err(malformed(format!(
            "envelope is not an object (missing \"{result_key}\")"
        )));
    };
    let value = fields
        .remove(&result_key)
        .ok_or_else(|| malformed(format!("missing \"{result_key}\"")))?;

    let payload = classify(value).map_err(malformed)?;
    Ok(NormalizedResult::new(procedure, payload))
}

/// Classifies a result value purely by its shape.
///
/// Also used for nested collections inside records, such as order lines.
pub(crate) fn classify(value: Value) -> Result<Payload, String> {
    match value {
        Value::Bool(b) => Ok(Payload::Bool(b)),
        Value::Null => Ok(Payload::Sequence(Vec::new())),
        Value::Array(items) => collect_records(items).map(Payload::Sequence),
        Value::Object(mut obj) if is_collection_wrapper(&obj) => {
            match obj.remove(ITEM_KEY).unwrap_or(Value::Null) {
                Value::Null => Ok(Payload::Sequence(Vec::new())),
                Value::Array(items) => collect_records(items).map(Payload::Sequence),
                // A lone member under the wrapper, without a list around it.
                Value::Object(record) => Ok(Payload::Sequence(vec![record])),
                other => Err(format!("collection item is a {}", json_kind(&other))),
            }
        }
        Value::Object(record) => Ok(Payload::Record(record)),
        other => Err(format!("result is a bare {}", json_kind(&other))),
    }
}

fn is_collection_wrapper(obj: &Record) -> bool {
    obj.len() == 1 && obj.contains_key(ITEM_KEY)
}

fn collect_records(items: Vec<Value>) -> Result<Vec<Record>, String> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(format!(
                "collection member {idx} is a {}",
                json_kind(&other)
            )),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
