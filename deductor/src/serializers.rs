//! JSON input and output
//!
//! Seeds are read from a flat JSON object of `name: number` pairs, and models
//! are written as their ordered row listing.

use crate::{DeductorError, DeductorResult, Model, Row};
use serde::Serialize;
use serde_json::Value;

/// Read a seed from a JSON object such as `{"R": 2.0, "tau": 2.0}`
///
/// Numbers may also be given as numeric strings; `null` entries are skipped.
/// Entry order is not preserved, which deduction does not depend on.
pub fn seed_from_json(json: &str) -> DeductorResult<Vec<(String, f64)>> {
    let parsed: Value = serde_json::from_str(json)?;
    let Value::Object(map) = parsed else {
        return Err(DeductorError::Input(format!(
            "Expected a JSON object of name/value pairs, got {}",
            type_name(&parsed)
        )));
    };

    let mut seed = Vec::with_capacity(map.len());
    for (name, value) in map {
        let number = match &value {
            Value::Null => continue,
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(number) => seed.push((name, number)),
            None => {
                return Err(DeductorError::Input(format!(
                    "Expected a number for '{}', got {}",
                    name,
                    type_name(&value)
                )))
            }
        }
    }
    Ok(seed)
}

#[derive(Serialize)]
struct ModelListing<'a> {
    schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    rows: Vec<Row>,
}

/// Write the rows of a group of a model as pretty JSON
pub fn to_json(model: &Model, group: &str) -> DeductorResult<String> {
    let listing = ModelListing {
        schema: model.schema().name(),
        name: model.label().map(|l| l.name.as_str()),
        description: model.label().map(|l| l.description.as_str()),
        rows: model.rows(group)?,
    };
    Ok(serde_json::to_string_pretty(&listing)?)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
