//! Reading bike records from JSON documents
//!
//! Two shapes are accepted:
//!
//! ```json
//! { "bike-id": { "stack": 543, "reach": 390, ... }, ... }
//! [ { "id": "bike-id", "stack": 543, ... }, ... ]
//! ```
//!
//! Geometry charts are scraped from many places, so values are coerced
//! leniently: numbers pass through, numeric strings are parsed, and anything
//! else counts as missing. A record with missing fields still loads; it is the
//! solver's job to declare it not drawable.

use serde_json::{Map, Value};

use crate::batch::BikeRecord;
use crate::errors::{LoadError, SourceContext};
use crate::params::{Field, RawFrameParameters};

/// Parse every bike record in `json`. `name` is only used in diagnostics.
pub fn load_bikes(name: &str, json: &str) -> Result<Vec<BikeRecord>, LoadError> {
    let document: Value =
        serde_json::from_str(json).map_err(|err| syntax_error(name, json, &err))?;

    let records = match document {
        Value::Object(map) => map
            .into_iter()
            .map(|(id, value)| record_from_value(id, value))
            .collect::<Result<Vec<_>, _>>()?,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let id = member_id(&value).unwrap_or_else(|| index.to_string());
                record_from_value(id, value)
            })
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(LoadError::UnexpectedShape {
                found: kind_of(&other),
            });
        }
    };

    crate::log::debug!(source = name, records = records.len(), "loaded bike data");
    Ok(records)
}

fn syntax_error(name: &str, json: &str, err: &serde_json::Error) -> LoadError {
    let ctx = SourceContext::new(name, json);
    let offset = ctx.offset_of(err.line(), err.column());
    LoadError::Syntax {
        message: err.to_string(),
        src: ctx.named_source(),
        span: (offset, 0).into(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `"id"` or `"name"` member of an array entry
fn member_id(value: &Value) -> Option<String> {
    ["id", "name"].iter().find_map(|key| match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn params_from_map(map: &Map<String, Value>) -> RawFrameParameters {
    let mut params = RawFrameParameters::default();
    for field in Field::ALL {
        params.set(field, map.get(field.key()).and_then(coerce_number));
    }
    params
}

fn record_from_value(id: String, value: Value) -> Result<BikeRecord, LoadError> {
    match value {
        Value::Object(map) => Ok(BikeRecord::new(id, params_from_map(&map))),
        other => Err(LoadError::RecordNotObject {
            id,
            found: kind_of(&other),
        }),
    }
}
