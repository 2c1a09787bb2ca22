//! JSON dialect.
//!
//! Two document shapes are recognized:
//! - an array of marker objects: `[{"rsid": "rs1065852", "genotype": "CT"}, ...]`
//! - an object keyed by rsid, mapping to a genotype string or a marker object:
//!   `{"rs1065852": "CT", "rs4244285": {"genotype": "GA", "gene": "CYP2C19"}}`

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FormatError;

use super::normalize::{normalize_marker, raw_from_json_object};
use super::types::{Dialect, DialectOutput, RawMarker};

/// Top-level layout of a JSON document.
enum JsonShape<'a> {
    List(&'a [Value]),
    Keyed(&'a Map<String, Value>),
    Unsupported,
}

impl<'a> JsonShape<'a> {
    fn detect(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => JsonShape::List(items),
            Value::Object(map) => JsonShape::Keyed(map),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                JsonShape::Unsupported
            }
        }
    }
}

pub fn parse(content: &str) -> Result<DialectOutput, FormatError> {
    let document: Value = serde_json::from_str(content).map_err(|e| {
        debug!("Content is not JSON: {}", e);
        FormatError::InvalidJson
    })?;

    let output = match JsonShape::detect(&document) {
        JsonShape::List(items) => parse_list(items),
        JsonShape::Keyed(map) => parse_keyed(map),
        JsonShape::Unsupported => return Err(FormatError::UnsupportedShape),
    };

    if output.markers.is_empty() {
        return Err(FormatError::NoMarkers {
            dialect: Dialect::Json,
        });
    }
    Ok(output)
}

fn parse_list(items: &[Value]) -> DialectOutput {
    let mut output = DialectOutput::default();

    for (index, item) in items.iter().enumerate() {
        let marker = item
            .as_object()
            .map(raw_from_json_object)
            .and_then(normalize_marker);

        match marker {
            Some(marker) => output.markers.push(marker),
            None => output
                .warnings
                .push(format!("Skipped invalid entry at index {}", index)),
        }
    }

    output
}

fn parse_keyed(map: &Map<String, Value>) -> DialectOutput {
    let mut output = DialectOutput::default();

    // Keys that don't look like rsids are document metadata, not markers
    for (key, value) in map.iter().filter(|(k, _)| k.to_lowercase().starts_with("rs")) {
        let raw = match value {
            Value::String(genotype) => Some(RawMarker {
                rsid: Some(key.clone()),
                genotype: Some(genotype.clone()),
                ..Default::default()
            }),
            Value::Object(obj) => {
                let mut raw = raw_from_json_object(obj);
                raw.rsid = obj
                    .get("rsid")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .or_else(|| Some(key.clone()));
                Some(raw)
            }
            _ => None,
        };

        match raw.and_then(normalize_marker) {
            Some(marker) => output.markers.push(marker),
            None => output
                .warnings
                .push(format!("Skipped invalid entry for key '{}'", key)),
        }
    }

    output
}
