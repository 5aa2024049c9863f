//! JSON Schema gate for listing payloads.
//!
//! Sources hand back raw JSON; the repository client runs it through this
//! schema before deserializing so shape problems surface as one readable
//! message instead of a serde error about the first bad field. The schema is
//! embedded at build time and compiled once per process.

use anyhow::{Result, anyhow};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::sync::OnceLock;

const LISTING_COLLECTION_SCHEMA: &str =
    include_str!("../schema/listing_collection.schema.json");

static SCHEMA_VALUE: OnceLock<Result<Value, String>> = OnceLock::new();
static COMPILED: OnceLock<Result<JSONSchema, String>> = OnceLock::new();

fn schema_value() -> Result<&'static Value> {
    SCHEMA_VALUE
        .get_or_init(|| {
            serde_json::from_str(LISTING_COLLECTION_SCHEMA)
                .map_err(|err| format!("parsing embedded listing schema: {err}"))
        })
        .as_ref()
        .map_err(|msg| anyhow!("{msg}"))
}

fn compiled_schema() -> Result<&'static JSONSchema> {
    COMPILED
        .get_or_init(|| {
            let raw = schema_value().map_err(|err| format!("{err:#}"))?;
            JSONSchema::compile(raw)
                .map_err(|err| format!("compiling embedded listing schema: {err}"))
        })
        .as_ref()
        .map_err(|msg| anyhow!("{msg}"))
}

/// `schema_version` declared by the embedded schema.
pub fn listing_schema_version() -> Result<&'static str> {
    schema_value()?
        .get("schema_version")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("embedded listing schema has no schema_version"))
}

/// Validate a raw collection payload.
///
/// Returns every validation message rather than stopping at the first so a
/// malformed response can be diagnosed in one pass.
pub fn validate_listing_collection(payload: &Value) -> Result<(), Vec<String>> {
    let schema = compiled_schema().map_err(|err| vec![format!("{err:#}")])?;
    if let Err(errors) = schema.validate(payload) {
        let details = errors.map(|err| err.to_string()).collect::<Vec<_>>();
        return Err(details);
    }
    Ok(())
}
