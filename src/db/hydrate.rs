//! Result hydration.
//!
//! Decoded rows become records of the model they were queried as. Every column
//! the database returned is kept verbatim; values are not converted back to the
//! model's logical types.

use crate::models::{ModelDescriptor, Record};
use serde_json::{Map, Value as JsonValue};

pub fn hydrate(rows: Vec<Map<String, JsonValue>>, model: &ModelDescriptor) -> Vec<Record> {
    rows.into_iter()
        .map(|values| Record::new(model.identity.as_str(), values))
        .collect()
}
