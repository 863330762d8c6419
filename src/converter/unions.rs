//! Union flattening
//!
//! Decides how a union's branches are represented: the inline nullable
//! shorthand (`"type": [base, "null"]`) where it applies, an `anyOf`
//! alternatives list otherwise.

use serde_json::{json, Value};

use crate::avro::AvroSchema;
use crate::converter::types::to_json_schema;
use crate::converter::SchemaDocument;

/// Flatten a union's branches into a single schema node.
///
/// A nullable union with exactly one non-null branch whose mapped `type`
/// is a bare string collapses to that branch with `type` replaced by
/// `[base, "null"]`. Every other shape becomes an `anyOf` list with the
/// non-null branches in source order and `{"type": "null"}` appended last
/// when a null branch is present. A single-branch union with no null
/// collapses to the branch itself.
pub fn flatten_union(branches: &[AvroSchema]) -> SchemaDocument {
    let has_null = branches.iter().any(|b| b.is_null());
    let non_null: Vec<&AvroSchema> = branches.iter().filter(|b| !b.is_null()).collect();

    if non_null.is_empty() {
        let mut node = SchemaDocument::new();
        node.insert("type".to_string(), json!("null"));
        return node;
    }

    if has_null && non_null.len() == 1 {
        let mut mapped = to_json_schema(non_null[0]);
        if let Some(Value::String(base)) = mapped.get("type").cloned() {
            mapped.insert("type".to_string(), json!([base, "null"]));
            return mapped;
        }
        // The branch's type is already non-scalar (a nested anyOf or an
        // array-valued type), so the shorthand does not apply; fall
        // through to the alternatives list.
    }

    if !has_null && non_null.len() == 1 {
        return to_json_schema(non_null[0]);
    }

    let mut alternatives: Vec<Value> = non_null
        .iter()
        .map(|branch| Value::Object(to_json_schema(branch)))
        .collect();
    if has_null {
        alternatives.push(json!({ "type": "null" }));
    }

    let mut node = SchemaDocument::new();
    node.insert("anyOf".to_string(), Value::Array(alternatives));
    node
}
