//! Avro to JSON Schema conversion
//!
//! The mapping is a pure, depth-first walk over the schema tree: one target
//! node per source node, built bottom-up with no back-references into the
//! source. `convert` wraps the mapped root with the draft-07 dialect
//! identifier; everything below it is produced by [`types::to_json_schema`].

pub mod defaults;
pub mod logical;
pub mod types;
pub mod unions;

pub use defaults::convert_default;
pub use logical::has_logical_type;
pub use types::to_json_schema;
pub use unions::flatten_union;

use serde_json::{Map, Value};

use crate::avro::AvroSchema;

/// Dialect identifier emitted at the root of every converted document
pub const DRAFT7_URI: &str = "http://json-schema.org/draft-07/schema#";

/// An ordered JSON Schema node
pub type SchemaDocument = Map<String, Value>;

/// Convert a parsed Avro schema into a JSON Schema draft-07 document
pub fn convert(schema: &AvroSchema) -> SchemaDocument {
    let mut document = SchemaDocument::new();
    document.insert("$schema".to_string(), Value::String(DRAFT7_URI.to_string()));
    document.extend(to_json_schema(schema));
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_carries_dialect_identifier() {
        let document = convert(&AvroSchema::string());
        let keys: Vec<&String> = document.keys().collect();
        assert_eq!(keys[0], "$schema");
        assert_eq!(document["$schema"], json!(DRAFT7_URI));
        assert_eq!(document["type"], json!("string"));
    }
}
