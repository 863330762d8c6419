//! Logical-type detection

use crate::avro::AvroSchema;

/// Check whether a schema node carries the named logical type.
///
/// The structured annotation is consulted first and works for every
/// variant. Fixed schemas additionally honor a raw string-valued
/// `logicalType` attribute: upstream writers still emit some annotations
/// (notably `duration`) only in that form, so either signal alone counts.
pub fn has_logical_type(schema: &AvroSchema, name: &str) -> bool {
    if let Some(logical) = schema.logical_type() {
        if logical.name == name {
            return true;
        }
    }

    if let AvroSchema::Fixed(fixed) = schema {
        if let Some(raw) = fixed.attributes.get("logicalType").and_then(|v| v.as_str()) {
            return raw == name;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avro::{FixedSchema, LogicalType, Primitive};
    use serde_json::json;

    fn fixed_with_raw(logical: &str) -> AvroSchema {
        let mut attributes = serde_json::Map::new();
        attributes.insert("logicalType".to_string(), json!(logical));
        AvroSchema::Fixed(FixedSchema {
            name: "Blob".to_string(),
            doc: None,
            size: 12,
            logical_type: None,
            attributes,
        })
    }

    #[test]
    fn test_structured_annotation_matches() {
        let date = AvroSchema::Int(Primitive::annotated(LogicalType::new(LogicalType::DATE)));
        assert!(has_logical_type(&date, "date"));
        assert!(!has_logical_type(&date, "time-millis"));
    }

    #[test]
    fn test_absent_annotation_is_not_logical() {
        assert!(!has_logical_type(&AvroSchema::int(), "date"));
        assert!(!has_logical_type(&AvroSchema::Null, "date"));
    }

    #[test]
    fn test_fixed_raw_attribute_matches() {
        let duration = fixed_with_raw("duration");
        assert!(has_logical_type(&duration, "duration"));
        assert!(!has_logical_type(&duration, "decimal"));
    }

    #[test]
    fn test_raw_attribute_ignored_on_non_fixed() {
        // Primitives only carry the structured form; a bytes schema with no
        // annotation is never logical.
        let bytes = AvroSchema::bytes();
        assert!(!has_logical_type(&bytes, "duration"));
    }
}
