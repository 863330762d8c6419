//! Recursive type mapping
//!
//! One JSON Schema node per Avro node: primitives become `type`/`format`
//! pairs, logical types override the base mapping, enums keep their
//! symbols, records become objects with `properties`/`required`, and
//! unions are delegated to the flattener.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::avro::{AvroSchema, EnumSchema, LogicalType, RecordSchema};
use crate::converter::defaults::convert_default;
use crate::converter::logical::has_logical_type;
use crate::converter::unions::flatten_union;
use crate::converter::SchemaDocument;

// =============================================================================
// Public API
// =============================================================================

/// Map one Avro schema node to its JSON Schema counterpart.
///
/// Total and pure: every variant maps to exactly one node, and the same
/// tree always produces the same document.
pub fn to_json_schema(schema: &AvroSchema) -> SchemaDocument {
    let mut node = SchemaDocument::new();

    // Documentation goes in first so type-specific keys can never be
    // overwritten by it.
    if let Some(doc) = schema.doc() {
        if !doc.is_empty() {
            set(&mut node, "description", json!(doc));
        }
    }

    match schema {
        AvroSchema::Null => set(&mut node, "type", json!("null")),
        AvroSchema::Boolean(_) => set(&mut node, "type", json!("boolean")),
        AvroSchema::Int(_) => map_int(schema, &mut node),
        AvroSchema::Long(_) => map_long(schema, &mut node),
        AvroSchema::Float(_) => {
            set(&mut node, "type", json!("number"));
            set(&mut node, "format", json!("float"));
        }
        AvroSchema::Double(_) => {
            set(&mut node, "type", json!("number"));
            set(&mut node, "format", json!("double"));
        }
        AvroSchema::Bytes(_) => map_bytes(schema, &mut node),
        AvroSchema::String(_) => map_string(schema, &mut node),
        AvroSchema::Enum(e) => map_enum(e, &mut node),
        AvroSchema::Fixed(_) => map_fixed(schema, &mut node),
        AvroSchema::Array(element) => {
            set(&mut node, "type", json!("array"));
            set(&mut node, "items", Value::Object(to_json_schema(element)));
        }
        AvroSchema::Map(values) => {
            set(&mut node, "type", json!("object"));
            set(
                &mut node,
                "additionalProperties",
                Value::Object(to_json_schema(values)),
            );
        }
        AvroSchema::Record(record) => map_record(record, &mut node),
        // Union branches cannot carry documentation, so the flattened node
        // is the whole result.
        AvroSchema::Union(branches) => return flatten_union(branches),
    }

    node
}

// =============================================================================
// Primitive Mappings
// =============================================================================

fn map_int(schema: &AvroSchema, node: &mut SchemaDocument) {
    if has_logical_type(schema, LogicalType::DATE) {
        set(node, "type", json!("string"));
        set(node, "format", json!("date"));
    } else if has_logical_type(schema, LogicalType::TIME_MILLIS) {
        set(node, "type", json!("string"));
        set(node, "format", json!("time"));
    } else {
        set(node, "type", json!("integer"));
        set(node, "format", json!("int32"));
    }
}

fn map_long(schema: &AvroSchema, node: &mut SchemaDocument) {
    let is_timestamp = [
        LogicalType::TIMESTAMP_MILLIS,
        LogicalType::TIMESTAMP_MICROS,
        LogicalType::LOCAL_TIMESTAMP_MILLIS,
        LogicalType::LOCAL_TIMESTAMP_MICROS,
    ]
    .into_iter()
    .any(|name| has_logical_type(schema, name));

    if is_timestamp {
        set(node, "type", json!("string"));
        set(node, "format", json!("date-time"));
    } else if has_logical_type(schema, LogicalType::TIME_MICROS) {
        set(node, "type", json!("string"));
        set(node, "format", json!("time"));
    } else {
        set(node, "type", json!("integer"));
    }
}

fn map_bytes(schema: &AvroSchema, node: &mut SchemaDocument) {
    if has_logical_type(schema, LogicalType::DECIMAL) {
        map_decimal(schema, node);
    } else {
        set(node, "type", json!("string"));
        set(node, "contentEncoding", json!("base64"));
    }
}

fn map_string(schema: &AvroSchema, node: &mut SchemaDocument) {
    set(node, "type", json!("string"));
    if has_logical_type(schema, LogicalType::UUID) {
        set(node, "format", json!("uuid"));
    }
}

// =============================================================================
// Named and Composite Mappings
// =============================================================================

fn map_enum(schema: &EnumSchema, node: &mut SchemaDocument) {
    set(node, "type", json!("string"));
    set(node, "enum", json!(schema.symbols));
}

fn map_fixed(schema: &AvroSchema, node: &mut SchemaDocument) {
    if has_logical_type(schema, LogicalType::DECIMAL) {
        map_decimal(schema, node);
    } else if has_logical_type(schema, LogicalType::DURATION) {
        set(node, "type", json!("string"));
        set(node, "format", json!("duration"));
    } else {
        // The byte-length constraint has no draft-07 counterpart and is
        // dropped.
        set(node, "type", json!("string"));
        set(node, "contentEncoding", json!("base64"));
    }
}

fn map_record(record: &RecordSchema, node: &mut SchemaDocument) {
    set(node, "type", json!("object"));

    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in &record.fields {
        let mut mapped = to_json_schema(&field.schema);

        if let Some(doc) = &field.doc {
            if !doc.is_empty() {
                mapped.insert("description".to_string(), json!(doc));
            }
        }

        if let Some(raw) = &field.default {
            if let Some(default) = convert_default(&field.name, raw) {
                mapped.insert("default".to_string(), default);
            }
        }

        if !field.schema.is_nullable_union() {
            required.push(json!(field.name));
        }

        properties.insert(field.name.clone(), Value::Object(mapped));
    }

    set(node, "properties", Value::Object(properties));
    if !required.is_empty() {
        set(node, "required", Value::Array(required));
    }
}

/// Decimal output: `type: string` plus vendor keys. Precision and scale are
/// emitted only when present and integral; a bad parameter is logged and
/// skipped, never fatal.
fn map_decimal(schema: &AvroSchema, node: &mut SchemaDocument) {
    set(node, "type", json!("string"));
    set(node, "x-avro-logicalType", json!("decimal"));

    for key in ["precision", "scale"] {
        if let Some(value) = decimal_param(schema, key) {
            match value.as_i64() {
                Some(n) => set(node, &format!("x-{}", key), json!(n)),
                None => warn!(
                    param = key,
                    value = %value,
                    "non-integer decimal parameter, omitting"
                ),
            }
        }
    }
}

/// Decimal parameters come from the structured annotation when promoted,
/// or straight from a fixed schema's raw attributes otherwise.
fn decimal_param<'a>(schema: &'a AvroSchema, key: &str) -> Option<&'a Value> {
    if let Some(logical) = schema.logical_type() {
        if logical.name == LogicalType::DECIMAL {
            return logical.param(key);
        }
    }
    if let AvroSchema::Fixed(fixed) = schema {
        return fixed.attributes.get(key);
    }
    None
}

fn set(node: &mut SchemaDocument, key: &str, value: Value) {
    node.insert(key.to_string(), value);
}

// =============================================================================
// Tests
// =============================================================================
