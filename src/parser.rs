//! Avro schema parsing
//!
//! Builds the in-memory schema tree from the `.avsc` JSON text
//! representation. Named types (records, enums, fixeds) are registered as
//! they are defined and later references are resolved by inlining the
//! stored definition, so the converter downstream always receives a
//! self-contained tree. A reference to a type whose definition is still
//! being parsed is rejected as recursive.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::avro::{
    AvroSchema, EnumSchema, FixedSchema, LogicalType, Primitive, RecordField, RecordSchema,
};
use crate::error::{ConvertError, Result};

/// Attributes that define a schema's structure rather than annotate it
const STRUCTURAL_KEYS: &[&str] = &[
    "type",
    "name",
    "namespace",
    "doc",
    "aliases",
    "fields",
    "symbols",
    "items",
    "values",
    "size",
    "default",
    "order",
    "logicalType",
];

/// Keys of a fixed definition that do not belong in its raw attribute map.
/// `logicalType`, `precision`, and `scale` stay in the attributes so the
/// raw annotation signal survives parsing.
const FIXED_DEFINITION_KEYS: &[&str] = &["type", "name", "namespace", "doc", "aliases", "size"];

/// Parse Avro schema text into a schema tree
pub fn parse_schema(text: &str) -> Result<AvroSchema> {
    let value: Value = serde_json::from_str(text)?;
    parse_value(&value)
}

/// Parse Avro schema text, first validating it with the reference parser.
///
/// Anything the `apache-avro` parser rejects is rejected here with its
/// diagnostic, before the crate's own parse runs.
pub fn parse_schema_strict(text: &str) -> Result<AvroSchema> {
    apache_avro::Schema::parse_str(text)?;
    parse_schema(text)
}

/// Parse an already-deserialized schema value into a schema tree
pub fn parse_value(value: &Value) -> Result<AvroSchema> {
    let mut names = NameRegistry::default();
    parse_node(value, None, &mut names)
}

fn parse_node(
    value: &Value,
    namespace: Option<&str>,
    names: &mut NameRegistry,
) -> Result<AvroSchema> {
    match value {
        Value::String(name) => parse_type_name(name, namespace, names),
        Value::Array(branches) => parse_union(branches, namespace, names),
        Value::Object(map) => parse_object(map, namespace, names),
        other => Err(ConvertError::InvalidSchema(format!(
            "expected a schema, found {}",
            other
        ))),
    }
}

fn parse_type_name(
    name: &str,
    namespace: Option<&str>,
    names: &NameRegistry,
) -> Result<AvroSchema> {
    match name {
        "null" => Ok(AvroSchema::Null),
        "boolean" => Ok(AvroSchema::boolean()),
        "int" => Ok(AvroSchema::int()),
        "long" => Ok(AvroSchema::long()),
        "float" => Ok(AvroSchema::float()),
        "double" => Ok(AvroSchema::double()),
        "bytes" => Ok(AvroSchema::bytes()),
        "string" => Ok(AvroSchema::string()),
        reference => names.resolve(reference, namespace),
    }
}

fn parse_object(
    map: &Map<String, Value>,
    namespace: Option<&str>,
    names: &mut NameRegistry,
) -> Result<AvroSchema> {
    let type_value = map.get("type").ok_or_else(|| {
        ConvertError::InvalidSchema("schema object is missing a \"type\" attribute".to_string())
    })?;

    let type_name = match type_value {
        Value::String(name) => name.as_str(),
        // Some writers wrap a whole schema under "type".
        other => return parse_node(other, namespace, names),
    };

    match type_name {
        "record" => parse_record(map, namespace, names),
        "enum" => parse_enum(map, namespace, names),
        "fixed" => parse_fixed(map, namespace, names),
        "array" => {
            let items = map.get("items").ok_or_else(|| {
                ConvertError::InvalidSchema("array is missing \"items\"".to_string())
            })?;
            Ok(AvroSchema::Array(Box::new(parse_node(
                items, namespace, names,
            )?)))
        }
        "map" => {
            let values = map.get("values").ok_or_else(|| {
                ConvertError::InvalidSchema("map is missing \"values\"".to_string())
            })?;
            Ok(AvroSchema::Map(Box::new(parse_node(
                values, namespace, names,
            )?)))
        }
        "null" => Ok(AvroSchema::Null),
        "boolean" => Ok(AvroSchema::Boolean(primitive_attrs("boolean", map))),
        "int" => Ok(AvroSchema::Int(primitive_attrs("int", map))),
        "long" => Ok(AvroSchema::Long(primitive_attrs("long", map))),
        "float" => Ok(AvroSchema::Float(primitive_attrs("float", map))),
        "double" => Ok(AvroSchema::Double(primitive_attrs("double", map))),
        "bytes" => Ok(AvroSchema::Bytes(primitive_attrs("bytes", map))),
        "string" => Ok(AvroSchema::String(primitive_attrs("string", map))),
        reference => names.resolve(reference, namespace),
    }
}

fn parse_union(
    branches: &[Value],
    namespace: Option<&str>,
    names: &mut NameRegistry,
) -> Result<AvroSchema> {
    if branches.is_empty() {
        return Err(ConvertError::InvalidSchema(
            "union must have at least one branch".to_string(),
        ));
    }

    let mut members = Vec::with_capacity(branches.len());
    let mut null_branches = 0;

    for branch in branches {
        let member = parse_node(branch, namespace, names)?;
        if matches!(member, AvroSchema::Union(_)) {
            return Err(ConvertError::InvalidSchema(
                "unions may not immediately contain other unions".to_string(),
            ));
        }
        if member.is_null() {
            null_branches += 1;
        }
        members.push(member);
    }

    if null_branches > 1 {
        return Err(ConvertError::InvalidSchema(
            "union has more than one null branch".to_string(),
        ));
    }

    Ok(AvroSchema::Union(members))
}

fn parse_record(
    map: &Map<String, Value>,
    enclosing: Option<&str>,
    names: &mut NameRegistry,
) -> Result<AvroSchema> {
    let name = required_str(map, "name", "record")?;
    let declared = map.get("namespace").and_then(Value::as_str);
    let (fullname, child_namespace) = qualify(name, declared, enclosing);
    let simple = name.rsplit('.').next().unwrap_or(name);

    names.begin(&fullname)?;

    let field_values = map.get("fields").and_then(Value::as_array).ok_or_else(|| {
        ConvertError::InvalidSchema(format!("record {} has no \"fields\" array", fullname))
    })?;

    let mut fields = Vec::with_capacity(field_values.len());
    let mut seen = HashSet::new();

    for field_value in field_values {
        let field_map = field_value.as_object().ok_or_else(|| {
            ConvertError::InvalidSchema(format!(
                "field of record {} must be an object",
                fullname
            ))
        })?;
        let field_name = required_str(field_map, "name", "field")?;
        if !seen.insert(field_name.to_string()) {
            return Err(ConvertError::InvalidSchema(format!(
                "duplicate field name: {}",
                field_name
            )));
        }

        let type_value = field_map.get("type").ok_or_else(|| {
            ConvertError::InvalidSchema(format!("field {} is missing a \"type\"", field_name))
        })?;
        let schema = parse_node(type_value, child_namespace.as_deref(), names)?;

        fields.push(RecordField {
            name: field_name.to_string(),
            schema,
            doc: field_map
                .get("doc")
                .and_then(Value::as_str)
                .map(str::to_string),
            default: field_map.get("default").cloned(),
        });
    }

    let record = AvroSchema::Record(RecordSchema {
        name: fullname.clone(),
        doc: map.get("doc").and_then(Value::as_str).map(str::to_string),
        fields,
    });
    names.finish(&fullname, simple, record.clone());

    Ok(record)
}

fn parse_enum(
    map: &Map<String, Value>,
    enclosing: Option<&str>,
    names: &mut NameRegistry,
) -> Result<AvroSchema> {
    let name = required_str(map, "name", "enum")?;
    let declared = map.get("namespace").and_then(Value::as_str);
    let (fullname, _) = qualify(name, declared, enclosing);
    let simple = name.rsplit('.').next().unwrap_or(name);

    let symbol_values = map.get("symbols").and_then(Value::as_array).ok_or_else(|| {
        ConvertError::InvalidSchema(format!("enum {} has no \"symbols\" array", fullname))
    })?;

    let mut symbols = Vec::with_capacity(symbol_values.len());
    let mut seen = HashSet::new();

    for symbol_value in symbol_values {
        let symbol = symbol_value.as_str().ok_or_else(|| {
            ConvertError::InvalidSchema(format!("enum {} symbols must be strings", fullname))
        })?;
        if !seen.insert(symbol.to_string()) {
            return Err(ConvertError::InvalidSchema(format!(
                "duplicate enum symbol: {}",
                symbol
            )));
        }
        symbols.push(symbol.to_string());
    }

    let schema = AvroSchema::Enum(EnumSchema {
        name: fullname.clone(),
        doc: map.get("doc").and_then(Value::as_str).map(str::to_string),
        symbols,
    });
    names.define(&fullname, simple, schema.clone())?;

    Ok(schema)
}

fn parse_fixed(
    map: &Map<String, Value>,
    enclosing: Option<&str>,
    names: &mut NameRegistry,
) -> Result<AvroSchema> {
    let name = required_str(map, "name", "fixed")?;
    let declared = map.get("namespace").and_then(Value::as_str);
    let (fullname, _) = qualify(name, declared, enclosing);
    let simple = name.rsplit('.').next().unwrap_or(name);

    let size = map.get("size").and_then(Value::as_u64).ok_or_else(|| {
        ConvertError::InvalidSchema(format!("fixed {} has no integral \"size\"", fullname))
    })?;

    let mut attributes = Map::new();
    for (key, value) in map {
        if !FIXED_DEFINITION_KEYS.contains(&key.as_str()) {
            attributes.insert(key.clone(), value.clone());
        }
    }

    let schema = AvroSchema::Fixed(FixedSchema {
        name: fullname.clone(),
        doc: map.get("doc").and_then(Value::as_str).map(str::to_string),
        size,
        logical_type: promote_logical("fixed", map),
        attributes,
    });
    names.define(&fullname, simple, schema.clone())?;

    Ok(schema)
}

fn primitive_attrs(base: &str, map: &Map<String, Value>) -> Primitive {
    Primitive {
        doc: map.get("doc").and_then(Value::as_str).map(str::to_string),
        logical_type: promote_logical(base, map),
    }
}

/// Promote a recognized `logicalType` attribute to the structured form.
///
/// Promotion requires the annotation to sit on its expected base type;
/// `duration` and unrecognized names stay raw, which never changes the
/// base mapping downstream.
fn promote_logical(base: &str, attrs: &Map<String, Value>) -> Option<LogicalType> {
    let name = attrs.get("logicalType")?.as_str()?;

    let promoted = match name {
        LogicalType::DATE | LogicalType::TIME_MILLIS => base == "int",
        LogicalType::TIME_MICROS
        | LogicalType::TIMESTAMP_MILLIS
        | LogicalType::TIMESTAMP_MICROS
        | LogicalType::LOCAL_TIMESTAMP_MILLIS
        | LogicalType::LOCAL_TIMESTAMP_MICROS => base == "long",
        LogicalType::UUID => base == "string",
        LogicalType::DECIMAL => base == "bytes" || base == "fixed",
        _ => false,
    };
    if !promoted {
        return None;
    }

    let mut params = Map::new();
    for (key, value) in attrs {
        if !STRUCTURAL_KEYS.contains(&key.as_str()) {
            params.insert(key.clone(), value.clone());
        }
    }

    Some(LogicalType::with_params(name, params))
}

/// Compute a definition's full name and the namespace its children inherit
fn qualify(name: &str, namespace: Option<&str>, enclosing: Option<&str>) -> (String, Option<String>) {
    if let Some(dot) = name.rfind('.') {
        return (name.to_string(), Some(name[..dot].to_string()));
    }

    let namespace = namespace
        .or(enclosing)
        .filter(|ns| !ns.is_empty())
        .map(str::to_string);
    let fullname = match &namespace {
        Some(ns) => format!("{}.{}", ns, name),
        None => name.to_string(),
    };

    (fullname, namespace)
}

fn required_str<'a>(map: &'a Map<String, Value>, key: &str, what: &str) -> Result<&'a str> {
    map.get(key).and_then(Value::as_str).ok_or_else(|| {
        ConvertError::InvalidSchema(format!("{} is missing a \"{}\"", what, key))
    })
}

/// Named-type definitions seen so far
#[derive(Default)]
struct NameRegistry {
    resolved: HashMap<String, AvroSchema>,
    in_progress: HashSet<String>,
}

impl NameRegistry {
    fn begin(&mut self, fullname: &str) -> Result<()> {
        if self.resolved.contains_key(fullname) || !self.in_progress.insert(fullname.to_string()) {
            return Err(ConvertError::InvalidSchema(format!(
                "type {} is defined more than once",
                fullname
            )));
        }
        Ok(())
    }

    fn finish(&mut self, fullname: &str, simple: &str, schema: AvroSchema) {
        self.in_progress.remove(fullname);
        if simple != fullname {
            self.resolved.insert(simple.to_string(), schema.clone());
        }
        self.resolved.insert(fullname.to_string(), schema);
    }

    fn define(&mut self, fullname: &str, simple: &str, schema: AvroSchema) -> Result<()> {
        self.begin(fullname)?;
        self.finish(fullname, simple, schema);
        Ok(())
    }

    fn resolve(&self, name: &str, namespace: Option<&str>) -> Result<AvroSchema> {
        let qualified = match namespace {
            Some(ns) if !name.contains('.') && !ns.is_empty() => Some(format!("{}.{}", ns, name)),
            _ => None,
        };

        for candidate in qualified.as_deref().into_iter().chain([name]) {
            if let Some(schema) = self.resolved.get(candidate) {
                return Ok(schema.clone());
            }
            if self.in_progress.contains(candidate) {
                return Err(ConvertError::RecursiveType(candidate.to_string()));
            }
        }

        Err(ConvertError::UnknownType(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_bare_primitives() {
        assert_eq!(parse_schema("\"null\"").unwrap(), AvroSchema::Null);
        assert_eq!(parse_schema("\"int\"").unwrap(), AvroSchema::int());
        assert_eq!(parse_schema("\"string\"").unwrap(), AvroSchema::string());
    }

    #[test]
    fn test_rejects_non_schema_json() {
        assert!(matches!(
            parse_schema("42").unwrap_err(),
            ConvertError::InvalidSchema(_)
        ));
        assert!(matches!(
            parse_schema("not json at all").unwrap_err(),
            ConvertError::Json(_)
        ));
    }

    #[test]
    fn test_promotes_recognized_logical_types() {
        let date = parse_value(&json!({ "type": "int", "logicalType": "date" })).unwrap();
        assert_eq!(date.logical_type().map(|l| l.name.as_str()), Some("date"));

        let uuid = parse_value(&json!({ "type": "string", "logicalType": "uuid" })).unwrap();
        assert_eq!(uuid.logical_type().map(|l| l.name.as_str()), Some("uuid"));

        let decimal = parse_value(&json!({
            "type": "bytes", "logicalType": "decimal", "precision": 10, "scale": 2
        }))
        .unwrap();
        let logical = decimal.logical_type().unwrap();
        assert_eq!(logical.name, "decimal");
        assert_eq!(logical.param("precision"), Some(&json!(10)));
        assert_eq!(logical.param("scale"), Some(&json!(2)));
    }

    #[test]
    fn test_wrong_base_type_is_not_promoted() {
        // timestamp-millis belongs on long, not int
        let node = parse_value(&json!({ "type": "int", "logicalType": "timestamp-millis" })).unwrap();
        assert!(node.logical_type().is_none());
        assert_eq!(node, AvroSchema::int());
    }

    #[test]
    fn test_unknown_logical_name_is_not_promoted() {
        let node = parse_value(&json!({ "type": "string", "logicalType": "hex-color" })).unwrap();
        assert!(node.logical_type().is_none());
    }

    #[test]
    fn test_duration_stays_raw_on_fixed() {
        let node = parse_value(&json!({
            "type": "fixed", "name": "Interval", "size": 12, "logicalType": "duration"
        }))
        .unwrap();

        let fixed = match &node {
            AvroSchema::Fixed(fixed) => fixed,
            other => panic!("expected fixed, got {:?}", other),
        };
        assert!(fixed.logical_type.is_none());
        assert_eq!(fixed.attributes.get("logicalType"), Some(&json!("duration")));
    }

    #[test]
    fn test_union_rules() {
        let nested = json!(["null", ["string", "int"]]);
        assert!(matches!(
            parse_value(&nested).unwrap_err(),
            ConvertError::InvalidSchema(_)
        ));

        let double_null = json!(["null", "null"]);
        assert!(parse_value(&double_null).is_err());

        let empty = json!([]);
        assert!(parse_value(&empty).is_err());
    }

    #[test]
    fn test_duplicate_field_names_rejected() {
        let schema = json!({
            "type": "record", "name": "Pair",
            "fields": [
                { "name": "x", "type": "int" },
                { "name": "x", "type": "string" }
            ]
        });
        assert!(parse_value(&schema).is_err());
    }

    #[test]
    fn test_duplicate_enum_symbols_rejected() {
        let schema = json!({
            "type": "enum", "name": "Color", "symbols": ["RED", "RED"]
        });
        assert!(parse_value(&schema).is_err());
    }

    #[test]
    fn test_named_reference_is_inlined() {
        let schema = json!({
            "type": "record", "name": "Event", "namespace": "com.example",
            "fields": [
                { "name": "source", "type": { "type": "record", "name": "Source", "fields": [
                    { "name": "host", "type": "string" }
                ]}},
                { "name": "mirror", "type": "Source" }
            ]
        });
        let parsed = parse_value(&schema).unwrap();

        let record = match &parsed {
            AvroSchema::Record(record) => record,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.name, "com.example.Event");
        assert_eq!(record.fields[0].schema, record.fields[1].schema);

        let source = match &record.fields[1].schema {
            AvroSchema::Record(source) => source,
            other => panic!("expected inlined record, got {:?}", other),
        };
        assert_eq!(source.name, "com.example.Source");
    }

    #[test]
    fn test_self_reference_is_rejected() {
        let schema = json!({
            "type": "record", "name": "Node",
            "fields": [
                { "name": "value", "type": "int" },
                { "name": "next", "type": ["null", "Node"] }
            ]
        });
        assert!(matches!(
            parse_value(&schema).unwrap_err(),
            ConvertError::RecursiveType(_)
        ));
    }

    #[test]
    fn test_unknown_reference_is_rejected() {
        let schema = json!({
            "type": "record", "name": "Holder",
            "fields": [{ "name": "payload", "type": "Missing" }]
        });
        assert!(matches!(
            parse_value(&schema).unwrap_err(),
            ConvertError::UnknownType(name) if name == "Missing"
        ));
    }

    #[test]
    fn test_dotted_name_carries_its_namespace() {
        let schema = json!({
            "type": "record", "name": "com.example.Deep",
            "fields": [
                { "name": "inner", "type": { "type": "enum", "name": "Mode", "symbols": ["A"] } },
                { "name": "again", "type": "com.example.Mode" }
            ]
        });
        let parsed = parse_value(&schema).unwrap();
        let record = match &parsed {
            AvroSchema::Record(record) => record,
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(record.name, "com.example.Deep");
        assert_eq!(record.fields[0].schema, record.fields[1].schema);
    }

    #[test]
    fn test_schema_nested_under_type_attribute() {
        let schema = json!({ "type": { "type": "array", "items": "string" } });
        assert_eq!(
            parse_value(&schema).unwrap(),
            AvroSchema::Array(Box::new(AvroSchema::string()))
        );
    }

    #[test]
    fn test_missing_structural_attributes() {
        assert!(parse_value(&json!({ "name": "NoType" })).is_err());
        assert!(parse_value(&json!({ "type": "record", "name": "NoFields" })).is_err());
        assert!(parse_value(&json!({ "type": "fixed", "name": "NoSize" })).is_err());
        assert!(parse_value(&json!({ "type": "array" })).is_err());
    }

    #[test]
    fn test_strict_accepts_valid_schema() {
        let text = r#"{
            "type": "record", "name": "Ping",
            "fields": [{ "name": "at", "type": "long" }]
        }"#;
        assert!(parse_schema_strict(text).is_ok());
    }

    #[test]
    fn test_strict_rejects_what_the_reference_parser_rejects() {
        let text = r#"{ "type": "record", "name": "Broken" }"#;
        assert!(matches!(
            parse_schema_strict(text).unwrap_err(),
            ConvertError::Avro(_)
        ));
    }
}
