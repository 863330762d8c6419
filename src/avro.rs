//! Avro schema types and structures

use serde_json::{Map, Value};

/// Attributes shared by the primitive type variants
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Primitive {
    /// Documentation string, if declared
    pub doc: Option<String>,
    /// Structured logical-type annotation, if promoted
    pub logical_type: Option<LogicalType>,
}

impl Primitive {
    /// Create primitive attributes carrying a logical-type annotation
    pub fn annotated(logical_type: LogicalType) -> Self {
        Self {
            doc: None,
            logical_type: Some(logical_type),
        }
    }
}

/// A logical-type annotation: a name plus its extra parameters
/// (e.g. `decimal` carries `precision` and `scale`)
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalType {
    /// Annotation name as spelled in the schema text
    pub name: String,
    /// Remaining non-structural attributes of the annotated node
    pub params: Map<String, Value>,
}

impl LogicalType {
    pub const DATE: &'static str = "date";
    pub const TIME_MILLIS: &'static str = "time-millis";
    pub const TIME_MICROS: &'static str = "time-micros";
    pub const TIMESTAMP_MILLIS: &'static str = "timestamp-millis";
    pub const TIMESTAMP_MICROS: &'static str = "timestamp-micros";
    pub const LOCAL_TIMESTAMP_MILLIS: &'static str = "local-timestamp-millis";
    pub const LOCAL_TIMESTAMP_MICROS: &'static str = "local-timestamp-micros";
    pub const UUID: &'static str = "uuid";
    pub const DECIMAL: &'static str = "decimal";
    pub const DURATION: &'static str = "duration";

    /// Create an annotation without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    /// Create an annotation with parameters
    pub fn with_params(name: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Look up a parameter by name
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

/// An enum definition
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    /// Full name (namespace-qualified when a namespace applies)
    pub name: String,
    /// Documentation string, if declared
    pub doc: Option<String>,
    /// Symbols in declared order
    pub symbols: Vec<String>,
}

/// A fixed-size binary definition
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    /// Full name (namespace-qualified when a namespace applies)
    pub name: String,
    /// Documentation string, if declared
    pub doc: Option<String>,
    /// Size in bytes
    pub size: u64,
    /// Structured logical-type annotation, if promoted
    pub logical_type: Option<LogicalType>,
    /// Raw extra attributes, including an unpromoted `logicalType` string.
    /// Some writers still emit annotations (notably `duration`) only in this
    /// raw form, so both signals are kept.
    pub attributes: Map<String, Value>,
}

/// A record definition
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    /// Full name (namespace-qualified when a namespace applies)
    pub name: String,
    /// Documentation string, if declared
    pub doc: Option<String>,
    /// Fields in declared order
    pub fields: Vec<RecordField>,
}

/// A single record field
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Field name
    pub name: String,
    /// Field type
    pub schema: AvroSchema,
    /// Documentation string, if declared
    pub doc: Option<String>,
    /// Declared default value, if any
    pub default: Option<Value>,
}

/// An Avro schema node
///
/// The variant set is closed: every schema the parser accepts is one of
/// these, so the converter can match exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroSchema {
    Null,
    Boolean(Primitive),
    Int(Primitive),
    Long(Primitive),
    Float(Primitive),
    Double(Primitive),
    Bytes(Primitive),
    String(Primitive),
    Enum(EnumSchema),
    Fixed(FixedSchema),
    Array(Box<AvroSchema>),
    Map(Box<AvroSchema>),
    Record(RecordSchema),
    Union(Vec<AvroSchema>),
}

impl AvroSchema {
    /// Create a bare boolean schema
    pub fn boolean() -> Self {
        AvroSchema::Boolean(Primitive::default())
    }

    /// Create a bare int schema
    pub fn int() -> Self {
        AvroSchema::Int(Primitive::default())
    }

    /// Create a bare long schema
    pub fn long() -> Self {
        AvroSchema::Long(Primitive::default())
    }

    /// Create a bare float schema
    pub fn float() -> Self {
        AvroSchema::Float(Primitive::default())
    }

    /// Create a bare double schema
    pub fn double() -> Self {
        AvroSchema::Double(Primitive::default())
    }

    /// Create a bare bytes schema
    pub fn bytes() -> Self {
        AvroSchema::Bytes(Primitive::default())
    }

    /// Create a bare string schema
    pub fn string() -> Self {
        AvroSchema::String(Primitive::default())
    }

    /// Documentation string of this node, if it carries one
    pub fn doc(&self) -> Option<&str> {
        match self {
            AvroSchema::Boolean(p)
            | AvroSchema::Int(p)
            | AvroSchema::Long(p)
            | AvroSchema::Float(p)
            | AvroSchema::Double(p)
            | AvroSchema::Bytes(p)
            | AvroSchema::String(p) => p.doc.as_deref(),
            AvroSchema::Enum(e) => e.doc.as_deref(),
            AvroSchema::Fixed(f) => f.doc.as_deref(),
            AvroSchema::Record(r) => r.doc.as_deref(),
            AvroSchema::Null | AvroSchema::Array(_) | AvroSchema::Map(_) | AvroSchema::Union(_) => {
                None
            }
        }
    }

    /// Structured logical-type annotation of this node, if present
    pub fn logical_type(&self) -> Option<&LogicalType> {
        match self {
            AvroSchema::Boolean(p)
            | AvroSchema::Int(p)
            | AvroSchema::Long(p)
            | AvroSchema::Float(p)
            | AvroSchema::Double(p)
            | AvroSchema::Bytes(p)
            | AvroSchema::String(p) => p.logical_type.as_ref(),
            AvroSchema::Fixed(f) => f.logical_type.as_ref(),
            _ => None,
        }
    }

    /// Whether this node is the null schema
    pub fn is_null(&self) -> bool {
        matches!(self, AvroSchema::Null)
    }

    /// Whether this node is a union containing a null branch
    pub fn is_nullable_union(&self) -> bool {
        matches!(self, AvroSchema::Union(branches) if branches.iter().any(|b| b.is_null()))
    }
}
