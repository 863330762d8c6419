//! Avro to JSON Schema conversion
//!
//! Converts Apache Avro schemas (`.avsc`) into JSON Schema draft-07
//! documents, one document per source file, preserving documentation,
//! defaults, and logical-type annotations along the way.
//!
//! ## Features
//!
//! - **Full type coverage**: All Avro primitives, records, enums, fixeds, arrays, maps, unions
//! - **Logical types**: date, time, timestamp, uuid, and decimal annotations refine the output
//! - **Nullable shorthand**: `["null", T]` unions become compact two-element `type` arrays
//! - **Batch conversion**: Directory trees convert in one pass, failures isolated per file
//! - **Drift checking**: Stored documents are compared against freshly converted output
//!
//! ## Architecture
//!
//! ```text
//! .avsc text --parser--> AvroSchema --converter--> SchemaDocument --batch--> *.schema.json
//! ```

pub mod avro;
pub mod batch;
pub mod config;
pub mod converter;
pub mod error;
pub mod parser;

pub use avro::{AvroSchema, LogicalType};
pub use batch::{BatchOptions, BatchReport};
pub use config::{ConvertConfig, OutputFormat};
pub use converter::{convert, SchemaDocument, DRAFT7_URI};
pub use error::{ConvertError, Result};
pub use parser::{parse_schema, parse_schema_strict, parse_value};
