//! JSON Schema (Draft-04) validation.
//!
//! Parse a schema document into an immutable tree, then validate decoded
//! JSON values against it:
//! - `$ref` chains resolve lazily against the lexical `id` scope, with the
//!   bundled draft-04 meta-schema available as a reference target.
//! - Every failure is a typed [`Error`] variant; display strings are for
//!   humans only.
//! - Schemas round-trip back to JSON via [`Document::to_value`].
//!
//! ```no_run
//! use serde_json::json;
//!
//! let doc = jscheck::Document::parse(&json!({
//!     "type": "integer",
//!     "minimum": 1,
//! }))?;
//! doc.validate(&json!(5))?;
//! # Ok::<(), jscheck::Error>(())
//! ```

pub mod cli;
pub mod errors;
pub mod extract;
pub mod format;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod serialize;
pub mod validate;
pub mod value;

pub use errors::Error;
pub use registry::{HYPER_SCHEMA_URL, MIME_TYPE, SCHEMA_URL};
pub use schema::{
    Additional, DependencyMap, Document, Format, ItemSpec, OptionalBool, OptionalInt,
    OptionalNumber, PrimitiveType, Schema, SchemaId,
};
