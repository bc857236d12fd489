//! In-memory model of a Draft-04 schema document.
//!
//! The whole document lives in a flat arena: [`Document`] owns every node,
//! and schema-to-schema edges (properties, items, composition lists, parent
//! back-links) are [`SchemaId`] indices into it. After the parser's linkage
//! pass the arena is immutable; the only mutable state is the `$ref`
//! resolution cache, behind a mutex.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use regex::Regex;
use serde_json::Value;

use crate::errors::Error;
use crate::resolve::Target;

// ---------------------------- Tri-state fields ---------------------------- //

// Draft-04 distinguishes "keyword absent" from "keyword present with its
// default value", so plain Option<f64> fields are not enough: serialization
// and the additionalProperties semantics both need the presence bit.

/// A numeric keyword that remembers whether it appeared in the source.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OptionalNumber {
    pub value: f64,
    pub present: bool,
}

/// An integer-valued keyword that remembers whether it appeared in the source.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OptionalInt {
    pub value: i64,
    pub present: bool,
}

/// A boolean keyword with a draft-defined default.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OptionalBool {
    pub value: bool,
    pub default: bool,
    pub present: bool,
}

impl OptionalBool {
    /// The effective value: explicit when present, the draft default otherwise.
    pub fn get(&self) -> bool {
        if self.present {
            self.value
        } else {
            self.default
        }
    }
}

// ----------------------------- Primitive types ---------------------------- //

/// The closed set of Draft-04 primitive type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Null,
    Integer,
    String,
    Object,
    Array,
    Boolean,
    Number,
}

impl PrimitiveType {
    pub fn from_keyword(s: &str) -> Option<PrimitiveType> {
        match s {
            "null" => Some(PrimitiveType::Null),
            "integer" => Some(PrimitiveType::Integer),
            "string" => Some(PrimitiveType::String),
            "object" => Some(PrimitiveType::Object),
            "array" => Some(PrimitiveType::Array),
            "boolean" => Some(PrimitiveType::Boolean),
            "number" => Some(PrimitiveType::Number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Null => "null",
            PrimitiveType::Integer => "integer",
            PrimitiveType::String => "string",
            PrimitiveType::Object => "object",
            PrimitiveType::Array => "array",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Number => "number",
        }
    }
}

/// The `format` keyword. Unknown format names are retained verbatim and
/// rejected only when an instance actually reaches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    DateTime,
    Email,
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    Other(String),
}

impl Format {
    pub fn from_keyword(s: &str) -> Format {
        match s {
            "date-time" => Format::DateTime,
            "email" => Format::Email,
            "hostname" => Format::Hostname,
            "ipv4" => Format::Ipv4,
            "ipv6" => Format::Ipv6,
            "uri" => Format::Uri,
            other => Format::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Format::DateTime => "date-time",
            Format::Email => "email",
            Format::Hostname => "hostname",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::Uri => "uri",
            Format::Other(s) => s,
        }
    }
}

// ----------------------------- Schema entities ---------------------------- //

/// Index of a schema node within its [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(pub(crate) u32);

/// The `items` keyword: one schema for every element, or one schema per
/// position with `additionalItems` governing the overflow.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemSpec {
    Single(SchemaId),
    Tuple(Vec<SchemaId>),
}

/// The three observable states of `additionalItems` / `additionalProperties`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Additional {
    /// Keyword absent or `true`: anything goes.
    #[default]
    Permissive,
    /// Explicit `false`: whatever falls through is rejected.
    Deny,
    /// A schema the "additional" element or property must satisfy.
    Schema(SchemaId),
}

/// The `dependencies` keyword. A property name maps either to other names
/// that must co-occur with it, or to a schema the whole instance must then
/// satisfy.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DependencyMap {
    pub names: BTreeMap<String, Vec<String>>,
    pub schemas: BTreeMap<String, SchemaId>,
}

impl DependencyMap {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.schemas.is_empty()
    }
}

/// One schema node. Empty strings mean "absent" for the identification
/// fields, matching how the keywords behave on the wire.
#[derive(Debug, Default, Clone)]
pub struct Schema {
    pub(crate) parent: Option<SchemaId>,

    pub id: String,
    pub title: String,
    pub description: String,
    /// The `$schema` declaration.
    pub schema_ref: String,
    /// The `$ref` keyword; when non-empty this node stands for another schema.
    pub reference: String,
    pub format: Option<Format>,
    pub default: Option<Value>,
    /// The `type` keyword; empty means any kind is accepted.
    pub types: Vec<PrimitiveType>,
    pub definitions: BTreeMap<String, SchemaId>,

    pub multiple_of: OptionalNumber,
    pub minimum: OptionalNumber,
    pub maximum: OptionalNumber,
    pub exclusive_minimum: OptionalBool,
    pub exclusive_maximum: OptionalBool,

    pub min_length: OptionalInt,
    pub max_length: OptionalInt,
    pub pattern: Option<Regex>,

    pub items: Option<ItemSpec>,
    pub additional_items: Additional,
    pub min_items: OptionalInt,
    pub max_items: OptionalInt,
    pub unique_items: OptionalBool,

    pub min_properties: OptionalInt,
    pub max_properties: OptionalInt,
    pub required: Vec<String>,
    pub properties: BTreeMap<String, SchemaId>,
    /// Ordered by pattern source text, so evaluation and serialization are
    /// deterministic.
    pub pattern_properties: Vec<(Regex, SchemaId)>,
    pub additional_properties: Additional,
    pub dependencies: DependencyMap,

    pub enum_: Vec<Value>,
    pub all_of: Vec<SchemaId>,
    pub any_of: Vec<SchemaId>,
    pub one_of: Vec<SchemaId>,
    pub not: Option<SchemaId>,

    /// Unrecognized keys, retained verbatim for round-trips (hyper-schema
    /// keywords like `links` ride through here).
    pub extras: BTreeMap<String, Value>,
}

impl Schema {
    pub fn new() -> Schema {
        Schema::default()
    }

    pub fn parent(&self) -> Option<SchemaId> {
        self.parent
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Every directly nested schema, in a fixed walk order. Used by the
    /// parent-linkage pass and by nothing else.
    pub(crate) fn children(&self) -> Vec<SchemaId> {
        let mut out = Vec::new();
        out.extend(self.definitions.values().copied());
        out.extend(self.properties.values().copied());
        out.extend(self.pattern_properties.iter().map(|(_, id)| *id));
        match &self.items {
            Some(ItemSpec::Single(id)) => out.push(*id),
            Some(ItemSpec::Tuple(ids)) => out.extend(ids.iter().copied()),
            None => {}
        }
        if let Additional::Schema(id) = self.additional_items {
            out.push(id);
        }
        if let Additional::Schema(id) = self.additional_properties {
            out.push(id);
        }
        out.extend(self.dependencies.schemas.values().copied());
        out.extend(self.all_of.iter().copied());
        out.extend(self.any_of.iter().copied());
        out.extend(self.one_of.iter().copied());
        if let Some(id) = self.not {
            out.push(id);
        }
        out
    }
}

// -------------------------------- Document -------------------------------- //

/// An immutable tree of schema nodes plus the per-root `$ref` cache.
///
/// Safe to share across threads: validation never mutates the tree, and the
/// cache is behind a mutex that is only held for lookups and inserts, never
/// across recursive resolution.
#[derive(Debug)]
pub struct Document {
    pub(crate) nodes: Vec<Schema>,
    root: SchemaId,
    pub(crate) resolved: Mutex<HashMap<String, Result<Target, Error>>>,
}

impl Document {
    pub(crate) fn new(nodes: Vec<Schema>, root: SchemaId) -> Document {
        Document {
            nodes,
            root,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Lift a decoded JSON value (which must be an object) into a schema
    /// tree. See [`crate::extract`] for the per-keyword contract.
    pub fn parse(raw: &Value) -> Result<Document, Error> {
        crate::extract::parse_document(raw)
    }

    pub fn root_id(&self) -> SchemaId {
        self.root
    }

    pub fn root(&self) -> &Schema {
        self.node(self.root)
    }

    pub fn node(&self, id: SchemaId) -> &Schema {
        &self.nodes[id.0 as usize]
    }

    /// The resolution scope of a node: its own `id` if non-empty, else the
    /// nearest ancestor's, else the empty string at the root.
    pub fn scope(&self, id: SchemaId) -> &str {
        let mut cur = id;
        loop {
            let node = self.node(cur);
            if !node.id.is_empty() {
                return &node.id;
            }
            match node.parent {
                Some(p) => cur = p,
                None => return "",
            }
        }
    }
}
