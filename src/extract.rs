//! Lifting decoded JSON maps into the schema model.
//!
//! Every recognized keyword gets its shape checked as it is pulled out of
//! the map; anything wrong is reported as `Extract { field, cause }` so the
//! caller can pinpoint the offending keyword. Unrecognized keys are kept
//! verbatim in `extras`. Once every node exists, a final pass links children
//! to parents so scope resolution can walk upward.

use regex::Regex;
use serde_json::{Map, Value};

use crate::errors::Error;
use crate::schema::{
    Additional, DependencyMap, Document, Format, ItemSpec, OptionalBool, OptionalInt,
    OptionalNumber, PrimitiveType, Schema, SchemaId,
};
use crate::value::{as_f64, kind_name};

/// Keys the parser understands; everything else lands in `extras`.
const KNOWN_FIELDS: &[&str] = &[
    "id",
    "title",
    "description",
    "required",
    "$schema",
    "$ref",
    "format",
    "enum",
    "default",
    "type",
    "definitions",
    "items",
    "pattern",
    "minLength",
    "maxLength",
    "minItems",
    "maxItems",
    "uniqueItems",
    "maxProperties",
    "minProperties",
    "minimum",
    "exclusiveMinimum",
    "maximum",
    "exclusiveMaximum",
    "multipleOf",
    "properties",
    "dependencies",
    "additionalItems",
    "additionalProperties",
    "patternProperties",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
];

/// Parse a decoded JSON value into a schema document.
pub fn parse_document(raw: &Value) -> Result<Document, Error> {
    let Value::Object(m) = raw else {
        return Err(Error::invalid_field_msg(
            "schema",
            kind_name(raw),
            "schema document must be an object",
        ));
    };

    let mut ex = Extractor { nodes: Vec::new() };
    let root = ex.extract_schema(m)?;
    let mut nodes = ex.nodes;
    link_parents(&mut nodes, root);
    Ok(Document::new(nodes, root))
}

/// Walk the finished tree and point every child back at its parent. This is
/// the only mutation the tree ever sees after extraction.
fn link_parents(nodes: &mut [Schema], root: SchemaId) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        for child in nodes[id.0 as usize].children() {
            nodes[child.0 as usize].parent = Some(id);
            stack.push(child);
        }
    }
}

// ------------------------------- Extractor -------------------------------- //

struct Extractor {
    nodes: Vec<Schema>,
}

impl Extractor {
    fn alloc(&mut self, s: Schema) -> SchemaId {
        let id = SchemaId(self.nodes.len() as u32);
        self.nodes.push(s);
        id
    }

    fn extract_schema(&mut self, m: &Map<String, Value>) -> Result<SchemaId, Error> {
        let mut s = Schema::new();

        s.id = extract_string(m, "id").map_err(|e| Error::extract("id", e))?;
        s.title = extract_string(m, "title").map_err(|e| Error::extract("title", e))?;
        s.description =
            extract_string(m, "description").map_err(|e| Error::extract("description", e))?;
        s.required = extract_required(m).map_err(|e| Error::extract("required", e))?;
        s.schema_ref = extract_string(m, "$schema").map_err(|e| Error::extract("$schema", e))?;
        s.reference = extract_string(m, "$ref").map_err(|e| Error::extract("$ref", e))?;
        s.format = extract_format(m).map_err(|e| Error::extract("format", e))?;
        s.enum_ = extract_value_list(m, "enum").map_err(|e| Error::extract("enum", e))?;
        s.default = m.get("default").cloned();
        s.types = extract_types(m).map_err(|e| Error::extract("type", e))?;
        s.definitions = self
            .extract_schema_map(m, "definitions")
            .map_err(|e| Error::extract("definitions", e))?;
        s.items = self
            .extract_items(m)
            .map_err(|e| Error::extract("items", e))?;
        s.pattern = extract_regex(m, "pattern").map_err(|e| Error::extract("pattern", e))?;
        s.min_length = extract_int(m, "minLength").map_err(|e| Error::extract("minLength", e))?;
        s.max_length = extract_int(m, "maxLength").map_err(|e| Error::extract("maxLength", e))?;
        s.min_items = extract_int(m, "minItems").map_err(|e| Error::extract("minItems", e))?;
        s.max_items = extract_int(m, "maxItems").map_err(|e| Error::extract("maxItems", e))?;
        s.unique_items =
            extract_bool(m, "uniqueItems", false).map_err(|e| Error::extract("uniqueItems", e))?;
        s.max_properties =
            extract_int(m, "maxProperties").map_err(|e| Error::extract("maxProperties", e))?;
        s.min_properties =
            extract_int(m, "minProperties").map_err(|e| Error::extract("minProperties", e))?;
        s.minimum = extract_number(m, "minimum").map_err(|e| Error::extract("minimum", e))?;
        s.exclusive_minimum = extract_bool(m, "exclusiveMinimum", false)
            .map_err(|e| Error::extract("exclusiveMinimum", e))?;
        s.maximum = extract_number(m, "maximum").map_err(|e| Error::extract("maximum", e))?;
        s.exclusive_maximum = extract_bool(m, "exclusiveMaximum", false)
            .map_err(|e| Error::extract("exclusiveMaximum", e))?;
        s.multiple_of = extract_multiple_of(m).map_err(|e| Error::extract("multipleOf", e))?;
        s.properties = self
            .extract_schema_map(m, "properties")
            .map_err(|e| Error::extract("properties", e))?;
        s.dependencies = self
            .extract_dependencies(m)
            .map_err(|e| Error::extract("dependencies", e))?;
        s.additional_items = self
            .extract_additional(m, "additionalItems")
            .map_err(|e| Error::extract("additionalItems", e))?;
        s.additional_properties = self
            .extract_additional(m, "additionalProperties")
            .map_err(|e| Error::extract("additionalProperties", e))?;
        s.pattern_properties = self
            .extract_pattern_properties(m)
            .map_err(|e| Error::extract("patternProperties", e))?;
        s.all_of = self
            .extract_schema_list(m, "allOf")
            .map_err(|e| Error::extract("allOf", e))?;
        s.any_of = self
            .extract_schema_list(m, "anyOf")
            .map_err(|e| Error::extract("anyOf", e))?;
        s.one_of = self
            .extract_schema_list(m, "oneOf")
            .map_err(|e| Error::extract("oneOf", e))?;
        s.not = self.extract_not(m).map_err(|e| Error::extract("not", e))?;

        for (k, v) in m {
            if !KNOWN_FIELDS.contains(&k.as_str()) {
                s.extras.insert(k.clone(), v.clone());
            }
        }

        Ok(self.alloc(s))
    }

    fn extract_subschema(&mut self, v: &Value, name: &str) -> Result<SchemaId, Error> {
        match v {
            Value::Object(sub) => self.extract_schema(sub),
            other => Err(Error::invalid_field(name, kind_name(other))),
        }
    }

    fn extract_schema_map(
        &mut self,
        m: &Map<String, Value>,
        name: &str,
    ) -> Result<std::collections::BTreeMap<String, SchemaId>, Error> {
        let mut out = std::collections::BTreeMap::new();
        let Some(v) = m.get(name) else {
            return Ok(out);
        };
        let Value::Object(entries) = v else {
            return Err(Error::invalid_field(name, kind_name(v)));
        };
        for (key, entry) in entries {
            out.insert(key.clone(), self.extract_subschema(entry, name)?);
        }
        Ok(out)
    }

    fn extract_items(&mut self, m: &Map<String, Value>) -> Result<Option<ItemSpec>, Error> {
        match m.get("items") {
            None => Ok(None),
            Some(Value::Object(sub)) => Ok(Some(ItemSpec::Single(self.extract_schema(sub)?))),
            Some(Value::Array(xs)) => {
                let mut ids = Vec::with_capacity(xs.len());
                for x in xs {
                    ids.push(self.extract_subschema(x, "items")?);
                }
                Ok(Some(ItemSpec::Tuple(ids)))
            }
            Some(other) => Err(Error::invalid_field("items", kind_name(other))),
        }
    }

    fn extract_additional(
        &mut self,
        m: &Map<String, Value>,
        name: &str,
    ) -> Result<Additional, Error> {
        match m.get(name) {
            // Absent and explicit `true` both mean the empty schema.
            None | Some(Value::Bool(true)) => Ok(Additional::Permissive),
            Some(Value::Bool(false)) => Ok(Additional::Deny),
            Some(Value::Object(sub)) => Ok(Additional::Schema(self.extract_schema(sub)?)),
            Some(other) => Err(Error::invalid_field(name, kind_name(other))),
        }
    }

    fn extract_pattern_properties(
        &mut self,
        m: &Map<String, Value>,
    ) -> Result<Vec<(Regex, SchemaId)>, Error> {
        let Some(v) = m.get("patternProperties") else {
            return Ok(Vec::new());
        };
        let Value::Object(entries) = v else {
            return Err(Error::invalid_field("patternProperties", kind_name(v)));
        };
        // serde_json maps iterate key-sorted, so this list is ordered by
        // pattern source text.
        let mut out = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            let rx = compile_regex("patternProperties", key)?;
            out.push((rx, self.extract_subschema(entry, "patternProperties")?));
        }
        Ok(out)
    }

    fn extract_dependencies(&mut self, m: &Map<String, Value>) -> Result<DependencyMap, Error> {
        let mut out = DependencyMap::default();
        let Some(v) = m.get("dependencies") else {
            return Ok(out);
        };
        let Value::Object(entries) = v else {
            return Err(Error::invalid_field("dependencies", kind_name(v)));
        };
        for (key, entry) in entries {
            match entry {
                Value::Array(_) => {
                    out.names.insert(key.clone(), convert_string_list(entry)?);
                }
                Value::Object(sub) => {
                    out.schemas.insert(key.clone(), self.extract_schema(sub)?);
                }
                _ => return Err(Error::DependencyItemType),
            }
        }
        Ok(out)
    }

    fn extract_schema_list(
        &mut self,
        m: &Map<String, Value>,
        name: &str,
    ) -> Result<Vec<SchemaId>, Error> {
        match m.get(name) {
            None => Ok(Vec::new()),
            Some(Value::Array(xs)) => {
                if xs.is_empty() {
                    return Err(Error::invalid_field_msg(
                        name,
                        "array",
                        "must contain at least one schema",
                    ));
                }
                let mut ids = Vec::with_capacity(xs.len());
                for x in xs {
                    match x {
                        Value::Object(sub) => ids.push(self.extract_schema(sub)?),
                        _ => return Err(Error::InvalidSchemaList),
                    }
                }
                Ok(ids)
            }
            // Historical tolerance: a lone schema object stands for a
            // one-element list.
            Some(Value::Object(sub)) => Ok(vec![self.extract_schema(sub)?]),
            Some(_) => Err(Error::InvalidSchemaList),
        }
    }

    fn extract_not(&mut self, m: &Map<String, Value>) -> Result<Option<SchemaId>, Error> {
        match m.get("not") {
            None => Ok(None),
            Some(Value::Object(sub)) => Ok(Some(self.extract_schema(sub)?)),
            Some(other) => Err(Error::invalid_field("not", kind_name(other))),
        }
    }
}

// ---------------------------- Field primitives ---------------------------- //

fn extract_string(m: &Map<String, Value>, name: &str) -> Result<String, Error> {
    match m.get(name) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(Error::invalid_field(name, kind_name(other))),
    }
}

fn extract_number(m: &Map<String, Value>, name: &str) -> Result<OptionalNumber, Error> {
    match m.get(name) {
        None => Ok(OptionalNumber::default()),
        Some(Value::Number(n)) => Ok(OptionalNumber {
            value: as_f64(n),
            present: true,
        }),
        Some(other) => Err(Error::invalid_field(name, kind_name(other))),
    }
}

fn extract_multiple_of(m: &Map<String, Value>) -> Result<OptionalNumber, Error> {
    let n = extract_number(m, "multipleOf")?;
    if n.present && n.value <= 0.0 {
        return Err(Error::invalid_field_msg(
            "multipleOf",
            "number",
            "must be greater than zero",
        ));
    }
    Ok(n)
}

fn extract_int(m: &Map<String, Value>, name: &str) -> Result<OptionalInt, Error> {
    match m.get(name) {
        None => Ok(OptionalInt::default()),
        Some(Value::Number(n)) => {
            let value = as_f64(n).floor() as i64;
            if value < 0 {
                return Err(Error::invalid_field_msg(name, "number", "must not be negative"));
            }
            Ok(OptionalInt {
                value,
                present: true,
            })
        }
        Some(other) => Err(Error::invalid_field(name, kind_name(other))),
    }
}

fn extract_bool(m: &Map<String, Value>, name: &str, default: bool) -> Result<OptionalBool, Error> {
    match m.get(name) {
        None => Ok(OptionalBool {
            value: false,
            default,
            present: false,
        }),
        Some(Value::Bool(b)) => Ok(OptionalBool {
            value: *b,
            default,
            present: true,
        }),
        Some(other) => Err(Error::invalid_field(name, kind_name(other))),
    }
}

fn convert_string_list(v: &Value) -> Result<Vec<String>, Error> {
    match v {
        // One bare string stands for a one-element list; real-world schemas
        // rely on this.
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(xs) => xs
            .iter()
            .map(|x| match x {
                Value::String(s) => Ok(s.clone()),
                _ => Err(Error::InvalidStringArray),
            })
            .collect(),
        _ => Err(Error::InvalidStringArray),
    }
}

fn extract_required(m: &Map<String, Value>) -> Result<Vec<String>, Error> {
    let Some(v) = m.get("required") else {
        return Ok(Vec::new());
    };
    let names = convert_string_list(v)?;
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(Error::invalid_field_msg(
                "required",
                "array",
                &format!("duplicate property name '{name}'"),
            ));
        }
    }
    Ok(names)
}

fn extract_format(m: &Map<String, Value>) -> Result<Option<Format>, Error> {
    let raw = extract_string(m, "format")?;
    if raw.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Format::from_keyword(&raw)))
    }
}

fn extract_value_list(m: &Map<String, Value>, name: &str) -> Result<Vec<Value>, Error> {
    match m.get(name) {
        None => Ok(Vec::new()),
        Some(Value::Array(xs)) => Ok(xs.clone()),
        Some(other) => Err(Error::invalid_field(name, kind_name(other))),
    }
}

fn extract_types(m: &Map<String, Value>) -> Result<Vec<PrimitiveType>, Error> {
    let Some(v) = m.get("type") else {
        return Ok(Vec::new());
    };
    match v {
        Value::String(s) => Ok(vec![primitive_from_keyword(s)?]),
        Value::Array(xs) => xs
            .iter()
            .map(|x| match x {
                Value::String(s) => primitive_from_keyword(s),
                other => Err(Error::invalid_field("type", kind_name(other))),
            })
            .collect(),
        other => Err(Error::invalid_field("type", kind_name(other))),
    }
}

fn primitive_from_keyword(s: &str) -> Result<PrimitiveType, Error> {
    PrimitiveType::from_keyword(s).ok_or_else(|| {
        Error::invalid_field_msg("type", "string", &format!("unknown primitive type '{s}'"))
    })
}

fn extract_regex(m: &Map<String, Value>, name: &str) -> Result<Option<Regex>, Error> {
    match m.get(name) {
        None => Ok(None),
        Some(Value::String(src)) => Ok(Some(compile_regex(name, src)?)),
        Some(other) => Err(Error::invalid_field(name, kind_name(other))),
    }
}

fn compile_regex(name: &str, src: &str) -> Result<Regex, Error> {
    Regex::new(src).map_err(|e| {
        Error::invalid_field_msg(name, "string", &format!("invalid regular expression: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Additional;
    use serde_json::json;

    fn parse(v: Value) -> Document {
        Document::parse(&v).unwrap()
    }

    #[test]
    fn empty_schema_has_permissive_defaults() {
        let doc = parse(json!({}));
        let root = doc.root();
        assert!(root.types.is_empty());
        assert_eq!(root.additional_items, Additional::Permissive);
        assert_eq!(root.additional_properties, Additional::Permissive);
        assert!(!root.minimum.present);
        assert!(!root.unique_items.get());
    }

    #[test]
    fn type_accepts_scalar_and_array() {
        let doc = parse(json!({"type": "string"}));
        assert_eq!(doc.root().types, vec![PrimitiveType::String]);

        let doc = parse(json!({"type": ["integer", "null"]}));
        assert_eq!(
            doc.root().types,
            vec![PrimitiveType::Integer, PrimitiveType::Null]
        );

        let err = Document::parse(&json!({"type": "any"})).unwrap_err();
        assert_eq!(err.field(), Some("type"));
    }

    #[test]
    fn required_tolerates_bare_string_and_rejects_duplicates() {
        let doc = parse(json!({"required": "name"}));
        assert_eq!(doc.root().required, vec!["name"]);

        let err = Document::parse(&json!({"required": ["a", "b", "a"]})).unwrap_err();
        assert_eq!(err.field(), Some("required"));

        let err = Document::parse(&json!({"required": [1]})).unwrap_err();
        assert!(matches!(
            err,
            Error::Extract { ref cause, .. } if **cause == Error::InvalidStringArray
        ));
    }

    #[test]
    fn multiple_of_must_be_positive() {
        for bad in [json!({"multipleOf": 0}), json!({"multipleOf": -2.5})] {
            let err = Document::parse(&bad).unwrap_err();
            assert_eq!(err.field(), Some("multipleOf"));
        }
        assert!(parse(json!({"multipleOf": 0.5})).root().multiple_of.present);
    }

    #[test]
    fn integer_fields_floor_and_reject_negatives() {
        let doc = parse(json!({"minLength": 2.9}));
        assert_eq!(doc.root().min_length.value, 2);

        let err = Document::parse(&json!({"maxItems": -1})).unwrap_err();
        assert_eq!(err.field(), Some("maxItems"));
    }

    #[test]
    fn items_discriminates_tuple_and_single_mode() {
        let doc = parse(json!({"items": {"type": "string"}}));
        assert!(matches!(doc.root().items, Some(ItemSpec::Single(_))));

        let doc = parse(json!({"items": [{"type": "string"}, {"type": "number"}]}));
        match &doc.root().items {
            Some(ItemSpec::Tuple(ids)) => assert_eq!(ids.len(), 2),
            other => panic!("expected tuple mode, got {other:?}"),
        }

        let err = Document::parse(&json!({"items": 3})).unwrap_err();
        assert_eq!(err.field(), Some("items"));
    }

    #[test]
    fn additional_properties_tri_state() {
        assert_eq!(
            parse(json!({})).root().additional_properties,
            Additional::Permissive
        );
        assert_eq!(
            parse(json!({"additionalProperties": true}))
                .root()
                .additional_properties,
            Additional::Permissive
        );
        assert_eq!(
            parse(json!({"additionalProperties": false}))
                .root()
                .additional_properties,
            Additional::Deny
        );
        assert!(matches!(
            parse(json!({"additionalProperties": {"type": "string"}}))
                .root()
                .additional_properties,
            Additional::Schema(_)
        ));
    }

    #[test]
    fn dependencies_discriminate_names_and_schemas() {
        let doc = parse(json!({
            "dependencies": {
                "a": ["b", "c"],
                "d": {"required": ["e"]},
            }
        }));
        let deps = &doc.root().dependencies;
        assert_eq!(deps.names["a"], vec!["b", "c"]);
        assert!(deps.schemas.contains_key("d"));

        let err = Document::parse(&json!({"dependencies": {"a": 1}})).unwrap_err();
        assert!(matches!(
            err,
            Error::Extract { ref cause, .. } if **cause == Error::DependencyItemType
        ));
    }

    #[test]
    fn pattern_properties_must_compile() {
        let err = Document::parse(&json!({"patternProperties": {"[": {}}})).unwrap_err();
        assert_eq!(err.field(), Some("patternProperties"));
    }

    #[test]
    fn composition_lists_reject_empty_and_accept_lone_objects() {
        let err = Document::parse(&json!({"allOf": []})).unwrap_err();
        assert_eq!(err.field(), Some("allOf"));

        let doc = parse(json!({"anyOf": {"type": "string"}}));
        assert_eq!(doc.root().any_of.len(), 1);
    }

    #[test]
    fn exclusive_bounds_require_exact_camel_case() {
        // A lowercased key is not the draft-04 keyword; it rides along as an
        // extra instead of toggling the bound.
        let doc = parse(json!({"minimum": 5, "exclusiveminimum": true}));
        assert!(!doc.root().exclusive_minimum.get());
        assert!(doc.root().extras.contains_key("exclusiveminimum"));

        let doc = parse(json!({"minimum": 5, "exclusiveMinimum": true}));
        assert!(doc.root().exclusive_minimum.get());
    }

    #[test]
    fn extras_are_retained_verbatim() {
        let doc = parse(json!({"links": [{"rel": "self"}], "readOnly": true}));
        assert_eq!(doc.root().extras["links"], json!([{"rel": "self"}]));
        assert_eq!(doc.root().extras["readOnly"], json!(true));
    }

    #[test]
    fn parent_links_give_nested_nodes_the_root_scope() {
        let doc = parse(json!({
            "id": "http://example.com/base.json",
            "definitions": {
                "inner": {"properties": {"deep": {"type": "string"}}}
            }
        }));
        let inner = doc.root().definitions["inner"];
        let deep = doc.node(inner).properties["deep"];
        assert_eq!(doc.scope(deep), "http://example.com/base.json");
        assert_eq!(doc.node(inner).parent(), Some(doc.root_id()));
    }
}
