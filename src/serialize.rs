//! Schema-to-JSON serialization, the inverse of extraction.
//!
//! Absent fields are omitted; presence-gated keywords (`exclusiveMinimum`,
//! `exclusiveMaximum`, `uniqueItems`) only appear when they appeared in the
//! source; the tri-state additional keywords emit `false` in the deny state,
//! the schema in the schema state, and nothing when permissive. After the
//! first parse, serialize-then-parse is idempotent.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::schema::{Additional, Document, ItemSpec, OptionalInt, OptionalNumber, SchemaId};

impl Document {
    /// Serialize the whole document back to a JSON value.
    pub fn to_value(&self) -> Value {
        self.schema_value(self.root_id())
    }

    /// Serialize one node and everything beneath it.
    pub fn schema_value(&self, id: SchemaId) -> Value {
        let s = self.node(id);
        let mut m = Map::new();

        place_string(&mut m, "id", &s.id);
        place_string(&mut m, "title", &s.title);
        place_string(&mut m, "description", &s.description);
        place_string(&mut m, "$schema", &s.schema_ref);
        place_string(&mut m, "$ref", &s.reference);
        if let Some(f) = &s.format {
            m.insert("format".into(), Value::from(f.as_str()));
        }
        if let Some(d) = &s.default {
            m.insert("default".into(), d.clone());
        }
        match s.types.len() {
            0 => {}
            1 => {
                m.insert("type".into(), Value::from(s.types[0].as_str()));
            }
            _ => {
                m.insert(
                    "type".into(),
                    Value::Array(s.types.iter().map(|t| Value::from(t.as_str())).collect()),
                );
            }
        }
        if !s.enum_.is_empty() {
            m.insert("enum".into(), Value::Array(s.enum_.clone()));
        }

        place_number(&mut m, "multipleOf", s.multiple_of);
        place_number(&mut m, "minimum", s.minimum);
        if s.exclusive_minimum.present {
            m.insert("exclusiveMinimum".into(), Value::from(s.exclusive_minimum.get()));
        }
        place_number(&mut m, "maximum", s.maximum);
        if s.exclusive_maximum.present {
            m.insert("exclusiveMaximum".into(), Value::from(s.exclusive_maximum.get()));
        }

        place_int(&mut m, "minLength", s.min_length);
        place_int(&mut m, "maxLength", s.max_length);
        if let Some(rx) = &s.pattern {
            m.insert("pattern".into(), Value::from(rx.as_str()));
        }

        match &s.items {
            None => {}
            Some(ItemSpec::Single(sub)) => {
                m.insert("items".into(), self.schema_value(*sub));
            }
            Some(ItemSpec::Tuple(ids)) => {
                m.insert(
                    "items".into(),
                    Value::Array(ids.iter().map(|&i| self.schema_value(i)).collect()),
                );
            }
        }
        self.place_additional(&mut m, "additionalItems", s.additional_items);
        place_int(&mut m, "minItems", s.min_items);
        place_int(&mut m, "maxItems", s.max_items);
        if s.unique_items.present {
            m.insert("uniqueItems".into(), Value::from(s.unique_items.get()));
        }

        place_int(&mut m, "minProperties", s.min_properties);
        place_int(&mut m, "maxProperties", s.max_properties);
        if !s.required.is_empty() {
            m.insert(
                "required".into(),
                Value::Array(s.required.iter().map(|r| Value::from(r.as_str())).collect()),
            );
        }
        self.place_schema_map(&mut m, "definitions", &s.definitions);
        self.place_schema_map(&mut m, "properties", &s.properties);
        if !s.pattern_properties.is_empty() {
            let mut pm = Map::new();
            for (rx, sub) in &s.pattern_properties {
                pm.insert(rx.as_str().to_string(), self.schema_value(*sub));
            }
            m.insert("patternProperties".into(), Value::Object(pm));
        }
        self.place_additional(&mut m, "additionalProperties", s.additional_properties);
        if !s.dependencies.is_empty() {
            let mut dm = Map::new();
            for (name, list) in &s.dependencies.names {
                dm.insert(
                    name.clone(),
                    Value::Array(list.iter().map(|x| Value::from(x.as_str())).collect()),
                );
            }
            for (name, &sub) in &s.dependencies.schemas {
                dm.insert(name.clone(), self.schema_value(sub));
            }
            m.insert("dependencies".into(), Value::Object(dm));
        }

        self.place_schema_list(&mut m, "allOf", &s.all_of);
        self.place_schema_list(&mut m, "anyOf", &s.any_of);
        self.place_schema_list(&mut m, "oneOf", &s.one_of);
        if let Some(sub) = s.not {
            m.insert("not".into(), self.schema_value(sub));
        }

        for (k, v) in &s.extras {
            m.insert(k.clone(), v.clone());
        }

        Value::Object(m)
    }

    fn place_additional(&self, m: &mut Map<String, Value>, name: &str, state: Additional) {
        match state {
            Additional::Permissive => {}
            Additional::Deny => {
                m.insert(name.into(), Value::Bool(false));
            }
            Additional::Schema(sub) => {
                m.insert(name.into(), self.schema_value(sub));
            }
        }
    }

    fn place_schema_map(
        &self,
        m: &mut Map<String, Value>,
        name: &str,
        entries: &std::collections::BTreeMap<String, SchemaId>,
    ) {
        if entries.is_empty() {
            return;
        }
        let mut out = Map::new();
        for (key, &sub) in entries {
            out.insert(key.clone(), self.schema_value(sub));
        }
        m.insert(name.into(), Value::Object(out));
    }

    fn place_schema_list(&self, m: &mut Map<String, Value>, name: &str, ids: &[SchemaId]) {
        if ids.is_empty() {
            return;
        }
        m.insert(
            name.into(),
            Value::Array(ids.iter().map(|&i| self.schema_value(i)).collect()),
        );
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn place_string(m: &mut Map<String, Value>, name: &str, s: &str) {
    if !s.is_empty() {
        m.insert(name.into(), Value::from(s));
    }
}

fn place_number(m: &mut Map<String, Value>, name: &str, n: OptionalNumber) {
    if !n.present {
        return;
    }
    // Keep whole numbers as integers so the output reads like the input.
    let v = if n.value.fract() == 0.0 && n.value.abs() < 9.007_199_254_740_992e15 {
        Value::from(n.value as i64)
    } else {
        Value::from(n.value)
    };
    m.insert(name.into(), v);
}

fn place_int(m: &mut Map<String, Value>, name: &str, n: OptionalInt) {
    if n.present {
        m.insert(name.into(), Value::from(n.value));
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::Document;
    use serde_json::json;

    fn round(raw: serde_json::Value) -> serde_json::Value {
        Document::parse(&raw).unwrap().to_value()
    }

    #[test]
    fn absent_fields_stay_absent() {
        assert_eq!(round(json!({})), json!({}));
    }

    #[test]
    fn presence_gated_booleans() {
        // an explicit false survives, absence stays absent
        assert_eq!(
            round(json!({"uniqueItems": false})),
            json!({"uniqueItems": false})
        );
        assert_eq!(
            round(json!({"minimum": 5, "exclusiveMinimum": false})),
            json!({"minimum": 5, "exclusiveMinimum": false})
        );
        assert_eq!(round(json!({"minimum": 5})), json!({"minimum": 5}));
    }

    #[test]
    fn type_is_scalar_when_single() {
        assert_eq!(round(json!({"type": "string"})), json!({"type": "string"}));
        assert_eq!(
            round(json!({"type": ["string", "null"]})),
            json!({"type": ["string", "null"]})
        );
    }

    #[test]
    fn items_keep_their_mode() {
        assert_eq!(
            round(json!({"items": {"type": "integer"}})),
            json!({"items": {"type": "integer"}})
        );
        assert_eq!(
            round(json!({"items": [{"type": "integer"}, {"type": "string"}]})),
            json!({"items": [{"type": "integer"}, {"type": "string"}]})
        );
    }

    #[test]
    fn additional_keywords_by_state() {
        assert_eq!(
            round(json!({"additionalProperties": false})),
            json!({"additionalProperties": false})
        );
        assert_eq!(
            round(json!({"additionalProperties": {"type": "string"}})),
            json!({"additionalProperties": {"type": "string"}})
        );
        // permissive (absent or `true`) serializes to nothing
        assert_eq!(round(json!({"additionalProperties": true})), json!({}));
    }

    #[test]
    fn dependencies_merge_back_into_one_map() {
        let raw = json!({
            "dependencies": {
                "a": ["b"],
                "c": {"required": ["d"]},
            }
        });
        assert_eq!(round(raw.clone()), raw);
    }

    #[test]
    fn extras_round_trip_verbatim() {
        let raw = json!({"links": [{"rel": "self", "href": "{id}"}], "type": "object"});
        assert_eq!(round(raw.clone()), raw);
    }

    #[test]
    fn serialize_then_parse_is_idempotent() {
        let schemas = [
            json!({
                "id": "http://example.com/card.json",
                "title": "business card",
                "type": "object",
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "email": {"type": "string", "format": "email"},
                    "age": {"type": "integer", "minimum": 0, "maximum": 150},
                },
                "required": ["name"],
                "patternProperties": {"^x-": {}},
                "additionalProperties": false,
                "definitions": {"tag": {"enum": ["home", "work"]}},
                "dependencies": {"email": ["name"]},
            }),
            json!({
                "items": [{"type": "string"}, {"$ref": "#/definitions/n"}],
                "additionalItems": false,
                "uniqueItems": true,
                "definitions": {"n": {"type": "number", "multipleOf": 0.5}},
            }),
            json!({
                "allOf": [{"minimum": 0}, {"maximum": 10, "exclusiveMaximum": true}],
                "not": {"enum": [7]},
            }),
        ];
        for raw in schemas {
            let first = Document::parse(&raw).unwrap().to_value();
            let second = Document::parse(&first).unwrap().to_value();
            assert_eq!(first, second);
        }
    }
}
