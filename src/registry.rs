//! Bundled meta-schemas.
//!
//! The draft-04 core meta-schema and the hyper-schema are compiled in as
//! JSON literals and parsed exactly once, so `$ref` targets pointing into
//! them (`http://json-schema.org/draft-04/schema#/definitions/...`) resolve
//! without any I/O. User schemas are NOT automatically validated against
//! them.

use std::sync::LazyLock;

use crate::schema::Document;

/// Canonical URL of the draft-04 core meta-schema.
pub const SCHEMA_URL: &str = "http://json-schema.org/draft-04/schema";

/// Canonical URL of the bundled hyper-schema. The draft-03 URL is what
/// deployed schemas actually reference, so it is retained as-is.
pub const HYPER_SCHEMA_URL: &str = "http://json-schema.org/draft-03/hyper-schema";

/// Media type registered for JSON Schema documents.
pub const MIME_TYPE: &str = "application/schema+json";

/// The draft-04 core meta-schema, parsed once.
pub fn draft04() -> &'static Document {
    &DRAFT04
}

/// The bundled hyper-schema, parsed once.
pub fn hyper_schema() -> &'static Document {
    &HYPER
}

/// Which bundled document a resolved base URL names, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MetaSchema {
    Draft04,
    Hyper,
}

impl MetaSchema {
    pub(crate) fn document(self) -> &'static Document {
        match self {
            MetaSchema::Draft04 => draft04(),
            MetaSchema::Hyper => hyper_schema(),
        }
    }
}

/// Look up a bundled meta-schema by URL, ignoring a trailing `#`.
pub(crate) fn lookup(base: &str) -> Option<MetaSchema> {
    match base.trim_end_matches('#') {
        SCHEMA_URL => Some(MetaSchema::Draft04),
        HYPER_SCHEMA_URL => Some(MetaSchema::Hyper),
        _ => None,
    }
}

static DRAFT04: LazyLock<Document> =
    LazyLock::new(|| parse_bundled(DRAFT04_SRC, "draft-04 meta-schema"));

static HYPER: LazyLock<Document> = LazyLock::new(|| parse_bundled(HYPER_SRC, "hyper-schema"));

fn parse_bundled(src: &str, what: &str) -> Document {
    // If the bundled schemas fail to parse the build itself is broken, so
    // panicking here is the only sensible move.
    let raw: serde_json::Value = serde_json::from_str(src)
        .unwrap_or_else(|e| panic!("bundled {what} is not valid JSON: {e}"));
    Document::parse(&raw).unwrap_or_else(|e| panic!("bundled {what} does not parse: {e}"))
}

const DRAFT04_SRC: &str = r##"{
  "id": "http://json-schema.org/draft-04/schema#",
  "$schema": "http://json-schema.org/draft-04/schema#",
  "description": "Core schema meta-schema",
  "definitions": {
    "schemaArray": {
      "type": "array",
      "minItems": 1,
      "items": { "$ref": "#" }
    },
    "positiveInteger": {
      "type": "integer",
      "minimum": 0
    },
    "positiveIntegerDefault0": {
      "allOf": [ { "$ref": "#/definitions/positiveInteger" }, { "default": 0 } ]
    },
    "simpleTypes": {
      "enum": [ "array", "boolean", "integer", "null", "number", "object", "string" ]
    },
    "stringArray": {
      "type": "array",
      "items": { "type": "string" },
      "minItems": 1,
      "uniqueItems": true
    }
  },
  "type": "object",
  "properties": {
    "id": {
      "type": "string",
      "format": "uri"
    },
    "$schema": {
      "type": "string",
      "format": "uri"
    },
    "title": {
      "type": "string"
    },
    "description": {
      "type": "string"
    },
    "default": {},
    "multipleOf": {
      "type": "number",
      "minimum": 0,
      "exclusiveMinimum": true
    },
    "maximum": {
      "type": "number"
    },
    "exclusiveMaximum": {
      "type": "boolean",
      "default": false
    },
    "minimum": {
      "type": "number"
    },
    "exclusiveMinimum": {
      "type": "boolean",
      "default": false
    },
    "maxLength": { "$ref": "#/definitions/positiveInteger" },
    "minLength": { "$ref": "#/definitions/positiveIntegerDefault0" },
    "pattern": {
      "type": "string",
      "format": "regex"
    },
    "additionalItems": {
      "anyOf": [
        { "type": "boolean" },
        { "$ref": "#" }
      ],
      "default": {}
    },
    "items": {
      "anyOf": [
        { "$ref": "#" },
        { "$ref": "#/definitions/schemaArray" }
      ],
      "default": {}
    },
    "maxItems": { "$ref": "#/definitions/positiveInteger" },
    "minItems": { "$ref": "#/definitions/positiveIntegerDefault0" },
    "uniqueItems": {
      "type": "boolean",
      "default": false
    },
    "maxProperties": { "$ref": "#/definitions/positiveInteger" },
    "minProperties": { "$ref": "#/definitions/positiveIntegerDefault0" },
    "required": { "$ref": "#/definitions/stringArray" },
    "additionalProperties": {
      "anyOf": [
        { "type": "boolean" },
        { "$ref": "#" }
      ],
      "default": {}
    },
    "definitions": {
      "type": "object",
      "additionalProperties": { "$ref": "#" },
      "default": {}
    },
    "properties": {
      "type": "object",
      "additionalProperties": { "$ref": "#" },
      "default": {}
    },
    "patternProperties": {
      "type": "object",
      "additionalProperties": { "$ref": "#" },
      "default": {}
    },
    "dependencies": {
      "type": "object",
      "additionalProperties": {
        "anyOf": [
          { "$ref": "#" },
          { "$ref": "#/definitions/stringArray" }
        ]
      }
    },
    "enum": {
      "type": "array",
      "minItems": 1,
      "uniqueItems": true
    },
    "type": {
      "anyOf": [
        { "$ref": "#/definitions/simpleTypes" },
        {
          "type": "array",
          "items": { "$ref": "#/definitions/simpleTypes" },
          "minItems": 1,
          "uniqueItems": true
        }
      ]
    },
    "allOf": { "$ref": "#/definitions/schemaArray" },
    "anyOf": { "$ref": "#/definitions/schemaArray" },
    "oneOf": { "$ref": "#/definitions/schemaArray" },
    "not": { "$ref": "#" }
  },
  "dependencies": {
    "exclusiveMaximum": [ "maximum" ],
    "exclusiveMinimum": [ "minimum" ]
  },
  "default": {}
}"##;

const HYPER_SRC: &str = r##"{
  "id": "http://json-schema.org/draft-03/hyper-schema#",
  "$schema": "http://json-schema.org/draft-03/hyper-schema#",
  "properties": {
    "links": {
      "type": "array"
    },
    "fragmentResolution": {
      "type": "string",
      "default": "slash-delimited"
    },
    "root": {
      "type": "boolean",
      "default": false
    },
    "readonly": {
      "type": "boolean",
      "default": false
    },
    "contentEncoding": {
      "type": "string"
    },
    "pathStart": {
      "type": "string",
      "format": "uri"
    },
    "mediaType": {
      "type": "string",
      "format": "media-type"
    },
    "alternate": {
      "type": "array",
      "items": { "$ref": "#" }
    }
  },
  "links": [
    { "href": "{id}", "rel": "self" },
    { "href": "{$ref}", "rel": "full" },
    { "href": "{$schema}", "rel": "describedby" }
  ],
  "fragmentResolution": "slash-delimited",
  "extends": { "$ref": "http://json-schema.org/draft-03/schema#" }
}"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_schemas_parse() {
        assert!(draft04().root().definitions.contains_key("positiveInteger"));
        assert_eq!(draft04().root().id, "http://json-schema.org/draft-04/schema#");
        assert!(hyper_schema().root().extras.contains_key("links"));
    }

    #[test]
    fn lookup_ignores_trailing_fragment_marker() {
        assert_eq!(lookup(SCHEMA_URL), Some(MetaSchema::Draft04));
        assert_eq!(
            lookup("http://json-schema.org/draft-04/schema#"),
            Some(MetaSchema::Draft04)
        );
        assert_eq!(lookup(HYPER_SCHEMA_URL), Some(MetaSchema::Hyper));
        assert_eq!(lookup("http://example.com/schema"), None);
    }
}
