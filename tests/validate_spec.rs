//! End-to-end validation scenarios: one schema, a set of passing instances,
//! a set of failing instances with the exact error expected.

use jscheck::{Document, Error};
use serde_json::{json, Value};

fn doc(v: Value) -> Document {
    Document::parse(&v).unwrap()
}

#[test]
fn numeric_range() {
    let d = doc(json!({
        "type": "number",
        "minimum": 0,
        "maximum": 10,
        "exclusiveMaximum": true,
    }));
    d.validate(&json!(5)).unwrap();
    d.validate(&json!(0)).unwrap();
    assert_eq!(
        d.validate(&json!(10)),
        Err(Error::MaximumValidationFailed {
            observed: 10.0,
            bound: 10.0,
            exclusive: true,
        })
    );
    assert_eq!(
        d.validate(&json!(-1)),
        Err(Error::MinimumValidationFailed {
            observed: -1.0,
            bound: 0.0,
            exclusive: false,
        })
    );
}

#[test]
fn string_length_and_pattern() {
    let d = doc(json!({
        "type": "string",
        "minLength": 2,
        "maxLength": 5,
        "pattern": "^[a-z]+$",
    }));
    d.validate(&json!("abc")).unwrap();
    assert_eq!(
        d.validate(&json!("a")),
        Err(Error::MinLengthValidationFailed {
            observed: 1,
            bound: 2,
        })
    );
    assert_eq!(
        d.validate(&json!("abcdef")),
        Err(Error::MaxLengthValidationFailed {
            observed: 6,
            bound: 5,
        })
    );
    assert_eq!(
        d.validate(&json!("AB")),
        Err(Error::PatternValidationFailed {
            string: "AB".into(),
            pattern: "^[a-z]+$".into(),
        })
    );
}

#[test]
fn tuple_items_with_additional_items_false() {
    let d = doc(json!({
        "type": "array",
        "items": [{"type": "string"}, {"type": "number"}],
        "additionalItems": false,
    }));
    d.validate(&json!(["x", 1])).unwrap();
    assert_eq!(
        d.validate(&json!(["x", 1, 2])),
        Err(Error::ArrayItemValidationFailed)
    );
    assert_eq!(d.validate(&json!(["x", "y"])), Err(Error::InvalidType));
}

#[test]
fn object_required_and_additional_properties_schema() {
    let d = doc(json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}},
        "required": ["a"],
        "additionalProperties": {"type": "string"},
    }));
    d.validate(&json!({"a": 1, "b": "x"})).unwrap();
    assert_eq!(
        d.validate(&json!({"a": 1, "b": 2})),
        Err(Error::InvalidType)
    );
    assert_eq!(
        d.validate(&json!({"b": "x"})),
        Err(Error::RequiredField { name: "a".into() })
    );
}

#[test]
fn one_of_counts_exact_matches() {
    let d = doc(json!({"oneOf": [{"type": "integer"}, {"type": "string"}]}));
    d.validate(&json!(1)).unwrap();
    d.validate(&json!("x")).unwrap();
    assert_eq!(d.validate(&json!(true)), Err(Error::OneOfValidationFailed));
    assert_eq!(d.validate(&json!(1.5)), Err(Error::OneOfValidationFailed));
}

#[test]
fn reference_into_definitions() {
    let d = doc(json!({
        "definitions": {"pos": {"type": "integer", "minimum": 1}},
        "properties": {"n": {"$ref": "#/definitions/pos"}},
    }));
    d.validate(&json!({"n": 5})).unwrap();
    assert_eq!(
        d.validate(&json!({"n": 0})),
        Err(Error::MinimumValidationFailed {
            observed: 0.0,
            bound: 1.0,
            exclusive: false,
        })
    );
}

#[test]
fn enum_subsumption() {
    let members = [json!("red"), json!(2), json!(null), json!([1, 2])];
    let d = doc(json!({"enum": members}));
    for m in &members {
        d.validate(m).unwrap();
    }
    for outside in [json!("blue"), json!(3), json!([2, 1]), json!({})] {
        assert_eq!(d.validate(&outside), Err(Error::InvalidEnum), "{outside}");
    }
}

#[test]
fn required_independence() {
    // presence with a valid value passes regardless of other properties
    let d = doc(json!({
        "properties": {
            "a": {"type": "integer"},
            "b": {"type": "string"},
        },
        "required": ["a"],
    }));
    d.validate(&json!({"a": 1})).unwrap();
    d.validate(&json!({"a": 1, "b": "ok", "c": true})).unwrap();
    assert_eq!(
        d.validate(&json!({})),
        Err(Error::RequiredField { name: "a".into() })
    );
}

#[test]
fn nested_composition_with_references() {
    // a "business card" style composite schema
    let d = doc(json!({
        "id": "http://example.com/card.json",
        "type": "object",
        "definitions": {
            "name": {"type": "string", "minLength": 1},
            "phone": {"type": "string", "pattern": "^[0-9()+ -]+$"},
        },
        "properties": {
            "fullName": {"$ref": "#/definitions/name"},
            "email": {"type": "string", "format": "email"},
            "phones": {
                "type": "array",
                "items": {"$ref": "#/definitions/phone"},
                "uniqueItems": true,
            },
            "website": {"type": "string", "format": "uri"},
        },
        "required": ["fullName"],
        "additionalProperties": false,
    }));

    d.validate(&json!({
        "fullName": "Ada Lovelace",
        "email": "ada@example.com",
        "phones": ["+44 20 1234", "(020) 5678"],
        "website": "http://example.com/ada",
    }))
    .unwrap();

    assert_eq!(
        d.validate(&json!({"email": "ada@example.com"})),
        Err(Error::RequiredField {
            name: "fullName".into()
        })
    );
    assert_eq!(
        d.validate(&json!({"fullName": "Ada", "email": "not-an-email"})),
        Err(Error::InvalidFormat)
    );
    assert_eq!(
        d.validate(&json!({"fullName": "Ada", "twitter": "@ada"})),
        Err(Error::AdditionalProperties)
    );
    assert_eq!(
        d.validate(&json!({"fullName": "Ada", "phones": ["123", "123"]})),
        Err(Error::UniqueItemsValidationFailed)
    );
}

#[test]
fn integer_schema_rejects_fractions() {
    let d = doc(json!({"type": "integer"}));
    d.validate(&json!(3)).unwrap();
    d.validate(&json!(3.0)).unwrap();
    d.validate(&json!(-12)).unwrap();
    assert_eq!(d.validate(&json!(3.5)), Err(Error::InvalidType));
    assert_eq!(d.validate(&json!("3")), Err(Error::InvalidType));
}

#[test]
fn object_property_sizing() {
    let d = doc(json!({"type": "object", "minProperties": 2, "maxProperties": 3}));
    d.validate(&json!({"a": 1, "b": 2})).unwrap();
    d.validate(&json!({"a": 1, "b": 2, "c": 3})).unwrap();
    assert!(d.validate(&json!({"a": 1})).is_err());
    assert!(d.validate(&json!({"a": 1, "b": 2, "c": 3, "d": 4})).is_err());
}

#[test]
fn round_trip_is_stable_after_first_parse() {
    let raw = json!({
        "type": ["object", "null"],
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "scores": {
                "type": "array",
                "items": [{"type": "integer"}],
                "additionalItems": {"type": "number"},
                "uniqueItems": false,
            },
        },
        "required": ["name"],
        "additionalProperties": false,
        "vendorExtension": {"keep": "me"},
    });
    let first = Document::parse(&raw).unwrap().to_value();
    let second = Document::parse(&first).unwrap().to_value();
    assert_eq!(first, second);

    // and both parses validate identically
    let d1 = Document::parse(&raw).unwrap();
    let d2 = Document::parse(&first).unwrap();
    for instance in [
        json!(null),
        json!({"name": "x", "scores": [1, 2.5]}),
        json!({"name": ""}),
        json!({"extra": true, "name": "x"}),
    ] {
        assert_eq!(d1.validate(&instance), d2.validate(&instance), "{instance}");
    }
}

#[test]
fn validating_a_schema_against_the_meta_schema() {
    // the registry exists for $ref targets; it also works as a plain schema
    let meta = jscheck::registry::draft04();
    meta.validate(&json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}},
        "required": ["a"],
    }))
    .unwrap();
    // `type: 12` violates the meta-schema's `type` union
    assert!(meta.validate(&json!({"type": 12})).is_err());
}

#[test]
fn concurrent_validation_shares_one_document() {
    let d = std::sync::Arc::new(doc(json!({
        "definitions": {"leaf": {"type": "integer"}},
        "items": {"$ref": "#/definitions/leaf"},
    })));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let d = d.clone();
            std::thread::spawn(move || {
                for k in 0..50 {
                    d.validate(&json!([i, k])).unwrap();
                    assert!(d.validate(&json!(["x"])).is_err());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
