//! Purpose: Lock the value deserializer contract against wire-level fixtures.
//! Exports: Integration tests only (no runtime exports).
//! Role: Exercise the public API the way protocol-result handlers use it.
//! Invariants: Absent input and unsupported tags yield `None` with exactly one diagnostic.
//! Invariants: Only `UnsupportedType` is absorbed; malformed payloads surface as errors.

use std::cell::RefCell;

use bidival::api::{
    DeserializedValue, Deserializer, Diagnostics, ErrorKind, SerializedValue, deserialize,
    serialize, serialized_value_from_str,
};
use num_bigint::BigInt;
use serde_json::{Value, json};

#[derive(Default)]
struct Recorder {
    messages: RefCell<Vec<String>>,
}

impl Diagnostics for Recorder {
    fn debug_error(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

fn wire(value: Value) -> SerializedValue {
    serde_json::from_value(value).expect("wire value")
}

fn decode(value: Value) -> DeserializedValue {
    deserialize(Some(wire(value)))
        .expect("no fault")
        .expect("present")
}

fn decode_number(sentinel: &str) -> f64 {
    match decode(json!({"type": "number", "value": sentinel})) {
        DeserializedValue::Number(value) => value,
        other => panic!("expected number, got {other:?}"),
    }
}

#[test]
fn numeric_sentinels_decode_to_special_values() {
    let neg_zero = decode_number("-0");
    assert_eq!(neg_zero, 0.0);
    assert!(neg_zero.is_sign_negative());
    assert!(decode_number("NaN").is_nan());
    assert_eq!(decode_number("Infinity"), f64::INFINITY);
    assert_eq!(decode_number("-Infinity"), f64::NEG_INFINITY);
}

#[test]
fn unknown_numeric_strings_pass_through_unchanged() {
    assert_eq!(
        decode(json!({"type": "number", "value": "0x10"})),
        DeserializedValue::String("0x10".to_string())
    );
}

#[test]
fn absent_input_is_logged_once_and_not_a_fault() {
    let recorder = Recorder::default();
    let deserializer = Deserializer::with_diagnostics(&recorder);
    assert!(deserializer.deserialize(None).expect("no fault").is_none());
    assert_eq!(recorder.messages.borrow().len(), 1);
}

#[test]
fn array_preserves_order() {
    assert_eq!(
        decode(json!({"type": "array", "value": [
            {"type": "number", "value": 1},
            {"type": "string", "value": "a"}
        ]})),
        DeserializedValue::Array(vec![
            DeserializedValue::Number(1.0),
            DeserializedValue::String("a".to_string()),
        ])
    );
}

#[test]
fn map_decodes_to_generic_mapping() {
    let value = decode(json!({"type": "map", "value": [
        [{"type": "string", "value": "k"}, {"type": "number", "value": 2}]
    ]}));
    let DeserializedValue::Map(map) = value else {
        panic!("expected a generic map, got {value:?}");
    };
    assert_eq!(map.len(), 1);
    assert_eq!(
        map.get(&DeserializedValue::String("k".to_string())),
        Some(&DeserializedValue::Number(2.0))
    );
}

#[test]
fn object_decodes_to_string_keyed_mapping() {
    let value = decode(json!({"type": "object", "value": [
        ["k", {"type": "boolean", "value": true}]
    ]}));
    let DeserializedValue::Object(object) = value else {
        panic!("expected an object, got {value:?}");
    };
    assert_eq!(object.len(), 1);
    assert_eq!(object.get("k"), Some(&DeserializedValue::Boolean(true)));
}

#[test]
fn promise_is_always_an_empty_object() {
    for input in [
        json!({"type": "promise"}),
        json!({"type": "promise", "value": {"resolved": 5}}),
        json!({"type": "promise", "handle": "h-1", "value": [1, 2, 3]}),
    ] {
        assert_eq!(decode(input), DeserializedValue::empty_object());
    }
}

#[test]
fn unsupported_tag_is_absorbed_with_one_diagnostic() {
    let recorder = Recorder::default();
    let deserializer = Deserializer::with_diagnostics(&recorder);
    let value = deserializer
        .deserialize(Some(wire(json!({"type": "bogus-tag"}))))
        .expect("no fault");
    assert!(value.is_none());
    assert_eq!(
        *recorder.messages.borrow(),
        ["Deserialization of type bogus-tag not supported."]
    );
}

#[test]
fn unsupported_tag_deep_inside_composite_is_absorbed() {
    let recorder = Recorder::default();
    let deserializer = Deserializer::with_diagnostics(&recorder);
    let value = deserializer
        .deserialize(Some(wire(json!({"type": "object", "value": [
            ["ok", {"type": "number", "value": 1}],
            ["fn", {"type": "function", "handle": "h-9"}]
        ]}))))
        .expect("no fault");
    assert!(value.is_none());
    assert_eq!(recorder.messages.borrow().len(), 1);
}

#[test]
fn three_level_nesting_preserves_order() {
    let value = decode(json!({"type": "set", "value": [
        {"type": "string", "value": "first"},
        {"type": "array", "value": [
            {"type": "number", "value": 1},
            {"type": "map", "value": [
                ["b", {"type": "number", "value": 2}],
                ["a", {"type": "number", "value": 1}]
            ]}
        ]}
    ]}));
    let DeserializedValue::Set(set) = value else {
        panic!("expected set");
    };
    let items: Vec<_> = set.iter().collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], &DeserializedValue::String("first".to_string()));
    let DeserializedValue::Array(array) = items[1] else {
        panic!("expected array");
    };
    assert_eq!(array[0], DeserializedValue::Number(1.0));
    let DeserializedValue::Map(map) = &array[1] else {
        panic!("expected map");
    };
    let keys: Vec<_> = map.iter().map(|(key, _)| key.to_property_key()).collect();
    assert_eq!(keys, ["b", "a"]);
}

#[test]
fn set_deduplicates_primitives_only() {
    let value = decode(json!({"type": "set", "value": [
        {"type": "number", "value": 1},
        {"type": "number", "value": 1},
        {"type": "number", "value": "NaN"},
        {"type": "number", "value": "NaN"},
        {"type": "object", "value": []},
        {"type": "object", "value": []}
    ]}));
    let DeserializedValue::Set(set) = value else {
        panic!("expected set");
    };
    assert_eq!(set.len(), 4);
}

#[test]
fn scalars_round_trip_through_serializer() {
    let fixtures = [
        json!({"type": "number", "value": 42}),
        json!({"type": "number", "value": -1.25}),
        json!({"type": "number", "value": "-0"}),
        json!({"type": "number", "value": "NaN"}),
        json!({"type": "number", "value": "-Infinity"}),
        json!({"type": "string", "value": "héllo"}),
        json!({"type": "boolean", "value": false}),
        json!({"type": "null"}),
        json!({"type": "undefined"}),
        json!({"type": "bigint", "value": "123456789012345678901234567890"}),
    ];
    for fixture in fixtures {
        let decoded = decode(fixture.clone());
        let encoded = serde_json::to_value(serialize(&decoded).expect("serialize")).expect("json");
        assert_eq!(encoded, fixture);
    }
}

#[test]
fn bigint_keeps_arbitrary_precision() {
    assert_eq!(
        decode(json!({"type": "bigint", "value": "-98765432109876543210"})),
        DeserializedValue::BigInt("-98765432109876543210".parse::<BigInt>().expect("bigint"))
    );
}

#[test]
fn malformed_payloads_surface_to_the_caller() {
    let err = deserialize(Some(wire(json!({"type": "bigint", "value": "ten"})))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);

    let err = deserialize(Some(wire(
        json!({"type": "regexp", "value": {"pattern": "a(", "flags": "g"}}),
    )))
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);

    let shapeless = serialized_value_from_str(r#"{"type":"regexp","value":{}}"#, "test")
        .expect("parse");
    let err = deserialize(shapeless).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);
}

#[test]
fn unsupported_tag_before_malformed_sibling_is_absorbed() {
    let recorder = Recorder::default();
    let deserializer = Deserializer::with_diagnostics(&recorder);
    let value = serialized_value_from_str(
        r#"{"type":"array","value":[{"type":"symbol"},{"type":"number"}]}"#,
        "test",
    )
    .expect("parse");
    assert!(deserializer.deserialize(value).expect("absorbed").is_none());
    assert_eq!(
        *recorder.messages.borrow(),
        ["Deserialization of type symbol not supported."]
    );

    let value = serialized_value_from_str(
        r#"{"type":"array","value":[{"type":"number"},{"type":"symbol"}]}"#,
        "test",
    )
    .expect("parse");
    let err = deserializer.deserialize(value).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);
}

#[test]
fn js_regexp_syntax_decodes() {
    for pattern in ["(?=a)b", "(?<=a)b", r"(a)\1", "[^]"] {
        let value = decode(json!({"type": "regexp", "value": {"pattern": pattern}}));
        let DeserializedValue::RegExp(regexp) = value else {
            panic!("expected regexp for {pattern}");
        };
        assert_eq!(regexp.source(), pattern);
    }

    let DeserializedValue::RegExp(backref) =
        decode(json!({"type": "regexp", "value": {"pattern": r"(a)\1"}}))
    else {
        panic!("expected regexp");
    };
    assert!(backref.is_match("xaa"));
    assert!(!backref.is_match("ab"));
}

#[test]
fn large_numeric_keys_use_shortest_digits() {
    let value = decode(json!({"type": "object", "value": [
        [{"type": "number", "value": 123456789012345680000.0}, {"type": "null"}]
    ]}));
    let DeserializedValue::Object(object) = value else {
        panic!("expected object");
    };
    assert_eq!(object.keys().collect::<Vec<_>>(), ["123456789012345680000"]);
}

#[test]
fn wide_set_and_map_payloads_decode() {
    let count = 20_000;
    let items: Vec<Value> = (0..count)
        .map(|idx| json!({"type": "number", "value": idx}))
        .collect();
    let DeserializedValue::Set(set) = decode(json!({"type": "set", "value": items})) else {
        panic!("expected set");
    };
    assert_eq!(set.len(), count);

    let entries: Vec<Value> = (0..count)
        .map(|idx| {
            json!([
                {"type": "number", "value": idx % 100},
                {"type": "number", "value": idx}
            ])
        })
        .collect();
    let DeserializedValue::Map(map) = decode(json!({"type": "map", "value": entries})) else {
        panic!("expected map");
    };
    assert_eq!(map.len(), 100);
    assert_eq!(
        map.get(&DeserializedValue::Number(0.0)),
        Some(&DeserializedValue::Number((count - 100) as f64))
    );
}

#[test]
fn proto_entry_does_not_become_a_key() {
    let value = decode(json!({"type": "object", "value": [
        ["__proto__", {"type": "object", "value": []}],
        ["k", {"type": "number", "value": 1}]
    ]}));
    let DeserializedValue::Object(object) = value else {
        panic!("expected object");
    };
    assert_eq!(object.keys().collect::<Vec<_>>(), ["k"]);
}

#[test]
fn regexp_and_date_construct_native_values() {
    let DeserializedValue::RegExp(regexp) =
        decode(json!({"type": "regexp", "value": {"pattern": "^a.c$", "flags": "i"}}))
    else {
        panic!("expected regexp");
    };
    assert!(regexp.is_match("ABC"));
    assert!(!regexp.is_match("abcd"));

    let DeserializedValue::Date(date) =
        decode(json!({"type": "date", "value": "2023-03-04T05:06:07.089Z"}))
    else {
        panic!("expected date");
    };
    assert_eq!(
        date.to_iso_string().as_deref(),
        Some("2023-03-04T05:06:07.089Z")
    );

    let DeserializedValue::Date(invalid) = decode(json!({"type": "date", "value": "garbage"}))
    else {
        panic!("expected date");
    };
    assert!(!invalid.is_valid());
}
