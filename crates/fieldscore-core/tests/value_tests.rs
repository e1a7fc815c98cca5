//! Tests for the `Value` model: JSON conversion, map semantics, rendering.
use fieldscore_core::{FieldPath, Map, PathSegment, ScoreError, Value};
use serde_json::json;

#[test]
fn parses_every_json_variant() {
    let value = Value::from_json_str(r#"{"n":null,"b":true,"x":1.5,"s":"hi","l":[1],"m":{"k":"v"}}"#).unwrap();

    assert_eq!(value.get("n"), Some(&Value::Null));
    assert_eq!(value.get("b"), Some(&Value::Boolean(true)));
    assert_eq!(value.get("x"), Some(&Value::Number(1.5)));
    assert_eq!(value.get("s"), Some(&Value::from("hi")));
    assert_eq!(value.get("l"), Some(&Value::List(vec![Value::Number(1.0)])));
    assert_eq!(value.get("m").and_then(|m| m.get("k")), Some(&Value::from("v")));
}

#[test]
fn invalid_json_is_a_parse_error() {
    let err = Value::from_json_str("{not json").unwrap_err();
    assert!(matches!(err, ScoreError::JsonParse(_)));
    assert!(err.to_string().starts_with("JSON parse error"));
}

#[test]
fn leaf_and_container_classification() {
    for leaf in [Value::Null, Value::Boolean(false), Value::Number(0.0), Value::from("")] {
        assert!(leaf.is_leaf(), "{leaf:?} should be a leaf");
    }
    assert!(Value::List(vec![]).is_container());
    assert!(Value::Map(Map::new()).is_container());
}

#[test]
fn map_equality_ignores_insertion_order() {
    let a: Map = [("x", 1i64), ("y", 2i64)].into_iter().collect();
    let b: Map = [("y", 2i64), ("x", 1i64)].into_iter().collect();
    assert_eq!(a, b);
}

#[test]
fn map_insert_replaces_existing_key() {
    let mut map = Map::new();
    assert_eq!(map.insert("age", 90i64), None);
    assert_eq!(map.insert("age", 91i64), Some(Value::Number(90.0)));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("age"), Some(&Value::Number(91.0)));
}

#[test]
fn map_keeps_insertion_order() {
    let value = Value::from_json_str(r#"{"zeta":1,"alpha":2,"mid":3}"#).unwrap();
    let Value::Map(map) = value else {
        panic!("expected a map");
    };
    assert_eq!(map.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
}

#[test]
fn integral_numbers_render_without_fraction() {
    assert_eq!(Value::Number(90.0).to_json(), json!(90));
    assert_eq!(Value::Number(-3.0).to_string(), "-3");
    assert_eq!(Value::Number(4.5).to_json(), json!(4.5));
}

#[test]
fn non_finite_numbers_render_as_null() {
    assert_eq!(Value::Number(f64::NAN).to_json(), serde_json::Value::Null);
    assert_eq!(Value::Number(f64::INFINITY).to_json(), serde_json::Value::Null);
}

#[test]
fn to_json_preserves_structure() {
    let raw = json!({"name": "Maria", "wound": {"size": 4, "hasPus": null}, "tags": ["a", true]});
    assert_eq!(Value::from(&raw).to_json(), raw);
}

#[test]
fn serde_roundtrip_through_value() {
    let value: Value = serde_json::from_str(r#"{"a":[1,{"b":"c"}]}"#).unwrap();
    let text = serde_json::to_string(&value).unwrap();
    assert_eq!(text, r#"{"a":[1,{"b":"c"}]}"#);
}

#[test]
fn nan_numbers_are_equal_to_each_other() {
    assert_eq!(Value::from(f64::NAN), Value::Number(f64::NAN));
    assert_ne!(Value::from(f64::NAN), Value::from(1.0));

    let a: Map = [("x", f64::NAN), ("y", 2.0)].into_iter().collect();
    let b: Map = [("y", 2.0), ("x", f64::NAN)].into_iter().collect();
    assert_eq!(a, b);
}

// ============================================================================
// Field paths
// ============================================================================

#[test]
fn root_path_renders_as_dollar() {
    assert_eq!(FieldPath::root().to_string(), "$");
}

#[test]
fn keys_and_indices_render_dotted() {
    let path = FieldPath::root().key("visits").index(0).key("date");
    assert_eq!(path.to_string(), "visits[0].date");
}

#[test]
fn root_list_index_has_no_leading_dot() {
    let path = FieldPath::root().index(3).key("name");
    assert_eq!(path.to_string(), "[3].name");
}

#[test]
fn child_path_does_not_mutate_parent() {
    let parent = FieldPath::root().key("wound");
    let _child = parent.key("size");
    assert_eq!(parent.segments(), [PathSegment::Key("wound".into())]);
}
