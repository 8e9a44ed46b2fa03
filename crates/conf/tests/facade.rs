//! The mirrored snapshot: an owned, read-only copy of a scope tree that
//! outlives the parser and serializes naturally.

use conf::{Object, Parser, Value};
use pretty_assertions::assert_eq;

const SOURCE: &str = "class Point {\n  int x\n  int y\n}\nPoint p\np.x = 5\nstring label = \"origin\"\nfloat ratio = 0.5\n";

fn snapshot() -> Object {
    let mut parser = Parser::new();
    let global = parser.parse_source(SOURCE).unwrap();
    parser.snapshot(global)
}

#[test]
fn snapshot_mirrors_the_scope_tree() {
    let mirror = snapshot();
    let Object::Scope { children, .. } = &mirror else {
        panic!("global mirrors as a scope");
    };
    // Point, p, label, ratio — functions and operators are omitted.
    assert_eq!(children.len(), 4);

    let point = mirror.get("Point").expect("Point mirrored");
    let Object::Type { children: members, .. } = point else {
        panic!("Point mirrors as a type");
    };
    let names: Vec<&str> = members.iter().map(Object::name).collect();
    assert_eq!(names, ["x", "y"]);

    let p = mirror.get("p").expect("p mirrored");
    let Object::Instance {
        type_name,
        sub_instances,
        ..
    } = p
    else {
        panic!("p mirrors as an instance");
    };
    assert_eq!(type_name.as_deref(), Some("Point"));
    let Object::Instance { value, .. } = &sub_instances[0] else {
        panic!("sub-instances mirror as instances");
    };
    assert_eq!(*value, Value::Int(5));
}

#[test]
fn snapshot_extracts_intrinsic_payloads() {
    let mirror = snapshot();
    let Some(Object::Instance { value, .. }) = mirror.get("label") else {
        panic!("label mirrored");
    };
    assert_eq!(*value, Value::Str("origin".to_owned()));

    let Some(Object::Instance { value, .. }) = mirror.get("ratio") else {
        panic!("ratio mirrored");
    };
    assert_eq!(*value, Value::Float(0.5));
}

/// The snapshot stays usable after the parser is gone.
#[test]
fn snapshot_outlives_the_parser() {
    let mirror = snapshot();
    assert_eq!(mirror.get("p").map(Object::name), Some("p"));
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn snapshot_round_trips_through_json() {
    let mirror = snapshot();
    let json = serde_json::to_string(&mirror).unwrap();
    let back: Object = serde_json::from_str(&json).unwrap();
    assert_eq!(back, mirror);
}

#[test]
fn snapshot_round_trips_through_postcard() {
    let mirror = snapshot();
    let bytes = postcard::to_allocvec(&mirror).unwrap();
    let back: Object = postcard::from_bytes(&bytes).unwrap();
    assert_eq!(back, mirror);
}

// =============================================================================
// Canonical text forms
// =============================================================================

#[test]
fn value_text_is_canonical() {
    assert_eq!(Value::Str("hi".to_owned()).to_text(), "hi");
    assert_eq!(Value::Int(19).to_text(), "19");
    assert_eq!(Value::Float(3.14).to_text(), "3.14");
    assert_eq!(Value::Float(2.0).to_text(), "2.0");
    assert_eq!(Value::None.to_text(), "");
}
