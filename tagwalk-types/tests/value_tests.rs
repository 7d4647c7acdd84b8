use tagwalk_types::{Error, Fields, Value};

#[derive(Debug, PartialEq)]
struct Money {
    cents: i64,
    currency: &'static str,
}

// ── Construction and accessors ───────────────────────────────────

#[test]
fn scalars_have_no_identity() {
    assert!(Value::Null.identity().is_none());
    assert!(Value::from(true).identity().is_none());
    assert!(Value::from(42).identity().is_none());
    assert!(Value::from("text").identity().is_none());
}

#[test]
fn containers_have_identity() {
    assert!(Value::list([]).identity().is_some());
    assert!(Value::map::<&str>([]).identity().is_some());
    assert!(Value::custom(Money { cents: 1, currency: "EUR" }).identity().is_some());
}

#[test]
fn clone_shares_identity() {
    let a = Value::map([("x", Value::from(1))]);
    let b = a.clone();
    assert!(a.ptr_eq(&b));

    b.set("y", Value::from(2));
    assert_eq!(a.get("y"), Some(Value::from(2)));
}

#[test]
fn equal_maps_are_distinct_objects() {
    let a = Value::map([("x", Value::from(1))]);
    let b = Value::map([("x", Value::from(1))]);
    assert_eq!(a, b);
    assert!(!a.ptr_eq(&b));
}

#[test]
fn scalars_never_ptr_eq() {
    let a = Value::from("same");
    assert!(!a.ptr_eq(&a.clone()));
}

#[test]
fn non_finite_float_is_rejected() {
    assert!(matches!(Value::try_from(f64::NAN), Err(Error::NonFiniteNumber(n)) if n.is_nan()));
    assert!(matches!(
        Value::try_from(f64::NEG_INFINITY),
        Err(Error::NonFiniteNumber(n)) if n == f64::NEG_INFINITY
    ));
    assert_eq!(Value::try_from(1.5).unwrap().as_f64(), Some(1.5));
}

#[test]
fn accessors_reject_wrong_kind() {
    let v = Value::from("text");
    assert_eq!(v.as_str(), Some("text"));
    assert!(v.as_bool().is_none());
    assert!(v.as_i64().is_none());
    assert!(v.as_list().is_none());
    assert!(v.as_map().is_none());
    assert!(v.len().is_none());
    assert!(!v.set("k", Value::Null));
    assert!(!v.push(Value::Null));
}

#[test]
fn list_push_and_at() {
    let list = Value::list([Value::from(1)]);
    assert!(list.push(Value::from(2)));
    assert_eq!(list.len(), Some(2));
    assert_eq!(list.at(1), Some(Value::from(2)));
    assert!(list.at(5).is_none());
}

#[test]
fn custom_downcast() {
    let v = Value::custom(Money { cents: 250, currency: "USD" });
    let money = v.as_custom::<Money>().unwrap();
    assert_eq!(money.cents, 250);
    assert!(v.as_custom::<String>().is_none());
}

#[test]
fn custom_values_compare_structurally() {
    let a = Value::custom(Money { cents: 5, currency: "EUR" });
    let b = Value::custom(Money { cents: 5, currency: "EUR" });
    let c = Value::custom(Money { cents: 6, currency: "EUR" });
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, Value::custom(5_i64));
}

// ── Equality ─────────────────────────────────────────────────────

#[test]
fn map_equality_is_order_sensitive() {
    let a = Value::map([("x", Value::from(1)), ("y", Value::from(2))]);
    let b = Value::map([("y", Value::from(2)), ("x", Value::from(1))]);
    assert_ne!(a, b);
}

#[test]
fn list_and_map_are_never_equal() {
    assert_ne!(Value::list([]), Value::map::<&str>([]));
}

#[test]
fn cyclic_graphs_compare_without_looping() {
    let a = Value::map::<&str>([]);
    a.set("self", a.clone());
    let b = Value::map::<&str>([]);
    b.set("self", b.clone());
    assert_eq!(a, b);

    let c = Value::map::<&str>([]);
    c.set("self", c.clone());
    c.set("extra", Value::from(1));
    assert_ne!(a, c);
}

#[test]
fn debug_marks_cycles() {
    let list = Value::list([Value::from(1)]);
    list.push(list.clone());
    let rendered = format!("{list:?}");
    assert_eq!(rendered, "[1, <cycle>]");
}

#[test]
fn debug_prints_shared_non_cyclic_twice() {
    let shared = Value::map([("x", Value::from(1))]);
    let root = Value::list([shared.clone(), shared]);
    assert_eq!(format!("{root:?}"), r#"[{"x": 1}, {"x": 1}]"#);
}

// ── Fields ───────────────────────────────────────────────────────

#[test]
fn fields_keep_insertion_order() {
    let fields: Fields = [("b", Value::from(1)), ("a", Value::from(2)), ("c", Value::from(3))]
        .into_iter()
        .collect();
    assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
}

#[test]
fn fields_replace_in_place() {
    let mut fields = Fields::new();
    fields.insert("a", Value::from(1));
    fields.insert("b", Value::from(2));
    let old = fields.insert("a", Value::from(9));

    assert_eq!(old, Some(Value::from(1)));
    assert_eq!(fields.len(), 2);
    assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(fields.get("a"), Some(&Value::from(9)));
}

#[test]
fn fields_lookup() {
    let mut fields = Fields::new();
    assert!(fields.is_empty());
    fields.insert("k", Value::Null);
    assert!(fields.contains_key("k"));
    assert!(!fields.contains_key("missing"));
    assert!(fields.get("missing").is_none());
}
