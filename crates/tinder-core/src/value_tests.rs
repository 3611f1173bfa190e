use super::*;

#[test]
fn falsy_values() {
    assert!(!Value::None.is_truthy());
    assert!(!Value::Boolean(false).is_truthy());
    assert!(!Value::Number(0.0).is_truthy());
    assert!(!Value::String(String::new()).is_truthy());
    assert!(!Value::Sequence(vec![]).is_truthy());
    assert!(!Value::Mapping(vec![]).is_truthy());
}

#[test]
fn truthy_values() {
    assert!(Value::Number(-1.0).is_truthy());
    assert!(Value::String("0".into()).is_truthy());
    assert!(Value::Sequence(vec![Value::None]).is_truthy());
}

#[test]
fn numbers_compare_by_value() {
    assert!(Value::Number(1.0) < Value::Number(2.0));
}

#[test]
fn cross_kind_comparison_is_unordered() {
    assert_eq!(Value::Number(1.0).partial_cmp(&Value::String("1".into())), None);
}

#[test]
fn handles_compare_by_identity_not_kind_string_alone() {
    let a = Value::Handle(Handle { kind: "sprite".into(), id: 1 });
    let b = Value::Handle(Handle { kind: "sprite".into(), id: 2 });
    assert_ne!(a, b);
}
