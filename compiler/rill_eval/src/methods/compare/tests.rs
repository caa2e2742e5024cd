use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rill_value::{invalid_operation, ErrorCategory};

fn nums(values: &[f64]) -> Vec<Value> {
    values.iter().copied().map(Value::number).collect()
}

#[test]
fn test_default_type_classes() {
    let mut values = vec![
        Value::Null,
        Value::Bool(false),
        Value::string("b"),
        Value::number(2.0),
        Value::array(vec![]),
        Value::number(1.0),
        Value::string("a"),
    ];
    values.sort_by(default_compare);
    let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["1", "2", "a", "b", "false", "null", "[]"]);
}

#[test]
fn test_nan_sorts_last_among_numbers() {
    assert_eq!(
        default_compare(&Value::number(f64::NAN), &Value::number(1.0)),
        Ordering::Greater
    );
    assert_eq!(
        default_compare(&Value::number(f64::NAN), &Value::string("a")),
        Ordering::Less
    );
}

#[test]
fn test_identity_order_is_consistent() {
    let a = Value::array(vec![]);
    let b = Value::array(vec![]);
    let forward = default_compare(&a, &b);
    assert_ne!(forward, Ordering::Equal);
    assert_eq!(default_compare(&b, &a), forward.reverse());
    assert_eq!(default_compare(&a, &a.clone()), Ordering::Equal);
}

#[test]
fn test_comparator_coercion() {
    assert_eq!(
        comparator_ordering(&Value::number(-3.0)).unwrap(),
        Ordering::Less
    );
    assert_eq!(
        comparator_ordering(&Value::number(0.0)).unwrap(),
        Ordering::Equal
    );
    assert_eq!(
        comparator_ordering(&Value::number(f64::NAN)).unwrap(),
        Ordering::Equal
    );
    assert_eq!(
        comparator_ordering(&Value::string(" 2 ")).unwrap(),
        Ordering::Greater
    );
    assert_eq!(
        comparator_ordering(&Value::Bool(true)).unwrap(),
        Ordering::Greater
    );
    assert_eq!(
        comparator_ordering(&Value::Bool(false)).unwrap(),
        Ordering::Less
    );
    let err = comparator_ordering(&Value::string("later")).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeError);
    assert!(comparator_ordering(&Value::Null).is_err());
}

#[test]
fn test_always_less_keeps_input_order() {
    let input: Vec<u32> = (0..20).collect();
    let sorted = stable_sort_by(input.clone(), |_, _| Ok(Ordering::Less)).unwrap();
    assert_eq!(sorted, input);
}

#[test]
fn test_stable_on_ties() {
    let input = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd'), (1, 'e')];
    let sorted = stable_sort_by(input, |x, y| Ok(x.0.cmp(&y.0))).unwrap();
    assert_eq!(
        sorted,
        vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c'), (1, 'e')]
    );
}

#[test]
fn test_error_aborts_sort() {
    let mut calls = 0;
    let err = stable_sort_by(nums(&[3.0, 1.0, 2.0]), |_, _| {
        calls += 1;
        Err(invalid_operation("comparator failed"))
    })
    .unwrap_err();
    assert_eq!(err.message, "comparator failed");
    assert_eq!(calls, 1);
}

proptest! {
    #[test]
    fn prop_matches_std_stable_sort(
        input in proptest::collection::vec((0u8..5, any::<u16>()), 0..64),
    ) {
        let mut expected = input.clone();
        expected.sort_by_key(|pair| pair.0);
        let sorted = stable_sort_by(input, |a, b| Ok(a.0.cmp(&b.0))).unwrap();
        prop_assert_eq!(sorted, expected);
    }
}
