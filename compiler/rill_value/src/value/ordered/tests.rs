use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn keys_of(index: &OrderedIndex<String, i32>) -> Vec<String> {
    index.keys().cloned().collect()
}

#[test]
fn test_insert_preserves_order() {
    let mut index = OrderedIndex::new();
    index.insert("b".to_string(), 1);
    index.insert("a".to_string(), 2);
    index.insert("c".to_string(), 3);
    assert_eq!(keys_of(&index), vec!["b", "a", "c"]);
}

#[test]
fn test_overwrite_keeps_position() {
    let mut index = OrderedIndex::new();
    index.insert("a".to_string(), 1);
    index.insert("b".to_string(), 2);
    assert_eq!(index.insert("a".to_string(), 10), Some(1));
    assert_eq!(keys_of(&index), vec!["a", "b"]);
    assert_eq!(index.get(&"a".to_string()), Some(&10));
}

#[test]
fn test_delete_then_insert() {
    let mut index = OrderedIndex::new();
    for key in ["a", "b", "c"] {
        index.insert(key.to_string(), 0);
    }
    assert_eq!(index.remove(&"b".to_string()), Some(0));
    index.insert("d".to_string(), 0);
    assert_eq!(keys_of(&index), vec!["a", "c", "d"]);
    assert!(!index.contains_key(&"b".to_string()));
    assert_eq!(index.len(), 3);
}

#[test]
fn test_delete_first_keeps_order_of_rest() {
    let mut index = OrderedIndex::new();
    for key in ["a", "b", "c"] {
        index.insert(key.to_string(), 0);
    }
    index.remove(&"a".to_string());
    assert_eq!(keys_of(&index), vec!["b", "c"]);
}

#[test]
fn test_compaction_keeps_lookup_valid() {
    let mut index = OrderedIndex::new();
    for i in 0..100 {
        index.insert(format!("k{i}"), i);
    }
    for i in (0..100).filter(|i| i % 3 != 0) {
        index.remove(&format!("k{i}"));
    }
    assert_eq!(index.len(), 34);
    for i in (0..100).filter(|i| i % 3 == 0) {
        assert_eq!(index.get(&format!("k{i}")), Some(&i));
    }
    let expected: Vec<String> = (0..100).filter(|i| i % 3 == 0).map(|i| format!("k{i}")).collect();
    assert_eq!(keys_of(&index), expected);
}

#[test]
fn test_remove_missing() {
    let mut index: OrderedIndex<String, i32> = OrderedIndex::new();
    assert_eq!(index.remove(&"x".to_string()), None);
    assert!(index.is_empty());
}

proptest! {
    #[test]
    fn prop_order_matches_reference(
        ops in proptest::collection::vec((any::<bool>(), 0u8..12), 0..200),
    ) {
        let mut index = OrderedIndex::new();
        let mut reference: Vec<u8> = Vec::new();
        for (insert, key) in ops {
            if insert {
                if !reference.contains(&key) {
                    reference.push(key);
                }
                index.insert(key, ());
            } else {
                reference.retain(|k| *k != key);
                index.remove(&key);
            }
        }
        let actual: Vec<u8> = index.keys().copied().collect();
        prop_assert_eq!(actual, reference.clone());
        prop_assert_eq!(index.len(), reference.len());
    }
}
