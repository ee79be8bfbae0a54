//! Tests for metadata matching: positional fallback, 1:1 matching and
//! group-based matching with unequal cardinality.

use hcs_common::{Error, Store, Value, IMAGE};

#[test]
fn test_match_by_order_on_empty_store() {
    let store = Store::new();
    let zeros = vec![Value::Float(0.0); 3];
    let result = store
        .match_metadata(&["Metadata_foo", "Metadata_bar"], &[zeros.clone(), zeros])
        .unwrap();
    assert_eq!(result, vec![vec![1], vec![2], vec![3]]);
}

#[test]
fn test_match_by_order_when_requested_keys_unrecorded() {
    let mut store = Store::new();
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 1);
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 2);
    // Metadata exists, but not for the requested key
    let result = store
        .match_metadata(&["Metadata_bar"], &[vec![Value::Float(0.0); 2]])
        .unwrap();
    assert_eq!(result, vec![vec![1], vec![2]]);
}

#[test]
fn test_match_equal_cardinality() {
    let mut store = Store::new();
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 1);
    store.add_measurement_at(IMAGE, "Metadata_bar", "World", 1);
    store.add_measurement_at(IMAGE, "Metadata_foo", "Goodbye", 2);
    store.add_measurement_at(IMAGE, "Metadata_bar", "Phobos", 2);

    let result = store
        .match_metadata(
            &["Metadata_foo", "Metadata_bar"],
            &[
                vec![Value::from("Goodbye"), Value::from("Hello")],
                vec![Value::from("Phobos"), Value::from("World")],
            ],
        )
        .unwrap();
    assert_eq!(result, vec![vec![2], vec![1]]);
}

#[test]
fn test_match_unequal_cardinality_resolves_groups() {
    let mut store = Store::new();
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 1);
    store.add_measurement_at(IMAGE, "Metadata_bar", "World", 1);
    store.add_measurement_at(IMAGE, "Metadata_foo", "Goodbye", 2);
    store.add_measurement_at(IMAGE, "Metadata_bar", "Phobos", 2);
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 3);
    store.add_measurement_at(IMAGE, "Metadata_bar", "Phobos", 3);

    let result = store
        .match_metadata(
            &["Metadata_foo"],
            &[vec![Value::from("Goodbye"), Value::from("Hello")]],
        )
        .unwrap();
    assert_eq!(result, vec![vec![2], vec![1, 3]]);
}

#[test]
fn test_unmatched_row_gets_empty_list() {
    let mut store = Store::new();
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 1);
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 2);
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 3);

    let result = store
        .match_metadata(
            &["Metadata_foo"],
            &[vec![Value::from("Nope"), Value::from("Hello")]],
        )
        .unwrap();
    assert_eq!(result, vec![vec![], vec![1, 2, 3]]);
}

#[test]
fn test_partially_unrecorded_keys_are_ignored() {
    // Metadata_bar was never recorded, so only Metadata_foo distinguishes
    let mut store = Store::new();
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 1);
    store.add_measurement_at(IMAGE, "Metadata_foo", "Goodbye", 2);
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 3);

    let result = store
        .match_metadata(
            &["Metadata_foo", "Metadata_bar"],
            &[
                vec![Value::from("Goodbye"), Value::from("Hello")],
                vec![Value::from("X"), Value::from("Y")],
            ],
        )
        .unwrap();
    assert_eq!(result, vec![vec![2], vec![1, 3]]);
}

#[test]
fn test_duplicate_tuples_in_equal_cardinality_case() {
    let mut store = Store::new();
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 1);
    store.add_measurement_at(IMAGE, "Metadata_foo", "Hello", 2);

    let result = store
        .match_metadata(
            &["Metadata_foo"],
            &[vec![Value::from("Hello"), Value::from("Hello")]],
        )
        .unwrap();
    // Each image number resolves to exactly one row
    assert_eq!(result, vec![vec![1], vec![2]]);
}

#[test]
fn test_mismatched_shapes_are_invalid_input() {
    let store = Store::new();
    let result = store.match_metadata(&["Metadata_foo"], &[]);
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let ragged = store.match_metadata(
        &["Metadata_foo", "Metadata_bar"],
        &[vec![Value::Float(0.0)], vec![Value::Float(0.0), Value::Float(0.0)]],
    );
    assert!(matches!(ragged, Err(Error::InvalidInput(_))));
}

#[test]
fn test_zero_rows() {
    let store = Store::new();
    let result = store.match_metadata(&["Metadata_foo"], &[vec![]]).unwrap();
    assert!(result.is_empty());
}
