//! Tests for metadata grouping: tuple correctness and the partition
//! invariant over randomly permuted registrations.

use hcs_common::{Store, Value, IMAGE};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// 100 image sets registered in random order with two metadata keys;
/// returns the per-image expected values, indexed by image_number - 1
fn random_store(seed: u64) -> (Store, Vec<i64>, Vec<String>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = Store::new();
    let mut aa = vec![0i64; 100];
    let mut bb = vec![String::new(); 100];
    let mut order: Vec<u32> = (1..=100).collect();
    order.shuffle(&mut rng);
    for &image_number in &order {
        let a = rng.gen_range(1..3i64);
        let b = format!("A{:02}", rng.gen_range(1..12));
        aa[image_number as usize - 1] = a;
        bb[image_number as usize - 1] = b.clone();
        store.add_measurement_at(IMAGE, "Metadata_A", a, image_number);
        store.add_measurement_at(IMAGE, "Metadata_B", b, image_number);
    }
    (store, aa, bb)
}

#[test]
fn test_group_by_metadata_members_share_the_tuple() {
    let (store, aa, bb) = random_store(91);
    let groups = store.group_by_metadata(&["A", "B"]);
    for group in &groups {
        for &image_number in group.image_numbers() {
            assert_eq!(
                group.get("A"),
                Some(&Some(Value::Integer(aa[image_number as usize - 1])))
            );
            assert_eq!(
                group.get("B"),
                Some(&Some(Value::Text(bb[image_number as usize - 1].clone())))
            );
        }
    }
}

#[test]
fn test_get_groupings_members_share_the_tuple() {
    let (store, aa, bb) = random_store(91);
    let result = store.get_groupings(&["Metadata_A", "Metadata_B"]);
    for (values, image_numbers) in &result {
        for &image_number in image_numbers {
            assert_eq!(
                values.get("Metadata_A"),
                Some(&Some(Value::Integer(aa[image_number as usize - 1])))
            );
            assert_eq!(
                values.get("Metadata_B"),
                Some(&Some(Value::Text(bb[image_number as usize - 1].clone())))
            );
        }
    }
}

#[test]
fn test_groups_form_an_exact_partition() {
    let (store, _, _) = random_store(17);
    let groups = store.group_by_metadata(&["A", "B"]);

    let mut seen = HashSet::new();
    for group in &groups {
        for &image_number in group.image_numbers() {
            // Pairwise disjoint
            assert!(seen.insert(image_number));
        }
    }
    // Union equals the registered set
    let mut union: Vec<u32> = seen.into_iter().collect();
    union.sort_unstable();
    assert_eq!(union, store.get_image_numbers());
}

#[test]
fn test_missing_key_groups_as_absent() {
    let mut store = Store::new();
    store.add_measurement_at(IMAGE, "Metadata_Plate", "P1", 1);
    store.add_measurement_at(IMAGE, "Metadata_Plate", "P1", 2);
    // Image set 3 is registered but has no Metadata_Plate
    store.add_measurement_at(IMAGE, "OtherFeature", 1i64, 3);

    let groups = store.group_by_metadata(&["Plate"]);
    assert_eq!(groups.len(), 2);
    for group in &groups {
        match group.get("Plate") {
            Some(Some(Value::Text(p))) => {
                assert_eq!(p, "P1");
                assert_eq!(group.image_numbers(), &[1, 2]);
            }
            Some(None) => assert_eq!(group.image_numbers(), &[3]),
            other => panic!("unexpected group key slot: {:?}", other),
        }
    }
}

#[test]
fn test_group_members_ascend() {
    let (store, _, _) = random_store(5);
    for group in store.group_by_metadata(&["A"]) {
        let members = group.image_numbers();
        assert!(members.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_deregistered_image_set_leaves_the_partition() {
    let mut store = Store::new();
    store.add_measurement_at(IMAGE, "Metadata_A", 1i64, 1);
    store.add_measurement_at(IMAGE, "Metadata_A", 1i64, 2);
    store.remove_measurement(IMAGE, hcs_common::IMAGE_NUMBER, 1);

    let groups = store.group_by_metadata(&["A"]);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].image_numbers(), &[2]);
}
