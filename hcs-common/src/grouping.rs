//! Metadata grouping
//!
//! Partitions the registered image numbers by the tuple of metadata values
//! they carry for a chosen key set. For a fixed key set the groups always
//! form an exact partition: every registered image number lands in exactly
//! one group, including image sets that are missing one of the keys (the
//! missing slot is `None` and groups with other image sets missing the
//! same slot).

use crate::store::{Store, IMAGE, METADATA_PREFIX};
use crate::value::{Value, ValueKey};
use std::collections::{BTreeMap, HashMap};

/// One cell of the metadata partition: the key tuple shared by its members
/// and the image numbers that carry it.
#[derive(Debug, Clone)]
pub struct MetadataGroup {
    values: BTreeMap<String, Option<Value>>,
    image_numbers: Vec<u32>,
}

impl MetadataGroup {
    /// Value of one grouping key; outer `None` means the key was not part
    /// of the grouping, inner `None` that the members lack the key
    pub fn get(&self, key: &str) -> Option<&Option<Value>> {
        self.values.get(key)
    }

    /// Key -> shared value mapping for this group
    pub fn values(&self) -> &BTreeMap<String, Option<Value>> {
        &self.values
    }

    /// Member image numbers, ascending
    pub fn image_numbers(&self) -> &[u32] {
        &self.image_numbers
    }
}

impl Store {
    /// Partition the registered image numbers by bare metadata key names
    /// (`"Plate"` refers to the `Metadata_Plate` feature). Group order is
    /// unspecified.
    pub fn group_by_metadata(&self, keys: &[&str]) -> Vec<MetadataGroup> {
        let features: Vec<String> = keys
            .iter()
            .map(|k| format!("{}{}", METADATA_PREFIX, k))
            .collect();
        self.partition(&features)
            .into_iter()
            .map(|(tuple, image_numbers)| MetadataGroup {
                values: keys
                    .iter()
                    .map(|k| k.to_string())
                    .zip(tuple.into_iter())
                    .collect(),
                image_numbers,
            })
            .collect()
    }

    /// Same partition keyed by already-qualified feature names
    /// (e.g. `"Metadata_Plate"`), returned as (key -> value, image
    /// numbers) pairs.
    pub fn get_groupings(
        &self,
        features: &[&str],
    ) -> Vec<(BTreeMap<String, Option<Value>>, Vec<u32>)> {
        let owned: Vec<String> = features.iter().map(|f| f.to_string()).collect();
        self.partition(&owned)
            .into_iter()
            .map(|(tuple, image_numbers)| {
                let values = owned
                    .iter()
                    .cloned()
                    .zip(tuple.into_iter())
                    .collect();
                (values, image_numbers)
            })
            .collect()
    }

    /// Shared grouping core: one (value tuple, members) pair per distinct
    /// tuple over all registered image numbers. Members come out ascending
    /// because the registered list is ascending.
    fn partition(&self, features: &[String]) -> Vec<(Vec<Option<Value>>, Vec<u32>)> {
        let mut groups: Vec<(Vec<Option<Value>>, Vec<u32>)> = Vec::new();
        let mut index: HashMap<Vec<Option<ValueKey>>, usize> = HashMap::new();
        for image_number in self.get_image_numbers() {
            let tuple: Vec<Option<Value>> = features
                .iter()
                .map(|f| self.get_measurement(IMAGE, f, image_number).cloned())
                .collect();
            let key: Vec<Option<ValueKey>> = tuple
                .iter()
                .map(|v| v.as_ref().map(Value::group_key))
                .collect();
            match index.get(&key) {
                Some(&i) => groups[i].1.push(image_number),
                None => {
                    index.insert(key, groups.len());
                    groups.push((tuple, vec![image_number]));
                }
            }
        }
        groups
    }
}
