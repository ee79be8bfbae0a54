//! The measurement store
//!
//! An indexed table of (namespace, feature, image_number) -> value written
//! by the analysis stages while a run progresses and read back by grouping,
//! matching, reporting and persistence. Each logical unit of work owns
//! exactly one `Store`; readers that need to observe a run concurrently
//! wrap it in `Arc<RwLock<Store>>` at the call site, so the store itself
//! carries no locking.

use crate::value::Value;
use std::collections::{BTreeMap, HashMap};

/// Namespace of the per-image-set scalar measurements
pub const IMAGE: &str = "Image";
/// Namespace of the run-wide summary measurements
pub const EXPERIMENT: &str = "Experiment";
/// Reserved feature whose presence registers an image number
pub const IMAGE_NUMBER: &str = "ImageNumber";
/// Reserved run-summary text feature, consumed by the done-file writer
pub const EXIT_STATUS: &str = "ExitStatus";
/// Features carrying this prefix are metadata keys for grouping,
/// matching and templating
pub const METADATA_PREFIX: &str = "Metadata_";

/// Slot used for run-wide "Experiment" scalars. Image numbers are
/// positive, so the slot can never collide with a registered image set.
pub(crate) const EXPERIMENT_SLOT: u32 = 0;

/// Indexed observation database for one run.
///
/// Inner columns are `BTreeMap<u32, Value>` keyed by image number, which
/// makes every whole-column read come back in ascending image-number order
/// no matter what order the writes arrived in.
#[derive(Debug, Clone)]
pub struct Store {
    /// namespace -> feature -> image_number -> value
    cells: HashMap<String, HashMap<String, BTreeMap<u32, Value>>>,
    /// Cursor for the "current" accessors; starts at 1
    image_set_number: u32,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store with the current pointer at image set 1
    pub fn new() -> Self {
        Store {
            cells: HashMap::new(),
            image_set_number: 1,
        }
    }

    /// Image number implicitly targeted by the "current" accessors
    pub fn image_set_number(&self) -> u32 {
        self.image_set_number
    }

    /// Advance the current pointer by one image set
    pub fn next_image_set(&mut self) {
        self.image_set_number += 1;
    }

    /// Write or overwrite a cell at the current image set. Last write wins.
    pub fn add_measurement(&mut self, object: &str, feature: &str, value: impl Into<Value>) {
        self.add_measurement_at(object, feature, value, self.image_set_number);
    }

    /// Write or overwrite a cell at an explicit image number.
    ///
    /// Any write into the "Image" namespace also records the reserved
    /// ("Image", "ImageNumber") cell for that image number when missing,
    /// which is what registers the image set for listing, grouping and
    /// matching.
    pub fn add_measurement_at(
        &mut self,
        object: &str,
        feature: &str,
        value: impl Into<Value>,
        image_number: u32,
    ) {
        self.insert_cell(object, feature, image_number, value.into());
        if object == IMAGE && feature != IMAGE_NUMBER && !self.is_registered(image_number) {
            self.insert_cell(
                IMAGE,
                IMAGE_NUMBER,
                image_number,
                Value::Integer(image_number as i64),
            );
        }
    }

    /// Record a run-wide "Experiment" scalar (e.g. ExitStatus)
    pub fn add_experiment_measurement(&mut self, feature: &str, value: impl Into<Value>) {
        self.insert_cell(EXPERIMENT, feature, EXPERIMENT_SLOT, value.into());
    }

    /// Raw cell insert with no registration side effect. Persistence uses
    /// this so a loaded store reproduces the saved cells exactly.
    pub(crate) fn insert_cell(
        &mut self,
        object: &str,
        feature: &str,
        image_number: u32,
        value: Value,
    ) {
        self.cells
            .entry(object.to_string())
            .or_default()
            .entry(feature.to_string())
            .or_default()
            .insert(image_number, value);
    }

    /// Stored value at an explicit image number; `None` means no cell,
    /// which is an ordinary state and never an error
    pub fn get_measurement(&self, object: &str, feature: &str, image_number: u32) -> Option<&Value> {
        self.column(object, feature)?.get(&image_number)
    }

    /// Stored value at the current image set
    pub fn get_current_measurement(&self, object: &str, feature: &str) -> Option<&Value> {
        self.get_measurement(object, feature, self.image_set_number)
    }

    /// Run-wide "Experiment" scalar
    pub fn get_experiment_measurement(&self, feature: &str) -> Option<&Value> {
        self.get_measurement(EXPERIMENT, feature, EXPERIMENT_SLOT)
    }

    /// Every value recorded for the feature, ascending by image number
    /// regardless of insertion order
    pub fn get_all_measurements(&self, object: &str, feature: &str) -> Vec<&Value> {
        match self.column(object, feature) {
            Some(column) => column.values().collect(),
            None => Vec::new(),
        }
    }

    /// Delete exactly one cell. Removing the reserved ("Image",
    /// "ImageNumber") cell deregisters the image number from listing,
    /// grouping and matching; other cells at that image number are left in
    /// place and stay independently queryable (no cascade).
    pub fn remove_measurement(&mut self, object: &str, feature: &str, image_number: u32) {
        if let Some(features) = self.cells.get_mut(object) {
            if let Some(column) = features.get_mut(feature) {
                column.remove(&image_number);
                if column.is_empty() {
                    features.remove(feature);
                }
            }
            if features.is_empty() {
                self.cells.remove(object);
            }
        }
    }

    /// Ascending list of all registered image numbers
    pub fn get_image_numbers(&self) -> Vec<u32> {
        match self.column(IMAGE, IMAGE_NUMBER) {
            Some(column) => column.keys().copied().collect(),
            None => Vec::new(),
        }
    }

    /// Whether the image number carries the reserved ImageNumber cell
    pub fn is_registered(&self, image_number: u32) -> bool {
        self.get_measurement(IMAGE, IMAGE_NUMBER, image_number).is_some()
    }

    /// Presence check at the current image set
    pub fn has_current_measurements(&self, object: &str, feature: &str) -> bool {
        self.get_current_measurement(object, feature).is_some()
    }

    /// Whether any image set recorded the feature
    pub fn has_feature(&self, object: &str, feature: &str) -> bool {
        self.column(object, feature).is_some()
    }

    /// Namespaces with at least one recorded feature. Set semantics, order
    /// unspecified.
    pub fn get_object_names(&self) -> Vec<&str> {
        self.cells.keys().map(String::as_str).collect()
    }

    /// Feature names recorded under a namespace. Set semantics, order
    /// unspecified.
    pub fn get_feature_names(&self, object: &str) -> Vec<&str> {
        match self.cells.get(object) {
            Some(features) => features.keys().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }

    /// Iterate every stored cell as (namespace, feature, image_number, value)
    pub fn iter_cells(&self) -> impl Iterator<Item = (&str, &str, u32, &Value)> {
        self.cells.iter().flat_map(|(object, features)| {
            features.iter().flat_map(move |(feature, column)| {
                column.iter().map(move |(image_number, value)| {
                    (object.as_str(), feature.as_str(), *image_number, value)
                })
            })
        })
    }

    fn column(&self, object: &str, feature: &str) -> Option<&BTreeMap<u32, Value>> {
        self.cells.get(object)?.get(feature)
    }
}
