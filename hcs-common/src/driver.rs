//! Batch-driver helpers
//!
//! The headless run loop shared by the local batch driver and the
//! distributed worker: feed a range of image sets through the analysis
//! stages into a fresh, private store, restrict a run to one metadata
//! group, and write the done-file when the run ends.

use crate::error::{Error, Result};
use crate::store::{Store, EXIT_STATUS, IMAGE, IMAGE_NUMBER, METADATA_PREFIX};
use std::path::Path;
use tracing::{debug, error, info};

/// One analysis stage of a pipeline. Stages measure whatever the store's
/// current image set points at and record their results with
/// `add_measurement`.
pub trait AnalysisStage {
    fn name(&self) -> &str;

    /// Measure the current image set
    fn run(&self, store: &mut Store) -> Result<()>;
}

/// Run every stage over the inclusive image-set range, returning the
/// private store of the run.
///
/// Each image set is registered before the stages see it, the pointer is
/// advanced one step at a time, and a run that completes records
/// ("Experiment", "ExitStatus") = "Complete". A stage error aborts the run
/// and propagates; the done-file writer then falls back to "Failure".
pub fn run_stages(
    stages: &[Box<dyn AnalysisStage>],
    image_set_start: u32,
    image_set_end: u32,
) -> Result<Store> {
    if image_set_start < 1 || image_set_end < image_set_start {
        return Err(Error::InvalidInput(format!(
            "invalid image set range {}..={}",
            image_set_start, image_set_end
        )));
    }

    let mut store = Store::new();
    while store.image_set_number() < image_set_start {
        store.next_image_set();
    }

    for image_number in image_set_start..=image_set_end {
        store.add_measurement(IMAGE, IMAGE_NUMBER, image_number);
        for stage in stages {
            debug!("Running stage {} on image set {}", stage.name(), image_number);
            if let Err(e) = stage.run(&mut store) {
                error!(
                    "Stage {} failed on image set {}: {}",
                    stage.name(),
                    image_number,
                    e
                );
                return Err(e);
            }
        }
        if image_number < image_set_end {
            store.next_image_set();
        }
    }

    store.add_experiment_measurement(EXIT_STATUS, "Complete");
    info!(
        "Run complete: image sets {}..={}",
        image_set_start, image_set_end
    );
    Ok(store)
}

/// Parse a `-g` group restriction such as `ROW=H,COL=01` into key/value
/// pairs
pub fn parse_group_spec(spec: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for entry in spec.split(',') {
        match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                pairs.push((key.to_string(), value.to_string()));
            }
            _ => {
                return Err(Error::InvalidInput(format!(
                    "bad group restriction entry \"{}\" (expected KEY=VALUE)",
                    entry
                )));
            }
        }
    }
    Ok(pairs)
}

/// Image numbers whose metadata matches every key of the restriction.
/// Restriction values are compared against the string form of the stored
/// metadata, since they arrive from the command line as text.
pub fn select_group(store: &Store, restriction: &[(String, String)]) -> Vec<u32> {
    let features: Vec<String> = restriction
        .iter()
        .map(|(key, _)| format!("{}{}", METADATA_PREFIX, key))
        .collect();
    let feature_refs: Vec<&str> = features.iter().map(String::as_str).collect();

    let mut selected = Vec::new();
    for (values, image_numbers) in store.get_groupings(&feature_refs) {
        let matches = restriction.iter().zip(feature_refs.iter()).all(
            |((_, wanted), feature)| match values.get(*feature) {
                Some(Some(v)) => v.to_string() == *wanted,
                _ => false,
            },
        );
        if matches {
            selected.extend(image_numbers);
        }
    }
    selected.sort_unstable();
    selected
}

/// Write the done-file: the run's ExitStatus text, or the literal
/// "Failure" when the store never recorded one
pub fn write_done_file(path: &Path, store: &Store) -> Result<()> {
    let done_text = store
        .get_experiment_measurement(EXIT_STATUS)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "Failure".to_string());
    std::fs::write(path, format!("{}\n", done_text))?;
    info!("Wrote done file {} ({})", path.display(), done_text);
    Ok(())
}
