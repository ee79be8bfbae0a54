//! Distributed-work transport client
//!
//! Worker side of the coordinator protocol: fetch a work unit (an image-set
//! range plus the pipeline text to run), and report a finished run's store
//! back. Each work unit is run into a fresh, private store, so nothing here
//! needs cross-worker synchronization; merging reports is the coordinator's
//! job.

use crate::error::Result;
use crate::store::Store;
use crate::value::Value;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One unit of distributed work handed out by the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkUnit {
    pub image_set_start: u32,
    pub image_set_end: u32,
    /// Pipeline definition text the worker should run
    pub pipeline: String,
}

/// One store cell in a report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedCell {
    pub object_name: String,
    pub feature: String,
    pub image_number: u32,
    pub value: Value,
}

/// Everything a worker sends back for one work unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementReport {
    pub image_set_start: u32,
    pub image_set_end: u32,
    pub cells: Vec<ReportedCell>,
}

impl MeasurementReport {
    /// Flatten a run's store into a report for the given work unit
    pub fn from_store(unit: &WorkUnit, store: &Store) -> Self {
        let cells = store
            .iter_cells()
            .map(|(object_name, feature, image_number, value)| ReportedCell {
                object_name: object_name.to_string(),
                feature: feature.to_string(),
                image_number,
                value: value.clone(),
            })
            .collect();
        MeasurementReport {
            image_set_start: unit.image_set_start,
            image_set_end: unit.image_set_end,
            cells,
        }
    }
}

/// Fetch the next work unit from the coordinator. `Ok(None)` (HTTP 204)
/// means there is no more work and the worker loop should exit.
pub async fn fetch_work(client: &Client, base_url: &str) -> Result<Option<WorkUnit>> {
    let url = format!("{}/work", base_url.trim_end_matches('/'));
    let response = client.get(&url).send().await?;
    if response.status() == StatusCode::NO_CONTENT {
        info!("Coordinator reports no more work");
        return Ok(None);
    }
    let unit: WorkUnit = response.error_for_status()?.json().await?;
    info!(
        "Fetched work unit: image sets {}..={}",
        unit.image_set_start, unit.image_set_end
    );
    Ok(Some(unit))
}

/// Report a finished work unit's measurements back to the coordinator
pub async fn report_measurements(
    client: &Client,
    base_url: &str,
    unit: &WorkUnit,
    store: &Store,
) -> Result<()> {
    let report = MeasurementReport::from_store(unit, store);
    let url = format!("{}/report", base_url.trim_end_matches('/'));
    client
        .post(&url)
        .json(&report)
        .send()
        .await?
        .error_for_status()?;
    info!(
        "Reported {} cells for image sets {}..={}",
        report.cells.len(),
        unit.image_set_start,
        unit.image_set_end
    );
    Ok(())
}
