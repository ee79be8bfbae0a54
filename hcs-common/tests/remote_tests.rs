//! Tests for the distributed-work payload types: wire-format stability of
//! the work unit and report building from a finished store.

use hcs_common::remote::{MeasurementReport, WorkUnit};
use hcs_common::{Store, Value, EXIT_STATUS, IMAGE};

#[test]
fn test_work_unit_wire_format() {
    let json = r#"{"image_set_start":11,"image_set_end":20,"pipeline":"stages-v1"}"#;
    let unit: WorkUnit = serde_json::from_str(json).unwrap();
    assert_eq!(unit.image_set_start, 11);
    assert_eq!(unit.image_set_end, 20);
    assert_eq!(unit.pipeline, "stages-v1");

    let round = serde_json::to_string(&unit).unwrap();
    let again: WorkUnit = serde_json::from_str(&round).unwrap();
    assert_eq!(again.image_set_start, unit.image_set_start);
    assert_eq!(again.pipeline, unit.pipeline);
}

#[test]
fn test_value_wire_format_is_tagged() {
    let json = serde_json::to_string(&Value::Float(1.5)).unwrap();
    assert_eq!(json, r#"{"type":"float","value":1.5}"#);
    let json = serde_json::to_string(&Value::Vector(vec![1.0, 2.0])).unwrap();
    assert_eq!(json, r#"{"type":"vector","value":[1.0,2.0]}"#);
}

#[test]
fn test_report_carries_every_cell() {
    let unit = WorkUnit {
        image_set_start: 1,
        image_set_end: 2,
        pipeline: String::new(),
    };
    let mut store = Store::new();
    store.add_measurement_at(IMAGE, "Count", 5i64, 1);
    store.add_measurement_at(IMAGE, "Count", 6i64, 2);
    store.add_measurement_at("cells", "Area", vec![1.0, 2.0], 1);
    store.add_experiment_measurement(EXIT_STATUS, "Complete");

    let report = MeasurementReport::from_store(&unit, &store);
    assert_eq!(report.image_set_start, 1);
    assert_eq!(report.image_set_end, 2);
    // Two Count cells, two auto-registered ImageNumber cells, one vector
    // cell and the experiment scalar
    assert_eq!(report.cells.len(), 6);
    assert!(report
        .cells
        .iter()
        .any(|c| c.object_name == "cells" && c.value == Value::Vector(vec![1.0, 2.0])));

    // The payload survives JSON
    let json = serde_json::to_string(&report).unwrap();
    let decoded: MeasurementReport = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.cells.len(), report.cells.len());
}
