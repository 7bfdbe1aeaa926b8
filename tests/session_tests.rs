use digitizer_rs::DigitizerEngine;
use digitizer_rs::core::{CalibrationValues, CanvasPoint, Mode};

fn calibrated_engine_with_points() -> DigitizerEngine {
    let mut engine = DigitizerEngine::new();
    engine.begin_axis_capture();
    for (x, y) in [(100.0, 700.0), (900.0, 700.0), (100.0, 700.0), (100.0, 100.0)] {
        engine.axis_click(CanvasPoint::new(x, y)).expect("axis click");
    }
    engine
        .calibrate(CalibrationValues::new(0.0, 10.0, 0.0, 100.0).expect("values"))
        .expect("calibration");
    engine.add_point(CanvasPoint::new(500.0, 400.0)).expect("add");
    engine.add_point(CanvasPoint::new(580.0, 340.0)).expect("add");
    engine
}

#[test]
fn export_uses_the_documented_field_names() {
    let engine = calibrated_engine_with_points();
    let json = engine.export_session_json().expect("export");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

    assert_eq!(value["isCalibrated"], serde_json::json!(true));
    assert_eq!(value["scaleX"], serde_json::json!(80.0));
    assert_eq!(value["offsetY"], serde_json::json!(700.0));
    assert_eq!(value["logX"], serde_json::json!(false));
    assert_eq!(value["zoom"], serde_json::json!(1.0));
    assert_eq!(value["panX"], serde_json::json!(0.0));
    assert_eq!(value["showGrid"], serde_json::json!(false));
    assert_eq!(value["mode"], serde_json::json!("add"));
    assert_eq!(value["currentLineIndex"], serde_json::json!(0));
    assert_eq!(value["magnifierZoom"], serde_json::json!(2.0));

    let line = &value["lines"][0];
    assert_eq!(line["name"], serde_json::json!("Line 1"));
    assert_eq!(line["sorted"], serde_json::json!(false));
    assert_eq!(line["orderCounter"], serde_json::json!(2));

    let point = &line["points"][0];
    assert_eq!(point["x"], serde_json::json!(500.0));
    assert_eq!(point["dataX"], serde_json::json!(5.0));
    assert_eq!(point["dataY"], serde_json::json!(50.0));
    assert_eq!(point["order"], serde_json::json!(1));

    let axis_point = &value["axisPoints"][0];
    assert_eq!(axis_point["x"], serde_json::json!(100.0));
    assert_eq!(axis_point["label"], serde_json::json!("X1"));
}

#[test]
fn session_round_trip_preserves_the_document() {
    let source = calibrated_engine_with_points();
    let json = source.export_session_json().expect("export");

    let mut restored = DigitizerEngine::new();
    restored.import_session_json(&json).expect("import");

    assert_eq!(restored.document(), source.document());
    assert!(restored.is_calibrated());
    assert!(!restored.can_undo());
}

#[test]
fn import_tolerates_missing_order_fields() {
    let json = r#"{
        "lines": [
            {
                "name": "Legacy",
                "points": [
                    {"x": 1.0, "y": 2.0, "dataX": 0.1, "dataY": 0.2},
                    {"x": 3.0, "y": 4.0, "dataX": 0.3, "dataY": 0.4},
                    {"x": 5.0, "y": 6.0}
                ]
            }
        ],
        "isCalibrated": false
    }"#;

    let mut engine = DigitizerEngine::new();
    engine.import_session_json(json).expect("import");

    let line = &engine.document().lines[0];
    assert_eq!(line.name, "Legacy");
    assert!(!line.sorted);
    let orders: Vec<u64> = line.points.iter().map(|p| p.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert_eq!(line.order_counter, 3);
    assert_eq!(line.points[2].data_x, None);
}

#[test]
fn import_derives_order_counter_from_existing_orders() {
    let json = r#"{
        "lines": [
            {
                "name": "Partial",
                "points": [
                    {"x": 1.0, "y": 2.0, "order": 7},
                    {"x": 3.0, "y": 4.0, "order": 9}
                ]
            }
        ]
    }"#;

    let mut engine = DigitizerEngine::new();
    engine.import_session_json(json).expect("import");
    assert_eq!(engine.document().lines[0].order_counter, 9);
}

#[test]
fn import_falls_back_to_idle_mode_when_uncalibrated() {
    let json = r#"{
        "lines": [{"name": "Line 1", "points": []}],
        "mode": "add",
        "isCalibrated": false
    }"#;

    let mut engine = DigitizerEngine::new();
    engine.import_session_json(json).expect("import");
    assert_eq!(engine.document().mode, Mode::None);
}

#[test]
fn import_clamps_the_current_line_index() {
    let json = r#"{
        "lines": [{"name": "Only", "points": []}],
        "currentLineIndex": 5
    }"#;

    let mut engine = DigitizerEngine::new();
    engine.import_session_json(json).expect("import");
    assert_eq!(engine.document().current_line_index, 0);
}

#[test]
fn import_of_an_empty_object_yields_a_fresh_document() {
    let mut engine = DigitizerEngine::new();
    engine.import_session_json("{}").expect("import");

    let document = engine.document();
    assert_eq!(document.lines.len(), 1);
    assert_eq!(document.lines[0].name, "Line 1");
    assert!(!document.is_calibrated());
    assert_eq!(document.view.zoom, 1.0);
    assert_eq!(document.magnifier_zoom, 2.0);
}

#[test]
fn import_drops_unusable_calibration_parameters() {
    // Claims to be calibrated but carries a zero X scale.
    let json = r#"{
        "lines": [{"name": "Line 1", "points": []}],
        "scaleX": 0.0, "scaleY": -6.0, "offsetX": 100.0, "offsetY": 700.0,
        "isCalibrated": true,
        "mode": "add"
    }"#;

    let mut engine = DigitizerEngine::new();
    engine.import_session_json(json).expect("import");
    assert!(!engine.is_calibrated());
    assert_eq!(engine.document().mode, Mode::None);
}

#[test]
fn malformed_json_is_rejected() {
    let mut engine = DigitizerEngine::new();
    assert!(engine.import_session_json("not json").is_err());
}
