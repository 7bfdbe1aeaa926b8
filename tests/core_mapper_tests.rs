use digitizer_rs::DigitizerError;
use digitizer_rs::core::{AxisMapping, CalibrationParams, CanvasPoint, CoordinateMapper, DataPoint};

fn scenario_params() -> CalibrationParams {
    // 1000x800 image calibrated with X1=(100,700) X2=(900,700) Y1=(100,700)
    // Y2=(100,100) over values x: 0..10, y: 0..100.
    CalibrationParams {
        scale_x: 80.0,
        offset_x: 100.0,
        scale_y: -6.0,
        offset_y: 700.0,
        log_x: false,
        log_y: false,
    }
}

#[test]
fn scenario_point_maps_to_expected_data() {
    let mapper = CoordinateMapper::from_params(&scenario_params());
    let data = mapper
        .to_data(CanvasPoint::new(500.0, 400.0))
        .expect("conversion");
    assert_eq!(data, DataPoint::new(5.0, 50.0));
}

#[test]
fn linear_round_trip_within_tolerance() {
    let mapper = CoordinateMapper::from_params(&scenario_params());
    let original = CanvasPoint::new(431.25, 612.5);

    let data = mapper.to_data(original).expect("to data");
    let back = mapper.to_canvas(data).expect("to canvas");

    assert!((back.x - original.x).abs() <= 1e-9);
    assert!((back.y - original.y).abs() <= 1e-9);
}

#[test]
fn log_round_trip_within_tolerance() {
    // 120 px per decade on both axes.
    let params = CalibrationParams {
        scale_x: 120.0,
        offset_x: 40.0,
        scale_y: -120.0,
        offset_y: 640.0,
        log_x: true,
        log_y: true,
    };
    let mapper = CoordinateMapper::from_params(&params);
    let original = CanvasPoint::new(310.0, 275.0);

    let data = mapper.to_data(original).expect("to data");
    assert!(data.x > 0.0 && data.y > 0.0);

    let back = mapper.to_canvas(data).expect("to canvas");
    assert!((back.x - original.x).abs() <= 1e-9);
    assert!((back.y - original.y).abs() <= 1e-9);
}

#[test]
fn zero_scale_fails_every_conversion() {
    let mapping = AxisMapping::new(0.0, 10.0, false);
    assert_eq!(mapping.to_data(50.0), Err(DigitizerError::NonFinite));
    assert_eq!(mapping.to_canvas(1.0), Err(DigitizerError::NonFinite));
}

#[test]
fn non_finite_scale_fails_every_conversion() {
    let mapping = AxisMapping::new(f64::NAN, 10.0, false);
    assert_eq!(mapping.to_data(50.0), Err(DigitizerError::NonFinite));

    let mapping = AxisMapping::new(f64::INFINITY, 10.0, true);
    assert_eq!(mapping.to_data(50.0), Err(DigitizerError::NonFinite));
}

#[test]
fn log_axis_overflow_returns_no_result() {
    // Tiny scale blows the exponent up past the float range.
    let mapping = AxisMapping::new(1e-3, 0.0, true);
    assert_eq!(mapping.to_data(10.0), Err(DigitizerError::NonFinite));
}

#[test]
fn log_axis_underflow_returns_no_result() {
    // Exponent of -400 underflows to zero, which is outside the log domain.
    let mapping = AxisMapping::new(1.0, 0.0, true);
    assert_eq!(mapping.to_data(-400.0), Err(DigitizerError::NonFinite));
}

#[test]
fn log_axis_rejects_non_positive_data_on_inverse() {
    let mapping = AxisMapping::new(120.0, 40.0, true);
    assert_eq!(mapping.to_canvas(0.0), Err(DigitizerError::NonFinite));
    assert_eq!(mapping.to_canvas(-3.0), Err(DigitizerError::NonFinite));
}

#[test]
fn non_finite_input_is_rejected() {
    let mapping = AxisMapping::new(80.0, 100.0, false);
    assert_eq!(mapping.to_data(f64::NAN), Err(DigitizerError::NonFinite));
    assert_eq!(
        mapping.to_canvas(f64::NEG_INFINITY),
        Err(DigitizerError::NonFinite)
    );
}
