use digitizer_rs::core::{AxisMapping, CalibrationParams, CanvasPoint, CoordinateMapper};
use proptest::prelude::*;

proptest! {
    #[test]
    fn linear_axis_round_trips_within_tolerance(
        scale in -500.0f64..500.0,
        offset in -1_000.0f64..1_000.0,
        canvas in -2_000.0f64..2_000.0
    ) {
        prop_assume!(scale.abs() > 0.01);

        let mapping = AxisMapping::new(scale, offset, false);
        let data = mapping.to_data(canvas).expect("to data");
        let back = mapping.to_canvas(data).expect("to canvas");

        let tolerance = 1e-9 * (canvas.abs() + offset.abs() + 1.0);
        prop_assert!((back - canvas).abs() <= tolerance);
    }

    #[test]
    fn log_axis_round_trips_within_tolerance(
        decade_px in 20.0f64..400.0,
        offset in -500.0f64..500.0,
        exponent in -8.0f64..8.0
    ) {
        // Build the canvas coordinate from a bounded exponent so the data
        // value stays comfortably inside the float range.
        let canvas = offset + exponent * decade_px;
        let mapping = AxisMapping::new(decade_px, offset, true);

        let data = mapping.to_data(canvas).expect("to data");
        prop_assert!(data > 0.0);

        let back = mapping.to_canvas(data).expect("to canvas");
        let tolerance = 1e-9 * (canvas.abs() + offset.abs() + 1.0);
        prop_assert!((back - canvas).abs() <= tolerance);
    }

    #[test]
    fn log_axis_never_yields_a_non_positive_value(
        scale in -200.0f64..200.0,
        offset in -1_000.0f64..1_000.0,
        canvas in -10_000.0f64..10_000.0
    ) {
        prop_assume!(scale.abs() > 1e-6);

        let mapping = AxisMapping::new(scale, offset, true);
        if let Ok(value) = mapping.to_data(canvas) {
            prop_assert!(value > 0.0);
            prop_assert!(value.is_finite());
        }
    }

    #[test]
    fn mapper_round_trips_both_axes(
        scale_x in 1.0f64..200.0,
        scale_y in -200.0f64..-1.0,
        offset_x in -500.0f64..500.0,
        offset_y in -500.0f64..500.0,
        x in -1_500.0f64..1_500.0,
        y in -1_500.0f64..1_500.0
    ) {
        let params = CalibrationParams {
            scale_x,
            offset_x,
            scale_y,
            offset_y,
            log_x: false,
            log_y: false,
        };
        let mapper = CoordinateMapper::from_params(&params);

        let data = mapper.to_data(CanvasPoint::new(x, y)).expect("to data");
        let back = mapper.to_canvas(data).expect("to canvas");

        prop_assert!((back.x - x).abs() <= 1e-9 * (x.abs() + offset_x.abs() + 1.0));
        prop_assert!((back.y - y).abs() <= 1e-9 * (y.abs() + offset_y.abs() + 1.0));
    }
}
