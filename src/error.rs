use thiserror::Error;

use crate::core::types::Axis;

pub type DigitizerResult<T> = Result<T, DigitizerError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DigitizerError {
    #[error("no calibration is active")]
    NotCalibrated,

    #[error("computed coordinate is not finite")]
    NonFinite,

    #[error("invalid numeric input: {0}")]
    InvalidNumeric(String),

    #[error("axis reference values must be distinct")]
    DuplicateAxisValue,

    #[error("calibration points are degenerate on the {0} axis")]
    DegenerateGeometry(Axis),

    #[error("log {0} axis requires positive reference values")]
    NonPositiveLogValue(Axis),

    #[error("trace path is empty or too short")]
    EmptyOrShortPath,

    #[error("line name already in use: {0}")]
    DuplicateName(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
