use crate::errors::HomogeneityError;

// Validation
pub fn validate_positive_float_parameter(value: f64, parameter: &str) -> Result<(), HomogeneityError> {
    if value.is_nan() || value <= 0.0 || value.is_infinite() {
        Err(HomogeneityError::InvalidParameter(
            parameter.to_string(),
            "positive finite real value".to_string(),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Check that `value` lies strictly between `min` and `max`.
pub fn validate_open_interval_parameter(
    value: f64,
    min: f64,
    max: f64,
    parameter: &str,
) -> Result<(), HomogeneityError> {
    if value.is_nan() || value <= min || max <= value {
        let ex_msg = format!("real value strictly between {} and {}", min, max);
        Err(HomogeneityError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_non_empty_parameter(value: &str, parameter: &str) -> Result<(), HomogeneityError> {
    if value.trim().is_empty() {
        Err(HomogeneityError::InvalidParameter(
            parameter.to_string(),
            "non-empty name".to_string(),
            format!("\"{}\"", value),
        ))
    } else {
        Ok(())
    }
}

/// Round a value to the given number of decimals.
pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}
