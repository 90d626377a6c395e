//! Stats
//!
//! Building blocks of the chi-square test: expected frequencies, cell contributions,
//! and the chi-square distribution used for p-values and critical values.
use crate::errors::HomogeneityError;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Expected count of a cell when population and outcome are independent.
///
/// `row_total * column_total / grand_total`, always in real division.
#[inline]
pub fn expected_frequency(row_total: u64, column_total: u64, grand_total: u64) -> f64 {
    (row_total as f64 * column_total as f64) / grand_total as f64
}

/// Contribution of a single cell, `(observed - expected)^2 / expected`.
#[inline]
pub fn chi_square_term(observed: f64, expected: f64) -> f64 {
    let diff = observed - expected;
    diff * diff / expected
}

/// Calculate the Chi-squared contingency statistic for a 2x2 table.
///
/// The table is represented as:
/// [[a, b],
///  [c, d]]
///
/// Formula: (a+b+c+d) * (ad - bc)^2 / ((a+b)(c+d)(a+c)(b+d))
///
/// Returns 0 for an empty table or a table with an empty margin.
pub fn chi2_contingency_2x2(a: f64, b: f64, c: f64, d: f64) -> f64 {
    let n = a + b + c + d;
    if n == 0.0 {
        return 0.0;
    }
    let numerator = n * (a * d - b * c).powi(2);
    let denominator = (a + b) * (c + d) * (a + c) * (b + d);
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn distribution(degrees_of_freedom: u32) -> Result<ChiSquared, HomogeneityError> {
    ChiSquared::new(f64::from(degrees_of_freedom)).map_err(|e| {
        HomogeneityError::InvalidParameter(
            "degrees_of_freedom".to_string(),
            "positive integer".to_string(),
            format!("{} ({})", degrees_of_freedom, e),
        )
    })
}

/// Probability of a statistic at least as large as `chi_square` under the null hypothesis.
pub fn p_value(chi_square: f64, degrees_of_freedom: u32) -> Result<f64, HomogeneityError> {
    let dist = distribution(degrees_of_freedom)?;
    Ok((1.0 - dist.cdf(chi_square)).clamp(0.0, 1.0))
}

/// Critical value of the chi-square distribution for significance level `alpha`.
pub fn critical_value(alpha: f64, degrees_of_freedom: u32) -> Result<f64, HomogeneityError> {
    crate::utils::validate_open_interval_parameter(alpha, 0.0, 1.0, "alpha")?;
    let dist = distribution(degrees_of_freedom)?;
    Ok(dist.inverse_cdf(1.0 - alpha))
}
