/// Significance level used when none is given.
pub const DEFAULT_ALPHA: f64 = 0.01;
/// Chi-square critical value at alpha = 0.01 with one degree of freedom.
pub const DEFAULT_CRITICAL_VALUE: f64 = 6.635;
/// (rows - 1) * (columns - 1) for a 2x2 table.
pub const DEGREES_OF_FREEDOM: u32 = 1;
/// Label of the margin row and column.
pub const TOTAL_LABEL: &str = "Total";
/// Prefix of the derived inverse condition name.
pub const INVERSE_PREFIX: &str = "Not";
/// Expected frequencies below this make the chi-square approximation unreliable.
pub const MIN_EXPECTED_FREQUENCY: f64 = 5.0;
/// Tolerance when comparing expected row sums to observed row totals.
pub const TOTAL_TOLERANCE: f64 = 1e-9;
