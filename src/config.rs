//! Test Configuration
//!
//! Defines the parameters of a test of homogeneity and the json persistence
//! shared by configurations and results.
use crate::constants::{DEFAULT_ALPHA, DEFAULT_CRITICAL_VALUE, DEGREES_OF_FREEDOM, INVERSE_PREFIX};
use crate::errors::HomogeneityError;
use crate::stats::critical_value;
use crate::utils::{validate_non_empty_parameter, validate_open_interval_parameter, validate_positive_float_parameter};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}
fn default_critical_value() -> f64 {
    DEFAULT_CRITICAL_VALUE
}
fn default_parallel() -> bool {
    false
}

/// Configuration for a `HomogeneityTest`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestConfig {
    /// Name of the binary field measured in both populations.
    pub condition: String,
    /// Level of statistical significance.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Chi-square critical value the statistic must exceed.
    #[serde(default = "default_critical_value")]
    pub critical_value: f64,
    /// Count condition values with rayon.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl TestConfig {
    /// Configuration with the default alpha of 0.01 and critical value of 6.635.
    pub fn new(condition: &str) -> Self {
        TestConfig {
            condition: condition.to_string(),
            alpha: DEFAULT_ALPHA,
            critical_value: DEFAULT_CRITICAL_VALUE,
            parallel: false,
        }
    }

    /// Configuration whose critical value is derived from `alpha` at one degree of freedom.
    pub fn from_alpha(condition: &str, alpha: f64) -> Result<Self, HomogeneityError> {
        validate_open_interval_parameter(alpha, 0.0, 1.0, "alpha")?;
        Ok(TestConfig {
            alpha,
            critical_value: critical_value(alpha, DEGREES_OF_FREEDOM)?,
            ..TestConfig::new(condition)
        })
    }

    /// The human readable negation of the condition, used to label tables.
    pub fn inverse_condition(&self) -> String {
        format!("{} {}", INVERSE_PREFIX, self.condition)
    }

    pub fn validate_parameters(&self) -> Result<(), HomogeneityError> {
        validate_non_empty_parameter(&self.condition, "condition")?;
        validate_open_interval_parameter(self.alpha, 0.0, 1.0, "alpha")?;
        validate_positive_float_parameter(self.critical_value, "critical_value")?;
        Ok(())
    }
}

/// IO
pub trait HomogeneityIO: Serialize + DeserializeOwned + Sized {
    /// Save the object as json to a file.
    ///
    /// * `path` - Path to save to.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), HomogeneityError> {
        fs::write(path, self.json_dump()?).map_err(|e| HomogeneityError::UnableToWrite(e.to_string()))
    }

    /// Dump the object as a json string.
    fn json_dump(&self) -> Result<String, HomogeneityError> {
        serde_json::to_string(self).map_err(|e| HomogeneityError::UnableToWrite(e.to_string()))
    }

    /// Load the object from a json string.
    fn from_json(json_str: &str) -> Result<Self, HomogeneityError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| HomogeneityError::UnableToRead(e.to_string()))
    }

    /// Load the object from a path to a json file.
    fn load<P: AsRef<Path>>(path: P) -> Result<Self, HomogeneityError> {
        let json_str = fs::read_to_string(path).map_err(|e| HomogeneityError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl HomogeneityIO for TestConfig {}
