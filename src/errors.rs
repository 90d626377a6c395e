//! Errors
//!
//! Custom error types used throughout the `homogeneity` crate.
use thiserror::Error;

/// Broad classification of a [`HomogeneityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The test was set up incorrectly. The caller must fix the configuration.
    Configuration,
    /// The population data is unsuitable for the test.
    Data,
    /// Reading or writing a serialized object failed.
    Io,
}

/// Errors that can occur while configuring or running a test of homogeneity.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HomogeneityError {
    /// More than two population labels were supplied.
    #[error("Cannot compare more than two populations, {0} labels provided.")]
    TooManyPopulations(usize),
    /// Fewer than two population labels were supplied.
    #[error("Exactly two populations are required, {0} labels provided.")]
    TooFewPopulations(usize),
    /// The same label was used for both populations.
    #[error("Cannot compare the same population, label {0} provided twice.")]
    DuplicateLabel(String),
    /// First value is the number of labels, second the number of datasets.
    #[error("{0} population labels provided for {1} datasets.")]
    DatasetCountMismatch(usize, usize),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// A record does not carry the condition field.
    #[error("Record {row} of population {population} has no field {field}.")]
    MissingField {
        population: String,
        field: String,
        row: usize,
    },
    /// A record carries a condition value that is not binary.
    #[error("Record {row} of population {population} holds {value} in field {field}, expected 0 or 1.")]
    InvalidValue {
        population: String,
        field: String,
        row: usize,
        value: String,
    },
    /// Both populations are empty.
    #[error("Grand total of the comparison table is zero, both populations are empty.")]
    ZeroGrandTotal,
    /// An expected frequency is zero, so the chi-square term is undefined.
    #[error("Expected frequency of {outcome} in population {population} is zero.")]
    ZeroExpectedFrequency { population: String, outcome: String },
    /// Unable to write an object.
    #[error("Unable to write: {0}")]
    UnableToWrite(String),
    /// Unable to read an object.
    #[error("Unable to read: {0}")]
    UnableToRead(String),
}

impl HomogeneityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HomogeneityError::TooManyPopulations(_)
            | HomogeneityError::TooFewPopulations(_)
            | HomogeneityError::DuplicateLabel(_)
            | HomogeneityError::DatasetCountMismatch(_, _)
            | HomogeneityError::InvalidParameter(_, _, _) => ErrorKind::Configuration,
            HomogeneityError::MissingField { .. }
            | HomogeneityError::InvalidValue { .. }
            | HomogeneityError::ZeroGrandTotal
            | HomogeneityError::ZeroExpectedFrequency { .. } => ErrorKind::Data,
            HomogeneityError::UnableToWrite(_) | HomogeneityError::UnableToRead(_) => ErrorKind::Io,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    pub fn is_data_error(&self) -> bool {
        self.kind() == ErrorKind::Data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(HomogeneityError::TooManyPopulations(3).is_configuration_error());
        assert!(HomogeneityError::DuplicateLabel("a".to_string()).is_configuration_error());
        assert!(HomogeneityError::ZeroGrandTotal.is_data_error());
        let err = HomogeneityError::ZeroExpectedFrequency {
            population: "a".to_string(),
            outcome: "Survived".to_string(),
        };
        assert!(err.is_data_error());
        assert_eq!(HomogeneityError::UnableToRead("x".to_string()).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_error_message() {
        let err = HomogeneityError::MissingField {
            population: "crew".to_string(),
            field: "survived".to_string(),
            row: 4,
        };
        assert_eq!(err.to_string(), "Record 4 of population crew has no field survived.");
    }
}
