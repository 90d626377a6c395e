//! Chi-square test of homogeneity for a binary condition measured in two populations.

// Modules
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod homogeneity;
pub mod report;
pub mod stats;
pub mod table;
pub mod utils;

// Individual classes, and functions
pub use config::{HomogeneityIO, TestConfig};
pub use data::{FieldValue, Population, Record};
pub use errors::{ErrorKind, HomogeneityError};
pub use homogeneity::{HomogeneityTest, TestResult, TestRun};
pub use report::render;
pub use table::{ConditionCounts, ContingencyTable, ExpectedTable, Group, Outcome};
