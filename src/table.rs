//! Tables
//!
//! The observed contingency table and the expected frequency table of a test of
//! homogeneity. Both are plain values with named accessors per cell; the margins
//! of the observed table are derived from its four counts so they can never
//! disagree with them.
use crate::stats::expected_frequency;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Position of a population in the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    First,
    Second,
}

impl Group {
    pub const ALL: [Group; 2] = [Group::First, Group::Second];

    pub fn index(self) -> usize {
        match self {
            Group::First => 0,
            Group::Second => 1,
        }
    }
}

/// Column of a table: the condition holds, or it does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Condition,
    Inverse,
}

impl Outcome {
    pub const ALL: [Outcome; 2] = [Outcome::Condition, Outcome::Inverse];
}

/// Row and column names shared by the observed and expected tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLabels {
    /// Population labels, first and second.
    pub populations: [String; 2],
    pub condition: String,
    pub inverse_condition: String,
}

impl TableLabels {
    pub fn population(&self, group: Group) -> &str {
        &self.populations[group.index()]
    }

    pub fn outcome(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::Condition => &self.condition,
            Outcome::Inverse => &self.inverse_condition,
        }
    }
}

/// Observed counts of one population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionCounts {
    /// Records where the condition holds.
    pub condition: u64,
    /// Records where it does not.
    pub inverse: u64,
}

impl ConditionCounts {
    pub fn new(condition: u64, inverse: u64) -> Self {
        ConditionCounts { condition, inverse }
    }

    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Condition => self.condition,
            Outcome::Inverse => self.inverse,
        }
    }

    /// Number of records in the population.
    pub fn total(&self) -> u64 {
        self.condition + self.inverse
    }
}

impl Add for ConditionCounts {
    type Output = ConditionCounts;

    fn add(self, other: ConditionCounts) -> ConditionCounts {
        ConditionCounts {
            condition: self.condition + other.condition,
            inverse: self.inverse + other.inverse,
        }
    }
}

/// Observed frequencies, populations by outcome, with a Total row and column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    pub labels: TableLabels,
    first: ConditionCounts,
    second: ConditionCounts,
}

impl ContingencyTable {
    pub fn new(labels: TableLabels, first: ConditionCounts, second: ConditionCounts) -> Self {
        ContingencyTable { labels, first, second }
    }

    /// Counts of a population row.
    pub fn row(&self, group: Group) -> ConditionCounts {
        match group {
            Group::First => self.first,
            Group::Second => self.second,
        }
    }

    pub fn cell(&self, group: Group, outcome: Outcome) -> u64 {
        self.row(group).get(outcome)
    }

    /// The Total column of a population row.
    pub fn row_total(&self, group: Group) -> u64 {
        self.row(group).total()
    }

    /// The Total row of an outcome column.
    pub fn column_total(&self, outcome: Outcome) -> u64 {
        self.totals().get(outcome)
    }

    /// The Total row.
    pub fn totals(&self) -> ConditionCounts {
        self.first + self.second
    }

    /// The bottom right cell.
    pub fn grand_total(&self) -> u64 {
        self.totals().total()
    }
}

/// Expected frequencies of one population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedFrequencies {
    pub condition: f64,
    pub inverse: f64,
}

impl ExpectedFrequencies {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Condition => self.condition,
            Outcome::Inverse => self.inverse,
        }
    }

    pub fn total(&self) -> f64 {
        self.condition + self.inverse
    }
}

/// Expected frequencies under homogeneity, populations by outcome, without margins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedTable {
    pub labels: TableLabels,
    first: ExpectedFrequencies,
    second: ExpectedFrequencies,
}

impl ExpectedTable {
    /// Derive the expected table from the margins of `observed`.
    ///
    /// The caller must ensure the grand total is not zero.
    pub(crate) fn from_observed(observed: &ContingencyTable) -> Self {
        let grand_total = observed.grand_total();
        let row = |group: Group| ExpectedFrequencies {
            condition: expected_frequency(
                observed.row_total(group),
                observed.column_total(Outcome::Condition),
                grand_total,
            ),
            inverse: expected_frequency(
                observed.row_total(group),
                observed.column_total(Outcome::Inverse),
                grand_total,
            ),
        };
        ExpectedTable {
            labels: observed.labels.clone(),
            first: row(Group::First),
            second: row(Group::Second),
        }
    }

    pub fn row(&self, group: Group) -> ExpectedFrequencies {
        match group {
            Group::First => self.first,
            Group::Second => self.second,
        }
    }

    pub fn cell(&self, group: Group, outcome: Outcome) -> f64 {
        self.row(group).get(outcome)
    }
}
