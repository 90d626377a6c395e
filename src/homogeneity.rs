//! Homogeneity Test
//!
//! Chi-square test of homogeneity for one binary condition measured in exactly
//! two populations.
use crate::config::{HomogeneityIO, TestConfig};
use crate::constants::{DEGREES_OF_FREEDOM, MIN_EXPECTED_FREQUENCY};
use crate::data::{Population, Record};
use crate::errors::HomogeneityError;
use crate::stats::{chi_square_term, p_value};
use crate::table::{ConditionCounts, ContingencyTable, ExpectedTable, Group, Outcome, TableLabels};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of a test of homogeneity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// The chi-square statistic, never negative.
    pub chi_square: f64,
    pub critical_value: f64,
    pub alpha: f64,
    pub degrees_of_freedom: u32,
    /// Upper tail probability of `chi_square`.
    pub p_value: f64,
    /// `chi_square > critical_value`. A tie is not significant.
    pub is_significant: bool,
}

impl TestResult {
    pub fn new(chi_square: f64, alpha: f64, critical_value: f64) -> Result<Self, HomogeneityError> {
        Ok(TestResult {
            chi_square,
            critical_value,
            alpha,
            degrees_of_freedom: DEGREES_OF_FREEDOM,
            p_value: p_value(chi_square, DEGREES_OF_FREEDOM)?,
            is_significant: chi_square > critical_value,
        })
    }
}

/// Everything a single run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRun {
    pub observed: ContingencyTable,
    pub expected: ExpectedTable,
    pub result: TestResult,
}

impl HomogeneityIO for TestResult {}
impl HomogeneityIO for TestRun {}

/// Chi-square test of homogeneity over two borrowed populations.
///
/// The populations are never modified, so a test can be run any number of times,
/// from any number of threads, with identical results.
#[derive(Debug, Clone)]
pub struct HomogeneityTest<'a> {
    pub cfg: TestConfig,
    labels: [String; 2],
    datasets: [&'a Population; 2],
}

impl<'a> HomogeneityTest<'a> {
    /// Create a test with the default alpha (0.01) and critical value (6.635).
    ///
    /// * `labels` - Labels of the two populations, used for the tables and in errors.
    /// * `datasets` - The populations, paired positionally with `labels`.
    /// * `condition` - Name of the binary field measured in both populations.
    pub fn new(labels: &[&str], datasets: &[&'a Population], condition: &str) -> Result<Self, HomogeneityError> {
        Self::with_config(labels, datasets, TestConfig::new(condition))
    }

    /// Create a test from an explicit configuration.
    pub fn with_config(
        labels: &[&str],
        datasets: &[&'a Population],
        cfg: TestConfig,
    ) -> Result<Self, HomogeneityError> {
        let (first_label, second_label) = match labels {
            [first, second] => (*first, *second),
            _ if labels.len() > 2 => return Err(HomogeneityError::TooManyPopulations(labels.len())),
            _ => return Err(HomogeneityError::TooFewPopulations(labels.len())),
        };
        if first_label == second_label {
            return Err(HomogeneityError::DuplicateLabel(first_label.to_string()));
        }
        let [first, second] = datasets else {
            return Err(HomogeneityError::DatasetCountMismatch(labels.len(), datasets.len()));
        };
        cfg.validate_parameters()?;

        Ok(HomogeneityTest {
            cfg,
            labels: [first_label.to_string(), second_label.to_string()],
            datasets: [*first, *second],
        })
    }

    // Set methods for parameters

    /// Set the level of statistical significance.
    /// * `alpha` - Reported alongside the result, it does not change the critical value.
    pub fn set_alpha(mut self, alpha: f64) -> Self {
        self.cfg.alpha = alpha;
        self
    }

    /// Set the chi-square critical value the statistic must exceed.
    pub fn set_critical_value(mut self, critical_value: f64) -> Self {
        self.cfg.critical_value = critical_value;
        self
    }

    /// Count the condition with rayon when `parallel` is true.
    pub fn set_parallel(mut self, parallel: bool) -> Self {
        self.cfg.parallel = parallel;
        self
    }

    pub fn label(&self, group: Group) -> &str {
        &self.labels[group.index()]
    }

    pub fn population(&self, group: Group) -> &'a Population {
        self.datasets[group.index()]
    }

    pub fn inverse_condition(&self) -> String {
        self.cfg.inverse_condition()
    }

    pub fn table_labels(&self) -> TableLabels {
        TableLabels {
            populations: self.labels.clone(),
            condition: self.cfg.condition.clone(),
            inverse_condition: self.inverse_condition(),
        }
    }

    /// Count the records of a population where the condition holds, and where it does not.
    pub fn count_condition(&self, group: Group) -> Result<ConditionCounts, HomogeneityError> {
        let population = self.population(group);
        let label = self.label(group);
        let field = self.cfg.condition.as_str();

        let indicator = |(row, record): (usize, &Record)| -> Result<u64, HomogeneityError> {
            let value = record.get(field).ok_or_else(|| HomogeneityError::MissingField {
                population: label.to_string(),
                field: field.to_string(),
                row,
            })?;
            value
                .as_binary()
                .map(u64::from)
                .ok_or_else(|| HomogeneityError::InvalidValue {
                    population: label.to_string(),
                    field: field.to_string(),
                    row,
                    value: value.to_string(),
                })
        };

        let condition = if self.cfg.parallel {
            population
                .records
                .par_iter()
                .enumerate()
                .map(indicator)
                .try_reduce(|| 0, |a, b| Ok(a + b))?
        } else {
            population
                .records
                .iter()
                .enumerate()
                .map(indicator)
                .sum::<Result<u64, HomogeneityError>>()?
        };
        let total = population.len() as u64;

        Ok(ConditionCounts::new(condition, total - condition))
    }

    /// Count both populations into the comparison table.
    pub fn build_observed_table(&self) -> Result<ContingencyTable, HomogeneityError> {
        let first = self.count_condition(Group::First)?;
        let second = self.count_condition(Group::Second)?;
        let table = ContingencyTable::new(self.table_labels(), first, second);
        debug!("Comparison Table\n{}", table);
        Ok(table)
    }

    /// Expected frequencies under the null hypothesis that both populations share one distribution.
    pub fn build_expected_table(&self, observed: &ContingencyTable) -> Result<ExpectedTable, HomogeneityError> {
        if observed.grand_total() == 0 {
            return Err(HomogeneityError::ZeroGrandTotal);
        }
        let expected = ExpectedTable::from_observed(observed);
        for group in Group::ALL {
            for outcome in Outcome::ALL {
                let e = expected.cell(group, outcome);
                if e < MIN_EXPECTED_FREQUENCY {
                    warn!(
                        "Expected frequency of {} in {} is {:.3}, below {}. The chi-square approximation may be unreliable.",
                        expected.labels.outcome(outcome),
                        expected.labels.population(group),
                        e,
                        MIN_EXPECTED_FREQUENCY
                    );
                }
            }
        }
        debug!("Expected Frequency Table\n{}", expected);
        Ok(expected)
    }

    /// Sum of `(observed - expected)^2 / expected` over the four population cells.
    pub fn compute_chi_square(
        &self,
        observed: &ContingencyTable,
        expected: &ExpectedTable,
    ) -> Result<f64, HomogeneityError> {
        let mut chi_square = 0.0;
        for group in Group::ALL {
            for outcome in Outcome::ALL {
                let e = expected.cell(group, outcome);
                if e <= 0.0 {
                    return Err(HomogeneityError::ZeroExpectedFrequency {
                        population: expected.labels.population(group).to_string(),
                        outcome: expected.labels.outcome(outcome).to_string(),
                    });
                }
                chi_square += chi_square_term(observed.cell(group, outcome) as f64, e);
            }
        }
        Ok(chi_square)
    }

    /// Run the test: observed table, expected table, chi-square, verdict.
    pub fn run(&self) -> Result<TestRun, HomogeneityError> {
        self.cfg.validate_parameters()?;
        info!(
            "Chi-Square Test of Homogeneity, comparing rates of {} between {} and {}.",
            self.cfg.condition, self.labels[0], self.labels[1]
        );

        let observed = self.build_observed_table()?;
        let expected = self.build_expected_table(&observed)?;
        let chi_square = self.compute_chi_square(&observed, &expected)?;
        let result = TestResult::new(chi_square, self.cfg.alpha, self.cfg.critical_value)?;

        info!(
            "Chi-square: {:.6}, critical value at p={}: {}, statistically significant: {}",
            result.chi_square, result.alpha, result.critical_value, result.is_significant
        );

        Ok(TestRun {
            observed,
            expected,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TOTAL_TOLERANCE;
    use crate::data::FieldValue;
    use crate::stats::chi2_contingency_2x2;
    use crate::utils::precision_round;
    use approx::assert_abs_diff_eq;
    use std::error::Error;
    use std::fs::File;
    use std::io::BufReader;

    const CONDITION: &str = "survived";

    fn pop(condition: usize, inverse: usize) -> Population {
        Population::from_counts(CONDITION, condition, inverse)
    }

    #[test]
    fn test_observed_table() {
        let (a, b) = (pop(6, 4), pop(2, 8));
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let observed = test.build_observed_table().unwrap();
        assert_eq!(observed.row(Group::First), ConditionCounts::new(6, 4));
        assert_eq!(observed.row(Group::Second), ConditionCounts::new(2, 8));
        assert_eq!(observed.totals(), ConditionCounts::new(8, 12));
        assert_eq!(observed.row_total(Group::First), 10);
        assert_eq!(observed.grand_total(), 20);
        assert_eq!(observed.labels.population(Group::First), "A");
        assert_eq!(observed.labels.inverse_condition, "Not survived");
    }

    #[test]
    fn test_unequal_proportions() {
        let (a, b) = (pop(6, 4), pop(2, 8));
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let run = test.run().unwrap();

        for group in Group::ALL {
            assert_eq!(run.expected.cell(group, Outcome::Condition), 4.0);
            assert_eq!(run.expected.cell(group, Outcome::Inverse), 6.0);
        }
        assert_abs_diff_eq!(run.result.chi_square, 10.0 / 3.0, epsilon = 1e-12);
        assert_eq!(precision_round(run.result.chi_square, 3), 3.333);
        assert_eq!(run.result.critical_value, 6.635);
        assert_eq!(run.result.alpha, 0.01);
        assert_eq!(run.result.degrees_of_freedom, 1);
        assert!(!run.result.is_significant);
        assert!(run.result.p_value > 0.05 && run.result.p_value < 0.1);
    }

    #[test]
    fn test_identical_proportions() {
        let (a, b) = (pop(3, 7), pop(6, 14));
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let run = test.run().unwrap();
        assert_eq!(run.result.chi_square, 0.0);
        assert!(!run.result.is_significant);
        assert_abs_diff_eq!(run.result.p_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_significant() {
        let (a, b) = (pop(30, 10), pop(10, 30));
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let run = test.run().unwrap();
        assert_abs_diff_eq!(run.result.chi_square, 20.0, epsilon = 1e-12);
        assert!(run.result.is_significant);
        assert!(run.result.p_value < 0.01);
    }

    #[test]
    fn test_tie_is_not_significant() {
        let (a, b) = (pop(30, 10), pop(10, 30));
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION)
            .unwrap()
            .set_critical_value(20.0);
        let run = test.run().unwrap();
        assert_eq!(run.result.chi_square, 20.0);
        assert!(!run.result.is_significant);
    }

    #[test]
    fn test_from_alpha() {
        let (a, b) = (pop(10, 5), pop(10, 20));
        let cfg = TestConfig::from_alpha(CONDITION, 0.05).unwrap();
        let test = HomogeneityTest::with_config(&["A", "B"], &[&a, &b], cfg).unwrap();
        let run = test.run().unwrap();
        assert_abs_diff_eq!(run.result.chi_square, 4.5, epsilon = 1e-9);
        assert!(run.result.is_significant);

        let test = test.set_alpha(0.01).set_critical_value(6.635);
        assert!(!test.run().unwrap().result.is_significant);
    }

    #[test]
    fn test_matches_closed_form() {
        let tables = [(6, 4, 2, 8), (10, 5, 10, 20), (1, 99, 7, 13), (250, 750, 301, 699), (5, 5, 5, 6)];
        for (a, b, c, d) in tables {
            let (p1, p2) = (pop(a, b), pop(c, d));
            let test = HomogeneityTest::new(&["A", "B"], &[&p1, &p2], CONDITION).unwrap();
            let chi_square = test.run().unwrap().result.chi_square;
            let closed = chi2_contingency_2x2(a as f64, b as f64, c as f64, d as f64);
            assert_abs_diff_eq!(chi_square, closed, epsilon = 1e-9 * closed.max(1.0));
            assert!(chi_square > 0.0 || (a * d == b * c));
        }
    }

    #[test]
    fn test_expected_rows_match_observed() {
        let (a, b) = (pop(13, 29), pop(7, 3));
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let run = test.run().unwrap();
        for group in Group::ALL {
            let row = run.expected.row(group);
            assert!(row.condition >= 0.0 && row.inverse >= 0.0);
            assert!((row.total() - run.observed.row_total(group) as f64).abs() < TOTAL_TOLERANCE);
        }
    }

    #[test]
    fn test_too_many_populations() {
        let (a, b, c) = (pop(1, 1), pop(1, 1), pop(1, 1));
        let err = HomogeneityTest::new(&["A", "B", "C"], &[&a, &b, &c], CONDITION).unwrap_err();
        assert_eq!(err, HomogeneityError::TooManyPopulations(3));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_same_population() {
        let (a, b) = (pop(1, 1), pop(1, 1));
        let err = HomogeneityTest::new(&["A", "A"], &[&a, &b], CONDITION).unwrap_err();
        assert_eq!(err, HomogeneityError::DuplicateLabel("A".to_string()));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_invalid_setup() {
        let (a, b) = (pop(1, 1), pop(1, 1));
        let err = HomogeneityTest::new(&["A"], &[&a], CONDITION).unwrap_err();
        assert_eq!(err, HomogeneityError::TooFewPopulations(1));
        let err = HomogeneityTest::new(&["A", "B"], &[&a], CONDITION).unwrap_err();
        assert_eq!(err, HomogeneityError::DatasetCountMismatch(2, 1));
        let err = HomogeneityTest::new(&["A", "B"], &[&a, &b], "").unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_setters_are_validated_on_run() {
        let (a, b) = (pop(6, 4), pop(2, 8));
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION)
            .unwrap()
            .set_alpha(2.0);
        assert!(test.run().unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_both_populations_empty() {
        let (a, b) = (Population::default(), Population::default());
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let observed = test.build_observed_table().unwrap();
        assert_eq!(observed.grand_total(), 0);
        let err = test.run().unwrap_err();
        assert_eq!(err, HomogeneityError::ZeroGrandTotal);
        assert!(err.is_data_error());
    }

    #[test]
    fn test_one_population_empty() {
        let (a, b) = (pop(3, 4), Population::default());
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let err = test.run().unwrap_err();
        assert_eq!(
            err,
            HomogeneityError::ZeroExpectedFrequency {
                population: "B".to_string(),
                outcome: "survived".to_string(),
            }
        );
    }

    #[test]
    fn test_zero_marginal() {
        let (a, b) = (pop(0, 4), pop(0, 9));
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let err = test.run().unwrap_err();
        assert_eq!(
            err,
            HomogeneityError::ZeroExpectedFrequency {
                population: "A".to_string(),
                outcome: "survived".to_string(),
            }
        );
        assert!(err.is_data_error());
    }

    #[test]
    fn test_missing_field() {
        let a = pop(2, 2);
        let mut b = pop(1, 1);
        let mut record = Record::new();
        record.insert("age".to_string(), FieldValue::Int(40));
        b.push(record);
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let err = test.run().unwrap_err();
        assert_eq!(
            err,
            HomogeneityError::MissingField {
                population: "B".to_string(),
                field: "survived".to_string(),
                row: 2,
            }
        );
        assert!(err.is_data_error());
    }

    #[test]
    fn test_invalid_value() {
        let a = Population::from_json(r#"[{"survived": 1}, {"survived": 2}]"#).unwrap();
        let b = pop(1, 1);
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let err = test.count_condition(Group::First).unwrap_err();
        assert_eq!(
            err,
            HomogeneityError::InvalidValue {
                population: "A".to_string(),
                field: "survived".to_string(),
                row: 1,
                value: "2".to_string(),
            }
        );

        let a = Population::from_json(r#"[{"survived": null}]"#).unwrap();
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        assert!(test.run().unwrap_err().is_data_error());
    }

    #[test]
    fn test_mixed_binary_values() {
        let a = Population::from_json(r#"[{"survived": 1}, {"survived": true}, {"survived": 0.0}, {"survived": false}]"#)
            .unwrap();
        let b = pop(1, 1);
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        assert_eq!(test.count_condition(Group::First).unwrap(), ConditionCounts::new(2, 2));
    }

    #[test]
    fn test_parallel_matches_serial() {
        let values_a: Vec<bool> = (0..10_000).map(|i| i % 3 == 0).collect();
        let values_b: Vec<bool> = (0..7_500).map(|i| i % 5 < 2).collect();
        let a = Population::from_binary_column(CONDITION, &values_a);
        let b = Population::from_binary_column(CONDITION, &values_b);
        let serial = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let parallel = serial.clone().set_parallel(true);
        assert_eq!(parallel.count_condition(Group::First).unwrap(), ConditionCounts::new(3334, 6666));
        assert_eq!(serial.run().unwrap(), parallel.run().unwrap());
    }

    #[test]
    fn test_run_is_repeatable() {
        let (a, b) = (pop(17, 23), pop(31, 9));
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        assert_eq!(test.run().unwrap(), test.run().unwrap());
        assert_eq!(a, pop(17, 23));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HomogeneityTest<'static>>();
    }

    #[test]
    fn test_run_json() {
        let (a, b) = (pop(6, 4), pop(2, 8));
        let test = HomogeneityTest::new(&["A", "B"], &[&a, &b], CONDITION).unwrap();
        let run = test.run().unwrap();
        let json = run.json_dump().unwrap();
        let run2 = TestRun::from_json(&json).unwrap();
        assert_eq!(run, run2);
        let result = TestResult::from_json(&run.result.json_dump().unwrap()).unwrap();
        assert_eq!(result, run.result);
    }

    fn read_passengers(path: &str) -> Result<(Population, Population), Box<dyn Error>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let sex_index = headers.iter().position(|h| h == "sex").ok_or("sex column not found")?;
        let target_index = headers
            .iter()
            .position(|h| h == CONDITION)
            .ok_or("survived column not found")?;

        let (mut female, mut male) = (Population::default(), Population::default());
        for result in csv_reader.records() {
            let record = result?;
            let mut row = Record::new();
            row.insert(CONDITION.to_string(), FieldValue::Int(record[target_index].parse::<i64>()?));
            match &record[sex_index] {
                "female" => female.push(row),
                _ => male.push(row),
            }
        }
        Ok((female, male))
    }

    #[test]
    fn test_passengers() -> Result<(), Box<dyn Error>> {
        let (female, male) = read_passengers("resources/passengers.csv")?;
        let test = HomogeneityTest::new(&["female", "male"], &[&female, &male], CONDITION)?;
        let run = test.run()?;
        assert_eq!(run.observed.row(Group::First), ConditionCounts::new(9, 3));
        assert_eq!(run.observed.row(Group::Second), ConditionCounts::new(3, 9));
        assert_abs_diff_eq!(run.result.chi_square, 6.0, epsilon = 1e-12);
        assert!(!run.result.is_significant);

        let test = HomogeneityTest::with_config(
            &["female", "male"],
            &[&female, &male],
            TestConfig::from_alpha(CONDITION, 0.05)?,
        )?;
        assert!(test.run()?.result.is_significant);
        Ok(())
    }
}
