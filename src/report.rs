//! Report
//!
//! Plain text rendering of the tables and results of a test of homogeneity.
//! The statistical core never prints; callers decide where the text goes.
use crate::constants::TOTAL_LABEL;
use crate::homogeneity::{TestResult, TestRun};
use crate::table::{ContingencyTable, ExpectedTable, Group, Outcome};
use std::fmt::{self, Display};

/// Write rows of cells, the first column left aligned and the rest right aligned.
fn write_grid(f: &mut fmt::Formatter<'_>, rows: &[Vec<String>]) -> fmt::Result {
    let n_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let widths: Vec<usize> = (0..n_cols)
        .map(|c| rows.iter().filter_map(|r| r.get(c)).map(|s| s.len()).max().unwrap_or(0))
        .collect();
    for row in rows {
        let mut line = String::new();
        for (c, cell) in row.iter().enumerate() {
            if c == 0 {
                line.push_str(&format!("{:<width$}", cell, width = widths[c]));
            } else {
                line.push_str(&format!("  {:>width$}", cell, width = widths[c]));
            }
        }
        writeln!(f, "{}", line.trim_end())?;
    }
    Ok(())
}

impl Display for ContingencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = vec![vec![
            String::new(),
            self.labels.condition.clone(),
            self.labels.inverse_condition.clone(),
            TOTAL_LABEL.to_string(),
        ]];
        for group in Group::ALL {
            let counts = self.row(group);
            rows.push(vec![
                self.labels.population(group).to_string(),
                counts.condition.to_string(),
                counts.inverse.to_string(),
                counts.total().to_string(),
            ]);
        }
        let totals = self.totals();
        rows.push(vec![
            TOTAL_LABEL.to_string(),
            totals.condition.to_string(),
            totals.inverse.to_string(),
            self.grand_total().to_string(),
        ]);
        write_grid(f, &rows)
    }
}

impl Display for ExpectedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = vec![vec![
            String::new(),
            self.labels.condition.clone(),
            self.labels.inverse_condition.clone(),
        ]];
        for group in Group::ALL {
            let mut row = vec![self.labels.population(group).to_string()];
            row.extend(Outcome::ALL.iter().map(|o| format!("{:.6}", self.cell(group, *o))));
            rows.push(row);
        }
        write_grid(f, &rows)
    }
}

impl Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chi-square: {:.6}", self.chi_square)?;
        writeln!(
            f,
            "Chi-square critical value at p={:.6}: {:.6}",
            self.alpha, self.critical_value
        )?;
        writeln!(f, "p-value: {:.6}", self.p_value)?;
        writeln!(f, "Statistically significant: {}", self.is_significant)
    }
}

impl Display for TestRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = &self.observed.labels;
        writeln!(f, "Chi-Square Test of Homogeneity")?;
        writeln!(
            f,
            "Comparison of rates of {} between {} and {}",
            labels.condition,
            labels.population(Group::First),
            labels.population(Group::Second)
        )?;
        writeln!(f, "\n\nComparison Table\n")?;
        write!(f, "{}", self.observed)?;
        writeln!(f, "\n\nExpected Frequency Table\n")?;
        write!(f, "{}", self.expected)?;
        writeln!(f, "\n\nResults\n")?;
        write!(f, "{}", self.result)
    }
}

/// Render the full report of a run.
pub fn render(run: &TestRun) -> String {
    run.to_string()
}
