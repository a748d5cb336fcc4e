//! Aggregation of sweep rows into per-parameter confidence intervals, and
//! their `;`-delimited rendering.

use std::collections::HashMap;
use std::io::{self, Write};

use serde::Serialize;

use crate::config::{StandardErrorConvention, SweepConfig};
use crate::core::errors::{ConfigError, SimulationError};
use crate::experiments::stats::{ConfidenceInterval, confidence_interval, critical_value};
use crate::experiments::sweep::{ExperimentRow, Metric};

/// Field separator of rendered tables.
pub const DELIMITER: char = ';';

/// Aggregates of one swept parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub parameter: f64,
    pub repetitions: usize,
    /// One interval per table metric, in table order.
    pub intervals: Vec<ConfidenceInterval>,
}

/// Per-parameter mean and confidence offsets for a set of metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable {
    /// Header of the parameter column, `p` or `k`.
    pub parameter_name: String,
    pub metrics: Vec<Metric>,
    /// Ordered by first appearance of the parameter value.
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    /// Groups `rows` by parameter value and summarizes every metric.
    pub fn from_rows(
        parameter_name: &str,
        metrics: &[Metric],
        rows: &[ExperimentRow],
        sweep: &SweepConfig,
    ) -> Result<Self, SimulationError> {
        sweep.validate()?;
        if rows.is_empty() {
            return Err(ConfigError::EmptyGrid.into());
        }
        let critical = critical_value(sweep.alpha)?;

        let mut groups: Vec<(f64, Vec<&ExperimentRow>)> = Vec::new();
        let mut index: HashMap<u64, usize> = HashMap::new();
        for row in rows {
            let slot = *index.entry(row.parameter.to_bits()).or_insert_with(|| {
                groups.push((row.parameter, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(row);
        }

        let group_count = groups.len();
        let aggregated = groups
            .into_iter()
            .map(|(parameter, members)| {
                let denominator = match sweep.standard_error {
                    StandardErrorConvention::Repetitions => members.len(),
                    StandardErrorConvention::ParameterGroups => group_count,
                };
                let intervals = metrics
                    .iter()
                    .map(|metric| {
                        let samples: Vec<f64> = members.iter().map(|r| metric.value(r)).collect();
                        confidence_interval(&samples, critical, denominator)
                    })
                    .collect();

                AggregateRow {
                    parameter,
                    repetitions: members.len(),
                    intervals,
                }
            })
            .collect();

        Ok(Self {
            parameter_name: parameter_name.to_string(),
            metrics: metrics.to_vec(),
            rows: aggregated,
        })
    }

    /// Interval of `metric` at `parameter`, if both are in the table.
    pub fn interval(&self, parameter: f64, metric: Metric) -> Option<ConfidenceInterval> {
        let column = self.metrics.iter().position(|&m| m == metric)?;
        self.rows
            .iter()
            .find(|row| row.parameter == parameter)
            .map(|row| row.intervals[column])
    }

    /// `p;global_R_miss_mean;global_R_miss_lower;global_R_miss_upper;...`
    pub fn header(&self) -> String {
        let mut fields = vec![self.parameter_name.clone()];
        for metric in &self.metrics {
            let stem = metric.column();
            fields.push(format!("{stem}_mean"));
            fields.push(format!("{stem}_lower"));
            fields.push(format!("{stem}_upper"));
        }
        fields.join(&DELIMITER.to_string())
    }

    /// Writes the header and one line per parameter value.
    pub fn write_delimited<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", self.header())?;
        for row in &self.rows {
            write!(out, "{}", row.parameter)?;
            for ci in &row.intervals {
                write!(
                    out,
                    "{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}",
                    ci.mean, ci.lower_offset, ci.upper_offset
                )?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn to_delimited(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_delimited(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(parameter: f64, repetition: usize, global: f64, detected: bool) -> ExperimentRow {
        ExperimentRow {
            parameter,
            repetition,
            seed: repetition as u64,
            global_mismatch_ratio: global,
            z_mismatch_ratio: global,
            x_mismatch_ratio: 0.0,
            eavesdropper_detected: detected,
        }
    }

    fn sample_rows() -> Vec<ExperimentRow> {
        vec![
            row(0.0, 0, 0.1, true),
            row(0.0, 1, 0.3, true),
            row(0.5, 0, 0.4, false),
            row(0.5, 1, 0.4, true),
            row(0.5, 2, 0.7, true),
        ]
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let table = AggregateTable::from_rows(
            "p",
            &Metric::MISMATCH,
            &sample_rows(),
            &SweepConfig::default(),
        )
        .unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].parameter, 0.0);
        assert_eq!(table.rows[0].repetitions, 2);
        assert_eq!(table.rows[1].repetitions, 3);
        let ci = table.interval(0.5, Metric::GlobalMismatch).unwrap();
        assert!((ci.mean - 0.5).abs() < 1e-12);
        assert_eq!(table.interval(0.5, Metric::Undetected), None);
    }

    #[test]
    fn test_standard_error_conventions() {
        let rows = sample_rows();
        let by_reps = AggregateTable::from_rows(
            "p",
            &[Metric::GlobalMismatch],
            &rows,
            &SweepConfig::default(),
        )
        .unwrap();
        let by_groups = AggregateTable::from_rows(
            "p",
            &[Metric::GlobalMismatch],
            &rows,
            &SweepConfig {
                standard_error: StandardErrorConvention::ParameterGroups,
                ..SweepConfig::default()
            },
        )
        .unwrap();

        // Group at 0.5 has 3 repetitions, the table has 2 groups
        let reps = by_reps.interval(0.5, Metric::GlobalMismatch).unwrap();
        let groups = by_groups.interval(0.5, Metric::GlobalMismatch).unwrap();
        let ratio = groups.half_width() / reps.half_width();
        assert!((ratio - (3.0_f64 / 2.0).sqrt()).abs() < 1e-9, "ratio={}", ratio);
    }

    #[test]
    fn test_undetected_column_is_fraction() {
        let table = AggregateTable::from_rows(
            "k",
            &[Metric::Undetected],
            &sample_rows(),
            &SweepConfig::default(),
        )
        .unwrap();
        assert_eq!(table.interval(0.0, Metric::Undetected).unwrap().mean, 0.0);
        let ci = table.interval(0.5, Metric::Undetected).unwrap();
        assert!((ci.mean - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_delimited_rendering() {
        let table = AggregateTable::from_rows(
            "k",
            &[Metric::Undetected],
            &sample_rows(),
            &SweepConfig::default(),
        )
        .unwrap();
        let text = table.to_delimited();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "k;undetected_mean;undetected_lower;undetected_upper");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "0;0;0;0");
        assert!(lines[2].starts_with("0.5;"));
        assert_eq!(lines[2].split(DELIMITER).count(), 4);
    }

    #[test]
    fn test_mismatch_header() {
        let table = AggregateTable {
            parameter_name: "p".to_string(),
            metrics: Metric::MISMATCH.to_vec(),
            rows: vec![],
        };
        assert_eq!(
            table.header(),
            "p;global_R_miss_mean;global_R_miss_lower;global_R_miss_upper;\
             Z_R_miss_mean;Z_R_miss_lower;Z_R_miss_upper;\
             X_R_miss_mean;X_R_miss_lower;X_R_miss_upper"
        );
    }

    #[test]
    fn test_empty_rows_rejected() {
        assert!(matches!(
            AggregateTable::from_rows("p", &Metric::MISMATCH, &[], &SweepConfig::default()),
            Err(SimulationError::Config(ConfigError::EmptyGrid))
        ));
    }
}
