//! Result tables.

use std::fmt;
use std::time::Duration;

use crate::battery::{BatteryReport, Operation};

const LABEL_WIDTH: usize = 26;
const COLUMN_WIDTH: usize = 22;
const RATIO_WIDTH: usize = 10;

/// Side-by-side table of one or more battery reports.
///
/// With exactly two reports a ratio column (first / second) is added.
pub struct Comparison<'a> {
    reports: &'a [BatteryReport],
}

impl<'a> Comparison<'a> {
    pub fn new(reports: &'a [BatteryReport]) -> Self {
        Self { reports }
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1e3
}

impl fmt::Display for Comparison<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let with_ratio = self.reports.len() == 2;

        write!(f, "{:<LABEL_WIDTH$}", "operation")?;
        for report in self.reports {
            write!(f, "{:>COLUMN_WIDTH$}", report.target)?;
        }
        if with_ratio {
            write!(f, "{:>RATIO_WIDTH$}", "ratio")?;
        }
        writeln!(f)?;

        let ratio_width = if with_ratio { RATIO_WIDTH } else { 0 };
        let width = LABEL_WIDTH + COLUMN_WIDTH * self.reports.len() + ratio_width;
        writeln!(f, "{}", "-".repeat(width))?;

        for operation in Operation::ALL {
            write!(f, "{:<LABEL_WIDTH$}", operation.label())?;
            for report in self.reports {
                match report.elapsed(operation) {
                    Some(elapsed) => {
                        let cell = format!("{:.3}ms", millis(elapsed));
                        write!(f, "{cell:>COLUMN_WIDTH$}")?
                    }
                    None => write!(f, "{:>COLUMN_WIDTH$}", "-")?,
                }
            }
            if with_ratio {
                let ratio = match (
                    self.reports[0].elapsed(operation),
                    self.reports[1].elapsed(operation),
                ) {
                    (Some(a), Some(b)) if !b.is_zero() => {
                        format!("{:.2}x", a.as_secs_f64() / b.as_secs_f64())
                    }
                    _ => "-".to_string(),
                };
                write!(f, "{ratio:>RATIO_WIDTH$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
