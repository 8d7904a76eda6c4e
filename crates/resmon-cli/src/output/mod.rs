//! Output formatting module
//!
//! Provides table and JSON output formatting for CLI commands, plus the
//! number formatting shared by every printer.

pub mod console;

use serde::Serialize;
use std::fmt::Display;
use tabled::{Table, Tabled};

use resmon_core::ComparisonRow;

/// Output format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {}. Use 'table' or 'json'", s)),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Print data in the specified format
pub fn print_output<T>(data: &[T], format: OutputFormat) -> anyhow::Result<()>
where
    T: Serialize + Tabled,
{
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("No items found.");
            } else {
                let table = Table::new(data).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}

/// Print a warning to stderr
pub fn print_warning(message: &str) {
    eprintln!("{}", colored::Colorize::yellow(message));
}

/// Print an info message (respects quiet mode)
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        println!("{}", message);
    }
}

// ============================================================================
// Number formatting
// ============================================================================

/// Integer with thousands separators: `1234567` -> `1,234,567`
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Like [`format_number`] but always signed: `+1,000`, `-250`, `+0`
pub fn format_delta(n: i64) -> String {
    if n >= 0 {
        format!("+{}", format_number(n))
    } else {
        format_number(n)
    }
}

/// Rate with one decimal, or separators once it reaches the thousands
pub fn format_rate(rate: f64) -> String {
    if rate >= 1000.0 {
        format_number(rate as i64)
    } else {
        format!("{:.1}", rate)
    }
}

// ============================================================================
// Comparison table
// ============================================================================

/// Comparison row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ComparisonTableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Previous")]
    pub previous: String,
    #[tabled(rename = "Current")]
    pub current: String,
    #[tabled(rename = "Delta")]
    pub delta: String,
}

impl From<&ComparisonRow> for ComparisonTableRow {
    fn from(row: &ComparisonRow) -> Self {
        let (label, precision) = match row.metric.as_str() {
            "energy_regen_rate_per_second" => ("Energy Regen Rate (/sec)", 1),
            "energy_consume_rate_per_second" => ("Energy Consume Rate (/sec)", 1),
            "bandwidth_regen_rate_per_second" => ("Bandwidth Regen Rate (/sec)", 1),
            "tx_per_day_65k_energy" => ("Tx/day (65k)", 0),
            other => (other, 1),
        };

        Self {
            metric: label.to_string(),
            previous: format!("{:.*}", precision, row.previous),
            current: format!("{:.*}", precision, row.current),
            delta: format!("{:+.*}", precision, row.delta),
        }
    }
}

/// Print comparison rows as a table, or the raw rows as JSON
pub fn print_comparison(rows: &[ComparisonRow], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            let table_rows: Vec<ComparisonTableRow> = rows.iter().map(ComparisonTableRow::from).collect();
            print_output(&table_rows, format)
        }
        OutputFormat::Json => print_json(rows),
    }
}
