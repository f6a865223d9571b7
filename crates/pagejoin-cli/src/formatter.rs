//! Output formatters for join results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use pagejoin_core::catalog::Schema;
use pagejoin_core::proto::{Record, Value};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format the records of a join result.
    fn format_records(&self, schema: &Schema, records: &[Record]) -> String;

    /// Format a query plan produced by `explain`.
    fn format_plan(&self, plan: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_records(&self, schema: &Schema, records: &[Record]) -> String {
        if records.is_empty() {
            return "No results".to_string();
        }

        let mut table = Table::new();
        let headers: Vec<Cell> = schema.fields().iter().map(|f| Cell::new(&f.name)).collect();
        table.set_header(headers);

        for record in records {
            let cells: Vec<Cell> = record
                .values()
                .iter()
                .map(|v| Cell::new(v.to_string()))
                .collect();
            table.add_row(cells);
        }

        format!("{}\n{} row(s)", table, records.len())
    }

    fn format_plan(&self, plan: &str) -> String {
        plan.trim_end().to_string()
    }
}

/// JSON formatter: one object per record, keyed by column name.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_records(&self, schema: &Schema, records: &[Record]) -> String {
        let rows: Vec<serde_json::Value> = records
            .iter()
            .map(|record| {
                let mut obj = serde_json::Map::new();
                for (field, value) in schema.fields().iter().zip(record.values()) {
                    obj.insert(field.name.clone(), value_to_json(value));
                }
                serde_json::Value::Object(obj)
            })
            .collect();

        serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_plan(&self, plan: &str) -> String {
        let lines: Vec<&str> = plan.lines().collect();
        serde_json::json!({ "plan": lines }).to_string()
    }
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_records(&self, schema: &Schema, records: &[Record]) -> String {
        let mut output = String::new();

        let headers: Vec<String> = schema
            .fields()
            .iter()
            .map(|f| format!("\"{}\"", escape_csv(&f.name)))
            .collect();
        output.push_str(&headers.join(","));
        output.push('\n');

        for record in records {
            let cells: Vec<String> = record.values().iter().map(format_value_csv).collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }

        output
    }

    fn format_plan(&self, plan: &str) -> String {
        let mut output = String::from("plan\n");
        for line in plan.lines() {
            output.push_str(&format!("\"{}\"\n", escape_csv(line)));
        }
        output
    }
}

/// Format a Value for CSV output.
fn format_value_csv(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => format!("\"{}\"", escape_csv(s)),
        _ => value.to_string(),
    }
}

/// Convert a Value to JSON.
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int32(i) => serde_json::Value::Number((*i).into()),
        Value::Int64(i) => serde_json::Value::Number((*i).into()),
        Value::Float32(f) => serde_json::Number::from_f64(*f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Float64(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
    }
}

/// Escape a string for CSV.
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}
