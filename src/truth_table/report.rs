//! Rendering of truth-table outcomes.
//!
//! Four formats over the same rows: [`ReportFormat::Text`] blocks per
//! case, [`ReportFormat::Csv`] and [`ReportFormat::Table`] with one row
//! per case, and [`ReportFormat::Html`] with contradicted cells marked
//! red. Row formats share one column set: the sorted union of
//! observations and sensors appearing across the rendered cases, then the
//! verdict list columns and the error column.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::Assignment;
use crate::graph::format_value;

use super::{CaseOutcome, Verdict};

// ============================================================================
// Format selection
// ============================================================================

/// Output format for [`format_results`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Indented block per case.
    #[default]
    Text,
    /// Comma-separated values with a header line.
    Csv,
    /// An HTML table with contradicted cells marked red.
    Html,
    /// Fixed-width text table.
    Table,
}

impl ReportFormat {
    /// String identifier of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
            ReportFormat::Table => "table",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "csv" => Ok(ReportFormat::Csv),
            "html" => Ok(ReportFormat::Html),
            "table" => Ok(ReportFormat::Table),
            _ => Err(format!("Unknown report format: {s}")),
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Render outcomes in the requested format.
///
/// With `only_surprises` set, cases whose registered expectation held (and
/// unregistered cases) are dropped before rendering. An empty selection
/// renders as `No results to display.` in every format.
pub fn format_results(
    results: &[CaseOutcome],
    only_surprises: bool,
    format: ReportFormat,
) -> String {
    let rendered: Vec<&CaseOutcome> = if only_surprises {
        results.iter().filter(|r| r.has_surprise).collect()
    } else {
        results.iter().collect()
    };

    if rendered.is_empty() {
        return String::from("No results to display.");
    }

    match format {
        ReportFormat::Text => format_text(&rendered),
        ReportFormat::Csv => format_csv(&rendered),
        ReportFormat::Html => format_html(&rendered),
        ReportFormat::Table => format_table(&rendered),
    }
}

const LIST_COLUMNS: [&str; 5] = ["Diagnosed", "Expected", "Unexpected", "Missing", "Error"];
const LIST_COLUMN_WIDTH: usize = 40;

/// Sorted unions of observation names and sensor names across the rendered
/// cases. Row formats derive their columns from these.
fn column_names(rendered: &[&CaseOutcome]) -> (Vec<String>, Vec<String>) {
    let mut observations: BTreeSet<&String> = BTreeSet::new();
    let mut sensors: BTreeSet<&String> = BTreeSet::new();
    for result in rendered {
        observations.extend(result.inputs.observations.iter());
        sensors.extend(result.inputs.sensor_values.keys());
    }
    (
        observations.into_iter().cloned().collect(),
        sensors.into_iter().cloned().collect(),
    )
}

fn sensor_cell(inputs: &Assignment, name: &str) -> String {
    match inputs.sensor_value(name) {
        Some(value) => format_value(value),
        None => String::from("Unknown"),
    }
}

fn json_cell<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to encode report cell");
        String::new()
    })
}

/// Input and verdict cells for one case, in column order.
fn row_cells(result: &CaseOutcome, observations: &[String], sensors: &[String]) -> Vec<String> {
    let mut row = Vec::with_capacity(observations.len() + sensors.len() + LIST_COLUMNS.len());
    for name in observations {
        row.push(String::from(if result.inputs.has_observation(name) {
            "Yes"
        } else {
            "No"
        }));
    }
    for name in sensors {
        row.push(sensor_cell(&result.inputs, name));
    }
    row.push(json_cell(&result.diagnosed));
    row.push(json_cell(&result.expected));
    row.push(json_cell(&result.unexpected));
    row.push(json_cell(&result.missing));
    row.push(result.error.clone().unwrap_or_default());
    row
}

fn format_text(rendered: &[&CaseOutcome]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for (index, result) in rendered.iter().enumerate() {
        lines.push(format!("Test Case {}:", index + 1));
        lines.push(format!(
            "  Observations: {}",
            result
                .inputs
                .observations
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ));
        lines.push(format!(
            "  Sensor Values: {}",
            json_cell(&result.inputs.sensor_values)
        ));
        lines.push(format!(
            "  Diagnosed Failure Modes: {}",
            json_cell(&result.diagnosed)
        ));
        if !result.expected.is_empty() {
            lines.push(format!(
                "  Expected Failure Modes: {}",
                json_cell(&result.expected)
            ));
        }
        if !result.unexpected.is_empty() {
            lines.push(format!(
                "  UNEXPECTED RESULTS: {}",
                json_cell(&result.unexpected)
            ));
        }
        if !result.missing.is_empty() {
            lines.push(format!("  MISSING RESULTS: {}", json_cell(&result.missing)));
        }
        if let Some(error) = &result.error {
            lines.push(format!("  Diagnosis error: {error}"));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn format_csv(rendered: &[&CaseOutcome]) -> String {
    let (observations, sensors) = column_names(rendered);

    let mut header: Vec<String> = Vec::new();
    for name in &observations {
        header.push(format!("Obs: {name}"));
    }
    for name in &sensors {
        header.push(format!("Sensor: {name}"));
    }
    header.extend(LIST_COLUMNS.iter().map(|c| c.to_string()));

    let mut lines = vec![csv_line(&header)];
    for result in rendered {
        lines.push(csv_line(&row_cells(result, &observations, &sensors)));
    }
    lines.join("\n")
}

fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn format_html(rendered: &[&CaseOutcome]) -> String {
    let (observations, sensors) = column_names(rendered);
    let mut lines = vec![String::from("<table border=\"1\">")];

    let mut header = String::from("<tr>");
    for name in &observations {
        header.push_str(&format!("<th>Obs: {name}</th>"));
    }
    for name in &sensors {
        header.push_str(&format!("<th>Sensor: {name}</th>"));
    }
    for title in LIST_COLUMNS {
        header.push_str(&format!("<th>{title}</th>"));
    }
    header.push_str("</tr>");
    lines.push(header);

    for result in rendered {
        let mut row = String::from("<tr>");
        for name in &observations {
            let cell = if result.inputs.has_observation(name) {
                "Yes"
            } else {
                "No"
            };
            row.push_str(&format!("<td>{cell}</td>"));
        }
        for name in &sensors {
            row.push_str(&format!("<td>{}</td>", sensor_cell(&result.inputs, name)));
        }
        row.push_str(&format!("<td>{}</td>", json_cell(&result.diagnosed)));
        row.push_str(&format!("<td>{}</td>", json_cell(&result.expected)));
        row.push_str(&surprise_cell(&result.unexpected));
        row.push_str(&surprise_cell(&result.missing));
        match &result.error {
            Some(error) => row.push_str(&format!("<td style=\"color:red\">{error}</td>")),
            None => row.push_str("<td></td>"),
        }
        row.push_str("</tr>");
        lines.push(row);
    }

    lines.push(String::from("</table>"));
    lines.join("\n")
}

/// Contradictions render red; an empty list renders as an empty cell.
fn surprise_cell(verdicts: &[Verdict]) -> String {
    if verdicts.is_empty() {
        String::from("<td></td>")
    } else {
        format!("<td style=\"color:red\">{}</td>", json_cell(verdicts))
    }
}

fn format_table(rendered: &[&CaseOutcome]) -> String {
    let (observations, sensors) = column_names(rendered);

    let mut headers: Vec<String> = Vec::new();
    let mut widths: Vec<usize> = Vec::new();
    for name in &observations {
        let header = format!("Obs: {name}");
        widths.push(header.len().max(5));
        headers.push(header);
    }
    for name in &sensors {
        let header = format!("Sensor: {name}");
        widths.push(header.len().max(10));
        headers.push(header);
    }
    for title in LIST_COLUMNS {
        widths.push(LIST_COLUMN_WIDTH);
        headers.push(title.to_string());
    }

    let mut lines = Vec::with_capacity(rendered.len() + 2);
    lines.push(
        headers
            .iter()
            .zip(&widths)
            .map(|(header, &width)| format!("{header:<width$}"))
            .collect::<Vec<_>>()
            .join(" | "),
    );
    lines.push(
        widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-|-"),
    );
    for result in rendered {
        lines.push(
            row_cells(result, &observations, &sensors)
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{:<width$}", clip(cell, width)))
                .collect::<Vec<_>>()
                .join(" | "),
        );
    }
    lines.join("\n")
}

/// Truncate a cell to its column width, marking the cut with `...`.
fn clip(cell: &str, width: usize) -> String {
    if cell.chars().count() > width {
        let kept: String = cell.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        cell.to_string()
    }
}
