/// Results Grid Module
///
/// Renders a row set as a fixed-width text table. Columns come from the keys
/// of the first row; each column is as wide as its widest rendering, capped
/// at `MAX_COLUMN_WIDTH`, and longer cells are truncated with an ellipsis.
///
/// ```text
/// |----|-------|
/// | id |  name |
/// |----|-------|
/// |  1 |   Ann |
/// |----|-------|
/// ```
use crate::core::db::value::Row;

/// Widest a column may grow before cells are truncated.
pub const MAX_COLUMN_WIDTH: usize = 40;

const ELLIPSIS: &str = " ...";

/// Message shown instead of a table for an empty row set.
pub const EMPTY_RESULT: &str = "Returned 0 rows.";

/// A row set prepared for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultsGrid {
    /// Builds the grid from driver rows.
    ///
    /// Later rows are read by the first row's column names; a missing column
    /// renders as `null`.
    pub fn from_rows(rows: &[Row]) -> Self {
        let headers: Vec<String> = rows
            .first()
            .map(|first| first.keys().map(str::to_string).collect())
            .unwrap_or_default();
        let rows = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|column| {
                        row.get(column)
                            .map(|value| value.render())
                            .unwrap_or_else(|| "null".to_string())
                    })
                    .collect()
            })
            .collect();
        ResultsGrid { headers, rows }
    }

    /// Display width of each column, capped at `MAX_COLUMN_WIDTH`.
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let widest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| display_width(cell))
                    .chain(std::iter::once(display_width(header)))
                    .max()
                    .unwrap_or(0);
                widest.min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return EMPTY_RESULT.to_string();
        }

        let widths = self.column_widths();
        let header = format_line(&self.headers, &widths);
        let rule: String = header
            .chars()
            .map(|c| if c == '|' { '|' } else { '-' })
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(rule.clone());
        lines.push(header);
        lines.push(rule.clone());
        for row in &self.rows {
            lines.push(format_line(row, &widths));
        }
        lines.push(rule);
        lines.join("\n")
    }
}

/// Renders rows as a table, or `Returned 0 rows.` when there are none.
pub fn render_rows(rows: &[Row]) -> String {
    ResultsGrid::from_rows(rows).render()
}

fn display_width(text: &str) -> usize {
    text.chars().count()
}

fn fit_cell(text: &str, width: usize) -> String {
    let text = if display_width(text) > MAX_COLUMN_WIDTH {
        let kept: String = text
            .chars()
            .take(MAX_COLUMN_WIDTH - ELLIPSIS.len())
            .collect();
        format!("{}{}", kept, ELLIPSIS)
    } else {
        text.to_string()
    };
    format!("{:>width$}", text, width = width)
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let cells: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| fit_cell(cell, *width))
        .collect();
    format!("| {} |", cells.join(" | "))
}
