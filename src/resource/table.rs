//! Tabular view over JSON record lists

use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// Widest a rendered column may get
const MAX_COLUMN_WIDTH: usize = 40;

/// Records with a shared, ordered column set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl Table {
    /// Build from an array, a `{"data": [...]}` envelope or a single object
    ///
    /// `id` leads when present; other columns keep first-seen order.
    pub fn from_records(value: &Value) -> Self {
        let rows: Vec<Map<String, Value>> = match value {
            Value::Array(arr) => arr.iter().filter_map(|v| v.as_object().cloned()).collect(),
            Value::Object(map) => match map.get("data").and_then(|v| v.as_array()) {
                Some(arr) if !map.contains_key("id") => {
                    arr.iter().filter_map(|v| v.as_object().cloned()).collect()
                },
                _ => vec![map.clone()],
            },
            _ => Vec::new(),
        };

        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        if let Some(pos) = columns.iter().position(|c| c == "id") {
            let id = columns.remove(pos);
            columns.insert(0, id);
        }

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column; missing cells read as `null`
    pub fn column(&self, name: &str) -> Vec<&Value> {
        self.rows
            .iter()
            .map(|row| row.get(name).unwrap_or(&NULL))
            .collect()
    }

    /// Fixed-width text rendering
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return "(no records)\n".to_string();
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|col| truncate(&render_cell(row.get(col).unwrap_or(&NULL))))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(col.chars().count()))
                    .max()
                    .unwrap_or(0)
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect();

        let mut out = String::new();
        push_line(&mut out, self.columns.iter().map(|c| truncate(c)), &widths);
        push_line(&mut out, widths.iter().map(|w| "-".repeat(*w)), &widths);
        for row in cells {
            push_line(&mut out, row.into_iter(), &widths);
        }
        out
    }
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn truncate(s: &str) -> String {
    if s.chars().count() > MAX_COLUMN_WIDTH {
        let head: String = s.chars().take(MAX_COLUMN_WIDTH - 3).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(_) => "[object]".to_string(),
    }
}

/// Extract a value from JSON using a dot-notation path
pub fn extract_json_value(item: &Value, path: &str) -> String {
    let parts: Vec<&str> = path.split('.').collect();
    let mut current = item;

    for part in parts {
        // Handle array index
        if let Ok(idx) = part.parse::<usize>() {
            current = match current.get(idx) {
                Some(v) => v,
                None => return "-".to_string(),
            };
        } else {
            current = match current.get(part) {
                Some(v) => v,
                None => return "-".to_string(),
            };
        }
    }

    render_cell(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_columns_union_with_id_first() {
        let table = Table::from_records(&json!([
            {"well_name": "W1", "id": 1},
            {"id": 2, "comment": "new", "well_name": "W2"}
        ]));
        assert_eq!(table.columns()[0], "id");
        assert_eq!(table.columns().len(), 3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("comment"), vec![&Value::Null, &json!("new")]);
    }

    #[test]
    fn test_envelope_and_single_object() {
        let table = Table::from_records(&json!({"data": [{"date": "2020-01-01"}]}));
        assert_eq!(table.len(), 1);

        let table = Table::from_records(&json!({"id": 4, "name": "FDP"}));
        assert_eq!(table.len(), 1);

        assert!(Table::from_records(&json!(null)).is_empty());
    }

    #[test]
    fn test_render_contains_header_and_cells() {
        let table = Table::from_records(&json!([{"id": 1, "name": "A", "tags": [1, 2]}]));
        let text = table.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id"));
        assert!(lines[2].contains("[2 items]"));
        assert_eq!(Table::default().render(), "(no records)\n");
    }

    #[test]
    fn test_extract_json_value_paths() {
        let item = json!({"primary_plot_data": {"x_selected": ["2020-01-01", "2020-02-01"]}, "beta": 0.5});
        assert_eq!(extract_json_value(&item, "primary_plot_data.x_selected.1"), "2020-02-01");
        assert_eq!(extract_json_value(&item, "beta"), "0.5");
        assert_eq!(extract_json_value(&item, "missing.path"), "-");
    }
}
