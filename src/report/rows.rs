//! Normalization of JSON rows into a rectangular table.

use serde_json::{Map, Value};

use crate::error::RenderError;

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Missing or null.
    Empty,
}

impl Cell {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// Text shown for this cell in a rendered document.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Empty => String::new(),
        }
    }
}

/// Header row plus body rows, all of the same width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column names in order of first appearance.
    pub headers: Vec<String>,
    /// Body rows in input order, cells in header order.
    pub rows: Vec<Vec<Cell>>,
}

/// Column layout merged over every row.
///
/// A key that holds an object in any row expands into dotted child columns.
/// It keeps a column of its own only when some row holds a scalar there.
#[derive(Debug, Default)]
struct Shape {
    scalar: bool,
    children: Vec<(String, Shape)>,
}

impl Shape {
    fn child(&mut self, key: &str) -> &mut Self {
        let idx = match self.children.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.children.push((key.to_string(), Self::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[idx].1
    }

    fn absorb_row(&mut self, row: &Map<String, Value>) {
        for (key, value) in row {
            self.child(key).absorb(value);
        }
    }

    fn absorb(&mut self, value: &Value) {
        match value {
            Value::Object(inner) => self.absorb_row(inner),
            Value::Null => {}
            _ => self.scalar = true,
        }
    }

    /// Collects leaf column paths in order.
    fn columns(&self, path: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
        for (key, shape) in &self.children {
            path.push(key.clone());
            if shape.scalar || shape.children.is_empty() {
                out.push(path.clone());
            }
            shape.columns(path, out);
            path.pop();
        }
    }
}

/// Cell of `row` at a dotted column path. An object found where a leaf is
/// expected is covered by its child columns and shows as empty.
fn cell_at(row: &Map<String, Value>, path: &[String]) -> Cell {
    let Some((first, rest)) = path.split_first() else {
        return Cell::Empty;
    };
    let mut value = row.get(first);
    for key in rest {
        value = value.and_then(Value::as_object).and_then(|o| o.get(key));
    }
    match value {
        None | Some(Value::Object(_)) => Cell::Empty,
        Some(other) => Cell::from_value(other),
    }
}

impl Table {
    /// Builds a table from JSON rows.
    ///
    /// Columns are the union over all rows in order of first appearance, so
    /// the first row's order leads. Nested objects become dotted columns and
    /// arrays stay JSON text. A row without a value for a column gets an
    /// empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidRows`] for empty input.
    pub fn from_rows(rows: &[Map<String, Value>]) -> Result<Self, RenderError> {
        if rows.is_empty() {
            return Err(RenderError::InvalidRows("no rows".to_string()));
        }

        let mut shape = Shape::default();
        for row in rows {
            shape.absorb_row(row);
        }
        let mut paths = Vec::new();
        shape.columns(&mut Vec::new(), &mut paths);

        let body: Vec<Vec<Cell>> = rows
            .iter()
            .map(|row| paths.iter().map(|path| cell_at(row, path)).collect())
            .collect();

        Ok(Self {
            headers: paths.iter().map(|p| p.join(".")).collect(),
            rows: body,
        })
    }
}
