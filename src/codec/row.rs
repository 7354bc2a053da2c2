//! Tabular record representation: named columns, arbitrary order.
//!
//! A [`Row`] is the exchange shape for cursor-like tabular sources (and the
//! registry's projection query). The row schema is controlled by this system:
//! record decoders address columns by name and treat a missing required
//! column as a programming error, not a runtime condition.

use url::Url;

/// One cell of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Null,
    Integer(i64),
    Text(String),
}

impl RowValue {
    /// Text cell for a present value, `Null` otherwise.
    pub fn opt_text(value: Option<&str>) -> Self {
        match value {
            Some(s) => Self::Text(s.to_string()),
            None => Self::Null,
        }
    }

    /// Text cell holding a URI's string form, `Null` when absent.
    pub fn opt_uri(value: Option<&Url>) -> Self {
        Self::opt_text(value.map(Url::as_str))
    }
}

impl From<i64> for RowValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for RowValue {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<bool> for RowValue {
    fn from(v: bool) -> Self {
        Self::Integer(v.into())
    }
}

impl From<&str> for RowValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RowValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A single tabular row: named cells in writer-chosen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, RowValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell. Columns are unique per row by construction in this
    /// system; a duplicate name would shadow on lookup.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<RowValue>) {
        self.cells.push((column.into(), value.into()));
    }

    /// Cell by column name, if the column exists.
    pub fn get(&self, column: &str) -> Option<&RowValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Cell by column name.
    ///
    /// # Panics
    ///
    /// Panics if the column is missing: row schemas are controlled by this
    /// system and a missing column is a programming error.
    fn require(&self, column: &str) -> &RowValue {
        match self.get(column) {
            Some(value) => value,
            None => panic!("column not found: {column}"),
        }
    }

    /// Integer cell value; `Null` reads as 0.
    ///
    /// # Panics
    ///
    /// Panics if the column is missing or holds text.
    pub fn get_i64(&self, column: &str) -> i64 {
        match self.require(column) {
            RowValue::Integer(v) => *v,
            RowValue::Null => 0,
            RowValue::Text(_) => panic!("column is not an integer: {column}"),
        }
    }

    /// Boolean cell value: any non-zero integer is `true`.
    ///
    /// # Panics
    ///
    /// Panics if the column is missing or holds text.
    pub fn get_bool(&self, column: &str) -> bool {
        self.get_i64(column) != 0
    }

    /// Text cell value; `Null` reads as the empty string.
    ///
    /// # Panics
    ///
    /// Panics if the column is missing or holds an integer.
    pub fn get_str(&self, column: &str) -> &str {
        match self.require(column) {
            RowValue::Text(s) => s,
            RowValue::Null => "",
            RowValue::Integer(_) => panic!("column is not text: {column}"),
        }
    }

    /// Text cell value with `Null` surfaced as absence.
    ///
    /// # Panics
    ///
    /// Panics if the column is missing or holds an integer.
    pub fn get_opt_str(&self, column: &str) -> Option<&str> {
        match self.require(column) {
            RowValue::Text(s) => Some(s),
            RowValue::Null => None,
            RowValue::Integer(_) => panic!("column is not text: {column}"),
        }
    }

    /// URI cell value. `Null`, the empty string and unparseable text all
    /// read as absent (optional-field rule).
    ///
    /// # Panics
    ///
    /// Panics if the column is missing or holds an integer.
    pub fn get_opt_uri(&self, column: &str) -> Option<Url> {
        let s = self.get_opt_str(column)?;
        if s.is_empty() {
            return None;
        }
        match Url::parse(s) {
            Ok(uri) => Some(uri),
            Err(e) => {
                tracing::debug!(column, uri = %s, error = %e, "Dropping unparseable URI column");
                None
            }
        }
    }

    /// Column names in writer order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
