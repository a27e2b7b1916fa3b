//! Tabular grids.
//!
//! A grid is an ordered set of named columns, each with its own metadata
//! dict, plus a grid-level metadata dict and rows of cells. Grids are built
//! through [`GridBuilder`], which validates column names and freezes the
//! column set once the first row is added. Cells are resolved by column
//! position, so rows carry no pointer back to their grid.

use crate::value::{Dict, NDArray, Value};
use crate::{Error, Result};

/// True if `n` is a legal tagname: lowercase ASCII letter first, then
/// ASCII alphanumerics and underscores.
pub fn is_tagname(n: &str) -> bool {
    let mut chars = n.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A grid column: name plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCol {
    name: String,
    meta: Dict,
}

impl GridCol {
    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column metadata.
    pub fn meta(&self) -> &Dict {
        &self.meta
    }
}

/// An immutable grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    meta: Dict,
    cols: Vec<GridCol>,
    rows: Vec<Vec<Value>>,
}

impl Grid {
    /// A grid with no columns, rows or metadata.
    pub fn empty() -> Grid {
        Grid::default()
    }

    /// Grid-level metadata.
    pub fn meta(&self) -> &Dict {
        &self.meta
    }

    /// Columns in insertion (and wire) order.
    pub fn cols(&self) -> &[GridCol] {
        &self.cols
    }

    /// Column names in insertion order.
    pub fn col_names(&self) -> Vec<&str> {
        self.cols.iter().map(|c| c.name()).collect()
    }

    /// Look up a column by name.
    pub fn col(&self, name: &str) -> Option<&GridCol> {
        self.cols.iter().find(|c| c.name == name)
    }

    /// True if a column with this name exists.
    pub fn has(&self, name: &str) -> bool {
        self.col(name).is_some()
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// True if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in order. Every row has exactly one cell per column.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// The first row, if any.
    pub fn first(&self) -> Option<&Vec<Value>> {
        self.rows.first()
    }

    /// A row by index.
    pub fn get(&self, row: usize) -> Option<&Vec<Value>> {
        self.rows.get(row)
    }

    /// The cell at `row`/`col`. Panics if either index is out of range.
    pub fn val(&self, row: usize, col: usize) -> &Value {
        &self.rows[row][col]
    }

    /// The cell in the named column of `row`, if both exist.
    pub fn val_by_name(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.cols.iter().position(|c| c.name == name)?;
        Some(self.rows.get(row)?.get(idx)?)
    }

    /// Convert an all-numeric grid to a matrix, dropping units and
    /// metadata.
    pub fn to_ndarray(&self) -> Result<NDArray> {
        let mut data = Vec::with_capacity(self.rows.len() * self.cols.len());
        for row in &self.rows {
            for cell in row {
                match cell {
                    Value::Number(n) => data.push(n.val),
                    other => {
                        return Err(Error::TypeMismatch {
                            expected: "Number",
                            found: other.type_name(),
                        });
                    }
                }
            }
        }
        NDArray::new(self.rows.len(), self.cols.len(), data)
    }
}

/// Builder for [`Grid`].
#[derive(Debug, Default)]
pub struct GridBuilder {
    meta: Dict,
    cols: Vec<GridCol>,
    rows: Vec<Vec<Value>>,
}

impl GridBuilder {
    /// New empty builder.
    pub fn new() -> GridBuilder {
        GridBuilder::default()
    }

    /// Set the grid-level metadata.
    pub fn set_meta(&mut self, meta: Dict) -> &mut Self {
        self.meta = meta;
        self
    }

    /// Add a column. Fails on an invalid tagname, a duplicate name, or
    /// once a row has been added.
    pub fn add_col(&mut self, name: impl Into<String>, meta: Dict) -> Result<&mut Self> {
        let name = name.into();
        if !self.rows.is_empty() {
            return Err(Error::ColumnsFrozen);
        }
        if !is_tagname(&name) {
            return Err(Error::InvalidTagname(name));
        }
        if self.cols.iter().any(|c| c.name == name) {
            return Err(Error::DuplicateColumn(name));
        }
        self.cols.push(GridCol { name, meta });
        Ok(self)
    }

    /// Add columns with empty metadata.
    pub fn add_col_names<I, S>(&mut self, names: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_col(name, Dict::new())?;
        }
        Ok(self)
    }

    /// Replace the metadata of an existing column. Allowed at any point
    /// before `to_grid`; only the column *set* freezes with the first row.
    pub fn set_col_meta(&mut self, name: &str, meta: Dict) -> Result<&mut Self> {
        match self.cols.iter().position(|c| c.name == name) {
            Some(i) => {
                self.cols[i].meta = meta;
                Ok(self)
            }
            None => Err(Error::UnknownColumn(name.to_string())),
        }
    }

    /// Add a row. The cell count must match the column count; the first
    /// row freezes the column set.
    pub fn add_row(&mut self, cells: Vec<Value>) -> Result<&mut Self> {
        if cells.len() != self.cols.len() {
            return Err(Error::RowLength {
                cells: cells.len(),
                cols: self.cols.len(),
            });
        }
        self.rows.push(cells);
        Ok(self)
    }

    /// Finish the grid.
    pub fn to_grid(&mut self) -> Grid {
        Grid {
            meta: std::mem::take(&mut self.meta),
            cols: std::mem::take(&mut self.cols),
            rows: std::mem::take(&mut self.rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagnames() {
        assert!(is_tagname("a"));
        assert!(is_tagname("hisStart"));
        assert!(is_tagname("v0"));
        assert!(is_tagname("foo_bar"));
        assert!(!is_tagname(""));
        assert!(!is_tagname("Foo"));
        assert!(!is_tagname("0v"));
        assert!(!is_tagname("_x"));
        assert!(!is_tagname("a-b"));
        assert!(!is_tagname("naïve"));
    }

    #[test]
    fn build_and_read() {
        let mut gb = GridBuilder::new();
        gb.add_col_names(["a", "b", "c"]).unwrap();
        gb.add_row(vec![1.into(), 2.into(), 3.into()]).unwrap();
        let g = gb.to_grid();
        assert_eq!(g.col_names(), ["a", "b", "c"]);
        assert_eq!(g.size(), 1);
        assert!(!g.is_empty());
        assert!(g.has("b"));
        assert!(!g.has("d"));
        assert_eq!(g.val(0, 2), &Value::from(3));
        assert_eq!(g.val_by_name(0, "a"), Some(&Value::from(1)));
        assert_eq!(g.first(), Some(&vec![1.into(), 2.into(), 3.into()]));
    }

    #[test]
    fn col_meta() {
        let mut gb = GridBuilder::new();
        gb.add_col_names(["a", "b"]).unwrap();
        let mut meta = Dict::new();
        meta.insert("foo".into(), "bar".into());
        gb.set_col_meta("a", meta.clone()).unwrap();
        // Column meta may still change after rows exist.
        gb.add_row(vec![1.into(), 2.into()]).unwrap();
        let mut on = Dict::new();
        on.insert("on".into(), true.into());
        gb.set_col_meta("b", on.clone()).unwrap();
        assert!(gb.set_col_meta("nope", Dict::new()).is_err());
        let g = gb.to_grid();
        assert_eq!(g.col("a").unwrap().meta(), &meta);
        assert_eq!(g.col("b").unwrap().meta(), &on);
    }

    #[test]
    fn invalid_columns() {
        let mut gb = GridBuilder::new();
        assert!(matches!(
            gb.add_col("Bad", Dict::new()),
            Err(Error::InvalidTagname(_))
        ));
        gb.add_col("a", Dict::new()).unwrap();
        assert!(matches!(
            gb.add_col("a", Dict::new()),
            Err(Error::DuplicateColumn(_))
        ));
    }

    #[test]
    fn frozen_after_first_row() {
        let mut gb = GridBuilder::new();
        gb.add_col("a", Dict::new()).unwrap();
        gb.add_row(vec![Value::Null]).unwrap();
        assert!(matches!(
            gb.add_col("b", Dict::new()),
            Err(Error::ColumnsFrozen)
        ));
    }

    #[test]
    fn row_length_checked() {
        let mut gb = GridBuilder::new();
        gb.add_col_names(["a", "b"]).unwrap();
        assert!(matches!(
            gb.add_row(vec![Value::Null]),
            Err(Error::RowLength { cells: 1, cols: 2 })
        ));
    }

    #[test]
    fn to_ndarray() {
        let mut gb = GridBuilder::new();
        gb.add_col_names(["v0", "v1"]).unwrap();
        gb.add_row(vec![1.into(), 2.into()]).unwrap();
        gb.add_row(vec![3.into(), 4.into()]).unwrap();
        let a = gb.to_grid().to_ndarray().unwrap();
        assert_eq!((a.rows(), a.cols()), (2, 2));
        assert_eq!(a.data(), &[1.0, 2.0, 3.0, 4.0]);

        let mut gb = GridBuilder::new();
        gb.add_col("a", Dict::new()).unwrap();
        gb.add_row(vec![Value::Marker]).unwrap();
        assert!(gb.to_grid().to_ndarray().is_err());
    }
}
