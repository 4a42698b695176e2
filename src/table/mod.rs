//! Spreadsheet cell grids as numeric matrices.
//!
//! Anything that is not a number (empty cells, labels, formulas without a
//! cached value) is read as `0.0`. Short rows are padded with `0.0` up to the
//! widest row, so the grid always becomes a rectangular matrix.

use std::io::Write;

use anyhow::Context;
use log::debug;
use ndarray::{Array2, ArrayView2};

use crate::error::{Error, Result};
use crate::export::write_matrix;

/// One cell value as produced by a spreadsheet reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Numeric value: numbers as-is, booleans as `1.0`/`0.0`, numeric text
    /// parsed after trimming, everything else `0.0`.
    pub fn to_f64(&self) -> f64 {
        match self {
            Cell::Empty => 0.0,
            Cell::Number(x) => *x,
            Cell::Bool(b) => f64::from(u8::from(*b)),
            Cell::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Cell::Number(x)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Empty, Into::into)
    }
}

/// Builds a `rows x max_row_len` matrix from a cell grid.
///
/// Fails with an unsupported-shape error when the grid has no rows or no columns.
pub fn from_cells<R, C>(rows: R) -> Result<Array2<f64>>
where
    R: IntoIterator<Item = C>,
    C: IntoIterator,
    C::Item: Into<Cell>,
{
    let rows: Vec<Vec<f64>> = rows
        .into_iter()
        .map(|row| row.into_iter().map(|cell| Into::<Cell>::into(cell).to_f64()).collect())
        .collect();
    let n_rows = rows.len();
    let n_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if n_rows == 0 || n_cols == 0 {
        return Err(Error::shape(&[n_rows, n_cols], "table has no cells"));
    }

    let mut table = Array2::<f64>::zeros((n_rows, n_cols));
    for (mut target, values) in table.rows_mut().into_iter().zip(rows.iter()) {
        for (t, &v) in target.iter_mut().zip(values.iter()) {
            *t = v;
        }
    }
    debug!("Read {}x{} table", n_rows, n_cols);
    Ok(table)
}

/// Writes one comma-separated line per matrix row.
pub fn write_rows<W: Write>(writer: &mut W, table: ArrayView2<f64>) -> anyhow::Result<()> {
    write_matrix(writer, table).context("Failed to write table rows")
}
