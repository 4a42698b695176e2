//! # Factor matrix export
//!
//! Names and serializes the matrices of a factorization so a workbook writer
//! can store one matrix per sheet. Sheet names follow the workbook convention
//! of at most [`SHEET_NAME_LIMIT`] characters.

use std::io::Write;

use anyhow::Context;
use ndarray::{Array2, ArrayView2};

use crate::error::Result;
use crate::svd::Factorization;

/// Longest sheet name a workbook accepts.
pub const SHEET_NAME_LIMIT: usize = 31;

/// Truncates `raw` to [`SHEET_NAME_LIMIT`] characters.
pub fn sheet_name(raw: &str) -> String {
    raw.chars().take(SHEET_NAME_LIMIT).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub matrix: Array2<f64>,
}

/// Full and rank-`k` factors of one matrix, one [`Sheet`] each, in the order
/// `U_full`, `S_full`, `Vt_full`, `U_k`, `S_k`, `Vt_k`.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorSheets {
    sheets: Vec<Sheet>,
}

impl FactorSheets {
    /// Sheets for colour channel `channel` (0-based); names carry `_ch{channel + 1}`.
    pub fn for_channel(factorization: &Factorization, k: usize, channel: usize) -> Result<Self> {
        Self::build(factorization, k, &format!("_ch{}", channel + 1))
    }

    /// Sheets for a table, without a channel suffix.
    pub fn for_table(factorization: &Factorization, k: usize) -> Result<Self> {
        Self::build(factorization, k, "")
    }

    fn build(factorization: &Factorization, k: usize, suffix: &str) -> Result<Self> {
        let truncated = factorization.truncate(k)?;
        let named = [
            (format!("U_full{suffix}"), factorization.u().clone()),
            (format!("S_full{suffix}"), factorization.s_matrix()),
            (format!("Vt_full{suffix}"), factorization.vt().clone()),
            (format!("U_k={k}{suffix}"), truncated.u().clone()),
            (format!("S_k={k}{suffix}"), truncated.s_matrix()),
            (format!("Vt_k={k}{suffix}"), truncated.vt().clone()),
        ];
        let sheets = named
            .into_iter()
            .map(|(name, matrix)| Sheet {
                name: sheet_name(&name),
                matrix,
            })
            .collect();
        Ok(FactorSheets { sheets })
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn get(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Writes every sheet as a `[name]` header followed by comma-separated rows.
pub fn write_sections<W: Write>(writer: &mut W, sheets: &FactorSheets) -> anyhow::Result<()> {
    for sheet in sheets.sheets() {
        writeln!(writer, "[{}]", sheet.name)
            .with_context(|| format!("Failed to write header of sheet {}", sheet.name))?;
        write_matrix(writer, sheet.matrix.view())
            .with_context(|| format!("Failed to write sheet {}", sheet.name))?;
    }
    Ok(())
}

pub(crate) fn write_matrix<W: Write>(
    writer: &mut W,
    matrix: ArrayView2<f64>,
) -> std::io::Result<()> {
    for row in matrix.rows() {
        let line = row
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

/// Directory holding every artifact produced for `basename`.
pub fn output_dir_name(basename: &str) -> String {
    format!("compressed_{basename}")
}

/// Copy of the untouched input, e.g. `cat_original.jpg`.
pub fn original_name(basename: &str, extension: &str) -> String {
    format!("{basename}_original.{extension}")
}

/// Reconstructed image or table, e.g. `cat_compressed_k=20.jpg`.
pub fn compressed_name(basename: &str, k: usize, extension: &str) -> String {
    format!("{basename}_compressed_k={k}.{extension}")
}

/// Workbook with the factors of colour channel `channel` (0-based).
pub fn channel_matrices_name(basename: &str, channel: usize) -> String {
    format!("{basename}_channel{}_matrices.xlsx", channel + 1)
}

/// Workbook with the factors of a table.
pub fn table_matrices_name(basename: &str) -> String {
    format!("{basename}_SVD_matrices.xlsx")
}
