//! Dense matrix CSV reader

use anyhow::{Context, Result};
use crate::error::GraphError;
use crate::graph::ModularityGraph;
use polars::prelude::*;
use std::path::Path;

/// Read a headerless comma-separated square matrix
///
/// The matrix holds edge weights, or modularity entries when
/// `treat_as_modularity` is set. An asymmetric matrix is read as directed.
pub fn read_matrix_csv(
    path: &Path,
    modularity_resolution: f64,
    treat_as_modularity: bool,
) -> Result<ModularityGraph> {
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .with_context(|| format!("File {} can not be read as a matrix", path.display()))?;

    let size = df.height();
    log::debug!("Matrix file has {} rows and {} columns", size, df.width());
    if df.width() != size {
        return Err(GraphError::NonSquareMatrix {
            row: 0,
            expected: size,
            found: df.width(),
        }
        .into());
    }

    let mut rows = vec![vec![0.0; size]; size];
    for (j, column) in df.get_columns().iter().enumerate() {
        let column = column.cast(&DataType::Float64)?;
        for (i, value) in column.f64()?.into_iter().enumerate() {
            // ragged lines surface as missing cells
            rows[i][j] = value.ok_or(GraphError::NonSquareMatrix {
                row: i,
                expected: size,
                found: j,
            })?;
        }
    }

    Ok(ModularityGraph::from_rows(
        &rows,
        false,
        modularity_resolution,
        treat_as_modularity,
    )?)
}
