//! Parquet edge table reader

use anyhow::{Context, Result};
use crate::graph::{GraphBuilder, ModularityGraph};
use polars::prelude::*;
use std::path::Path;

pub const SOURCE_COLUMN: &str = "source";
pub const TARGET_COLUMN: &str = "target";
pub const WEIGHT_COLUMN: &str = "weight";

/// Load a directed edge table with `source`, `target` and optional `weight`
///
/// Rows with a missing endpoint are skipped, missing weights count as 1.
pub fn read_edge_table(
    path: &Path,
    modularity_resolution: f64,
    treat_as_modularity: bool,
) -> Result<ModularityGraph> {
    log::info!("Reading parquet file: {}", path.display());

    let df = LazyFrame::scan_parquet(path, Default::default())
        .and_then(|frame| frame.collect())
        .with_context(|| format!("File {} can not be read as parquet", path.display()))?;
    log::info!("File schema: {:?}", df.schema());
    log::info!("Loaded {} edges", df.height());

    let sources = df.column(SOURCE_COLUMN)?.cast(&DataType::Int64)?;
    let targets = df.column(TARGET_COLUMN)?.cast(&DataType::Int64)?;
    let weights = match df.column(WEIGHT_COLUMN) {
        Ok(column) => Some(column.cast(&DataType::Float64)?),
        Err(_) => None,
    };
    let weights = weights.as_ref().map(|column| column.f64()).transpose()?;

    let mut builder = GraphBuilder::with_capacity(df.height())
        .directed(true)
        .resolution(modularity_resolution)
        .treat_as_modularity(treat_as_modularity);

    for (row, (source, target)) in sources.i64()?.into_iter().zip(targets.i64()?).enumerate() {
        let (Some(source), Some(target)) = (source, target) else {
            continue;
        };
        let weight = weights.and_then(|w| w.get(row)).unwrap_or(1.0);
        builder.add_edge(source, target, weight);
    }

    Ok(builder.build()?)
}
