use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use super::types::GraphData;
use crate::error::DatasetError;

pub fn parse_dataset(raw: &str) -> Result<GraphData, DatasetError> {
    let data: GraphData = serde_json::from_str(raw)?;
    if data.nodes.is_empty() {
        return Err(DatasetError::Empty);
    }
    Ok(data)
}

/// Reads a `{ "nodes": [...], "edges": [...] }` document from disk.
///
/// Only the shape is checked here. Dangling edge endpoints and duplicate ids
/// are tolerated and handled by the layout engine.
pub fn load_dataset(path: &Path) -> Result<GraphData> {
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let data = parse_dataset(&raw)
        .with_context(|| format!("failed to parse dataset {}", path.display()))?;
    info!(
        nodes = data.nodes.len(),
        edges = data.edges.len();
        "loaded dataset from {}",
        path.display()
    );
    Ok(data)
}
