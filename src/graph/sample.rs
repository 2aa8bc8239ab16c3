use super::load::parse_dataset;
use super::types::GraphData;

const SAMPLE_GRAPH_JSON: &str = include_str!("../../data/sample-graph.json");

/// The built-in demonstration ecosystem, used when no dataset path is given.
pub fn sample_graph() -> GraphData {
    // The embedded file is covered by `sample_graph_is_well_formed`.
    parse_dataset(SAMPLE_GRAPH_JSON).unwrap_or_default()
}
