mod load;
mod sample;
mod types;

pub use load::{load_dataset, parse_dataset};
pub use sample::sample_graph;
pub use types::{
    DEFAULT_IMPORTANCE, EdgeKind, GraphData, GraphEdge, GraphNode, HealthStatus, NodeKind,
};
