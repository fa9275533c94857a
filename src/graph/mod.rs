// src/graph/mod.rs
// ============================================================================
// GRAPH - Modelo en memoria del grafo fuente
// ============================================================================

pub mod context;
pub mod json;
pub mod node;
pub mod tensor;

// Re-exports
pub use context::{ConvertContext, UsedConstSet, WeightTable};
pub use json::{load_graph, parse_graph, Graph, ValueInfo};
pub use node::{AttributeValue, GraphNode};
pub use tensor::{data_type, element_size, Tensor};
