// src/graph/json.rs
// ============================================================================
// GRAPH JSON - Descripción de grafo en JSON (entrada del CLI)
// ============================================================================
//
// Sustituye al loader protobuf externo. Formato:
//
// {
//   "name": "model",
//   "inputs":  [{"name": "x", "dims": [1, 3, 224, 224]}],
//   "outputs": ["y"],
//   "nodes": [{"op_type": "Relu", "inputs": ["x"], "outputs": ["y"]}],
//   "initializers": [{"name": "w", "data_type": 1, "dims": [2], "float_data": [1, 2]}]
// }
//
// ============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::node::GraphNode;
use super::tensor::Tensor;

/// Entrada del grafo con su shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueInfo {
    pub name: String,
    #[serde(default)]
    pub dims: Vec<i64>,
}

/// Grafo completo: nodos en orden topológico + initializers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ValueInfo>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub initializers: Vec<Tensor>,
}

/// Parsea un grafo desde texto JSON
pub fn parse_graph(json: &str) -> Result<Graph> {
    serde_json::from_str(json).with_context(|| "Invalid graph JSON")
}

/// Lee un grafo desde archivo
pub fn load_graph(path: &Path) -> Result<Graph> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_graph(&data).with_context(|| format!("Failed to parse {}", path.display()))
}
