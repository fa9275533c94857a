// src/builder.rs
// ============================================================================
// BUILDER - Driver de conversión de un grafo completo
// ============================================================================
//
// El builder es TONTO:
// - NO sabe de operadores (lo hace el registro)
// - NO decide qué entradas son aristas (lo hace el converter)
// - Solo recorre nodos en orden, aplica la política y acumula
//
// Un grafo se convierte de forma secuencial: el UsedConstSet crece nodo a
// nodo. Grafos independientes se convierten en paralelo (convert_graphs).
//
// ============================================================================

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::converter::{ConvertedLayer, PayloadStatus};
use crate::error::{ConvertError, ConvertResult};
use crate::graph::{ConvertContext, Graph, WeightTable};
use crate::proto::ProtoBuilder;
use crate::registry::ConverterRegistry;
use crate::serializer::{BinaryWriter, DstDataType, MemoryWriter};

/// Qué hacer con un op_type sin converter registrado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
    #[default]
    Abort,
    Skip,
}

/// Opciones de conversión (el CLI mapea sus flags aquí)
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Auto (float32) o Half para los pesos float aprendidos
    pub weight_data_type: DstDataType,
    pub on_unsupported: UnsupportedPolicy,
    pub verbose: bool,
}

/// Estadísticas de conversión
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub layers: usize,
    pub payload_layers: usize,
    pub skipped: usize,
}

impl BuildStats {
    pub fn record(&mut self, layer: &ConvertedLayer) {
        self.layers += 1;
        if layer.payload_status == PayloadStatus::Wrote {
            self.payload_layers += 1;
        }
    }

    pub fn merge(&mut self, other: &BuildStats) {
        self.layers += other.layers;
        self.payload_layers += other.payload_layers;
        self.skipped += other.skipped;
    }
}

/// Resultado de convertir un grafo
#[derive(Debug, Clone)]
pub struct ConvertedModel {
    pub name: String,
    pub layers: Vec<ConvertedLayer>,
    pub proto: ProtoBuilder,
    pub stats: BuildStats,
}

/// Convierte un grafo nodo a nodo. Los payloads van al writer en el mismo
/// orden que las capas.
pub fn convert_graph(
    graph: &Graph,
    registry: &ConverterRegistry,
    writer: &mut dyn BinaryWriter,
    options: &ConvertOptions,
) -> ConvertResult<ConvertedModel> {
    let weights = WeightTable::from_initializers(graph.initializers.iter().cloned())?;
    let mut ctx = ConvertContext::new(weights).with_weight_data_type(options.weight_data_type);

    info!(
        "Converting graph '{}': {} nodes, {} initializers",
        graph.name,
        graph.nodes.len(),
        ctx.weights.len()
    );

    let mut proto = ProtoBuilder::new(&graph.inputs, &graph.outputs);
    let mut layers = Vec::with_capacity(graph.nodes.len());
    let mut stats = BuildStats::default();

    for (idx, node) in graph.nodes.iter().enumerate() {
        let node_name = node.descriptor_name().unwrap_or_default();

        let Some(converter) = registry.lookup(&node.op_type) else {
            match options.on_unsupported {
                UnsupportedPolicy::Abort => {
                    return Err(ConvertError::UnsupportedOpType {
                        node: node_name.to_string(),
                        op_type: node.op_type.clone(),
                    });
                }
                UnsupportedPolicy::Skip => {
                    warn!("Skipping unsupported op '{}' (node '{}')", node.op_type, node_name);
                    stats.skipped += 1;
                    continue;
                }
            }
        };

        let layer = converter.convert(node, &mut ctx, writer)?;
        debug!("[{}] {}", idx, layer.text_line);
        if options.verbose {
            println!("    [{}/{}] {} {}", idx + 1, graph.nodes.len(), layer.op_type, layer.name);
        }

        stats.record(&layer);
        proto.push_layer(&layer);
        layers.push(layer);
    }

    info!(
        "Graph '{}' done: {} layers, {} with payload, {} skipped",
        graph.name, stats.layers, stats.payload_layers, stats.skipped
    );

    Ok(ConvertedModel {
        name: graph.name.clone(),
        layers,
        proto,
        stats,
    })
}

/// Convierte grafos independientes en paralelo. Cada uno tiene su propio
/// contexto y su writer en memoria; el orden del resultado es el de entrada.
pub fn convert_graphs(
    graphs: &[Graph],
    registry: &ConverterRegistry,
    options: &ConvertOptions,
) -> Vec<ConvertResult<(ConvertedModel, MemoryWriter)>> {
    graphs
        .par_iter()
        .map(|graph| {
            let mut writer = MemoryWriter::new();
            let model = convert_graph(graph, registry, &mut writer, options)?;
            Ok((model, writer))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{parse_graph, AttributeValue, GraphNode, Tensor, ValueInfo};
    use crate::registry::build_default_registry;
    use crate::serializer::BlobDataType;

    fn tiny_graph() -> Graph {
        Graph {
            name: "tiny".into(),
            inputs: vec![ValueInfo {
                name: "x".into(),
                dims: vec![1, 3, 4, 4],
            }],
            outputs: vec!["z".into()],
            nodes: vec![
                GraphNode::new("Conv")
                    .with_name("conv")
                    .with_inputs(["x", "W", "B"])
                    .with_outputs(["c"]),
                GraphNode::new("Relu").with_inputs(["c"]).with_outputs(["r"]),
                GraphNode::new("Unsqueeze")
                    .with_inputs(["r"])
                    .with_outputs(["z"])
                    .with_attr("axes", AttributeValue::Ints(vec![0])),
            ],
            initializers: vec![
                Tensor::from_f32("W", vec![2, 3, 1, 1], vec![0.5; 6]),
                Tensor::from_f32("B", vec![2], vec![0.0; 2]),
            ],
        }
    }

    #[test]
    fn test_convert_graph_in_order() {
        let registry = build_default_registry().unwrap();
        let mut writer = MemoryWriter::new();
        let model = convert_graph(&tiny_graph(), &registry, &mut writer, &ConvertOptions::default()).unwrap();

        assert_eq!(model.layers.len(), 3);
        assert_eq!(model.layers[0].op_type, "Convolution");
        assert_eq!(model.layers[1].text_line, "ReLU r 1 1 c r ");
        assert_eq!(model.layers[2].text_line, "Unsqueeze z 1 1 r z 1 0 ");
        assert_eq!(
            model.stats,
            BuildStats {
                layers: 3,
                payload_layers: 1,
                skipped: 0
            }
        );
        // filtro + bias
        assert_eq!(writer.payloads.len(), 2);
        assert_eq!(model.proto.blobs(), ["x", "c", "r", "z"]);
    }

    #[test]
    fn test_unsupported_abort() {
        let mut graph = tiny_graph();
        graph.nodes.insert(1, GraphNode::new("LSTM").with_name("rnn").with_outputs(["h"]));
        let registry = build_default_registry().unwrap();
        let err = convert_graph(&graph, &registry, &mut MemoryWriter::new(), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnsupportedOpType { ref node, ref op_type } if node == "rnn" && op_type == "LSTM"
        ));
    }

    #[test]
    fn test_unsupported_skip() {
        let mut graph = tiny_graph();
        graph.nodes.push(GraphNode::new("LSTM").with_outputs(["h"]));
        let registry = build_default_registry().unwrap();
        let options = ConvertOptions {
            on_unsupported: UnsupportedPolicy::Skip,
            ..Default::default()
        };
        let model = convert_graph(&graph, &registry, &mut MemoryWriter::new(), &options).unwrap();
        assert_eq!(model.stats.layers, 3);
        assert_eq!(model.stats.skipped, 1);
    }

    #[test]
    fn test_half_weights_option() {
        let registry = build_default_registry().unwrap();
        let options = ConvertOptions {
            weight_data_type: DstDataType::Half,
            ..Default::default()
        };
        let mut writer = MemoryWriter::new();
        convert_graph(&tiny_graph(), &registry, &mut writer, &options).unwrap();
        assert_eq!(writer.payloads[0].data_type, BlobDataType::Half);
        assert_eq!(writer.payloads[1].data_type, BlobDataType::Float);
    }

    #[test]
    fn test_duplicate_initializer_rejected() {
        let mut graph = tiny_graph();
        graph.initializers.push(Tensor::from_f32("W", vec![1], vec![1.0]));
        let registry = build_default_registry().unwrap();
        let err = convert_graph(&graph, &registry, &mut MemoryWriter::new(), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::DuplicateWeight(ref n) if n == "W"));
    }

    #[test]
    fn test_convert_graphs_parallel_keeps_order() {
        let registry = build_default_registry().unwrap();
        let graphs: Vec<Graph> = (0..6)
            .map(|i| {
                let mut g = tiny_graph();
                g.name = format!("g{}", i);
                g
            })
            .collect();
        let results = convert_graphs(&graphs, &registry, &ConvertOptions::default());
        assert_eq!(results.len(), 6);
        for (i, result) in results.into_iter().enumerate() {
            let (model, writer) = result.unwrap();
            assert_eq!(model.name, format!("g{}", i));
            assert_eq!(writer.payloads.len(), 2);
        }
    }

    #[test]
    fn test_constant_feeding_binary_from_json() {
        let graph = parse_graph(
            r#"{
                "name": "const_add",
                "inputs": [{"name": "x", "dims": [2]}],
                "outputs": ["y"],
                "nodes": [
                    {"op_type": "Constant", "outputs": ["k"]},
                    {"op_type": "Add", "inputs": ["x", "k"], "outputs": ["y"]}
                ],
                "initializers": [{"name": "k", "data_type": 1, "dims": [2], "float_data": [1, 2]}]
            }"#,
        )
        .unwrap();
        let registry = build_default_registry().unwrap();
        let mut writer = MemoryWriter::new();
        let model = convert_graph(&graph, &registry, &mut writer, &ConvertOptions::default()).unwrap();

        assert_eq!(model.layers[0].text_line, "Const k 0 1 k 1 2 ");
        assert_eq!(model.layers[1].text_line, "Add y 2 1 x k y ");
        assert_eq!(writer.payloads.len(), 1);
    }
}
