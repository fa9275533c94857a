// src/lib.rs
// ============================================================================
// ONNX2TNN - Conversor de grafos ONNX a TNN (.tnnproto + .tnnmodel)
// ============================================================================

pub mod builder;
pub mod cast;
pub mod converter;
pub mod error;
pub mod graph;
pub mod proto;
pub mod registry;
pub mod serializer;

// Re-exports principales
pub use builder::{convert_graph, convert_graphs, BuildStats, ConvertOptions, ConvertedModel, UnsupportedPolicy};
pub use converter::{classify_inputs, ConvertedLayer, OpConverter, PayloadStatus};
pub use error::{ConvertError, RegistryError, SerializeError};
pub use graph::{load_graph, ConvertContext, Graph, GraphNode, Tensor, WeightTable};
pub use proto::ProtoBuilder;
pub use registry::{build_default_registry, ConverterRegistry};
pub use serializer::{BinaryWriter, BlobDataType, DstDataType, MemoryWriter, TnnModelWriter};
