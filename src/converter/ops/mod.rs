// src/converter/ops/mod.rs
// ============================================================================
// OPS - Converters concretos por operador ONNX
// ============================================================================

pub mod axes;
pub mod clip;
pub mod constant;
pub mod conv;
pub mod elementwise;
pub mod reshape;

pub use axes::AxesConverter;
pub use clip::ClipConverter;
pub use constant::ConstantConverter;
pub use conv::ConvConverter;
pub use elementwise::{BinaryConverter, UnaryConverter};
pub use reshape::ReshapeConverter;

use crate::error::{SerializeError, SerializeResult};
use crate::graph::{data_type, ConvertContext, Tensor};
use crate::serializer::DstDataType;

/// Tipo destino de un peso: los float siguen la config del contexto,
/// los enteros siempre Auto (int64 → INT32).
pub(crate) fn payload_dst(tensor: &Tensor, ctx: &ConvertContext) -> DstDataType {
    if tensor.data_type == data_type::FLOAT {
        ctx.weight_data_type
    } else {
        DstDataType::Auto
    }
}

/// Peso requerido por el payload de una capa
pub(crate) fn payload_weight<'a>(ctx: &'a ConvertContext, name: &str) -> SerializeResult<&'a Tensor> {
    ctx.weights
        .get(name)
        .ok_or_else(|| SerializeError::MissingTensor(name.to_string()))
}
