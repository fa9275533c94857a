// src/converter/ops/constant.rs
// ============================================================================
// CONSTANT - Constant → capa Const materializada
// ============================================================================
//
// Si la salida del Constant también es un peso, se marca en el UsedConstSet
// antes de clasificar: los consumidores posteriores la verán como arista
// viva en lugar de plegarla.
//
// ============================================================================

use crate::converter::{missing_attribute, OpConverter, ParamText, PayloadStatus};
use crate::error::{ConvertResult, SerializeError, SerializeResult};
use crate::graph::{ConvertContext, GraphNode, Tensor};
use crate::serializer::{write_initializer, BinaryWriter};

use super::payload_dst;

pub struct ConstantConverter;

impl ConstantConverter {
    /// Valor: el peso con el nombre de la salida o, si no, el atributo "value"
    fn value<'a>(node: &'a GraphNode, ctx: &'a ConvertContext) -> Option<&'a Tensor> {
        node.outputs
            .first()
            .and_then(|out| ctx.weights.get(out))
            .or_else(|| node.attr_tensor("value"))
    }
}

impl OpConverter for ConstantConverter {
    fn target_op_type(&self, _node: &GraphNode, _ctx: &ConvertContext) -> String {
        "Const".to_string()
    }

    fn has_learned_parameters(&self, _node: &GraphNode, _ctx: &ConvertContext) -> bool {
        true
    }

    fn process_constant_node(&self, node: &GraphNode, ctx: &mut ConvertContext) {
        for out in &node.outputs {
            ctx.mark_const_used(out);
        }
    }

    fn encode_text_parameters(&self, node: &GraphNode, ctx: &ConvertContext) -> ConvertResult<String> {
        let value = Self::value(node, ctx).ok_or_else(|| missing_attribute(node, "value"))?;
        let mut params = ParamText::new();
        params.push_list(&value.dims);
        Ok(params.finish())
    }

    fn write_binary_payload(
        &self,
        node: &GraphNode,
        ctx: &ConvertContext,
        writer: &mut dyn BinaryWriter,
    ) -> SerializeResult<PayloadStatus> {
        let value = Self::value(node, ctx).ok_or_else(|| {
            SerializeError::MissingTensor(node.outputs.first().cloned().unwrap_or_default())
        })?;
        write_initializer(value, writer, payload_dst(value, ctx))?;
        Ok(PayloadStatus::Wrote)
    }
}
