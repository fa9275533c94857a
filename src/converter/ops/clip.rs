// src/converter/ops/clip.rs
// ============================================================================
// CLIP - min/max desde atributos (opset < 11) o entradas plegadas (opset 11+)
// ============================================================================

use crate::converter::{OpConverter, ParamText};
use crate::error::{ConvertError, ConvertResult};
use crate::graph::{ConvertContext, GraphNode};

pub struct ClipConverter;

impl ClipConverter {
    fn bound(
        node: &GraphNode,
        ctx: &ConvertContext,
        attr: &str,
        input: usize,
        default: f32,
    ) -> ConvertResult<f32> {
        if let Some(v) = node.attr_f(attr) {
            return Ok(v);
        }
        let Some(name) = node.input(input) else {
            return Ok(default);
        };
        let node_name = node.descriptor_name().unwrap_or_default();
        let values = ctx
            .weight(name, node_name, &node.op_type)?
            .to_f32_vec()
            .map_err(|e| ConvertError::serialize(node_name, &node.op_type, e))?;
        Ok(values.first().copied().unwrap_or(default))
    }
}

impl OpConverter for ClipConverter {
    fn target_op_type(&self, _node: &GraphNode, _ctx: &ConvertContext) -> String {
        "Clip".to_string()
    }

    fn has_learned_parameters(&self, _node: &GraphNode, _ctx: &ConvertContext) -> bool {
        false
    }

    fn encode_text_parameters(&self, node: &GraphNode, ctx: &ConvertContext) -> ConvertResult<String> {
        let min = Self::bound(node, ctx, "min", 1, f32::MIN)?;
        let max = Self::bound(node, ctx, "max", 2, f32::MAX)?;
        let mut params = ParamText::new();
        params.push(min).push(max);
        Ok(params.finish())
    }
}
