// src/converter/ops/axes.rs
// ============================================================================
// AXES OPS - Unsqueeze / Squeeze
// ============================================================================
//
// Solo la entrada 0 es arista. Los ejes vienen del atributo "axes" o, desde
// opset 13, de la entrada 1 (un peso que se pliega).
//
// ============================================================================

use crate::converter::{missing_attribute, OpConverter, ParamText};
use crate::error::{ConvertError, ConvertResult};
use crate::graph::{ConvertContext, GraphNode};

pub struct AxesConverter {
    target: &'static str,
}

impl AxesConverter {
    pub fn unsqueeze() -> Self {
        Self { target: "Unsqueeze" }
    }

    pub fn squeeze() -> Self {
        Self { target: "Squeeze" }
    }

    fn axes(&self, node: &GraphNode, ctx: &ConvertContext) -> ConvertResult<Vec<i64>> {
        if let Some(axes) = node.attr_ints("axes") {
            return Ok(axes.to_vec());
        }
        let name = node.input(1).ok_or_else(|| missing_attribute(node, "axes"))?;
        let node_name = node.descriptor_name().unwrap_or_default();
        ctx.weight(name, node_name, &node.op_type)?
            .to_i64_vec()
            .map_err(|e| ConvertError::serialize(node_name, &node.op_type, e))
    }
}

impl OpConverter for AxesConverter {
    fn target_op_type(&self, _node: &GraphNode, _ctx: &ConvertContext) -> String {
        self.target.to_string()
    }

    fn has_learned_parameters(&self, _node: &GraphNode, _ctx: &ConvertContext) -> bool {
        false
    }

    fn get_input_names(&self, node: &GraphNode, _ctx: &ConvertContext) -> Vec<String> {
        node.inputs.iter().take(1).cloned().collect()
    }

    fn encode_text_parameters(&self, node: &GraphNode, ctx: &ConvertContext) -> ConvertResult<String> {
        let mut params = ParamText::new();
        params.push_list(&self.axes(node, ctx)?);
        Ok(params.finish())
    }
}
