// src/converter/ops/reshape.rs
// ============================================================================
// RESHAPE - shape plegado en los parámetros de texto
// ============================================================================
//
// Params: axis num_axes n d0 … dn-1 reshape_type
//
// ============================================================================

use crate::converter::{missing_attribute, OpConverter, ParamText};
use crate::error::{ConvertError, ConvertResult};
use crate::graph::{ConvertContext, GraphNode};

pub struct ReshapeConverter;

impl ReshapeConverter {
    fn shape(node: &GraphNode, ctx: &ConvertContext) -> ConvertResult<Vec<i64>> {
        // opset < 5: atributo "shape"
        if let Some(shape) = node.attr_ints("shape") {
            return Ok(shape.to_vec());
        }
        let name = node.input(1).ok_or_else(|| missing_attribute(node, "shape"))?;
        let node_name = node.descriptor_name().unwrap_or_default();
        ctx.weight(name, node_name, &node.op_type)?
            .to_i64_vec()
            .map_err(|e| ConvertError::serialize(node_name, &node.op_type, e))
    }
}

impl OpConverter for ReshapeConverter {
    fn target_op_type(&self, _node: &GraphNode, _ctx: &ConvertContext) -> String {
        "Reshape".to_string()
    }

    fn has_learned_parameters(&self, _node: &GraphNode, _ctx: &ConvertContext) -> bool {
        false
    }

    fn encode_text_parameters(&self, node: &GraphNode, ctx: &ConvertContext) -> ConvertResult<String> {
        let shape = Self::shape(node, ctx)?;
        let mut params = ParamText::new();
        params.push(0).push(shape.len()).push_list(&shape).push(0);
        Ok(params.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AttributeValue, Tensor, WeightTable};
    use crate::serializer::MemoryWriter;

    #[test]
    fn test_shape_folded_from_weight() {
        let weights =
            WeightTable::from_initializers([Tensor::from_i64("shape", vec![2], vec![1, -1])]).unwrap();
        let mut ctx = ConvertContext::new(weights);
        let node = GraphNode::new("Reshape")
            .with_inputs(["x", "shape"])
            .with_outputs(["flat"]);

        let layer = ReshapeConverter
            .convert(&node, &mut ctx, &mut MemoryWriter::new())
            .unwrap();
        assert_eq!(layer.inputs, vec!["x"]);
        assert_eq!(layer.text_line, "Reshape flat 1 1 x flat 0 2 2 1 -1 0 ");
    }

    #[test]
    fn test_dynamic_shape_stays_an_edge() {
        // shape producido por otro nodo: no es peso, queda como arista
        let mut ctx = ConvertContext::new(WeightTable::new());
        let node = GraphNode::new("Reshape")
            .with_inputs(["x", "shape_dyn"])
            .with_outputs(["y"])
            .with_attr("shape", AttributeValue::Ints(vec![4]));

        let layer = ReshapeConverter
            .convert(&node, &mut ctx, &mut MemoryWriter::new())
            .unwrap();
        assert_eq!(layer.inputs, vec!["x", "shape_dyn"]);
    }

    #[test]
    fn test_missing_shape_weight() {
        let ctx = ConvertContext::new(WeightTable::new());
        let node = GraphNode::new("Reshape").with_inputs(["x", "s"]).with_outputs(["y"]);
        assert!(matches!(
            ReshapeConverter.encode_text_parameters(&node, &ctx),
            Err(ConvertError::MissingWeight { .. })
        ));
    }
}
