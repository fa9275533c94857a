// src/converter/ops/elementwise.rs
// ============================================================================
// ELEMENTWISE - Activaciones unarias y operadores binarios con broadcast
// ============================================================================
//
// Binario con un operando constante (Add(x, bias)): el peso va al payload y
// el parámetro de texto indica qué entrada era (weight_input_index).
//
// ============================================================================

use crate::converter::{OpConverter, ParamText, PayloadStatus};
use crate::error::{ConvertError, ConvertResult, SerializeResult};
use crate::graph::{ConvertContext, GraphNode};
use crate::serializer::{write_initializer, BinaryWriter};

use super::{payload_dst, payload_weight};

/// Activación sin parámetros (Relu, Sigmoid, ...)
pub struct UnaryConverter {
    target: &'static str,
}

impl UnaryConverter {
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl OpConverter for UnaryConverter {
    fn target_op_type(&self, _node: &GraphNode, _ctx: &ConvertContext) -> String {
        self.target.to_string()
    }

    fn has_learned_parameters(&self, _node: &GraphNode, _ctx: &ConvertContext) -> bool {
        false
    }

    fn encode_text_parameters(&self, _node: &GraphNode, _ctx: &ConvertContext) -> ConvertResult<String> {
        Ok(String::new())
    }
}

/// Operador binario (Add, Sub, Mul, Div, Max, Min)
pub struct BinaryConverter {
    target: &'static str,
}

impl BinaryConverter {
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }

    /// Índice del operando que va al payload: un peso no materializado como
    /// capa Const cuyo compañero es una arista viva (no es peso, o es un peso
    /// ya materializado).
    fn weight_input<'a>(node: &'a GraphNode, ctx: &ConvertContext) -> Option<(usize, &'a str)> {
        if node.inputs.len() != 2 {
            return None;
        }
        let folded = |name: &str| ctx.weights.contains(name) && !ctx.is_const_used(name);
        match (node.input(0), node.input(1)) {
            (Some(a), Some(b)) if folded(a) && !folded(b) => Some((0, a)),
            (Some(a), Some(b)) if folded(b) && !folded(a) => Some((1, b)),
            _ => None,
        }
    }

    /// Los dos operandos plegables: no hay arista ni payload posible
    fn all_operands_folded(node: &GraphNode, ctx: &ConvertContext) -> bool {
        let operands: Vec<&str> = node
            .inputs
            .iter()
            .filter(|name| !name.is_empty())
            .map(String::as_str)
            .collect();
        !operands.is_empty()
            && operands
                .iter()
                .all(|name| ctx.weights.contains(name) && !ctx.is_const_used(name))
    }
}

impl OpConverter for BinaryConverter {
    fn target_op_type(&self, _node: &GraphNode, _ctx: &ConvertContext) -> String {
        self.target.to_string()
    }

    // Con algún peso se usa la rama "learned" del clasificador: respeta el
    // UsedConstSet, así que un peso materializado como Const sigue siendo
    // arista y solo se pliega el operando de weight_input.
    fn has_learned_parameters(&self, node: &GraphNode, ctx: &ConvertContext) -> bool {
        node.inputs.iter().any(|name| ctx.weights.contains(name))
    }

    fn encode_text_parameters(&self, node: &GraphNode, ctx: &ConvertContext) -> ConvertResult<String> {
        if Self::all_operands_folded(node, ctx) {
            return Err(ConvertError::ConstantOperands {
                node: node.descriptor_name().unwrap_or_default().to_string(),
                op_type: node.op_type.clone(),
            });
        }
        let mut params = ParamText::new();
        if let Some((idx, _)) = Self::weight_input(node, ctx) {
            params.push(idx);
        }
        Ok(params.finish())
    }

    fn write_binary_payload(
        &self,
        node: &GraphNode,
        ctx: &ConvertContext,
        writer: &mut dyn BinaryWriter,
    ) -> SerializeResult<PayloadStatus> {
        let Some((_, name)) = Self::weight_input(node, ctx) else {
            return Ok(PayloadStatus::NoPayload);
        };
        let tensor = payload_weight(ctx, name)?;
        write_initializer(tensor, writer, payload_dst(tensor, ctx))?;
        Ok(PayloadStatus::Wrote)
    }
}
