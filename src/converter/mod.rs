// src/converter/mod.rs
// ============================================================================
// CONVERTER - Contrato por tipo de operador ONNX → capa TNN
// ============================================================================
//
// Cada operador implementa OpConverter. Los defaults:
//   get_input_names        → clasificador (classify.rs)
//   get_output_names       → identidad
//   write_binary_payload   → NoPayload
//   process_constant_node  → nada
//
// `convert` compone todo y produce la línea de descriptor:
//   "<opType> <name> <nIn> <nOut> <in…> <out…> <params>"
//
// ============================================================================

pub mod classify;
pub mod ops;

use std::fmt::{Display, Write as _};

use crate::error::{ConvertError, ConvertResult, SerializeResult};
use crate::graph::{ConvertContext, GraphNode};
use crate::serializer::BinaryWriter;

pub use classify::{classify_inputs, output_names};

/// Resultado de escribir el payload binario de una capa
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStatus {
    NoPayload,
    Wrote,
}

/// Capa convertida
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedLayer {
    pub name: String,
    pub op_type: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub text_line: String,
    pub payload_status: PayloadStatus,
}

/// Contrato de conversión de un tipo de operador.
///
/// Los converters no tienen estado: todo lo mutable vive en el ConvertContext.
pub trait OpConverter: Send + Sync {
    /// Nombre del opcode TNN
    fn target_op_type(&self, node: &GraphNode, ctx: &ConvertContext) -> String;

    /// true si la capa guarda datos derivados de pesos en el stream binario
    fn has_learned_parameters(&self, node: &GraphNode, ctx: &ConvertContext) -> bool;

    /// Parámetros inline: escalares separados por espacio, listas con su longitud delante
    fn encode_text_parameters(&self, node: &GraphNode, ctx: &ConvertContext) -> ConvertResult<String>;

    fn get_input_names(&self, node: &GraphNode, ctx: &ConvertContext) -> Vec<String> {
        classify_inputs(
            node,
            &ctx.weights,
            ctx.used_const(),
            self.has_learned_parameters(node, ctx),
        )
    }

    fn get_output_names(&self, node: &GraphNode, _ctx: &ConvertContext) -> Vec<String> {
        output_names(node)
    }

    fn write_binary_payload(
        &self,
        _node: &GraphNode,
        _ctx: &ConvertContext,
        _writer: &mut dyn BinaryWriter,
    ) -> SerializeResult<PayloadStatus> {
        Ok(PayloadStatus::NoPayload)
    }

    /// Hook previo a la clasificación. Los operadores que materializan una
    /// constante la marcan aquí en el UsedConstSet.
    fn process_constant_node(&self, _node: &GraphNode, _ctx: &mut ConvertContext) {}

    /// Convierte un nodo completo. process_constant_node corre antes de
    /// clasificar entradas: la clasificación depende de lo que marque.
    fn convert(
        &self,
        node: &GraphNode,
        ctx: &mut ConvertContext,
        writer: &mut dyn BinaryWriter,
    ) -> ConvertResult<ConvertedLayer> {
        let op_type = self.target_op_type(node, ctx);

        if node.outputs.is_empty() {
            return Err(ConvertError::NoOutputs {
                op_type: node.op_type.clone(),
            });
        }
        let name = node.descriptor_name().unwrap_or_default().to_string();

        self.process_constant_node(node, ctx);
        let ctx = &*ctx;

        let inputs = self.get_input_names(node, ctx);
        let outputs = self.get_output_names(node, ctx);

        let payload_status = self
            .write_binary_payload(node, ctx, writer)
            .map_err(|e| ConvertError::serialize(&name, &node.op_type, e))?;

        let params = self.encode_text_parameters(node, ctx)?;

        let mut text_line = format!("{} {} {} {} ", op_type, name, inputs.len(), outputs.len());
        for edge in inputs.iter().chain(outputs.iter()) {
            text_line.push_str(edge);
            text_line.push(' ');
        }
        text_line.push_str(&params);

        Ok(ConvertedLayer {
            name,
            op_type,
            inputs,
            outputs,
            text_line,
            payload_status,
        })
    }
}

/// Acumulador de parámetros de texto: cada valor seguido de un espacio
#[derive(Debug, Default, Clone)]
pub struct ParamText(String);

impl ParamText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: impl Display) -> &mut Self {
        let _ = write!(self.0, "{} ", value);
        self
    }

    /// Lista: longitud y luego los valores ([0, 2] → "2 0 2 ")
    pub fn push_list<T: Display>(&mut self, values: &[T]) -> &mut Self {
        self.push(values.len());
        for v in values {
            self.push(v);
        }
        self
    }

    pub fn finish(self) -> String {
        self.0
    }
}

/// Error de atributo ausente con el contexto del nodo
pub fn missing_attribute(node: &GraphNode, attribute: &str) -> ConvertError {
    ConvertError::MissingAttribute {
        node: node.descriptor_name().unwrap_or_default().to_string(),
        op_type: node.op_type.clone(),
        attribute: attribute.to_string(),
    }
}
