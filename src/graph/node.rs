// src/graph/node.rs
// ============================================================================
// GRAPH NODE - Nodo del grafo fuente (op_type, entradas, salidas, atributos)
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tensor::Tensor;

/// Valor de un atributo ONNX
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeValue {
    Int(i64),
    Float(f32),
    String(String),
    Ints(Vec<i64>),
    Floats(Vec<f32>),
    Strings(Vec<String>),
    Tensor(Tensor),
}

/// Nodo del grafo. Inmutable una vez parseado; el core solo lo lee.
///
/// Las entradas pueden contener "" para inputs opcionales omitidos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub op_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl GraphNode {
    pub fn new(op_type: impl Into<String>) -> Self {
        Self {
            op_type: op_type.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Nombre del descriptor: el del nodo, o su primera salida si no tiene.
    /// None solo si el nodo no tiene nombre ni salidas.
    pub fn descriptor_name(&self) -> Option<&str> {
        if !self.name.is_empty() {
            Some(&self.name)
        } else {
            self.outputs.first().map(String::as_str)
        }
    }

    /// Entrada i, tratando "" como ausente
    pub fn input(&self, index: usize) -> Option<&str> {
        self.inputs
            .get(index)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    // ========================================================================
    // Atributos
    // ========================================================================

    pub fn attr(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn attr_i(&self, name: &str) -> Option<i64> {
        match self.attr(name)? {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn attr_f(&self, name: &str) -> Option<f32> {
        match self.attr(name)? {
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn attr_s(&self, name: &str) -> Option<&str> {
        match self.attr(name)? {
            AttributeValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn attr_ints(&self, name: &str) -> Option<&[i64]> {
        match self.attr(name)? {
            AttributeValue::Ints(v) => Some(v),
            _ => None,
        }
    }

    pub fn attr_tensor(&self, name: &str) -> Option<&Tensor> {
        match self.attr(name)? {
            AttributeValue::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// Atributo entero con default (como get_node_attr_i)
    pub fn attr_i_or(&self, name: &str, default: i64) -> i64 {
        self.attr_i(name).unwrap_or(default)
    }
}
