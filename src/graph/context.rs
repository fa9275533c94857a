// src/graph/context.rs
// ============================================================================
// CONVERT CONTEXT - Estado compartido durante la conversión de UN grafo
// ============================================================================
//
// WeightTable:  nombre → initializer. Se construye antes de convertir y el
//               core nunca la modifica.
// UsedConstSet: nombres materializados como capas constantes. Solo crece,
//               y los nodos posteriores dependen de lo marcado antes: la
//               conversión de un grafo es secuencial.
//
// ============================================================================

use std::collections::{HashMap, HashSet};

use crate::error::{ConvertError, ConvertResult};
use crate::serializer::DstDataType;

use super::tensor::Tensor;

pub type UsedConstSet = HashSet<String>;

/// Tabla de pesos del grafo (nombres únicos)
#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    tensors: HashMap<String, Tensor>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye la tabla desde los initializers. Un nombre repetido es error.
    pub fn from_initializers(initializers: impl IntoIterator<Item = Tensor>) -> ConvertResult<Self> {
        let mut tensors = HashMap::new();
        for tensor in initializers {
            if tensors.contains_key(&tensor.name) {
                return Err(ConvertError::DuplicateWeight(tensor.name));
            }
            tensors.insert(tensor.name.clone(), tensor);
        }
        Ok(Self { tensors })
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tensors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }
}

/// Contexto mutable que el driver presta a cada converter
#[derive(Debug, Clone)]
pub struct ConvertContext {
    pub weights: WeightTable,
    used_const: UsedConstSet,
    /// Tipo destino de los pesos aprendidos (Auto o Half)
    pub weight_data_type: DstDataType,
}

impl ConvertContext {
    pub fn new(weights: WeightTable) -> Self {
        Self {
            weights,
            used_const: UsedConstSet::new(),
            weight_data_type: DstDataType::Auto,
        }
    }

    pub fn with_weight_data_type(mut self, data_type: DstDataType) -> Self {
        self.weight_data_type = data_type;
        self
    }

    /// Marca un peso como constante materializada.
    /// Devuelve false si el nombre no está en la WeightTable (UsedConstSet ⊆ WeightTable).
    pub fn mark_const_used(&mut self, name: &str) -> bool {
        if !self.weights.contains(name) {
            return false;
        }
        self.used_const.insert(name.to_string());
        true
    }

    pub fn is_const_used(&self, name: &str) -> bool {
        self.used_const.contains(name)
    }

    pub fn used_const(&self) -> &UsedConstSet {
        &self.used_const
    }

    /// Peso requerido por un nodo
    pub fn weight(&self, name: &str, node: &str, op_type: &str) -> ConvertResult<&Tensor> {
        self.weights.get(name).ok_or_else(|| ConvertError::MissingWeight {
            node: node.to_string(),
            op_type: op_type.to_string(),
            weight: name.to_string(),
        })
    }
}
