// src/error.rs
// ============================================================================
// ERRORS - Tipos de error de la conversión ONNX → TNN
// ============================================================================
//
// Tres familias:
//   SerializeError  - escritura de payloads binarios (cast, shape, buffer)
//   ConvertError    - conversión de un nodo (lleva nodo + op_type)
//   RegistryError   - registro de converters (solo en arranque)
//
// ============================================================================

use thiserror::Error;

use crate::serializer::{DstDataType, PayloadType};

/// Errores al serializar un tensor al stream binario
#[derive(Error, Debug)]
pub enum SerializeError {
    /// Tipo ONNX sin ruta de escritura (solo float32, int32, int64)
    #[error("unsupported tensor data type {data_type} for tensor '{tensor}'")]
    UnsupportedDataType { tensor: String, data_type: i32 },

    #[error("unsupported cast from {src:?} to {dst:?}")]
    UnsupportedCast { src: PayloadType, dst: DstDataType },

    /// dims vacíos solo valen para un escalar
    #[error("invalid tensor shape: empty dims with {count} elements")]
    InvalidTensorShape { count: usize },

    #[error("null payload with {count} elements")]
    NullPayload { count: usize },

    #[error("payload too short: {actual} bytes, expected {expected}")]
    PayloadSizeMismatch { expected: usize, actual: usize },

    /// write_int_tensor exige al menos un elemento
    #[error("tensor '{0}' is empty")]
    EmptyTensor(String),

    #[error("dimension {dim} does not fit in i32")]
    DimOutOfRange { dim: i64 },

    /// El payload referencia un tensor que no está en la WeightTable
    #[error("tensor '{0}' not found")]
    MissingTensor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errores al convertir un nodo del grafo
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("unsupported op type '{op_type}' (node '{node}')")]
    UnsupportedOpType { node: String, op_type: String },

    /// Un nodo sin salidas no tiene sentido en el grafo
    #[error("node of type '{op_type}' has no outputs")]
    NoOutputs { op_type: String },

    #[error("node '{node}' ({op_type}): missing attribute '{attribute}'")]
    MissingAttribute {
        node: String,
        op_type: String,
        attribute: String,
    },

    #[error("node '{node}' ({op_type}): invalid value {value} for attribute '{attribute}'")]
    InvalidAttribute {
        node: String,
        op_type: String,
        attribute: String,
        value: i64,
    },

    /// Binario con los dos operandos plegables: ninguno queda como arista
    #[error("node '{node}' ({op_type}): both operands are constant weights")]
    ConstantOperands { node: String, op_type: String },

    #[error("node '{node}' ({op_type}): weight '{weight}' not found")]
    MissingWeight {
        node: String,
        op_type: String,
        weight: String,
    },

    #[error("node '{node}' ({op_type}): {source}")]
    Serialize {
        node: String,
        op_type: String,
        #[source]
        source: SerializeError,
    },

    #[error("duplicate initializer '{0}'")]
    DuplicateWeight(String),
}

impl ConvertError {
    /// Envuelve un SerializeError con el contexto del nodo
    pub fn serialize(node: &str, op_type: &str, source: SerializeError) -> Self {
        Self::Serialize {
            node: node.to_string(),
            op_type: op_type.to_string(),
            source,
        }
    }
}

/// Errores del registro de converters
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("op type '{0}' cannot be registered twice")]
    DuplicateRegistration(String),
}

pub type SerializeResult<T> = Result<T, SerializeError>;
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvertError::UnsupportedOpType {
            node: "n0".to_string(),
            op_type: "LSTM".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("LSTM"));
        assert!(msg.contains("n0"));
    }

    #[test]
    fn test_serialize_error_keeps_node_context() {
        let err = ConvertError::serialize("conv1", "Conv", SerializeError::NullPayload { count: 4 });
        assert!(err.to_string().contains("conv1"));
        assert!(err.to_string().contains("4 elements"));
    }
}
