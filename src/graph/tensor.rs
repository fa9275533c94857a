// src/graph/tensor.rs
// ============================================================================
// TENSOR - Initializer ONNX (dims + tipo + raw_data o listas tipadas)
// ============================================================================

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::cast::{i32_to_f32, i64_to_f32};
use crate::error::{SerializeError, SerializeResult};

/// Códigos de tipo de TensorProto.DataType
pub mod data_type {
    pub const FLOAT: i32 = 1;
    pub const INT32: i32 = 6;
    pub const INT64: i32 = 7;
    pub const FLOAT16: i32 = 10;
    pub const DOUBLE: i32 = 11;
}

/// Tamaño en bytes del elemento (solo tipos con ruta de escritura)
pub fn element_size(data_type: i32) -> Option<usize> {
    match data_type {
        data_type::FLOAT | data_type::INT32 => Some(4),
        data_type::INT64 => Some(8),
        _ => None,
    }
}

/// Tensor constante del grafo. Los bytes de `raw_data` son little-endian.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    #[serde(default)]
    pub name: String,
    pub data_type: i32,
    #[serde(default)]
    pub dims: Vec<i64>,
    #[serde(default)]
    pub raw_data: Option<Vec<u8>>,
    #[serde(default)]
    pub float_data: Vec<f32>,
    #[serde(default)]
    pub int32_data: Vec<i32>,
    #[serde(default)]
    pub int64_data: Vec<i64>,
}

impl Tensor {
    pub fn from_f32(name: impl Into<String>, dims: Vec<i64>, data: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type::FLOAT,
            dims,
            float_data: data,
            ..Default::default()
        }
    }

    pub fn from_i64(name: impl Into<String>, dims: Vec<i64>, data: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type::INT64,
            dims,
            int64_data: data,
            ..Default::default()
        }
    }

    pub fn from_i32(name: impl Into<String>, dims: Vec<i64>, data: Vec<i32>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type::INT32,
            dims,
            int32_data: data,
            ..Default::default()
        }
    }

    /// Tensor con raw_data ya codificado
    pub fn from_raw(name: impl Into<String>, data_type: i32, dims: Vec<i64>, raw: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data_type,
            dims,
            raw_data: Some(raw),
            ..Default::default()
        }
    }

    fn typed_len(&self) -> usize {
        match self.data_type {
            data_type::FLOAT => self.float_data.len(),
            data_type::INT32 => self.int32_data.len(),
            data_type::INT64 => self.int64_data.len(),
            _ => 0,
        }
    }

    /// Número de elementos.
    ///
    /// Se cuenta desde los datos (raw_data o lista tipada). Sin datos, desde
    /// dims; dims vacíos sin datos cuentan 0.
    pub fn element_count(&self) -> usize {
        if let Some(raw) = &self.raw_data {
            return element_size(self.data_type).map_or(0, |size| raw.len() / size);
        }
        let typed = self.typed_len();
        if typed > 0 || self.dims.is_empty() {
            return typed;
        }
        self.dims.iter().map(|&d| d.max(0) as usize).product()
    }

    /// Dims como i32 (formato de dims del writer)
    pub fn dims_i32(&self) -> SerializeResult<Vec<i32>> {
        self.dims
            .iter()
            .map(|&d| i32::try_from(d).map_err(|_| SerializeError::DimOutOfRange { dim: d }))
            .collect()
    }

    fn unsupported(&self) -> SerializeError {
        SerializeError::UnsupportedDataType {
            tensor: self.name.clone(),
            data_type: self.data_type,
        }
    }

    /// Valores como i64 (ejes, shapes). Acepta INT64 e INT32.
    pub fn to_i64_vec(&self) -> SerializeResult<Vec<i64>> {
        match (self.data_type, &self.raw_data) {
            (data_type::INT64, Some(raw)) => {
                let mut out = vec![0i64; raw.len() / 8];
                LittleEndian::read_i64_into(&raw[..out.len() * 8], &mut out);
                Ok(out)
            }
            (data_type::INT64, None) => Ok(self.int64_data.clone()),
            (data_type::INT32, Some(raw)) => {
                let mut out = vec![0i32; raw.len() / 4];
                LittleEndian::read_i32_into(&raw[..out.len() * 4], &mut out);
                Ok(out.into_iter().map(i64::from).collect())
            }
            (data_type::INT32, None) => Ok(self.int32_data.iter().map(|&v| v as i64).collect()),
            _ => Err(self.unsupported()),
        }
    }

    /// Valores como f32, ensanchando enteros
    pub fn to_f32_vec(&self) -> SerializeResult<Vec<f32>> {
        match (self.data_type, &self.raw_data) {
            (data_type::FLOAT, Some(raw)) => {
                let mut out = vec![0f32; raw.len() / 4];
                LittleEndian::read_f32_into(&raw[..out.len() * 4], &mut out);
                Ok(out)
            }
            (data_type::FLOAT, None) => Ok(self.float_data.clone()),
            (data_type::INT32, _) => {
                Ok(self.to_i64_vec()?.into_iter().map(|v| i32_to_f32(v as i32)).collect())
            }
            (data_type::INT64, _) => Ok(self.to_i64_vec()?.into_iter().map(i64_to_f32).collect()),
            _ => Err(self.unsupported()),
        }
    }
}
