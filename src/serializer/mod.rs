// src/serializer/mod.rs
// ============================================================================
// SERIALIZER - Payloads binarios de pesos (stream .tnnmodel)
// ============================================================================
//
// El core solo conoce el contrato put_raw(bytes, dims, tipo) del writer.
// El layout en disco es cosa del writer (ver model_file.rs).
//
// ============================================================================

pub mod model_file;
pub mod tensor;

use std::borrow::Cow;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{SerializeError, SerializeResult};
use crate::graph::{data_type, Tensor};

pub use model_file::{read_model_file, ModelFile, TnnModelWriter};
pub use tensor::{write_initializer, write_int_tensor, write_tensor};

/// Tipo de elemento de un payload escrito (códigos DataType de TNN)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BlobDataType {
    Float = 0,
    Half = 1,
    Int8 = 2,
    Int32 = 3,
}

impl BlobDataType {
    pub fn code(&self) -> u32 {
        *self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Float),
            1 => Some(Self::Half),
            2 => Some(Self::Int8),
            3 => Some(Self::Int32),
            _ => None,
        }
    }

    pub fn element_size(&self) -> usize {
        match self {
            Self::Float | Self::Int32 => 4,
            Self::Half => 2,
            Self::Int8 => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Half => "half",
            Self::Int8 => "int8",
            Self::Int32 => "int32",
        }
    }
}

/// Tipo destino pedido al escribir un tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstDataType {
    /// Según el tipo fuente: float32 → FLOAT, int64 → INT32
    #[default]
    Auto,
    Float,
    Half,
    Int32,
}

/// Tipo de elemento fuente de un payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadType {
    Float32,
    /// Lista int32 (codificaciones enteras estrechas): se ensancha a float
    Int32,
    Int64,
}

impl PayloadType {
    pub fn element_size(&self) -> usize {
        match self {
            Self::Float32 | Self::Int32 => 4,
            Self::Int64 => 8,
        }
    }
}

/// Payload transitorio: se produce desde un Tensor y se consume al escribir.
/// `bytes` es little-endian; None representa un buffer ausente.
#[derive(Debug, Clone)]
pub struct RawTensorPayload<'a> {
    pub name: &'a str,
    pub data_type: PayloadType,
    pub count: usize,
    pub dims: Vec<i32>,
    pub bytes: Option<Cow<'a, [u8]>>,
}

impl<'a> RawTensorPayload<'a> {
    /// Decodifica un initializer. raw_data y listas tipadas dan los mismos bytes.
    pub fn from_tensor(tensor: &'a Tensor) -> SerializeResult<Self> {
        let payload_type = match tensor.data_type {
            data_type::FLOAT => PayloadType::Float32,
            data_type::INT32 => PayloadType::Int32,
            data_type::INT64 => PayloadType::Int64,
            other => {
                return Err(SerializeError::UnsupportedDataType {
                    tensor: tensor.name.clone(),
                    data_type: other,
                })
            }
        };

        // raw_data debe contener elementos completos
        if let Some(raw) = &tensor.raw_data {
            let size = payload_type.element_size();
            if raw.len() % size != 0 {
                return Err(SerializeError::PayloadSizeMismatch {
                    expected: raw.len().div_ceil(size) * size,
                    actual: raw.len(),
                });
            }
        }

        let bytes = match &tensor.raw_data {
            Some(raw) => Some(Cow::Borrowed(raw.as_slice())),
            None => typed_bytes(tensor, payload_type).map(Cow::Owned),
        };

        Ok(Self {
            name: &tensor.name,
            data_type: payload_type,
            count: tensor.element_count(),
            dims: tensor.dims_i32()?,
            bytes,
        })
    }
}

fn typed_bytes(tensor: &Tensor, payload_type: PayloadType) -> Option<Vec<u8>> {
    match payload_type {
        PayloadType::Float32 if !tensor.float_data.is_empty() => {
            let mut buf = vec![0u8; tensor.float_data.len() * 4];
            LittleEndian::write_f32_into(&tensor.float_data, &mut buf);
            Some(buf)
        }
        PayloadType::Int32 if !tensor.int32_data.is_empty() => {
            let mut buf = vec![0u8; tensor.int32_data.len() * 4];
            LittleEndian::write_i32_into(&tensor.int32_data, &mut buf);
            Some(buf)
        }
        PayloadType::Int64 if !tensor.int64_data.is_empty() => {
            let mut buf = vec![0u8; tensor.int64_data.len() * 8];
            LittleEndian::write_i64_into(&tensor.int64_data, &mut buf);
            Some(buf)
        }
        _ => None,
    }
}

/// Colaborador externo: recibe cada payload ya convertido
pub trait BinaryWriter {
    fn put_raw(&mut self, data: &[u8], dims: &[i32], data_type: BlobDataType) -> std::io::Result<()>;
}

/// Payload tal como llegó al writer
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenPayload {
    pub data_type: BlobDataType,
    pub dims: Vec<i32>,
    pub bytes: Vec<u8>,
}

/// Writer en memoria (tests y conversión paralela de grafos)
#[derive(Debug, Default)]
pub struct MemoryWriter {
    pub payloads: Vec<WrittenPayload>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_bytes(&self) -> usize {
        self.payloads.iter().map(|p| p.bytes.len()).sum()
    }

    /// Reenvía los payloads acumulados a otro writer, en orden
    pub fn replay(&self, writer: &mut dyn BinaryWriter) -> std::io::Result<()> {
        for p in &self.payloads {
            writer.put_raw(&p.bytes, &p.dims, p.data_type)?;
        }
        Ok(())
    }
}

impl BinaryWriter for MemoryWriter {
    fn put_raw(&mut self, data: &[u8], dims: &[i32], data_type: BlobDataType) -> std::io::Result<()> {
        self.payloads.push(WrittenPayload {
            data_type,
            dims: dims.to_vec(),
            bytes: data.to_vec(),
        });
        Ok(())
    }
}
