// src/serializer/tensor.rs
// ============================================================================
// TENSOR WRITER - Escribe un tensor con cast de tipo
// ============================================================================
//
// Rutas soportadas (fuente, destino) → tag escrito:
//   float32 + Auto/Float  → FLOAT (bytes tal cual)
//   float32 + Half        → HALF  (f32 → f16 por elemento)
//   int32   + Auto/Float  → FLOAT (ensanchado a f32)
//   int32   + Half        → HALF  (ensanchado y luego f16)
//   int64   + Auto/Int32  → INT32 (downcast saturante)
// Cualquier otra combinación es UnsupportedCast.
//
// ============================================================================

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use crate::cast::{f32_slice_to_f16_bytes, i32_to_f32, i64_slice_to_i32_saturating};
use crate::error::{SerializeError, SerializeResult};
use crate::graph::Tensor;

use super::{BinaryWriter, BlobDataType, DstDataType, PayloadType, RawTensorPayload};

/// Escribe un payload a través del writer
pub fn write_tensor(
    payload: &RawTensorPayload<'_>,
    writer: &mut dyn BinaryWriter,
    dst: DstDataType,
) -> SerializeResult<()> {
    let count = payload.count;
    debug!(
        "tensor ({}) data type: {:?} item_size: {}",
        payload.name, payload.data_type, count
    );

    if payload.dims.is_empty() && count != 1 {
        return Err(SerializeError::InvalidTensorShape { count });
    }

    // Buffer ausente solo vale para tensores vacíos
    let bytes: &[u8] = match &payload.bytes {
        Some(b) => b.as_ref(),
        None if count > 0 => return Err(SerializeError::NullPayload { count }),
        None => &[],
    };

    let expected = count * payload.data_type.element_size();
    if bytes.len() < expected {
        return Err(SerializeError::PayloadSizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    let bytes = &bytes[..expected];
    let dims = payload.dims.as_slice();

    match (payload.data_type, dst) {
        (PayloadType::Float32, DstDataType::Auto | DstDataType::Float) => {
            writer.put_raw(bytes, dims, BlobDataType::Float)?;
        }
        (PayloadType::Float32, DstDataType::Half) => {
            if count == 0 {
                writer.put_raw(&[], dims, BlobDataType::Half)?;
            } else {
                let mut floats = vec![0f32; count];
                LittleEndian::read_f32_into(bytes, &mut floats);
                writer.put_raw(&f32_slice_to_f16_bytes(&floats), dims, BlobDataType::Half)?;
            }
        }
        (PayloadType::Int32, DstDataType::Auto | DstDataType::Float | DstDataType::Half) => {
            let mut ints = vec![0i32; count];
            LittleEndian::read_i32_into(bytes, &mut ints);
            let floats: Vec<f32> = ints.into_iter().map(i32_to_f32).collect();
            if dst == DstDataType::Half {
                writer.put_raw(&f32_slice_to_f16_bytes(&floats), dims, BlobDataType::Half)?;
            } else {
                let mut out = vec![0u8; count * 4];
                LittleEndian::write_f32_into(&floats, &mut out);
                writer.put_raw(&out, dims, BlobDataType::Float)?;
            }
        }
        (PayloadType::Int64, DstDataType::Auto | DstDataType::Int32) => {
            if count == 0 {
                writer.put_raw(&[], dims, BlobDataType::Int32)?;
            } else {
                let mut wide = vec![0i64; count];
                LittleEndian::read_i64_into(bytes, &mut wide);
                let narrow = i64_slice_to_i32_saturating(&wide);
                let mut out = vec![0u8; count * 4];
                LittleEndian::write_i32_into(&narrow, &mut out);
                writer.put_raw(&out, dims, BlobDataType::Int32)?;
            }
        }
        (src, dst) => return Err(SerializeError::UnsupportedCast { src, dst }),
    }

    Ok(())
}

/// Decodifica un initializer y lo escribe
pub fn write_initializer(
    tensor: &Tensor,
    writer: &mut dyn BinaryWriter,
    dst: DstDataType,
) -> SerializeResult<()> {
    let payload = RawTensorPayload::from_tensor(tensor)?;
    write_tensor(&payload, writer, dst)
}

/// Escribe un tensor int64 como INT32 saturado (índices, shapes).
/// Un tensor vacío es error: estos parámetros siempre llevan valores.
pub fn write_int_tensor(tensor: &Tensor, writer: &mut dyn BinaryWriter) -> SerializeResult<()> {
    let payload = RawTensorPayload::from_tensor(tensor)?;
    if payload.data_type != PayloadType::Int64 {
        return Err(SerializeError::UnsupportedCast {
            src: payload.data_type,
            dst: DstDataType::Int32,
        });
    }
    if payload.count == 0 {
        return Err(SerializeError::EmptyTensor(tensor.name.clone()));
    }
    write_tensor(&payload, writer, DstDataType::Int32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::data_type;
    use crate::serializer::MemoryWriter;
    use std::borrow::Cow;

    fn i32s(bytes: &[u8]) -> Vec<i32> {
        let mut out = vec![0i32; bytes.len() / 4];
        LittleEndian::read_i32_into(bytes, &mut out);
        out
    }

    fn f32s(bytes: &[u8]) -> Vec<f32> {
        let mut out = vec![0f32; bytes.len() / 4];
        LittleEndian::read_f32_into(bytes, &mut out);
        out
    }

    #[test]
    fn test_float_verbatim() {
        let t = Tensor::from_f32("w", vec![3], vec![0.1, 0.2, 0.3]);
        let mut w = MemoryWriter::new();
        write_initializer(&t, &mut w, DstDataType::Auto).unwrap();
        write_initializer(&t, &mut w, DstDataType::Float).unwrap();

        for p in &w.payloads {
            assert_eq!(p.data_type, BlobDataType::Float);
            assert_eq!(p.dims, vec![3]);
            assert_eq!(f32s(&p.bytes), vec![0.1, 0.2, 0.3]);
        }
    }

    #[test]
    fn test_float_to_half() {
        let t = Tensor::from_f32("w", vec![2, 1], vec![1.0, -0.5]);
        let mut w = MemoryWriter::new();
        write_initializer(&t, &mut w, DstDataType::Half).unwrap();

        let p = &w.payloads[0];
        assert_eq!(p.data_type, BlobDataType::Half);
        assert_eq!(p.bytes.len(), 4);
        assert_eq!(half::f16::from_le_bytes([p.bytes[0], p.bytes[1]]).to_f32(), 1.0);
        assert_eq!(half::f16::from_le_bytes([p.bytes[2], p.bytes[3]]).to_f32(), -0.5);
    }

    #[test]
    fn test_empty_tensors_write_zero_length() {
        let empty_f = Tensor { name: "f".into(), data_type: data_type::FLOAT, dims: vec![0], ..Default::default() };
        let empty_i = Tensor { name: "i".into(), data_type: data_type::INT64, dims: vec![0], ..Default::default() };
        let mut w = MemoryWriter::new();
        write_initializer(&empty_f, &mut w, DstDataType::Half).unwrap();
        write_initializer(&empty_f, &mut w, DstDataType::Auto).unwrap();
        write_initializer(&empty_i, &mut w, DstDataType::Auto).unwrap();

        assert_eq!(w.payloads.len(), 3);
        assert_eq!(w.payloads[0].data_type, BlobDataType::Half);
        assert_eq!(w.payloads[1].data_type, BlobDataType::Float);
        assert_eq!(w.payloads[2].data_type, BlobDataType::Int32);
        assert!(w.payloads.iter().all(|p| p.bytes.is_empty()));
    }

    #[test]
    fn test_int64_saturates() {
        let t = Tensor::from_i64("shape", vec![2], vec![5_000_000_000, -1]);
        let mut w = MemoryWriter::new();
        write_initializer(&t, &mut w, DstDataType::Auto).unwrap();
        write_int_tensor(&t, &mut w).unwrap();

        for p in &w.payloads {
            assert_eq!(p.data_type, BlobDataType::Int32);
            assert_eq!(i32s(&p.bytes), vec![2147483647, -1]);
        }
    }

    #[test]
    fn test_int64_min_saturates() {
        let t = Tensor::from_i64("s", vec![1], vec![i64::MIN]);
        let mut w = MemoryWriter::new();
        write_initializer(&t, &mut w, DstDataType::Int32).unwrap();
        assert_eq!(i32s(&w.payloads[0].bytes), vec![i32::MIN]);
    }

    #[test]
    fn test_int32_list_widens_to_float() {
        let t = Tensor::from_i32("q", vec![3], vec![-3, 0, 16_777_217]);
        let mut w = MemoryWriter::new();
        write_initializer(&t, &mut w, DstDataType::Auto).unwrap();

        let p = &w.payloads[0];
        assert_eq!(p.data_type, BlobDataType::Float);
        assert_eq!(f32s(&p.bytes), vec![-3.0, 0.0, 16_777_216.0]);
    }

    #[test]
    fn test_int32_list_to_half() {
        let t = Tensor::from_i32("q", vec![3], vec![-3, 0, 2049]);
        let mut w = MemoryWriter::new();
        write_initializer(&t, &mut w, DstDataType::Half).unwrap();

        let p = &w.payloads[0];
        assert_eq!(p.data_type, BlobDataType::Half);
        assert_eq!(p.dims, vec![3]);
        assert_eq!(p.bytes.len(), 3 * 2);
        let halves: Vec<f32> = p
            .bytes
            .chunks_exact(2)
            .map(|b| half::f16::from_le_bytes([b[0], b[1]]).to_f32())
            .collect();
        // 2049 no es representable en f16: ties-to-even baja a 2048
        assert_eq!(halves, vec![-3.0, 0.0, 2048.0]);
    }

    #[test]
    fn test_unsupported_casts() {
        let f = Tensor::from_f32("f", vec![1], vec![1.0]);
        let i = Tensor::from_i64("i", vec![1], vec![1]);
        let q = Tensor::from_i32("q", vec![1], vec![1]);
        let mut w = MemoryWriter::new();

        let cases = [
            (&f, DstDataType::Int32),
            (&i, DstDataType::Float),
            (&i, DstDataType::Half),
            (&q, DstDataType::Int32),
        ];
        for (tensor, dst) in cases {
            let err = write_initializer(tensor, &mut w, dst).unwrap_err();
            assert!(matches!(err, SerializeError::UnsupportedCast { .. }), "{:?}", dst);
        }
        assert!(w.payloads.is_empty());
    }

    #[test]
    fn test_int_tensor_rejects_empty() {
        let empty = Tensor { name: "idx".into(), data_type: data_type::INT64, dims: vec![0], ..Default::default() };
        let mut w = MemoryWriter::new();
        assert!(matches!(
            write_int_tensor(&empty, &mut w),
            Err(SerializeError::EmptyTensor(ref name)) if name == "idx"
        ));
        assert!(w.payloads.is_empty());
    }

    #[test]
    fn test_int_tensor_rejects_float() {
        let f = Tensor::from_f32("f", vec![1], vec![1.0]);
        let mut w = MemoryWriter::new();
        assert!(matches!(
            write_int_tensor(&f, &mut w),
            Err(SerializeError::UnsupportedCast { src: PayloadType::Float32, .. })
        ));
    }

    #[test]
    fn test_scalar_shape_rules() {
        let mut w = MemoryWriter::new();

        // Escalar: dims vacíos con 1 elemento es válido
        let scalar = Tensor::from_f32("s", vec![], vec![3.0]);
        write_initializer(&scalar, &mut w, DstDataType::Auto).unwrap();
        assert!(w.payloads[0].dims.is_empty());

        let bad = Tensor::from_f32("b", vec![], vec![1.0, 2.0]);
        assert!(matches!(
            write_initializer(&bad, &mut w, DstDataType::Auto),
            Err(SerializeError::InvalidTensorShape { count: 2 })
        ));
    }

    #[test]
    fn test_null_payload() {
        let mut w = MemoryWriter::new();
        let payload = RawTensorPayload {
            name: "n",
            data_type: PayloadType::Float32,
            count: 4,
            dims: vec![4],
            bytes: None,
        };
        assert!(matches!(
            write_tensor(&payload, &mut w, DstDataType::Auto),
            Err(SerializeError::NullPayload { count: 4 })
        ));

        let empty = RawTensorPayload { count: 0, dims: vec![0], ..payload };
        write_tensor(&empty, &mut w, DstDataType::Auto).unwrap();
        assert_eq!(w.payloads.len(), 1);
    }

    #[test]
    fn test_short_buffer() {
        let mut w = MemoryWriter::new();
        let payload = RawTensorPayload {
            name: "short",
            data_type: PayloadType::Int64,
            count: 2,
            dims: vec![2],
            bytes: Some(Cow::Owned(vec![0u8; 12])),
        };
        assert!(matches!(
            write_tensor(&payload, &mut w, DstDataType::Auto),
            Err(SerializeError::PayloadSizeMismatch { expected: 16, actual: 12 })
        ));
    }
}
