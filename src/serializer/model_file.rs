// src/serializer/model_file.rs
// ============================================================================
// MODEL FILE - Writer/reader del stream binario .tnnmodel
// ============================================================================
//
// HEADER (40 bytes):
//   [0:4]   magic           u32 0xFABC0004
//   [4:8]   version         u32
//   [8:12]  payload_count   u32
//   [12:16] reserved        u32
//   [16:24] payload_bytes   u64 (tamaño de la región de records)
//   [24:32] digest          u64 (XXH3-64 de la región de records)
//   [32:36] header_crc      u32 (CRC32 de [0:32])
//   [36:40] reserved        u32
//
// RECORD (uno por put_raw):
//   tag u32 | ndims u32 | dims i32 × ndims | len u32 | bytes
//
// ============================================================================

use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use xxhash_rust::xxh3::{xxh3_64, Xxh3};

use super::{BinaryWriter, BlobDataType, WrittenPayload};

pub const MODEL_MAGIC: u32 = 0xFABC_0004;
pub const MODEL_VERSION: u32 = 1;
pub const MODEL_HEADER_SIZE: usize = 40;

/// Header del archivo .tnnmodel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelHeader {
    pub magic: u32,
    pub version: u32,
    pub payload_count: u32,
    pub payload_bytes: u64,
    pub digest: u64,
    pub header_crc: u32,
}

impl Default for ModelHeader {
    fn default() -> Self {
        Self {
            magic: MODEL_MAGIC,
            version: MODEL_VERSION,
            payload_count: 0,
            payload_bytes: 0,
            digest: 0,
            header_crc: 0,
        }
    }
}

impl ModelHeader {
    fn body_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32);
        buf.write_u32::<LittleEndian>(self.magic).unwrap();
        buf.write_u32::<LittleEndian>(self.version).unwrap();
        buf.write_u32::<LittleEndian>(self.payload_count).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u64::<LittleEndian>(self.payload_bytes).unwrap();
        buf.write_u64::<LittleEndian>(self.digest).unwrap();
        buf
    }

    /// CRC32 de los primeros 32 bytes
    pub fn compute_crc(&self) -> u32 {
        crc32fast::hash(&self.body_bytes())
    }

    /// Serializa a bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.body_bytes();
        buf.write_u32::<LittleEndian>(self.header_crc).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf
    }

    /// Deserializa desde bytes
    pub fn from_bytes(data: &[u8]) -> std::io::Result<Self> {
        let mut cursor = Cursor::new(data);
        let magic = cursor.read_u32::<LittleEndian>()?;
        let version = cursor.read_u32::<LittleEndian>()?;
        let payload_count = cursor.read_u32::<LittleEndian>()?;
        let _reserved = cursor.read_u32::<LittleEndian>()?;
        let payload_bytes = cursor.read_u64::<LittleEndian>()?;
        let digest = cursor.read_u64::<LittleEndian>()?;
        let header_crc = cursor.read_u32::<LittleEndian>()?;
        Ok(Self {
            magic,
            version,
            payload_count,
            payload_bytes,
            digest,
            header_crc,
        })
    }

    /// Valida el header
    pub fn validate(&self) -> Result<(), String> {
        if self.magic != MODEL_MAGIC {
            return Err(format!("Invalid magic: 0x{:08X}", self.magic));
        }
        if self.version != MODEL_VERSION {
            return Err(format!("Unsupported version: {}", self.version));
        }
        if self.header_crc != self.compute_crc() {
            return Err(format!("Header CRC mismatch: 0x{:08X}", self.header_crc));
        }
        Ok(())
    }
}

/// Writer de archivos .tnnmodel
pub struct TnnModelWriter {
    file: BufWriter<File>,
    header: ModelHeader,
    hasher: Xxh3,
}

impl TnnModelWriter {
    /// Crea el archivo y escribe un header placeholder
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Cannot create {}", path.as_ref().display()))?;
        let mut file = BufWriter::new(file);

        let header = ModelHeader::default();
        file.write_all(&header.to_bytes())?;

        Ok(Self {
            file,
            header,
            hasher: Xxh3::new(),
        })
    }

    pub fn payload_count(&self) -> u32 {
        self.header.payload_count
    }

    /// Reescribe el header con count, digest y CRC
    pub fn finalize(mut self) -> Result<ModelHeader> {
        self.header.digest = self.hasher.digest();
        self.header.header_crc = self.header.compute_crc();

        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.header.to_bytes())?;
        self.file.flush()?;

        Ok(self.header)
    }
}

fn encode_record(data: &[u8], dims: &[i32], data_type: BlobDataType) -> std::io::Result<Vec<u8>> {
    let len = u32::try_from(data.len()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "payload larger than 4 GiB")
    })?;

    let mut record = Vec::with_capacity(12 + dims.len() * 4 + data.len());
    record.write_u32::<LittleEndian>(data_type.code())?;
    record.write_u32::<LittleEndian>(dims.len() as u32)?;
    for &d in dims {
        record.write_i32::<LittleEndian>(d)?;
    }
    record.write_u32::<LittleEndian>(len)?;
    record.extend_from_slice(data);
    Ok(record)
}

impl BinaryWriter for TnnModelWriter {
    fn put_raw(&mut self, data: &[u8], dims: &[i32], data_type: BlobDataType) -> std::io::Result<()> {
        let record = encode_record(data, dims, data_type)?;
        self.file.write_all(&record)?;
        self.hasher.update(&record);
        self.header.payload_count += 1;
        self.header.payload_bytes += record.len() as u64;
        Ok(())
    }
}

/// Archivo .tnnmodel leído
#[derive(Debug)]
pub struct ModelFile {
    pub header: ModelHeader,
    pub payloads: Vec<WrittenPayload>,
}

/// Parsea un .tnnmodel completo desde bytes
pub fn parse_model_bytes(data: &[u8]) -> Result<ModelFile> {
    if data.len() < MODEL_HEADER_SIZE {
        bail!("File too small: {} bytes", data.len());
    }
    let header = ModelHeader::from_bytes(&data[..MODEL_HEADER_SIZE])?;
    header.validate().map_err(anyhow::Error::msg)?;

    let region = &data[MODEL_HEADER_SIZE..];
    if region.len() as u64 != header.payload_bytes {
        bail!(
            "Record region is {} bytes, header says {}",
            region.len(),
            header.payload_bytes
        );
    }
    if xxh3_64(region) != header.digest {
        bail!("Payload digest mismatch");
    }

    let mut cursor = Cursor::new(region);
    let mut payloads = Vec::with_capacity(header.payload_count as usize);
    for idx in 0..header.payload_count {
        let code = cursor.read_u32::<LittleEndian>()?;
        let data_type = BlobDataType::from_code(code)
            .with_context(|| format!("Record {}: unknown data type {}", idx, code))?;
        let ndims = cursor.read_u32::<LittleEndian>()? as usize;
        let mut dims = vec![0i32; ndims];
        cursor.read_i32_into::<LittleEndian>(&mut dims)?;
        let len = cursor.read_u32::<LittleEndian>()? as usize;
        let mut bytes = vec![0u8; len];
        cursor
            .read_exact(&mut bytes)
            .with_context(|| format!("Record {}: truncated payload", idx))?;
        payloads.push(WrittenPayload { data_type, dims, bytes });
    }

    Ok(ModelFile { header, payloads })
}

/// Lee un .tnnmodel desde archivo
pub fn read_model_file(path: impl AsRef<Path>) -> Result<ModelFile> {
    let data = std::fs::read(path.as_ref())
        .with_context(|| format!("Cannot open {}", path.as_ref().display()))?;
    parse_model_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bytes() {
        let mut header = ModelHeader {
            payload_count: 3,
            payload_bytes: 120,
            digest: 0xDEAD_BEEF,
            ..Default::default()
        };
        header.header_crc = header.compute_crc();

        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), MODEL_HEADER_SIZE);
        let parsed = ModelHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_header_crc_detects_tampering() {
        let mut header = ModelHeader::default();
        header.header_crc = header.compute_crc();
        header.payload_count = 9;
        assert!(header.validate().unwrap_err().contains("CRC"));
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.tnnmodel");

        let mut writer = TnnModelWriter::create(&path).unwrap();
        writer.put_raw(&[0, 0, 128, 63], &[1], BlobDataType::Float).unwrap();
        writer.put_raw(&[], &[0], BlobDataType::Half).unwrap();
        writer.put_raw(&[1, 0, 0, 0, 2, 0, 0, 0], &[2, 1], BlobDataType::Int32).unwrap();
        assert_eq!(writer.payload_count(), 3);
        let header = writer.finalize().unwrap();

        let file = read_model_file(&path).unwrap();
        assert_eq!(file.header, header);
        assert_eq!(file.payloads.len(), 3);
        assert_eq!(file.payloads[0].bytes, vec![0, 0, 128, 63]);
        assert!(file.payloads[1].bytes.is_empty());
        assert_eq!(file.payloads[1].data_type, BlobDataType::Half);
        assert_eq!(file.payloads[2].dims, vec![2, 1]);
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.tnnmodel");

        let mut writer = TnnModelWriter::create(&path).unwrap();
        writer.put_raw(&[1, 2, 3, 4], &[4], BlobDataType::Int8).unwrap();
        writer.finalize().unwrap();

        let mut data = std::fs::read(&path).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        let err = parse_model_bytes(&data).unwrap_err();
        assert!(err.to_string().contains("digest"));
    }

    #[test]
    fn test_too_small() {
        assert!(parse_model_bytes(&[0u8; 8]).is_err());
    }
}
