// src/bin/inspect.rs
// ============================================================================
// TNN MODEL INSPECTOR - Lista los payloads de un archivo .tnnmodel
// ============================================================================
//
// Uso: tnn-inspect modelo.tnnmodel [--values N]
//
// ============================================================================

use std::path::PathBuf;

use anyhow::Result;
use byteorder::{ByteOrder, LittleEndian};
use clap::Parser;
use half::f16;

use onnx2tnn::serializer::{read_model_file, BlobDataType};

#[derive(Parser)]
#[command(name = "tnn-inspect")]
#[command(about = "Inspect TNN model payload records")]
struct Args {
    /// .tnnmodel file to inspect
    file: PathBuf,

    /// Print the first N values of each payload
    #[arg(long, default_value_t = 0)]
    values: usize,
}

/// Primeros `n` valores de un payload como texto
fn preview(data_type: BlobDataType, bytes: &[u8], n: usize) -> String {
    let count = (bytes.len() / data_type.element_size()).min(n);
    let values: Vec<String> = (0..count)
        .map(|i| match data_type {
            BlobDataType::Float => LittleEndian::read_f32(&bytes[i * 4..]).to_string(),
            BlobDataType::Half => f16::from_bits(LittleEndian::read_u16(&bytes[i * 2..])).to_string(),
            BlobDataType::Int32 => LittleEndian::read_i32(&bytes[i * 4..]).to_string(),
            BlobDataType::Int8 => (bytes[i] as i8).to_string(),
        })
        .collect();
    values.join(" ")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let model = read_model_file(&args.file)?;
    let header = &model.header;

    println!("═══════════════════════════════════════════════════════════════");
    println!("  TNN MODEL: {}", args.file.display());
    println!("═══════════════════════════════════════════════════════════════");
    println!("  Magic:    0x{:08X}", header.magic);
    println!("  Version:  {}", header.version);
    println!("  Payloads: {}", header.payload_count);
    println!("  Bytes:    {}", header.payload_bytes);
    println!("  Digest:   0x{:016X} ✓", header.digest);
    println!("  CRC:      0x{:08X} ✓", header.header_crc);
    println!("═══════════════════════════════════════════════════════════════");

    for (idx, payload) in model.payloads.iter().enumerate() {
        let dims: Vec<String> = payload.dims.iter().map(|d| d.to_string()).collect();
        println!(
            "  [{:>4}] {:<6} [{}] {} bytes",
            idx,
            payload.data_type.name(),
            dims.join(", "),
            payload.bytes.len()
        );
        if args.values > 0 {
            println!("         {}", preview(payload.data_type, &payload.bytes, args.values));
        }
    }

    Ok(())
}
