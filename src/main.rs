// src/main.rs
// ============================================================================
// ONNX2TNN CLI
// ============================================================================
//
// Uso:
//   onnx2tnn model.json -o out/model
//   onnx2tnn model.json -o out/model --half --skip-unsupported -v
//   onnx2tnn --list-ops
//
// Escribe out/model.tnnproto y out/model.tnnmodel
//
// ============================================================================

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use onnx2tnn::{
    builder::{convert_graph, ConvertOptions, UnsupportedPolicy},
    graph::load_graph,
    registry::ConverterRegistry,
    serializer::{DstDataType, MemoryWriter, TnnModelWriter},
};

#[derive(Parser, Debug)]
#[command(name = "onnx2tnn")]
#[command(about = "Convert an ONNX graph description to TNN proto + model files")]
#[command(version = "0.1.0")]
struct Args {
    /// Graph description (JSON)
    #[arg(value_name = "GRAPH", required_unless_present = "list_ops")]
    graph: Option<PathBuf>,

    /// Output prefix (<prefix>.tnnproto / <prefix>.tnnmodel)
    #[arg(short, long, required_unless_present = "list_ops")]
    output: Option<PathBuf>,

    /// List supported ONNX operators and exit
    #[arg(long)]
    list_ops: bool,

    /// Store float weights as half precision
    #[arg(long)]
    half: bool,

    /// Skip operators without a converter instead of aborting
    #[arg(long)]
    skip_unsupported: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = prefix.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let registry = ConverterRegistry::shared();
    if args.list_ops {
        for op in registry.op_types() {
            println!("{}", op);
        }
        return Ok(());
    }
    let (Some(graph_path), Some(output)) = (args.graph, args.output) else {
        anyhow::bail!("GRAPH and --output are required");
    };

    let start = Instant::now();

    let options = ConvertOptions {
        weight_data_type: if args.half { DstDataType::Half } else { DstDataType::Auto },
        on_unsupported: if args.skip_unsupported {
            UnsupportedPolicy::Skip
        } else {
            UnsupportedPolicy::Abort
        },
        verbose: args.verbose,
    };

    let proto_path = with_suffix(&output, ".tnnproto");
    let model_path = with_suffix(&output, ".tnnmodel");

    println!("═══════════════════════════════════════════════════════════════");
    println!("  ONNX2TNN v0.1.0");
    println!("═══════════════════════════════════════════════════════════════");
    println!("  Graph:       {}", graph_path.display());
    println!("  Weights:     {}", if args.half { "half" } else { "float" });
    println!("  Unsupported: {}", if args.skip_unsupported { "skip" } else { "abort" });
    println!("  Output:      {}", output.display());
    println!("═══════════════════════════════════════════════════════════════");

    let graph = load_graph(&graph_path)?;
    println!("\n[GRAPH] '{}': {} nodes, {} initializers", graph.name, graph.nodes.len(), graph.initializers.len());

    // ══════════════════════════════════════════════════════════════════════
    // CONVERT
    // ══════════════════════════════════════════════════════════════════════

    // Los payloads se acumulan en memoria: si la conversión falla no queda
    // un .tnnmodel a medias en disco.
    let mut payloads = MemoryWriter::new();
    let model = convert_graph(&graph, registry, &mut payloads, &options)
        .with_context(|| format!("Failed to convert {}", graph_path.display()))?;

    // ══════════════════════════════════════════════════════════════════════
    // FINALIZE
    // ══════════════════════════════════════════════════════════════════════

    println!("\n[FINALIZE] Writing model + proto...");
    let mut writer = TnnModelWriter::create(&model_path)?;
    payloads
        .replay(&mut writer)
        .with_context(|| format!("Failed to write {}", model_path.display()))?;
    let header = writer.finalize()?;
    model.proto.write_to(&proto_path)?;
    println!("  ✓ {} payloads, {} bytes", header.payload_count, header.payload_bytes);

    let elapsed = start.elapsed();
    println!("\n═══════════════════════════════════════════════════════════════");
    println!("  CONVERSION COMPLETE");
    println!("═══════════════════════════════════════════════════════════════");
    println!("  Time:     {:.2}s", elapsed.as_secs_f64());
    println!(
        "  Layers:   {} ({} with payload)",
        model.stats.layers, model.stats.payload_layers
    );
    println!("  Skipped:  {}", model.stats.skipped);
    println!("  Proto:    {}", proto_path.display());
    println!("  Model:    {}", model_path.display());
    println!("═══════════════════════════════════════════════════════════════");

    Ok(())
}
