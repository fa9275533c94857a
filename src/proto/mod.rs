// src/proto/mod.rs
// ============================================================================
// PROTO - Ensamblado del descriptor de texto .tnnproto
// ============================================================================
//
// Cada línea va entre comillas y termina en ",":
//
//   "1 <nInputs> 1 4206624770 ,"
//   "<input> <ndims> <d0> … : <input2> … ,"
//   "<blob0> <blob1> … ,"
//   "<output0> <output1> … ,"
//   " <nLayers> ,"
//   "<layer line>,"        (una por capa, en orden)
//
// ============================================================================

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::converter::ConvertedLayer;
use crate::graph::ValueInfo;

pub const PROTO_MAGIC: u32 = 4_206_624_770;

/// Descriptor de texto del modelo completo
#[derive(Debug, Clone, Default)]
pub struct ProtoBuilder {
    inputs: Vec<ValueInfo>,
    outputs: Vec<String>,
    layers: Vec<String>,
    blobs: Vec<String>,
    seen: HashSet<String>,
}

impl ProtoBuilder {
    pub fn new(inputs: &[ValueInfo], outputs: &[String]) -> Self {
        let mut builder = Self {
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
            ..Default::default()
        };
        for input in inputs {
            builder.add_blob(&input.name);
        }
        builder
    }

    fn add_blob(&mut self, name: &str) {
        if self.seen.insert(name.to_string()) {
            self.blobs.push(name.to_string());
        }
    }

    /// Añade una capa convertida y registra sus blobs
    pub fn push_layer(&mut self, layer: &ConvertedLayer) {
        for name in layer.inputs.iter().chain(layer.outputs.iter()) {
            self.add_blob(name);
        }
        self.layers.push(layer.text_line.clone());
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Blobs en orden de primera aparición
    pub fn blobs(&self) -> &[String] {
        &self.blobs
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "\"1 {} 1 {} ,\"", self.inputs.len(), PROTO_MAGIC);

        let shapes: Vec<String> = self
            .inputs
            .iter()
            .map(|input| {
                let mut s = format!("{} {}", input.name, input.dims.len());
                for d in &input.dims {
                    let _ = write!(s, " {}", d);
                }
                s
            })
            .collect();
        let _ = writeln!(out, "\"{} ,\"", shapes.join(" : "));

        let _ = writeln!(out, "\"{} ,\"", self.blobs.join(" "));
        let _ = writeln!(out, "\"{} ,\"", self.outputs.join(" "));
        let _ = writeln!(out, "\" {} ,\"", self.layers.len());

        for line in &self.layers {
            let _ = writeln!(out, "\"{},\"", line);
        }
        out
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
