// src/registry/mod.rs
// ============================================================================
// CONVERTER REGISTRY - op_type ONNX → converter
// ============================================================================
//
// Se construye una vez y después es de solo lectura. Un op_type se registra
// una única vez: el segundo intento falla y el primero se conserva.
//
// La instancia compartida (shared) se inicializa con LazyLock: una sola
// construcción aunque varios hilos la pidan a la vez.
//
// ============================================================================

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::converter::ops::{
    AxesConverter, BinaryConverter, ClipConverter, ConstantConverter, ConvConverter,
    ReshapeConverter, UnaryConverter,
};
use crate::converter::OpConverter;
use crate::error::RegistryError;

/// Activaciones sin parámetros: (op ONNX, op TNN)
const UNARY_OPS: &[(&str, &str)] = &[
    ("Relu", "ReLU"),
    ("Sigmoid", "Sigmoid"),
    ("Tanh", "TanH"),
    ("Abs", "Abs"),
    ("Exp", "Exp"),
    ("Log", "Log"),
    ("Sqrt", "Sqrt"),
    ("Neg", "Neg"),
    ("Softplus", "Softplus"),
    ("Erf", "Erf"),
];

/// Binarios con broadcast: (op ONNX, op TNN)
const BINARY_OPS: &[(&str, &str)] = &[
    ("Add", "Add"),
    ("Sub", "Sub"),
    ("Mul", "Mul"),
    ("Div", "Div"),
    ("Max", "Maximum"),
    ("Min", "Minimum"),
];

static SHARED: LazyLock<ConverterRegistry> = LazyLock::new(|| {
    build_default_registry().expect("default converter table registers an op type twice")
});

#[derive(Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn OpConverter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registro global con los converters por defecto
    pub fn shared() -> &'static ConverterRegistry {
        &SHARED
    }

    pub fn register(
        &mut self,
        op_type: impl Into<String>,
        converter: Arc<dyn OpConverter>,
    ) -> Result<(), RegistryError> {
        let op_type = op_type.into();
        if self.converters.contains_key(&op_type) {
            return Err(RegistryError::DuplicateRegistration(op_type));
        }
        self.converters.insert(op_type, converter);
        Ok(())
    }

    pub fn lookup(&self, op_type: &str) -> Option<Arc<dyn OpConverter>> {
        self.converters.get(op_type).cloned()
    }

    pub fn contains(&self, op_type: &str) -> bool {
        self.converters.contains_key(op_type)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// op_types registrados, ordenados
    pub fn op_types(&self) -> Vec<&str> {
        let mut ops: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        ops.sort_unstable();
        ops
    }
}

/// Registro con todos los converters incluidos en el crate
pub fn build_default_registry() -> Result<ConverterRegistry, RegistryError> {
    let mut registry = ConverterRegistry::new();

    registry.register("Unsqueeze", Arc::new(AxesConverter::unsqueeze()))?;
    registry.register("Squeeze", Arc::new(AxesConverter::squeeze()))?;
    registry.register("Reshape", Arc::new(ReshapeConverter))?;
    registry.register("Clip", Arc::new(ClipConverter))?;
    registry.register("Conv", Arc::new(ConvConverter))?;
    registry.register("Constant", Arc::new(ConstantConverter))?;

    for (onnx, tnn) in UNARY_OPS {
        registry.register(*onnx, Arc::new(UnaryConverter::new(*tnn)))?;
    }
    for (onnx, tnn) in BINARY_OPS {
        registry.register(*onnx, Arc::new(BinaryConverter::new(*tnn)))?;
    }

    Ok(registry)
}
