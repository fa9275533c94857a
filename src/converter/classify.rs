// src/converter/classify.rs
// ============================================================================
// CLASSIFY - Qué nombres de tensor son aristas del grafo y cuáles se pliegan
// ============================================================================
//
// Un peso que solo parametriza al operador (shape de un Reshape, ejes...) no
// aparece como arista en TNN. Un peso consumido como valor en runtime (única
// entrada de un op unario, o acompañado de otra entrada dinámica) sí.
//
// ============================================================================

use crate::graph::{GraphNode, UsedConstSet, WeightTable};

/// Lista ordenada de entradas que quedan como aristas del grafo destino
pub fn classify_inputs(
    node: &GraphNode,
    weights: &WeightTable,
    used_const: &UsedConstSet,
    has_learned_parameters: bool,
) -> Vec<String> {
    let input_count = node.inputs.len();

    let has_other_variable_input = node
        .inputs
        .iter()
        .skip(1)
        .any(|name| !name.is_empty() && !weights.contains(name));

    let mut inputs = Vec::with_capacity(input_count);
    for (idx, name) in node.inputs.iter().enumerate() {
        // Input opcional omitido
        if name.is_empty() {
            continue;
        }

        let is_weight = weights.contains(name);
        if has_learned_parameters {
            // El peso va embebido en el payload del operador
            if is_weight && !used_const.contains(name) {
                continue;
            }
        } else if !(idx == 0 && input_count == 1) && !has_other_variable_input && is_weight {
            continue;
        }

        inputs.push(name.clone());
    }

    inputs
}

/// Salidas: copia directa de las del nodo
pub fn output_names(node: &GraphNode) -> Vec<String> {
    node.outputs.clone()
}
