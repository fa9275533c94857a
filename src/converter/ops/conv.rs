// src/converter/ops/conv.rs
// ============================================================================
// CONV - Conv 2D → Convolution
// ============================================================================
//
// Params (en orden):
//   group in_c out_c kh kw sh sw ph pw has_bias pad_type dh dw activation
//
// Payload: filtro [out_c, in_c/group, kh, kw] y, si existe, el bias [out_c].
// El filtro se escribe siempre, aunque una capa Const lo haya materializado
// y quede además como arista: la capa Convolution de TNN lee sus pesos del
// recurso binario, no de la entrada.
//
// ============================================================================

use crate::converter::{OpConverter, ParamText, PayloadStatus};
use crate::error::{ConvertError, ConvertResult, SerializeError, SerializeResult};
use crate::graph::{ConvertContext, GraphNode, Tensor};
use crate::serializer::{write_initializer, BinaryWriter, DstDataType};

use super::{payload_dst, payload_weight};

pub struct ConvConverter;

/// auto_pad ONNX → pad_type TNN (-1 explícito, 0 SAME, 1 VALID)
fn pad_type(auto_pad: Option<&str>) -> i32 {
    match auto_pad {
        Some("SAME_UPPER") | Some("SAME_LOWER") => 0,
        Some("VALID") => 1,
        _ => -1,
    }
}

/// Par de enteros (h, w) de un atributo lista, con default
fn pair(node: &GraphNode, attr: &str, default: i64) -> (i64, i64) {
    match node.attr_ints(attr) {
        Some([h, w, ..]) => (*h, *w),
        Some([v]) => (*v, *v),
        _ => (default, default),
    }
}

impl ConvConverter {
    fn filter<'a>(node: &GraphNode, ctx: &'a ConvertContext) -> ConvertResult<&'a Tensor> {
        let name = node.input(1).unwrap_or_default();
        ctx.weight(name, node.descriptor_name().unwrap_or_default(), &node.op_type)
    }
}

impl OpConverter for ConvConverter {
    fn target_op_type(&self, _node: &GraphNode, _ctx: &ConvertContext) -> String {
        "Convolution".to_string()
    }

    fn has_learned_parameters(&self, _node: &GraphNode, _ctx: &ConvertContext) -> bool {
        true
    }

    fn encode_text_parameters(&self, node: &GraphNode, ctx: &ConvertContext) -> ConvertResult<String> {
        let filter = Self::filter(node, ctx)?;
        if filter.dims.len() != 4 {
            return Err(ConvertError::serialize(
                node.descriptor_name().unwrap_or_default(),
                &node.op_type,
                SerializeError::InvalidTensorShape {
                    count: filter.element_count(),
                },
            ));
        }

        let group = node.attr_i_or("group", 1);
        let in_c = (group > 0)
            .then(|| filter.dims[1].checked_mul(group))
            .flatten()
            .ok_or_else(|| ConvertError::InvalidAttribute {
                node: node.descriptor_name().unwrap_or_default().to_string(),
                op_type: node.op_type.clone(),
                attribute: "group".to_string(),
                value: group,
            })?;
        let out_c = filter.dims[0];
        let (kh, kw) = match node.attr_ints("kernel_shape") {
            Some([h, w, ..]) => (*h, *w),
            _ => (filter.dims[2], filter.dims[3]),
        };
        let (sh, sw) = pair(node, "strides", 1);
        let (dh, dw) = pair(node, "dilations", 1);
        // pads ONNX: [h_begin, w_begin, h_end, w_end]
        let (ph, pw) = pair(node, "pads", 0);
        let has_bias = node.input(2).is_some();

        let mut params = ParamText::new();
        params
            .push(group)
            .push(in_c)
            .push(out_c)
            .push(kh)
            .push(kw)
            .push(sh)
            .push(sw)
            .push(ph)
            .push(pw)
            .push(has_bias as i32)
            .push(pad_type(node.attr_s("auto_pad")))
            .push(dh)
            .push(dw)
            .push(0);
        Ok(params.finish())
    }

    fn write_binary_payload(
        &self,
        node: &GraphNode,
        ctx: &ConvertContext,
        writer: &mut dyn BinaryWriter,
    ) -> SerializeResult<PayloadStatus> {
        let filter = payload_weight(ctx, node.input(1).unwrap_or_default())?;
        write_initializer(filter, writer, payload_dst(filter, ctx))?;

        if let Some(bias_name) = node.input(2) {
            // El bias se guarda siempre en su precisión original
            let bias = payload_weight(ctx, bias_name)?;
            write_initializer(bias, writer, DstDataType::Auto)?;
        }
        Ok(PayloadStatus::Wrote)
    }
}
