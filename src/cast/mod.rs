// src/cast/mod.rs
// ============================================================================
// CAST - Conversiones numéricas para payloads de pesos
// ============================================================================
//
// Funciones puras:
//   i64 → i32   saturante (NUNCA wrap: i64::MAX no puede acabar en -1)
//   f32 → f16   round-to-nearest-even (binary16)
//   i32/i64 → f32  ensanchamiento con redondeo nativo
//
// ============================================================================

use half::f16;

/// Downcast saturante: fuera de rango se clampa a i32::MIN / i32::MAX
#[inline]
pub fn saturating_i64_to_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[inline]
pub fn f32_to_f16(v: f32) -> f16 {
    f16::from_f32(v)
}

#[inline]
pub fn i32_to_f32(v: i32) -> f32 {
    v as f32
}

#[inline]
pub fn i64_to_f32(v: i64) -> f32 {
    v as f32
}

/// Convierte un slice f32 a bytes f16 little-endian
pub fn f32_slice_to_f16_bytes(data: &[f32]) -> Vec<u8> {
    data.iter()
        .flat_map(|&x| f32_to_f16(x).to_le_bytes())
        .collect()
}

/// Downcast saturante elemento a elemento
pub fn i64_slice_to_i32_saturating(data: &[i64]) -> Vec<i32> {
    data.iter().map(|&v| saturating_i64_to_i32(v)).collect()
}
