//! sRGB transfer functions (IEC 61966-2-1).
//!
//! The piecewise curve has a linear toe below the breakpoint and a 2.4
//! exponent above it. Slice variants run 8 lanes at a time; `wide` has no
//! vector `powf`, so the power is composed as `exp(ln(v) * e)` with lanes
//! clamped away from zero before the log.

use wide::{CmpLe, f32x8};

/// Linear-light to sRGB-encoded, one sample.
pub fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// sRGB-encoded to linear-light, one sample.
pub fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn powf_x8(v: f32x8, e: f32) -> f32x8 {
    // ln is undefined at or below zero; those lanes take the toe branch,
    // but clamp anyway so no NaN is ever formed.
    let safe = v.max(f32x8::splat(1e-10));
    (safe.ln() * f32x8::splat(e)).exp()
}

/// Linear-light to sRGB-encoded, whole slice in place.
pub fn linear_to_srgb_slice(samples: &mut [f32]) {
    let mut chunks = samples.chunks_exact_mut(8);
    for chunk in &mut chunks {
        let v = f32x8::from(<[f32; 8]>::try_from(&*chunk).unwrap());
        let toe = v * f32x8::splat(12.92);
        let body = f32x8::splat(1.055) * powf_x8(v, 1.0 / 2.4) - f32x8::splat(0.055);
        let mask = v.cmp_le(f32x8::splat(0.003_130_8));
        chunk.copy_from_slice(&mask.blend(toe, body).to_array());
    }
    for sample in chunks.into_remainder() {
        *sample = linear_to_srgb(*sample);
    }
}

/// sRGB-encoded to linear-light, whole slice in place.
pub fn srgb_to_linear_slice(samples: &mut [f32]) {
    let mut chunks = samples.chunks_exact_mut(8);
    for chunk in &mut chunks {
        let v = f32x8::from(<[f32; 8]>::try_from(&*chunk).unwrap());
        let toe = v / f32x8::splat(12.92);
        let shifted = (v + f32x8::splat(0.055)) / f32x8::splat(1.055);
        let body = powf_x8(shifted, 2.4);
        let mask = v.cmp_le(f32x8::splat(0.04045));
        chunk.copy_from_slice(&mask.blend(toe, body).to_array());
    }
    for sample in chunks.into_remainder() {
        *sample = srgb_to_linear(*sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn known_values() {
        assert_relative_eq!(linear_to_srgb(0.0), 0.0);
        assert_relative_eq!(linear_to_srgb(1.0), 1.0, epsilon = 1e-6);
        assert_relative_eq!(linear_to_srgb(0.5), 0.735357, epsilon = 1e-3);
        assert_relative_eq!(srgb_to_linear(0.5), 0.214041, epsilon = 1e-3);
    }

    #[test]
    fn round_trip() {
        for i in 0..=100 {
            let v = i as f32 / 100.0;
            assert_relative_eq!(srgb_to_linear(linear_to_srgb(v)), v, epsilon = 1e-5);
        }
    }

    #[test]
    fn toe_is_linear() {
        assert_relative_eq!(linear_to_srgb(0.002), 0.002 * 12.92);
        assert_relative_eq!(srgb_to_linear(0.03), 0.03 / 12.92);
    }

    #[test]
    fn slice_matches_scalar_encode() {
        // 21 samples: two full vectors and a 5-sample scalar tail.
        let samples: Vec<f32> = (0..21).map(|i| i as f32 / 20.0).collect();
        let mut encoded = samples.clone();
        linear_to_srgb_slice(&mut encoded);
        for (out, &v) in encoded.iter().zip(&samples) {
            assert_relative_eq!(*out, linear_to_srgb(v), epsilon = 1e-5);
        }
    }

    #[test]
    fn slice_matches_scalar_decode() {
        let samples: Vec<f32> = (0..21).map(|i| i as f32 / 20.0).collect();
        let mut decoded = samples.clone();
        srgb_to_linear_slice(&mut decoded);
        for (out, &v) in decoded.iter().zip(&samples) {
            assert_relative_eq!(*out, srgb_to_linear(v), epsilon = 1e-5);
        }
    }
}
