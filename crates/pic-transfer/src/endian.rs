//! 16-bit byte swapping.

use wide::u16x8;

/// Swaps the bytes of every 16-bit sample in place.
///
/// Used by codecs whose wire format fixes an endianness (PNG stores 16-bit
/// samples big-endian). Applying it twice restores the input.
pub fn swap_bytes_u16(samples: &mut [u16]) {
    let mut chunks = samples.chunks_exact_mut(8);
    for chunk in &mut chunks {
        let v = u16x8::from(<[u16; 8]>::try_from(&*chunk).unwrap());
        let swapped: u16x8 = (v << 8) | (v >> 8);
        chunk.copy_from_slice(&swapped.to_array());
    }
    for sample in chunks.into_remainder() {
        *sample = sample.swap_bytes();
    }
}
