//! Grayscale-to-RGB row expansion.

/// Expands a single-channel image to interleaved RGB by repeating each
/// sample three times, optionally reversing row order in the same pass.
///
/// Fusing the flip here saves a second walk over what is usually the
/// largest buffer a reader touches.
pub fn triplicate_rows<T: Copy>(src: &[T], width: usize, height: usize, flip: bool) -> Vec<T> {
    debug_assert_eq!(src.len(), width * height);
    let mut out = Vec::with_capacity(src.len() * 3);
    for y in 0..height {
        let src_y = if flip { height - 1 - y } else { y };
        for &sample in &src[src_y * width..(src_y + 1) * width] {
            out.push(sample);
            out.push(sample);
            out.push(sample);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triplicates_in_order() {
        let out = triplicate_rows(&[1u8, 2, 3, 4], 2, 2, false);
        assert_eq!(out, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn triplicates_with_flip() {
        let out = triplicate_rows(&[1u8, 2, 3, 4], 2, 2, true);
        assert_eq!(out, vec![3, 3, 3, 4, 4, 4, 1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn works_for_floats() {
        let out = triplicate_rows(&[0.5f32], 1, 1, false);
        assert_eq!(out, vec![0.5, 0.5, 0.5]);
    }
}
