//! Vertical flip.

/// Reverses row order in place. `row_samples` is width times channel count.
///
/// # Panics
///
/// Panics in debug builds when the buffer is not a whole number of rows.
pub fn flip_rows<T>(samples: &mut [T], row_samples: usize) {
    if row_samples == 0 {
        return;
    }
    debug_assert_eq!(samples.len() % row_samples, 0);
    let rows = samples.len() / row_samples;
    for y in 0..rows / 2 {
        let (top, rest) = samples.split_at_mut((y + 1) * row_samples);
        let top_row = &mut top[y * row_samples..];
        let bottom_start = (rows - 2 * y - 2) * row_samples;
        top_row.swap_with_slice(&mut rest[bottom_start..bottom_start + row_samples]);
    }
}
