/// Smallest value the release envelope may take.
pub const FLOOR_EPSILON: f32 = 1e-9;

/// Slot that follows `idx` in a ring of `len` slots.
#[inline]
pub fn ring_next(idx: usize, len: usize) -> usize {
    if idx + 1 < len {
        idx + 1
    } else {
        0
    }
}

/// Slot that precedes `idx` in a ring of `len` slots.
#[inline]
pub fn ring_prev(idx: usize, len: usize) -> usize {
    (idx + len - 1) % len
}

/// Periodic Hann window (sums to a constant under 50%/75% overlap).
pub fn make_hann_window(len: usize) -> Vec<f32> {
    let n = len.max(1) as f32;
    (0..len)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / n;
            0.5 - 0.5 * phase.cos()
        })
        .collect()
}
