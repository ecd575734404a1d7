//! Reference windows

/// Settled signal around 1 V
pub const STABLE: [f32; 5] = [1.00, 1.01, 0.99, 1.00, 1.00];

/// Noisy signal, variance well above the threshold
pub const NOISY: [f32; 5] = [0.5, 1.5, 0.2, 1.8, 0.9];

/// Flat line
pub const FLAT: [f32; 5] = [2.5; 5];

/// Script of `cycles` cycles repeating `window`
pub fn repeat(window: &[f32; 5], cycles: usize) -> Vec<Option<f32>> {
    window
        .iter()
        .copied()
        .map(Some)
        .cycle()
        .take(window.len() * cycles)
        .collect()
}
