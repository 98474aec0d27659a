//! Bicubic resampling of single-channel float planes.
//!
//! Matches the bicubic-with-antialiasing-off convention used by common
//! tensor libraries: cubic convolution kernel with a = -0.75, half-pixel
//! source mapping (`align_corners = false`) and edge-clamped taps. Depth
//! rasters upsampled here line up numerically with the models' own
//! training-time resizing.

/// Cubic convolution kernel coefficient.
const A: f32 = -0.75;

/// Kernel segment for |x| <= 1.
fn cubic_conv1(x: f32) -> f32 {
    ((A + 2.0) * x - (A + 3.0)) * x * x + 1.0
}

/// Kernel segment for 1 < |x| < 2.
fn cubic_conv2(x: f32) -> f32 {
    ((A * x - 5.0 * A) * x + 8.0 * A) * x - 4.0 * A
}

/// Weights for the four taps around a sample point, given the fractional
/// offset `t` in `[0, 1)` from the base tap.
pub(crate) fn cubic_weights(t: f32) -> [f32; 4] {
    [
        cubic_conv2(t + 1.0),
        cubic_conv1(t),
        cubic_conv1(1.0 - t),
        cubic_conv2(2.0 - t),
    ]
}

/// Half-pixel source coordinate for an output index.
fn source_index(scale: f32, dst: usize) -> f32 {
    scale * (dst as f32 + 0.5) - 0.5
}

/// Per-axis tap table: leftmost source tap plus the four kernel weights
/// for every output index. The taps sit at `floor(pos) - 1 .. floor(pos) + 2`.
fn axis_taps(src_len: usize, dst_len: usize) -> Vec<(i64, [f32; 4])> {
    let scale = src_len as f32 / dst_len as f32;
    (0..dst_len)
        .map(|dst| {
            let pos = source_index(scale, dst);
            let base = pos.floor();
            (base as i64 - 1, cubic_weights(pos - base))
        })
        .collect()
}

fn clamp_index(idx: i64, len: usize) -> usize {
    idx.clamp(0, len as i64 - 1) as usize
}

/// Resize a row-major single-channel plane to `dst_w` x `dst_h`.
///
/// `src` must hold exactly `src_w * src_h` values. Taps outside the plane
/// are clamped to the nearest edge sample. Resizing to the source
/// dimensions reproduces the input exactly. An empty source or target
/// plane yields an empty output; there is nothing to interpolate from or
/// into.
pub fn resize_bicubic(src: &[f32], src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Vec<f32> {
    debug_assert_eq!(src.len(), src_w * src_h);

    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return Vec::new();
    }

    let x_taps = axis_taps(src_w, dst_w);
    let y_taps = axis_taps(src_h, dst_h);

    let mut out = Vec::with_capacity(dst_w * dst_h);
    for &(y_base, y_weights) in &y_taps {
        for &(x_base, x_weights) in &x_taps {
            // Interpolate along x within each of the four rows, then blend
            // the row results along y.
            let mut acc = 0.0f32;
            for (ky, &wy) in y_weights.iter().enumerate() {
                let row = clamp_index(y_base + ky as i64, src_h) * src_w;
                let mut row_acc = 0.0f32;
                for (kx, &wx) in x_weights.iter().enumerate() {
                    let col = clamp_index(x_base + kx as i64, src_w);
                    row_acc += wx * src[row + col];
                }
                acc += wy * row_acc;
            }
            out.push(acc);
        }
    }

    out
}
