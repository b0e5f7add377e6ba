/// Clamp a working sample into the 8-bit range. NaN maps to 0.
pub(crate) fn clamp_sample(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 255.0) }
}

/// Clamp then truncate toward zero.
pub(crate) fn sample_to_u8(v: f32) -> u8 {
    clamp_sample(v) as u8
}

/// Euclidean distance of `(x, y)` from the integer image centre `(w/2, h/2)`, and the distance
/// of the origin corner from that centre.
pub(crate) fn centre_distance(x: u32, y: u32, width: u32, height: u32) -> (f32, f32) {
    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    let dx = x as f32 - cx;
    let dy = y as f32 - cy;
    ((dx * dx + dy * dy).sqrt(), (cx * cx + cy * cy).sqrt())
}

/// Percentile with linear interpolation between closest ranks, `p` in `[0, 100]`.
pub(crate) fn percentile(values: &[f32], p: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
