use rayon::prelude::*;

use crate::effects::work::WorkFrame;
use crate::foundation::core::CHANNELS;

/// Separable Gaussian blur applied per channel, edges clamped.
///
/// The kernel is truncated at `4 * sigma` taps on each side.
pub fn gaussian_blur(frame: WorkFrame, sigma: f32) -> WorkFrame {
    if !sigma.is_finite() || sigma <= 0.0 {
        return frame;
    }
    let radius = (4.0 * sigma + 0.5) as u32;
    if radius == 0 {
        return frame;
    }
    let kernel = gaussian_kernel(radius, sigma);
    let (w, h) = (frame.width() as usize, frame.height() as usize);

    let mut tmp = vec![0.0f32; frame.samples().len()];
    horizontal_pass(frame.samples(), &mut tmp, w, &kernel);
    let mut out = vec![0.0f32; tmp.len()];
    vertical_pass(&tmp, &mut out, w, h, &kernel);
    frame.with_data(out)
}

fn gaussian_kernel(radius: u32, sigma: f32) -> Vec<f32> {
    let r = radius as i32;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f32> = (-r..=r)
        .map(|i| {
            let x = i as f32;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

fn horizontal_pass(src: &[f32], dst: &mut [f32], width: usize, k: &[f32]) {
    let radius = (k.len() / 2) as isize;
    let row_len = width * CHANNELS;
    dst.par_chunks_mut(row_len)
        .zip(src.par_chunks(row_len))
        .for_each(|(out_row, in_row)| {
            for x in 0..width {
                let mut acc = [0.0f32; CHANNELS];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x as isize + ki as isize - radius).clamp(0, width as isize - 1);
                    let idx = sx as usize * CHANNELS;
                    for c in 0..CHANNELS {
                        acc[c] += kw * in_row[idx + c];
                    }
                }
                out_row[x * CHANNELS..x * CHANNELS + CHANNELS].copy_from_slice(&acc);
            }
        });
}

fn vertical_pass(src: &[f32], dst: &mut [f32], width: usize, height: usize, k: &[f32]) {
    let radius = (k.len() / 2) as isize;
    let row_len = width * CHANNELS;
    dst.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, out_row)| {
            for (i, out) in out_row.iter_mut().enumerate() {
                let mut acc = 0.0f32;
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = (y as isize + ki as isize - radius).clamp(0, height as isize - 1);
                    acc += kw * src[sy as usize * row_len + i];
                }
                *out = acc;
            }
        });
}

/// Samples of the 2×2 window whose bottom-right corner is `(x, y)`, edges clamped.
fn window_2x2(src: &[f32], width: usize, x: usize, y: usize, c: usize) -> [f32; 4] {
    let x0 = x.saturating_sub(1);
    let y0 = y.saturating_sub(1);
    let at = |xx: usize, yy: usize| src[(yy * width + xx) * CHANNELS + c];
    [at(x0, y0), at(x, y0), at(x0, y), at(x, y)]
}

fn window_filter(frame: WorkFrame, reduce: impl Fn([f32; 4]) -> f32 + Sync) -> WorkFrame {
    let w = frame.width() as usize;
    let row_len = frame.row_len();
    let src = frame.samples();
    let mut out = vec![0.0f32; src.len()];
    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..w {
                for c in 0..CHANNELS {
                    row[x * CHANNELS + c] = reduce(window_2x2(src, w, x, y, c));
                }
            }
        });
    frame.with_data(out)
}

/// 2×2 median per channel. With an even window the upper of the two middle samples is taken.
pub fn median_2x2(frame: WorkFrame) -> WorkFrame {
    window_filter(frame, |mut win| {
        win.sort_by(|a, b| a.total_cmp(b));
        win[2]
    })
}

/// 2×2 mean per channel.
pub fn box_2x2(frame: WorkFrame) -> WorkFrame {
    window_filter(frame, |win| win.iter().sum::<f32>() / 4.0)
}

/// Signed horizontal Sobel derivative of a single-channel plane, edges clamped.
///
/// Positive where the plane gets brighter from left to right; vertical smoothing is `[1, 2, 1]`.
pub fn sobel_x(plane: &[f32], width: usize, height: usize) -> Vec<f32> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let at = |x: isize, y: isize| {
        let xx = x.clamp(0, width as isize - 1) as usize;
        let yy = y.clamp(0, height as isize - 1) as usize;
        plane[yy * width + xx]
    };
    let mut out = vec![0.0f32; width * height];
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as isize;
            for (x, out) in row.iter_mut().enumerate() {
                let x = x as isize;
                *out = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
            }
        });
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/kernels.rs"]
mod tests;
