//! Elementary colour and geometry steps. Each one consumes a [`WorkFrame`] and returns the
//! transformed frame, clamped to `[0, 255]`.

use crate::effects::kernels::sobel_x;
use crate::effects::work::WorkFrame;
use crate::foundation::core::CHANNELS;
use crate::foundation::math::{centre_distance, percentile};

/// Negative image: `255 - v`.
pub fn invert(f: WorkFrame) -> WorkFrame {
    f.map_samples(|v| 255.0 - v)
}

/// `v * gain + offset` on every sample.
pub fn affine(f: WorkFrame, gain: f32, offset: f32) -> WorkFrame {
    f.map_samples(move |v| v * gain + offset)
}

/// Multiply every sample by `gain`.
pub fn scale(f: WorkFrame, gain: f32) -> WorkFrame {
    affine(f, gain, 0.0)
}

/// Contrast around mid-grey: `(v - 128) * k + 128`.
pub fn contrast(f: WorkFrame, k: f32) -> WorkFrame {
    f.map_samples(move |v| (v - 128.0) * k + 128.0)
}

/// Multiply one channel by `gain`.
pub fn scale_channel(f: WorkFrame, channel: usize, gain: f32) -> WorkFrame {
    f.map_channel(channel, move |v, _, _| v * gain)
}

/// Multiply each output channel by a row of `m` applied to the input pixel.
pub fn color_matrix(f: WorkFrame, m: [[f32; 3]; 3]) -> WorkFrame {
    f.map_pixels(move |p, _, _| {
        let mut out = [0.0; 3];
        for (row, o) in m.iter().zip(out.iter_mut()) {
            *o = row[0] * p[0] + row[1] * p[1] + row[2] * p[2];
        }
        out
    })
}

/// Power curve on normalized samples: `(v / 255)^gamma * 255`.
pub fn gamma(f: WorkFrame, gamma: f32) -> WorkFrame {
    f.map_samples(move |v| (v / 255.0).powf(gamma) * 255.0)
}

/// Scale only samples for which `mask` holds (per-sample, all channels).
pub fn scale_where(f: WorkFrame, mask: impl Fn(f32) -> bool + Sync, gain: f32) -> WorkFrame {
    f.map_samples(move |v| if mask(v) { v * gain } else { v })
}

/// Contrast only samples for which `mask` holds.
pub fn contrast_where(f: WorkFrame, mask: impl Fn(f32) -> bool + Sync, k: f32) -> WorkFrame {
    f.map_samples(move |v| if mask(v) { (v - 128.0) * k + 128.0 } else { v })
}

/// Scale one channel where that channel's own value satisfies `mask`.
pub fn scale_channel_where(
    f: WorkFrame,
    channel: usize,
    mask: impl Fn(f32) -> bool + Sync,
    gain: f32,
) -> WorkFrame {
    f.map_channel(channel, move |v, _, _| if mask(v) { v * gain } else { v })
}

/// Scale `channel` where the whole pixel satisfies `mask`.
pub fn scale_channel_if(
    f: WorkFrame,
    channel: usize,
    mask: impl Fn([f32; 3]) -> bool + Sync,
    gain: f32,
) -> WorkFrame {
    f.map_pixels(move |mut p, _, _| {
        if mask(p) {
            p[channel] *= gain;
        }
        p
    })
}

/// Scale `channel` where it is strictly greater than both other channels.
pub fn boost_dominant(f: WorkFrame, channel: usize, gain: f32) -> WorkFrame {
    scale_channel_if(
        f,
        channel,
        move |p| (0..CHANNELS).filter(|&c| c != channel).all(|c| p[channel] > p[c]),
        gain,
    )
}

/// Circular shift of one channel by `dx` columns and `dy` rows.
pub fn roll_channel(f: WorkFrame, channel: usize, dx: i32, dy: i32) -> WorkFrame {
    let (w, h) = (f.width() as i64, f.height() as i64);
    let src = f.samples().to_vec();
    f.map_channel(channel, move |_, x, y| {
        let sx = (x as i64 - dx as i64).rem_euclid(w);
        let sy = (y as i64 - dy as i64).rem_euclid(h);
        src[((sy * w + sx) as usize) * CHANNELS + channel]
    })
}

/// Circular shift of the whole image by `dx` columns and `dy` rows.
pub fn roll(f: WorkFrame, dx: i32, dy: i32) -> WorkFrame {
    if dx == 0 && dy == 0 {
        return f;
    }
    (0..CHANNELS).fold(f, |f, c| roll_channel(f, c, dx, dy))
}

/// Quantize to multiples of `step` (floor).
pub fn posterize(f: WorkFrame, step: f32) -> WorkFrame {
    f.map_samples(move |v| (v / step).floor() * step)
}

/// Replace every `block`×`block` cell with its top-left pixel.
pub fn pixelate(f: WorkFrame, block: u32) -> WorkFrame {
    if block <= 1 {
        return f;
    }
    let src = f.clone();
    f.map_pixels(move |_, x, y| src.pixel(x - x % block, y - y % block))
}

/// Scale every `every`-th row, starting at row 0.
pub fn scanlines(f: WorkFrame, every: u32, gain: f32) -> WorkFrame {
    f.map_pixels(move |p, _, y| {
        if y % every == 0 {
            p.map(|v| v * gain)
        } else {
            p
        }
    })
}

/// Scale pixels whose row and column are both multiples of `every`.
pub fn lattice(f: WorkFrame, every: u32, gain: f32) -> WorkFrame {
    f.map_pixels(move |p, x, y| {
        if x % every == 0 && y % every == 0 {
            p.map(|v| v * gain)
        } else {
            p
        }
    })
}

/// Add `amount` on every `every`-th row and every `every`-th column.
pub fn grid_overlay(f: WorkFrame, every: u32, amount: f32) -> WorkFrame {
    f.map_pixels(move |p, x, y| {
        if x % every == 0 || y % every == 0 {
            p.map(|v| v + amount)
        } else {
            p
        }
    })
}

/// Add `amount` to `channel` within `thickness` pixels of any edge.
pub fn border_glow(f: WorkFrame, channel: usize, thickness: u32, amount: f32) -> WorkFrame {
    let (w, h) = (f.width(), f.height());
    f.map_channel(channel, move |v, x, y| {
        let on_border = x < thickness
            || y < thickness
            || x + thickness >= w
            || y + thickness >= h;
        if on_border { v + amount } else { v }
    })
}

/// Add `sin(freq * y) * amp` to every channel.
pub fn row_wave(f: WorkFrame, freq: f32, amp: f32) -> WorkFrame {
    f.map_pixels(move |p, _, y| {
        let d = (freq * y as f32).sin() * amp;
        p.map(|v| v + d)
    })
}

/// Add `sin(freq * x) * amp` to every channel.
pub fn column_wave(f: WorkFrame, freq: f32, amp: f32) -> WorkFrame {
    f.map_pixels(move |p, x, _| {
        let d = (freq * x as f32).sin() * amp;
        p.map(|v| v + d)
    })
}

/// Add `sin(freq * x) * amp` to one channel.
pub fn column_wave_channel(f: WorkFrame, channel: usize, freq: f32, amp: f32) -> WorkFrame {
    f.map_channel(channel, move |v, x, _| v + (freq * x as f32).sin() * amp)
}

/// Multiply rows by `1 + depth * sin(freq * y)`.
pub fn row_modulate(f: WorkFrame, freq: f32, depth: f32) -> WorkFrame {
    f.map_pixels(move |p, _, y| {
        let k = 1.0 + depth * (freq * y as f32).sin();
        p.map(|v| v * k)
    })
}

/// Add a top-to-bottom linear ramp from `from` to `to` on one channel.
pub fn vertical_gradient(f: WorkFrame, channel: usize, from: f32, to: f32) -> WorkFrame {
    let steps = f.height().saturating_sub(1).max(1) as f32;
    f.map_channel(channel, move |v, _, y| v + from + (to - from) * (y as f32 / steps))
}

fn radial_ratio(x: u32, y: u32, w: u32, h: u32) -> f32 {
    let (d, max_d) = centre_distance(x, y, w, h);
    if max_d > 0.0 { d / max_d } else { 0.0 }
}

/// Darken towards the corners: divide by `1 + strength * d / d_max`.
pub fn radial_falloff(f: WorkFrame, strength: f32) -> WorkFrame {
    let (w, h) = (f.width(), f.height());
    f.map_pixels(move |p, x, y| {
        let k = 1.0 + strength * radial_ratio(x, y, w, h);
        p.map(|v| v / k)
    })
}

/// Add `amp * exp(-d / falloff)` to one channel, `d` measured from `(cx, cy)`.
pub fn radial_flare(
    f: WorkFrame,
    channel: usize,
    cx: u32,
    cy: u32,
    amp: f32,
    falloff: f32,
) -> WorkFrame {
    f.map_channel(channel, move |v, x, y| {
        let dx = x as f32 - cx as f32;
        let dy = y as f32 - cy as f32;
        v + amp * (-(dx * dx + dy * dy).sqrt() / falloff).exp()
    })
}

/// Radial vignette `clamp(1 - (d / d_max)^exponent, floor, 1)`, optionally adding
/// `(1 - vignette) * amount` to a tint channel afterwards.
pub fn vignette(
    f: WorkFrame,
    exponent: f32,
    floor: f32,
    tint: Option<(usize, f32)>,
) -> WorkFrame {
    let (w, h) = (f.width(), f.height());
    f.map_pixels(move |p, x, y| {
        let k = (1.0 - radial_ratio(x, y, w, h).powf(exponent)).clamp(floor, 1.0);
        let mut out = p.map(|v| v * k);
        if let Some((c, amount)) = tint {
            out[c] += (1.0 - k) * amount;
        }
        out
    })
}

/// Add `amount` to `channel` wherever the horizontal Sobel derivative of the channel mean exceeds
/// the given percentile of all derivatives. Only dark-to-bright transitions (left to right) glow.
pub fn edge_glow(f: WorkFrame, channel: usize, pct: f32, amount: f32) -> WorkFrame {
    let (w, h) = (f.width() as usize, f.height() as usize);
    let edges = sobel_x(&f.luma_mean(), w, h);
    let threshold = percentile(&edges, pct);
    f.map_channel(channel, move |v, x, y| {
        if edges[y as usize * w + x as usize] > threshold {
            v + amount
        } else {
            v
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/ops.rs"]
mod tests;
