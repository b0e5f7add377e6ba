use rand::Rng;

use crate::effects::kernels::{box_2x2, gaussian_blur, median_2x2};
use crate::effects::noise::{gaussian_gain, gaussian_noise, integer_noise, sprinkle, uniform_noise};
use crate::effects::ops::*;
use crate::effects::work::{BLUE, GREEN, RED, WorkFrame};
use crate::foundation::core::Frame;

/// Variant ids with a pipeline behind them.
pub const KNOWN_VARIANTS: [u32; 4] = [0, 1, 2, 3];

const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Run variant `variant_id`'s 25-step pipeline over a private copy of `frame`.
///
/// Unknown ids return the input unchanged. The stored frame is never written.
pub fn apply_variant<R: Rng + ?Sized>(frame: &Frame, variant_id: u32, rng: &mut R) -> Frame {
    let work = WorkFrame::from_frame(frame);
    let out = match variant_id {
        0 => classic_film(work, rng),
        1 => neon(work, rng),
        2 => nature(work, rng),
        3 => fire(work, rng),
        _ => return frame.clone(),
    };
    out.into_frame()
}

fn classic_film<R: Rng + ?Sized>(f: WorkFrame, rng: &mut R) -> WorkFrame {
    let f = invert(f);
    let f = affine(f, 1.0, 30.0);
    let f = contrast(f, 1.2);
    let f = color_matrix(f, SEPIA);
    let f = gamma(f, 0.8);
    let f = scale_channel(f, RED, 1.1);
    let f = scale(f, 1.15);
    let f = gaussian_noise(f, rng, 5.0);
    let f = affine(f, 1.1, -10.0);
    let f = scale_channel(scale_channel(f, RED, 1.05), BLUE, 0.95);
    let f = gaussian_blur(f, 0.5);
    let f = scale_where(f, |v| v > 200.0, 0.9);
    let f = scale_where(f, |v| v < 50.0, 1.2);
    let f = scale_channel(scale_channel(f, RED, 1.1), GREEN, 1.05);
    let f = contrast_where(f, |v| v > 50.0 && v < 200.0, 1.1);
    let f = roll_channel(roll_channel(f, RED, 1, 0), BLUE, -1, 0);
    let f = affine(f, 0.95, 20.0);
    let f = scale_channel(f, GREEN, 1.02);
    let f = gamma(f, 0.9);
    let f = scale(f, 1.03);
    let f = affine(f, 0.98, 5.0);
    let f = radial_falloff(f, 0.1);
    let f = scale_channel(f, GREEN, 0.98);
    let f = scale(f, 1.01);
    vignette(f, 1.5, 0.3, None)
}

fn neon<R: Rng + ?Sized>(f: WorkFrame, rng: &mut R) -> WorkFrame {
    let f = scale_channel(f, BLUE, 1.4);
    let f = scale_channel(f, RED, 0.6);
    let f = scale_channel(f, GREEN, 0.8);
    let f = contrast(f, 1.6);
    let f = integer_noise(f, rng, -10, 10);
    let f = scale_channel_where(f, GREEN, |v| v > 180.0, 1.2);
    let f = scale_channel_where(f, BLUE, |v| v > 180.0, 1.2);
    let f = scale_channel_where(f, RED, |v| v < 80.0, 1.3);
    let f = scale_channel_where(f, BLUE, |v| v < 80.0, 1.2);
    let f = scanlines(f, 4, 0.8);
    let f = posterize(f, 16.0);
    let f = scale(f, 1.2);
    let f = lattice(f, 8, 1.5);
    let f = edge_glow(f, BLUE, 90.0, 50.0);
    let f = scale(f, 1.1);
    let f = roll_channel(roll_channel(f, RED, 0, 2), BLUE, 0, -2);
    let f = pixelate(f, 2);
    let f = scale_channel(f, BLUE, 1.1);
    let f = row_wave(f, 0.1, 5.0);
    let f = sprinkle(f, rng, 0.001, |rng, _| {
        [0, 1, 2].map(|_| rng.random_range(0..255) as f32)
    });
    let f = grid_overlay(f, 20, 25.5);
    let f = border_glow(f, BLUE, 5, 100.0);
    let f = affine(f, 0.95, 15.0);
    let f = scale_channel(f, GREEN, 1.05);
    let f = scale(f, 1.02);
    let f = scale_channel(f, BLUE, 1.03);
    vignette(f, 1.2, 0.4, Some((BLUE, 20.0)))
}

fn nature<R: Rng + ?Sized>(f: WorkFrame, rng: &mut R) -> WorkFrame {
    let f = scale_channel(f, GREEN, 1.5);
    let f = scale_channel(f, RED, 0.7);
    let f = scale_channel(f, BLUE, 0.7);
    let f = gaussian_blur(f, 1.2);
    let f = affine(f, 0.9, 10.0);
    let f = gaussian_noise(f, rng, 3.0);
    let f = row_modulate(f, 0.3, 0.1);
    let f = scale_channel(f, GREEN, 1.2);
    let f = uniform_noise(f, rng, 0.0, 5.0);
    let f = sprinkle(f, rng, 0.1, |_, px| px.map(|v| v * 1.3));
    let f = median_2x2(f);
    let f = scale_channel(f, GREEN, 1.1);
    let f = contrast(f, 0.9);
    let f = column_wave(f, 0.2, 10.0);
    let f = scale_channel(scale_channel(f, RED, 1.05), GREEN, 1.1);
    let f = box_2x2(f);
    let f = scale(f, 1.05);
    let f = boost_dominant(f, GREEN, 1.2);
    let f = affine(f, 0.98, 5.0);
    let f = gaussian_noise(f, rng, 2.0);
    let f = scale_channel(f, RED, 1.02);
    let f = scale_channel(scale_channel(f, RED, 1.03), GREEN, 1.02);
    let f = affine(f, 0.99, 3.0);
    let f = scale_channel(f, GREEN, 1.01);
    vignette(f, 1.3, 0.5, Some((GREEN, 10.0)))
}

fn fire<R: Rng + ?Sized>(f: WorkFrame, rng: &mut R) -> WorkFrame {
    let (w, h) = (f.width(), f.height());

    let f = scale_channel(f, RED, 1.6);
    let f = scale_channel(f, GREEN, 0.6);
    let f = scale_channel(f, BLUE, 0.4);
    let f = affine(f, 1.3, -30.0);
    let f = column_wave(f, 0.5, 2.0);
    let f = sprinkle(f, rng, 0.005, |rng, [_, _, b]| {
        [255.0, rng.random_range(100..200) as f32, b]
    });
    let f = row_wave(f, 0.8, 5.0);
    let f = scale_channel(scale_channel(f, RED, 1.2), GREEN, 1.1);
    let f = scale_channel_where(f, RED, |v| v > 150.0, 1.2);
    let f = sprinkle(f, rng, 0.02, |_, px| px.map(|v| (v * 0.7 + 50.0).trunc()));
    let f = scale_channel_if(f, GREEN, |[r, g, _]| r > 100.0 && g > 50.0, 1.3);
    let f = f.map_pixels(|[r, g, b], _, _| [r + 0.1 * (r + g) / 2.0, g, b]);
    let f = scale_channel_if(f, GREEN, |[r, _, _]| r > 200.0, 1.5);
    let f = gaussian_gain(f, rng, 0.05);
    let f = vertical_gradient(f, RED, 0.0, 20.0);
    let f = edge_glow(f, RED, 85.0, 40.0);
    let f = column_wave_channel(f, RED, 0.3, 15.0);
    let f = scale(f, 1.1);
    let f = scale_channel_if(f, RED, |[r, g, b]| (r + g + b) / 3.0 < 80.0, 1.4);
    // sin() stays inside [-1, 1], so the shift is nonzero only when it lands exactly on ±1.
    let f = roll(f, (h as f32 * 0.1).sin().trunc() as i32, 0);
    let f = gaussian_noise(f, rng, 8.0);
    let f = radial_flare(f, RED, w / 3, h / 3, 30.0, 50.0);
    let f = scale_channel(f, RED, 1.05);
    let f = scale(f, 1.02);
    vignette(f, 1.1, 0.4, Some((RED, 30.0)))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/variants.rs"]
mod tests;
