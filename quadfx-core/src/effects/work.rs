use rayon::prelude::*;

use crate::foundation::core::{CHANNELS, Frame};
use crate::foundation::math::{clamp_sample, sample_to_u8};

/// Channel indices into a pixel.
pub const RED: usize = 0;
pub const GREEN: usize = 1;
pub const BLUE: usize = 2;

/// Private floating-point copy of a frame that effect steps consume and return.
///
/// Every constructor and mapping helper leaves samples clamped to `[0, 255]`, so an operation
/// only has to produce its raw value.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkFrame {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl WorkFrame {
    /// Widen an 8-bit frame to the working representation.
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            width: frame.width(),
            height: frame.height(),
            data: frame.data().iter().map(|&v| f32::from(v)).collect(),
        }
    }

    /// Clamp and truncate back to RGB24.
    pub fn into_frame(self) -> Frame {
        let data = self.data.iter().map(|&v| sample_to_u8(v)).collect();
        Frame::from_raw(self.width, self.height, data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved RGB samples, row-major.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn row_len(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Samples at `(x, y)`; panics outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Apply `f` to every sample.
    pub fn map_samples(mut self, f: impl Fn(f32) -> f32 + Sync) -> Self {
        self.data
            .par_iter_mut()
            .for_each(|v| *v = clamp_sample(f(*v)));
        self
    }

    /// Apply `f(value, x, y)` to one channel.
    pub fn map_channel(mut self, channel: usize, f: impl Fn(f32, u32, u32) -> f32 + Sync) -> Self {
        let row_len = self.row_len();
        self.data
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                    px[channel] = clamp_sample(f(px[channel], x as u32, y as u32));
                }
            });
        self
    }

    /// Apply `f(rgb, x, y)` to every pixel.
    pub fn map_pixels(mut self, f: impl Fn([f32; 3], u32, u32) -> [f32; 3] + Sync) -> Self {
        let row_len = self.row_len();
        self.data
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                    let out = f([px[0], px[1], px[2]], x as u32, y as u32);
                    for c in 0..CHANNELS {
                        px[c] = clamp_sample(out[c]);
                    }
                }
            });
        self
    }

    /// Sequential per-pixel pass for steps that draw from a random source.
    pub fn map_pixels_seq(mut self, mut f: impl FnMut([f32; 3]) -> [f32; 3]) -> Self {
        for px in self.data.chunks_exact_mut(CHANNELS) {
            let out = f([px[0], px[1], px[2]]);
            for c in 0..CHANNELS {
                px[c] = clamp_sample(out[c]);
            }
        }
        self
    }

    /// Sequential per-sample pass for steps that draw from a random source.
    pub fn map_samples_seq(mut self, mut f: impl FnMut(f32) -> f32) -> Self {
        for v in &mut self.data {
            *v = clamp_sample(f(*v));
        }
        self
    }

    /// Mean of the three channels per pixel, row-major.
    pub fn luma_mean(&self) -> Vec<f32> {
        self.data
            .chunks_exact(CHANNELS)
            .map(|px| (px[0] + px[1] + px[2]) / 3.0)
            .collect()
    }

    pub(crate) fn with_data(&self, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/work.rs"]
mod tests;
