use std::fmt;
use std::path::Path;

use crate::foundation::error::{QuadfxError, QuadfxResult};

/// Samples per pixel in every frame (interleaved R, G, B).
pub const CHANNELS: usize = 3;

pub(crate) fn rgb24_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
}

/// One decoded RGB24 picture.
///
/// Frames are immutable once built: there is no `&mut` access to the sample grid, so a frame
/// shared through the frame store can only be transformed by copying it first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap an interleaved row-major RGB24 buffer.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> QuadfxResult<Self> {
        if width == 0 || height == 0 {
            return Err(QuadfxError::validation("frame width/height must be non-zero"));
        }
        let expected = rgb24_len(width, height)
            .ok_or_else(|| QuadfxError::validation("frame buffer size overflow"))?;
        if data.len() != expected {
            return Err(QuadfxError::validation(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height} rgb24",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Caller guarantees `data.len() == width * height * 3` with non-zero dimensions.
    pub(crate) fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(rgb24_len(width, height), Some(data.len()));
        Self {
            width,
            height,
            data,
        }
    }

    /// Build a frame of a single colour.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> QuadfxResult<Self> {
        let len = rgb24_len(width, height)
            .ok_or_else(|| QuadfxError::validation("frame buffer size overflow"))?;
        Self::new(width, height, rgb.repeat(len / CHANNELS))
    }

    /// Build a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> [u8; 3],
    ) -> QuadfxResult<Self> {
        let len = rgb24_len(width, height)
            .ok_or_else(|| QuadfxError::validation("frame buffer size overflow"))?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved RGB24 samples, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take the RGB24 bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// True when every pixel has the same colour.
    pub fn is_uniform(&self) -> bool {
        let mut px = self.data.chunks_exact(CHANNELS);
        match px.next() {
            Some(first) => px.all(|p| p == first),
            None => true,
        }
    }

    /// Write the frame as an 8-bit RGB PNG.
    pub fn save_png(&self, path: &Path) -> QuadfxResult<()> {
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            QuadfxError::Other(anyhow::anyhow!("write png '{}': {e}", path.display()))
        })
    }
}

/// Exact rational used for frame rates and time bases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rational {
    /// Numerator.
    pub num: u32,
    /// Denominator, never zero.
    pub den: u32, // must be > 0
}

impl Rational {
    /// Fails on a zero denominator.
    pub fn new(num: u32, den: u32) -> QuadfxResult<Self> {
        if den == 0 {
            return Err(QuadfxError::validation("rational den must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Value as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Parse the `num/den` (or bare integer) notation used by ffprobe.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim().parse::<u32>().ok()?, d.trim().parse::<u32>().ok()?),
            None => (s.parse::<u32>().ok()?, 1),
        };
        if den == 0 {
            return None;
        }
        Some(Self { num, den })
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
