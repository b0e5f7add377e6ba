use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::effects::work::WorkFrame;

/// Where each renderer's random source comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseSeed {
    /// Fresh entropy per run.
    #[default]
    Entropy,
    /// Reproducible runs; the seed is mixed with the variant id so variants stay independent.
    Fixed(u64),
}

impl NoiseSeed {
    /// Random source for one variant's renderer.
    pub fn rng_for(self, variant_id: u32) -> StdRng {
        match self {
            Self::Entropy => StdRng::from_rng(&mut rand::rng()),
            Self::Fixed(seed) => StdRng::seed_from_u64(mix_seed(seed, variant_id)),
        }
    }
}

fn mix_seed(seed: u64, variant_id: u32) -> u64 {
    seed ^ u64::from(variant_id)
        .wrapping_add(1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f32, std_dev: f32) -> f32 {
    let z: f32 = rng.sample(StandardNormal);
    mean + std_dev * z
}

/// Additive `N(0, std_dev)` on every sample.
pub fn gaussian_noise<R: Rng + ?Sized>(f: WorkFrame, rng: &mut R, std_dev: f32) -> WorkFrame {
    f.map_samples_seq(|v| v + normal(&mut *rng, 0.0, std_dev))
}

/// Multiplicative `N(1, std_dev)` on every sample.
pub fn gaussian_gain<R: Rng + ?Sized>(f: WorkFrame, rng: &mut R, std_dev: f32) -> WorkFrame {
    f.map_samples_seq(|v| v * normal(&mut *rng, 1.0, std_dev))
}

/// Additive uniform `[lo, hi)` on every sample.
pub fn uniform_noise<R: Rng + ?Sized>(f: WorkFrame, rng: &mut R, lo: f32, hi: f32) -> WorkFrame {
    f.map_samples_seq(|v| v + rng.random_range(lo..hi))
}

/// Additive integer noise drawn from `[lo, hi)`.
pub fn integer_noise<R: Rng + ?Sized>(f: WorkFrame, rng: &mut R, lo: i32, hi: i32) -> WorkFrame {
    f.map_samples_seq(|v| v + rng.random_range(lo..hi) as f32)
}

/// Replace each pixel with `event(rng, pixel)` with probability `p`.
pub fn sprinkle<R: Rng + ?Sized>(
    f: WorkFrame,
    rng: &mut R,
    p: f64,
    mut event: impl FnMut(&mut R, [f32; 3]) -> [f32; 3],
) -> WorkFrame {
    f.map_pixels_seq(|px| {
        if rng.random::<f64>() < p {
            event(&mut *rng, px)
        } else {
            px
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/noise.rs"]
mod tests;
