use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::effects::noise::NoiseSeed;
use crate::effects::variants::KNOWN_VARIANTS;
use crate::encode::sink::RenderTarget;
use crate::foundation::error::{QuadfxError, QuadfxResult};

/// One row of the variant table: which pipeline to run and where its files go.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariantDescriptor {
    /// Effect pipeline, one of [`crate::KNOWN_VARIANTS`].
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Silent rendered file. Relative paths resolve against the work directory.
    pub intermediate: PathBuf,
    /// Final file with audio. Relative paths resolve against the output directory.
    pub output: PathBuf,
}

impl VariantDescriptor {
    /// Descriptor with unresolved paths.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        intermediate: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            intermediate: intermediate.into(),
            output: output.into(),
        }
    }
}

/// The reference four-variant table.
pub fn default_variants() -> Vec<VariantDescriptor> {
    ["Classic Film", "Neon/Cyberpunk", "Nature/Organic", "Fire/Energy"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            VariantDescriptor::new(
                i as u32,
                name,
                format!("temp_processed_{}.mp4", i + 1),
                format!("out{}.mp4", i + 1),
            )
        })
        .collect()
}

/// Everything a pipeline run needs. Every field has a default, so a config file only has to name
/// what it changes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Video to decode; also the audio donor for every final output.
    pub source: PathBuf,
    /// Where the final outputs are written.
    pub output_dir: PathBuf,
    /// Where intermediates are written.
    pub work_dir: PathBuf,
    /// Encoding format of every variant.
    pub target: RenderTarget,
    /// Codec the donor audio is re-encoded to when muxing.
    pub audio_codec: String,
    /// Random source for the noise steps.
    pub noise: NoiseSeed,
    /// Cancel renderers still running after this many seconds.
    pub render_timeout_secs: Option<u64>,
    /// Keep intermediates even when every output was produced.
    pub keep_intermediates: bool,
    /// Variants to render, with paths relative to the directories above.
    pub variants: Vec<VariantDescriptor>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("test.mp4"),
            output_dir: PathBuf::from("."),
            work_dir: PathBuf::from("."),
            target: RenderTarget::default(),
            audio_codec: "aac".to_string(),
            noise: NoiseSeed::Entropy,
            render_timeout_secs: None,
            keep_intermediates: false,
            variants: default_variants(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> QuadfxResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Check the target and the variant table before any work starts.
    pub fn validate(&self) -> QuadfxResult<()> {
        self.target.validate()?;
        if self.audio_codec.trim().is_empty() {
            return Err(QuadfxError::validation("audio_codec must be set"));
        }
        if self.render_timeout_secs == Some(0) {
            return Err(QuadfxError::validation("render_timeout_secs must be > 0"));
        }
        if self.variants.is_empty() {
            return Err(QuadfxError::validation("variant table must not be empty"));
        }

        let mut ids = HashSet::new();
        let mut paths = HashSet::new();
        for v in self.resolved_variants() {
            if !KNOWN_VARIANTS.contains(&v.id) {
                return Err(QuadfxError::validation(format!(
                    "unknown variant id {} (expected one of {KNOWN_VARIANTS:?})",
                    v.id
                )));
            }
            if !ids.insert(v.id) {
                return Err(QuadfxError::validation(format!(
                    "duplicate variant id {}",
                    v.id
                )));
            }
            if v.intermediate.as_os_str().is_empty() || v.output.as_os_str().is_empty() {
                return Err(QuadfxError::validation(format!(
                    "variant {} needs both an intermediate and an output path",
                    v.id
                )));
            }
            for p in [&v.intermediate, &v.output] {
                if !paths.insert(p.clone()) || *p == self.source {
                    return Err(QuadfxError::validation(format!(
                        "path '{}' is used more than once",
                        p.display()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Variant table with intermediate and output paths resolved against the work and output
    /// directories.
    pub fn resolved_variants(&self) -> Vec<VariantDescriptor> {
        self.variants
            .iter()
            .map(|v| VariantDescriptor {
                id: v.id,
                name: v.name.clone(),
                intermediate: self.work_dir.join(&v.intermediate),
                output: self.output_dir.join(&v.output),
            })
            .collect()
    }

    /// Deadline for the render phase, if any.
    pub fn render_timeout(&self) -> Option<Duration> {
        self.render_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
