use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{kernel::BlendMode, Result};

/// Top-level configuration for a [`crate::Pipeline`].
///
/// Every numeric field documents its valid range. Values outside the range are
/// accepted on load and clamped where they are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub beat: BeatConfig,
    #[serde(default)]
    pub effects: Vec<EffectConfig>,
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.beat.report_clamped();
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Chain used when no configuration file is supplied.
    pub fn live_defaults() -> Self {
        Self {
            beat: BeatConfig::default(),
            effects: vec![
                EffectConfig::Zoom(ZoomConfig::default()),
                EffectConfig::Mosaic(MosaicConfig::default()),
                EffectConfig::Bump(BumpConfig::default()),
            ],
        }
    }
}

/// Per-band weights applied to the mean magnitude of each spectrum quarter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandWeights {
    pub sub_bass: f32,
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl Default for BandWeights {
    fn default() -> Self {
        Self {
            sub_bass: 0.9,
            low: 0.8,
            mid: 0.6,
            high: 0.4,
        }
    }
}

impl BandWeights {
    pub fn as_array(&self) -> [f32; 4] {
        [self.sub_bass, self.low, self.mid, self.high]
    }
}

/// Beat estimator tuning. The defaults are empirically tuned and kept as
/// named values so they can be overridden per stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatConfig {
    pub band_weights: BandWeights,
    /// Energy gain, valid range `[0.1, 5.0]`.
    pub sensitivity: f32,
    /// Minimum combined energy admitted into the peak history, `>= 0`.
    pub threshold: f32,
    /// Required jump of the newest peak over the previous one, `>= 1`.
    pub jump_ratio: f32,
    /// A beat must also exceed `threshold * threshold_multiplier`, `>= 1`.
    pub threshold_multiplier: f32,
    /// Peak history capacity, `>= 3`.
    pub peak_capacity: usize,
    /// Tempo history capacity, `>= 1`.
    pub bpm_capacity: usize,
    pub min_bpm: f32,
    pub max_bpm: f32,
    /// Weight kept from the previous BPM estimate each frame, `[0, 1]`.
    pub bpm_smoothing: f32,
    /// Tempo variance at which confidence reaches zero, `> 0`.
    pub variance_scale: f32,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            band_weights: BandWeights::default(),
            sensitivity: 1.0,
            threshold: 0.3,
            jump_ratio: 1.2,
            threshold_multiplier: 1.5,
            peak_capacity: 10,
            bpm_capacity: 20,
            min_bpm: 60.0,
            max_bpm: 200.0,
            bpm_smoothing: 0.8,
            variance_scale: 100.0,
        }
    }
}

impl BeatConfig {
    pub fn sensitivity(&self) -> f32 {
        clamp_or(self.sensitivity, 0.1, 5.0, 1.0)
    }

    pub fn threshold(&self) -> f32 {
        if self.threshold.is_finite() {
            self.threshold.max(0.0)
        } else {
            0.3
        }
    }

    pub fn jump_ratio(&self) -> f32 {
        clamp_or(self.jump_ratio, 1.0, f32::MAX, 1.2)
    }

    pub fn threshold_multiplier(&self) -> f32 {
        clamp_or(self.threshold_multiplier, 1.0, f32::MAX, 1.5)
    }

    pub fn peak_capacity(&self) -> usize {
        self.peak_capacity.max(3)
    }

    pub fn bpm_capacity(&self) -> usize {
        self.bpm_capacity.max(1)
    }

    pub fn bpm_smoothing(&self) -> f32 {
        clamp_or(self.bpm_smoothing, 0.0, 1.0, 0.8)
    }

    pub fn variance_scale(&self) -> f32 {
        clamp_or(self.variance_scale, f32::EPSILON, f32::MAX, 100.0)
    }

    /// Whether a tempo sample lies inside the admitted BPM range.
    pub fn accepts_bpm(&self, bpm: f32) -> bool {
        bpm.is_finite() && bpm >= self.min_bpm && bpm <= self.max_bpm
    }

    fn report_clamped(&self) {
        if self.sensitivity() != self.sensitivity {
            tracing::warn!(
                sensitivity = self.sensitivity,
                used = self.sensitivity(),
                "sensitivity outside [0.1, 5.0], clamping"
            );
        }
        if self.threshold() != self.threshold {
            tracing::warn!(threshold = self.threshold, "negative beat threshold, clamping");
        }
        if self.min_bpm > self.max_bpm {
            tracing::warn!(
                min_bpm = self.min_bpm,
                max_bpm = self.max_bpm,
                "empty BPM range, no tempo samples will be admitted"
            );
        }
    }
}

/// Effect entry in a pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectConfig {
    Zoom(ZoomConfig),
    Mosaic(MosaicConfig),
    Bump(BumpConfig),
}

/// Feedback zoom that pulses on beats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Resting zoom factor, `[1.0, 4.0]`.
    pub base_zoom: f32,
    /// Zoom factor reached on a beat, `[1.0, 4.0]`.
    pub beat_zoom: f32,
    pub attack_frames: u32,
    pub return_frames: u32,
    /// How the zoomed previous frame is combined with the input.
    pub blend: BlendMode,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            base_zoom: 1.0,
            beat_zoom: 1.15,
            attack_frames: 4,
            return_frames: 20,
            blend: BlendMode::Average,
        }
    }
}

impl ZoomConfig {
    pub fn base_zoom(&self) -> f32 {
        clamp_or(self.base_zoom, 1.0, 4.0, 1.0)
    }

    pub fn beat_zoom(&self) -> f32 {
        clamp_or(self.beat_zoom, 1.0, 4.0, 1.15)
    }
}

/// Block mosaic whose block size jumps on beats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Resting block size in pixels, `[1, 256]`.
    pub base_block: u32,
    /// Block size reached on a beat, `[1, 256]`.
    pub beat_block: u32,
    pub attack_frames: u32,
    pub hold_frames: u32,
    pub return_frames: u32,
    /// Keep true pixels where the block average would smear an edge.
    pub edge_aware: bool,
    /// Per-channel difference treated as an edge, `[0, 255]`.
    pub edge_threshold: u32,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            base_block: 1,
            beat_block: 12,
            attack_frames: 2,
            hold_frames: 6,
            return_frames: 18,
            edge_aware: true,
            edge_threshold: 30,
        }
    }
}

impl MosaicConfig {
    pub fn base_block(&self) -> f32 {
        self.base_block.clamp(1, 256) as f32
    }

    pub fn beat_block(&self) -> f32 {
        self.beat_block.clamp(1, 256) as f32
    }

    pub fn edge_threshold(&self) -> u8 {
        self.edge_threshold.min(255) as u8
    }
}

/// Bump lighting with an orbiting light source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BumpConfig {
    /// Surface depth, `[0, 1]`.
    pub depth: f32,
    /// Resting light intensity, `[-1, 1]`; negative values darken.
    pub intensity: f32,
    /// Intensity the light jumps to on a beat, `[-1, 1]`.
    pub beat_intensity: f32,
    /// Per-frame exponential decay back to the resting intensity, `[0, 1]`.
    pub decay_rate: f32,
    /// Use `255 - max(R, G, B)` as the surface height.
    pub invert: bool,
    /// Light orbit advance in radians per frame.
    pub orbit_step: f32,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            depth: 1.0,
            intensity: 0.3,
            beat_intensity: 1.0,
            decay_rate: 0.15,
            invert: false,
            orbit_step: 0.02,
        }
    }
}

impl BumpConfig {
    pub fn depth(&self) -> f32 {
        clamp_or(self.depth, 0.0, 1.0, 1.0)
    }

    pub fn intensity(&self) -> f32 {
        clamp_or(self.intensity, -1.0, 1.0, 0.3)
    }

    pub fn beat_intensity(&self) -> f32 {
        clamp_or(self.beat_intensity, -1.0, 1.0, 1.0)
    }

    pub fn decay_rate(&self) -> f32 {
        clamp_or(self.decay_rate, 0.0, 1.0, 0.15)
    }

    pub fn orbit_step(&self) -> f32 {
        if self.orbit_step.is_finite() {
            self.orbit_step
        } else {
            0.0
        }
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
