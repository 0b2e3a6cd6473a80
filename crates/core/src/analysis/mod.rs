//! Beat and tempo estimation from per-frame spectrum snapshots.

mod spectrum;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub use spectrum::SpectrumAnalyzer;

use crate::BeatConfig;

/// Snapshot of the estimator after one update.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeatState {
    /// True only for the frame in which a beat was detected.
    pub is_beat: bool,
    /// Smoothed tempo estimate, `0.0` until the first tempo sample.
    pub bpm: f32,
    /// `[0, 1]`, degrades as tempo samples disagree.
    pub confidence: f32,
    /// Position inside the current beat cycle, always in `[0, 1)`.
    pub beat_phase: f32,
    /// Stream time of the latest beat in seconds.
    pub last_beat_time: Option<f32>,
    /// Latest admitted inter-beat interval in seconds, `0.0` if none yet.
    pub beat_interval: f32,
    /// Weighted combined energy of the latest non-empty spectrum.
    pub energy: f32,
}

/// Turns a stream of spectra into a beat flag, tempo and beat phase.
///
/// One estimator belongs to exactly one audio stream. It never looks ahead:
/// each update only sees the current spectrum and the bounded histories.
#[derive(Debug, Clone)]
pub struct BeatEstimator {
    config: BeatConfig,
    time: f64,
    last_beat_time: Option<f64>,
    peaks: VecDeque<f32>,
    bpm_history: VecDeque<f32>,
    state: BeatState,
}

impl Default for BeatEstimator {
    fn default() -> Self {
        Self::new(BeatConfig::default())
    }
}

impl BeatEstimator {
    pub fn new(config: BeatConfig) -> Self {
        Self {
            peaks: VecDeque::with_capacity(config.peak_capacity()),
            bpm_history: VecDeque::with_capacity(config.bpm_capacity()),
            config,
            time: 0.0,
            last_beat_time: None,
            state: BeatState::default(),
        }
    }

    pub fn config(&self) -> &BeatConfig {
        &self.config
    }

    /// Latest state without advancing the estimator.
    pub fn state(&self) -> BeatState {
        self.state
    }

    /// Stream time accumulated from the `dt` of every update.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn peak_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.peaks.iter().copied()
    }

    pub fn bpm_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.bpm_history.iter().copied()
    }

    /// Forgets all history, e.g. after a seek or stream restart.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.last_beat_time = None;
        self.peaks.clear();
        self.bpm_history.clear();
        self.state = BeatState::default();
    }

    /// Advances the estimator by `dt` seconds with the given spectrum.
    ///
    /// An empty spectrum only clears the beat flag. A non-finite or negative
    /// `dt` does not advance the clock.
    pub fn update(&mut self, spectrum: &[f32], dt: f32) -> BeatState {
        self.state.is_beat = false;
        if dt.is_finite() && dt > 0.0 {
            self.time += f64::from(dt);
        }

        if spectrum.is_empty() {
            return self.state;
        }

        let energy = self.combined_energy(spectrum);
        self.state.energy = energy;

        if energy > self.config.threshold() {
            if self.peaks.len() >= self.config.peak_capacity() {
                self.peaks.pop_front();
            }
            self.peaks.push_back(energy);

            if self.is_significant() {
                self.register_beat();
            }
        }

        self.update_phase();
        self.update_tempo();
        self.state
    }

    /// Weighted sum of the mean magnitude of each spectrum quarter, scaled by
    /// the sensitivity gain.
    pub fn combined_energy(&self, spectrum: &[f32]) -> f32 {
        let weighted: f32 = band_means(spectrum)
            .iter()
            .zip(self.config.band_weights.as_array())
            .map(|(mean, weight)| mean * weight)
            .sum();
        weighted * self.config.sensitivity()
    }

    fn is_significant(&self) -> bool {
        let len = self.peaks.len();
        if len < 3 {
            return false;
        }

        let newest = self.peaks[len - 1];
        let previous = self.peaks[len - 2];
        newest >= previous * self.config.jump_ratio()
            && newest > self.config.threshold() * self.config.threshold_multiplier()
    }

    fn register_beat(&mut self) {
        let now = self.time;

        if let Some(last) = self.last_beat_time {
            let interval = (now - last) as f32;
            if interval > f32::EPSILON {
                let bpm = 60.0 / interval;
                if self.config.accepts_bpm(bpm) {
                    if self.bpm_history.len() >= self.config.bpm_capacity() {
                        self.bpm_history.pop_front();
                    }
                    self.bpm_history.push_back(bpm);
                    self.state.beat_interval = interval;
                    tracing::trace!(time = now, bpm, interval, "beat");
                } else {
                    tracing::debug!(bpm, interval, "rejected tempo sample outside range");
                }
            }
        }

        self.last_beat_time = Some(now);
        self.state.last_beat_time = Some(now as f32);
        self.state.is_beat = true;
    }

    fn update_phase(&mut self) {
        let interval = f64::from(self.state.beat_interval);
        self.state.beat_phase = match self.last_beat_time {
            Some(last) if interval > 0.0 => wrap_phase(((self.time - last) / interval) as f32),
            _ => 0.0,
        };
    }

    fn update_tempo(&mut self) {
        if self.bpm_history.is_empty() {
            return;
        }

        let count = self.bpm_history.len() as f32;
        let mean = self.bpm_history.iter().sum::<f32>() / count;
        let variance = self
            .bpm_history
            .iter()
            .map(|bpm| (bpm - mean) * (bpm - mean))
            .sum::<f32>()
            / count;

        let smoothing = self.config.bpm_smoothing();
        self.state.bpm = if self.state.bpm > 0.0 {
            self.state.bpm * smoothing + mean * (1.0 - smoothing)
        } else {
            mean
        };
        self.state.confidence = (1.0 - variance / self.config.variance_scale()).clamp(0.0, 1.0);
    }
}

/// Mean magnitude of the sub-bass, low, mid and high quarters. Non-finite
/// and negative magnitudes count as silence.
fn band_means(spectrum: &[f32]) -> [f32; 4] {
    let len = spectrum.len();
    let mut means = [0.0; 4];

    for (band, mean) in means.iter_mut().enumerate() {
        let start = band * len / 4;
        let end = (band + 1) * len / 4;
        if end > start {
            let sum: f32 = spectrum[start..end]
                .iter()
                .map(|value| if value.is_finite() { value.max(0.0) } else { 0.0 })
                .sum();
            *mean = sum / (end - start) as f32;
        }
    }

    means
}

fn wrap_phase(phase: f32) -> f32 {
    if !phase.is_finite() || phase < 0.0 {
        return 0.0;
    }
    let wrapped = phase.fract();
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}
