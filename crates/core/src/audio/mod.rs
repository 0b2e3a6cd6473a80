use serde::{Deserialize, Serialize};

use crate::analysis::SpectrumAnalyzer;

/// Audio features for a single rendered frame, supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFrame {
    /// Frequency-ascending magnitudes. Length follows the upstream FFT size
    /// and values are not expected to be normalised.
    #[serde(default)]
    pub spectrum: Vec<f32>,
    /// Raw waveform samples for the frame.
    #[serde(default)]
    pub waveform: Vec<f32>,
    /// Beat flag from upstream silence/threshold detection, when the host
    /// provides one.
    #[serde(default)]
    pub beat: Option<bool>,
}

impl AudioFrame {
    pub fn new(spectrum: Vec<f32>, waveform: Vec<f32>) -> Self {
        Self {
            spectrum,
            waveform,
            beat: None,
        }
    }

    pub fn from_spectrum(spectrum: Vec<f32>) -> Self {
        Self::new(spectrum, Vec::new())
    }

    /// Derives the spectrum from waveform samples for hosts that do not run
    /// their own FFT.
    pub fn from_waveform(analyzer: &mut SpectrumAnalyzer, waveform: Vec<f32>) -> Self {
        let spectrum = analyzer.magnitudes(&waveform);
        Self::new(spectrum, waveform)
    }

    /// A frame without any audio information.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn with_beat(mut self, beat: bool) -> Self {
        self.beat = Some(beat);
        self
    }

    pub fn has_spectrum(&self) -> bool {
        !self.spectrum.is_empty()
    }

    /// Peak absolute waveform amplitude, `0.0` for an empty waveform.
    pub fn peak_amplitude(&self) -> f32 {
        self.waveform
            .iter()
            .filter(|sample| sample.is_finite())
            .fold(0.0f32, |peak, sample| peak.max(sample.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::BeatEstimator;

    #[test]
    fn silent_frames_carry_nothing() {
        let frame = AudioFrame::silent();
        assert!(!frame.has_spectrum());
        assert_eq!(frame.beat, None);
        assert_eq!(frame.peak_amplitude(), 0.0);
    }

    #[test]
    fn peak_amplitude_ignores_non_finite_samples() {
        let frame = AudioFrame::new(vec![1.0], vec![0.25, -0.75, f32::NAN]);
        assert_eq!(frame.peak_amplitude(), 0.75);
        assert_eq!(frame.with_beat(true).beat, Some(true));
    }

    fn sine(amplitude: f32, bin: usize, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (std::f32::consts::TAU * (bin * i) as f32 / len as f32).sin())
            .collect()
    }

    #[test]
    fn waveform_frames_drive_the_estimator() {
        let mut analyzer = SpectrumAnalyzer::new();
        let mut estimator = BeatEstimator::default();

        let silent = AudioFrame::from_waveform(&mut analyzer, vec![0.0; 256]);
        assert_eq!(silent.spectrum.len(), 129);
        assert_eq!(estimator.update(&silent.spectrum, 0.01).energy, 0.0);

        // Energy sits in the sub-bass quarter: roughly 0.9 * amplitude / 16.
        let quiet = AudioFrame::from_waveform(&mut analyzer, sine(8.0, 8, 256));
        assert_eq!(quiet.waveform.len(), 256);
        assert!((quiet.peak_amplitude() - 8.0).abs() < 1e-3);
        let loud = AudioFrame::from_waveform(&mut analyzer, sine(24.0, 8, 256));
        assert!(loud.spectrum[8] > quiet.spectrum[8] * 2.0);

        assert!(!estimator.update(&quiet.spectrum, 0.01).is_beat);
        let state = estimator.update(&quiet.spectrum, 0.01);
        assert!(state.energy > 0.3, "energy {}", state.energy);
        assert!(estimator.update(&loud.spectrum, 0.01).is_beat);
    }

    #[test]
    fn deserializes_partial_documents() {
        let frame: AudioFrame = serde_json::from_str(r#"{"spectrum":[0.5,0.25]}"#).unwrap();
        assert_eq!(frame.spectrum, vec![0.5, 0.25]);
        assert!(frame.waveform.is_empty());
        assert_eq!(frame.beat, None);
    }
}
