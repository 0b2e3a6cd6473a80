//! Per-stream wiring of the beat estimator and an ordered effect chain.

use tracing::debug;

use crate::analysis::{BeatEstimator, BeatState};
use crate::audio::AudioFrame;
use crate::config::{BeatConfig, PipelineConfig};
use crate::effect::{build_effect, Effect};
use crate::frame::FrameBuffer;
use crate::timeline::PlaybackClock;

/// Runs one audio stream's beat estimation and hands every frame through the
/// effect chain in order.
pub struct Pipeline {
    estimator: BeatEstimator,
    effects: Vec<Box<dyn Effect>>,
    clock: PlaybackClock,
    last_beat: BeatState,
}

impl Pipeline {
    /// Empty chain; frames pass through until effects are pushed.
    pub fn new(beat: BeatConfig) -> Self {
        Self {
            estimator: BeatEstimator::new(beat),
            effects: Vec::new(),
            clock: PlaybackClock::default(),
            last_beat: BeatState::default(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut pipeline = Self::new(config.beat.clone());
        for effect in &config.effects {
            pipeline.push(build_effect(effect));
        }
        pipeline
    }

    pub fn push(&mut self, effect: Box<dyn Effect>) {
        self.effects.push(effect);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn effect_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.effects.iter().map(|effect| effect.name())
    }

    /// Advances the estimator by `dt` and runs `input` through every effect.
    ///
    /// A host-supplied `audio.beat == Some(true)` counts as a beat even when
    /// the estimator stays quiet.
    pub fn process(&mut self, input: FrameBuffer, audio: &AudioFrame, dt: f32) -> FrameBuffer {
        self.clock.advance(dt);

        let mut beat = self.estimator.update(&audio.spectrum, dt);
        if audio.beat == Some(true) {
            beat.is_beat = true;
        }
        self.last_beat = beat;

        self.effects
            .iter_mut()
            .fold(input, |frame, effect| effect.process_frame(frame, audio, &beat))
    }

    /// Drops all history (seek or restart).
    pub fn reset(&mut self) {
        debug!(
            frames = self.clock.frames,
            effects = self.effects.len(),
            "resetting pipeline"
        );
        self.estimator.reset();
        self.clock.reset();
        self.last_beat = BeatState::default();
        for effect in &mut self.effects {
            effect.reset();
        }
    }

    /// Beat state handed to the effects on the most recent frame.
    pub fn beat_state(&self) -> BeatState {
        self.last_beat
    }

    pub fn estimator(&self) -> &BeatEstimator {
        &self.estimator
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EffectConfig, MosaicConfig, ZoomConfig};
    use crate::frame::Pixel;

    const QUIET: [f32; 4] = [0.2; 4];
    const LOUD: [f32; 4] = [1.0; 4];

    fn gradient() -> FrameBuffer {
        FrameBuffer::from_fn(16, 16, |x, y| Pixel::rgb((x * 16) as u8, (y * 16) as u8, 0))
    }

    #[test]
    fn empty_chain_passes_frames_through() {
        let mut pipeline = Pipeline::new(BeatConfig::default());
        assert!(pipeline.is_empty());
        let frame = gradient();
        let out = pipeline.process(frame.clone(), &AudioFrame::silent(), 1.0 / 60.0);
        assert_eq!(out, frame);
        assert_eq!(pipeline.clock().frames, 1);
    }

    #[test]
    fn upstream_beat_flag_is_merged() {
        let mut pipeline = Pipeline::new(BeatConfig::default());
        pipeline.process(gradient(), &AudioFrame::silent().with_beat(true), 0.01);
        assert!(pipeline.beat_state().is_beat);

        pipeline.process(gradient(), &AudioFrame::silent().with_beat(false), 0.01);
        assert!(!pipeline.beat_state().is_beat);
    }

    #[test]
    fn builds_chain_in_configured_order() {
        let config = PipelineConfig {
            beat: BeatConfig::default(),
            effects: vec![
                EffectConfig::Mosaic(MosaicConfig::default()),
                EffectConfig::Zoom(ZoomConfig::default()),
            ],
        };
        let pipeline = Pipeline::from_config(&config);
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.effect_names().collect::<Vec<_>>(), ["mosaic", "zoom"]);
    }

    #[test]
    fn pulsing_audio_drives_tempo_and_effects() {
        let mut pipeline = Pipeline::from_config(&PipelineConfig::live_defaults());
        let mut beats = 0;

        for i in 0..241 {
            let spectrum = if i % 30 == 0 { LOUD } else { QUIET };
            let audio = AudioFrame::from_spectrum(spectrum.to_vec());
            let out = pipeline.process(gradient(), &audio, 1.0 / 60.0);
            assert_eq!(out.dimensions(), (16, 16));
            if pipeline.beat_state().is_beat {
                beats += 1;
            }
        }

        let state = pipeline.beat_state();
        assert!(beats >= 7, "only {beats} beats");
        assert!((state.bpm - 120.0).abs() <= 5.0, "bpm {}", state.bpm);
        assert!(state.confidence > 0.5);
        assert!((pipeline.clock().time_seconds - 241.0 / 60.0).abs() < 1e-3);
    }

    #[test]
    fn reset_clears_estimator_and_clock() {
        let mut pipeline = Pipeline::from_config(&PipelineConfig::live_defaults());
        for i in 0..90 {
            let spectrum = if i % 30 == 0 { LOUD } else { QUIET };
            let audio = AudioFrame::from_spectrum(spectrum.to_vec());
            pipeline.process(gradient(), &audio, 1.0 / 60.0);
        }
        assert!(pipeline.estimator().bpm_history().count() > 0);

        pipeline.reset();
        assert_eq!(pipeline.clock(), &PlaybackClock::default());
        assert_eq!(pipeline.beat_state(), BeatState::default());
        assert_eq!(pipeline.estimator().bpm_history().count(), 0);
        assert_eq!(pipeline.estimator().time(), 0.0);
    }
}
