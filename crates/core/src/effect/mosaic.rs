use super::Effect;
use crate::analysis::BeatState;
use crate::animate::{Easing, ParameterAnimator};
use crate::audio::AudioFrame;
use crate::config::MosaicConfig;
use crate::frame::FrameBuffer;
use crate::kernel;

/// Block mosaic whose block size jumps up on a beat, holds and then glides
/// back to the resting size.
#[derive(Debug)]
pub struct Mosaic {
    config: MosaicConfig,
    block: ParameterAnimator<f32>,
}

impl Mosaic {
    pub fn new(config: MosaicConfig) -> Self {
        Self {
            block: Self::animator(&config),
            config,
        }
    }

    fn animator(config: &MosaicConfig) -> ParameterAnimator<f32> {
        ParameterAnimator::new(config.base_block())
            .with_easing(Easing::EaseOut)
            .with_hold(config.hold_frames)
            .returning_after(config.return_frames)
    }

    /// Block size in pixels applied to the most recent frame.
    pub fn block_size(&self) -> usize {
        self.block.value().round().max(1.0) as usize
    }
}

impl Effect for Mosaic {
    fn name(&self) -> &'static str {
        "mosaic"
    }

    fn process_frame(
        &mut self,
        input: FrameBuffer,
        _audio: &AudioFrame,
        beat: &BeatState,
    ) -> FrameBuffer {
        if beat.is_beat {
            let target = self.config.beat_block();
            self.block.trigger(target, self.config.attack_frames);
        }
        self.block.tick();

        let block = self.block_size();
        if block <= 1 {
            return input;
        }
        let threshold = self
            .config
            .edge_aware
            .then(|| self.config.edge_threshold());
        kernel::mosaic(&input, block, threshold)
    }

    fn reset(&mut self) {
        self.block = Self::animator(&self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Pixel;

    fn checker(size: usize) -> FrameBuffer {
        FrameBuffer::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Pixel::rgb(100, 100, 100)
            } else {
                Pixel::rgb(110, 110, 110)
            }
        })
    }

    fn beat() -> BeatState {
        BeatState {
            is_beat: true,
            ..BeatState::default()
        }
    }

    #[test]
    fn resting_block_passes_frames_through() {
        let mut effect = Mosaic::new(MosaicConfig::default());
        let frame = checker(6);
        let quiet = BeatState::default();
        let out = effect.process_frame(frame.clone(), &AudioFrame::silent(), &quiet);
        assert_eq!(out, frame);
    }

    #[test]
    fn beat_grows_holds_and_returns() {
        let config = MosaicConfig {
            base_block: 1,
            beat_block: 4,
            attack_frames: 0,
            hold_frames: 2,
            return_frames: 3,
            edge_aware: false,
            ..MosaicConfig::default()
        };
        let mut effect = Mosaic::new(config);
        let audio = AudioFrame::silent();
        let quiet = BeatState::default();

        let out = effect.process_frame(checker(4), &audio, &beat());
        assert_eq!(effect.block_size(), 4);
        let first = out.get(0, 0).unwrap();
        assert!(out.pixels().iter().all(|p| *p == first));

        let mut sizes = Vec::new();
        for _ in 0..6 {
            effect.process_frame(checker(4), &audio, &quiet);
            sizes.push(effect.block_size());
        }
        assert_eq!(sizes[0], 4);
        assert_eq!(*sizes.last().unwrap(), 1);
        assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn low_contrast_detail_is_smoothed_when_edge_aware() {
        let config = MosaicConfig {
            base_block: 2,
            edge_threshold: 30,
            ..MosaicConfig::default()
        };
        let mut effect = Mosaic::new(config);
        let quiet = BeatState::default();
        let out = effect.process_frame(checker(4), &AudioFrame::silent(), &quiet);
        assert_eq!(out.get(0, 0), out.get(1, 1));
        assert_eq!(out.get(0, 0), out.get(1, 0));
    }

    #[test]
    fn reset_restores_the_resting_block() {
        let mut effect = Mosaic::new(MosaicConfig::default());
        effect.process_frame(checker(4), &AudioFrame::silent(), &beat());
        assert!(effect.block_size() > 1);
        effect.reset();
        assert_eq!(effect.block_size(), 1);
    }
}
