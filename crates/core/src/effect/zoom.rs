use super::Effect;
use crate::analysis::BeatState;
use crate::animate::ParameterAnimator;
use crate::audio::AudioFrame;
use crate::config::ZoomConfig;
use crate::frame::FrameBuffer;
use crate::kernel::{blend_into, zoom};

/// Feeds the previous output back through a centred zoom and blends it over
/// the incoming frame. Beats push the zoom factor up, which then glides back
/// to the resting factor.
#[derive(Debug)]
pub struct ZoomFeedback {
    config: ZoomConfig,
    factor: ParameterAnimator<f32>,
    previous: Option<FrameBuffer>,
}

impl ZoomFeedback {
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            factor: Self::animator(&config),
            config,
            previous: None,
        }
    }

    fn animator(config: &ZoomConfig) -> ParameterAnimator<f32> {
        ParameterAnimator::new(config.base_zoom()).returning_after(config.return_frames)
    }

    /// Zoom factor used for the most recent frame.
    pub fn factor(&self) -> f32 {
        self.factor.value()
    }
}

impl Effect for ZoomFeedback {
    fn name(&self) -> &'static str {
        "zoom"
    }

    fn process_frame(
        &mut self,
        mut input: FrameBuffer,
        _audio: &AudioFrame,
        beat: &BeatState,
    ) -> FrameBuffer {
        if beat.is_beat {
            let target = self.config.beat_zoom();
            self.factor.trigger(target, self.config.attack_frames);
        }
        let factor = self.factor.tick();

        if let Some(previous) = self.previous.as_ref() {
            // A resized input restarts the feedback loop.
            if previous.same_dimensions(&input) {
                let zoomed = zoom(previous, factor);
                blend_into(&mut input, &zoomed, self.config.blend);
            }
        }

        match self.previous.as_mut() {
            Some(previous) if previous.same_dimensions(&input) => {
                previous.pixels_mut().copy_from_slice(input.pixels());
            }
            _ => self.previous = Some(input.clone()),
        }
        input
    }

    fn reset(&mut self) {
        self.factor = Self::animator(&self.config);
        self.previous = None;
    }
}
