use std::f32::consts::TAU;

use super::Effect;
use crate::analysis::BeatState;
use crate::animate::ParameterAnimator;
use crate::audio::AudioFrame;
use crate::config::BumpConfig;
use crate::frame::FrameBuffer;
use crate::kernel::{bump_light, LightingParams};

/// Orbit radius as a fraction of the shorter frame side.
const ORBIT_RADIUS: f32 = 0.25;

/// Bump lighting from a light that circles the frame centre. A beat flashes
/// the light to the beat intensity, after which it decays back.
#[derive(Debug)]
pub struct BumpLight {
    config: BumpConfig,
    intensity: ParameterAnimator<f32>,
    angle: f32,
}

impl BumpLight {
    pub fn new(config: BumpConfig) -> Self {
        Self {
            intensity: Self::animator(&config),
            config,
            angle: 0.0,
        }
    }

    fn animator(config: &BumpConfig) -> ParameterAnimator<f32> {
        ParameterAnimator::new(config.intensity()).decaying(config.decay_rate())
    }

    pub fn intensity(&self) -> f32 {
        self.intensity.value()
    }

    /// Orbit angle in radians, `[0, 2π)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Light position for a frame of the given size at the current angle.
    pub fn light_position(&self, width: usize, height: usize) -> (f32, f32) {
        let radius = width.min(height) as f32 * ORBIT_RADIUS;
        (
            width as f32 / 2.0 + radius * self.angle.cos(),
            height as f32 / 2.0 + radius * self.angle.sin(),
        )
    }
}

impl Effect for BumpLight {
    fn name(&self) -> &'static str {
        "bump"
    }

    fn process_frame(
        &mut self,
        input: FrameBuffer,
        _audio: &AudioFrame,
        beat: &BeatState,
    ) -> FrameBuffer {
        // The beat frame renders the flash itself; decay starts on the next.
        let intensity = if beat.is_beat {
            self.intensity.jump(self.config.beat_intensity());
            self.intensity.value()
        } else {
            self.intensity.tick()
        };

        let (width, height) = input.dimensions();
        let light = self.light_position(width, height);
        self.angle = (self.angle + self.config.orbit_step()).rem_euclid(TAU);

        if input.is_empty() {
            return input;
        }
        let params = LightingParams {
            depth: self.config.depth(),
            intensity,
            invert: self.config.invert,
            radius: None,
        };
        bump_light(&input, light, params)
    }

    fn reset(&mut self) {
        self.intensity = Self::animator(&self.config);
        self.angle = 0.0;
    }
}
