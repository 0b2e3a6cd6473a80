//! Beat-reactive image effects built on the shared kernel.

mod bump;
mod mosaic;
mod zoom;

pub use bump::BumpLight;
pub use mosaic::Mosaic;
pub use zoom::ZoomFeedback;

use crate::analysis::BeatState;
use crate::audio::AudioFrame;
use crate::config::EffectConfig;
use crate::frame::FrameBuffer;

/// One stage of a pipeline.
///
/// An effect owns all of its per-instance state (angles, counters, animators
/// and any feedback frame). Input buffers are handed over by value; an effect
/// that needs to read and write independently allocates its own output.
pub trait Effect: Send {
    /// Stable identifier, matching the configuration `kind`.
    fn name(&self) -> &'static str;

    /// Produces the output for one frame. Never fails: degenerate inputs
    /// pass through unchanged.
    fn process_frame(
        &mut self,
        input: FrameBuffer,
        audio: &AudioFrame,
        beat: &BeatState,
    ) -> FrameBuffer;

    /// Returns to the freshly constructed state (seek/restart).
    fn reset(&mut self);
}

/// Instantiates the effect described by `config`.
pub fn build_effect(config: &EffectConfig) -> Box<dyn Effect> {
    match config {
        EffectConfig::Zoom(zoom) => Box::new(ZoomFeedback::new(zoom.clone())),
        EffectConfig::Mosaic(mosaic) => Box::new(Mosaic::new(mosaic.clone())),
        EffectConfig::Bump(bump) => Box::new(BumpLight::new(bump.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BumpConfig, MosaicConfig, ZoomConfig};

    #[test]
    fn builds_every_configured_kind() {
        let names: Vec<_> = [
            EffectConfig::Zoom(ZoomConfig::default()),
            EffectConfig::Mosaic(MosaicConfig::default()),
            EffectConfig::Bump(BumpConfig::default()),
        ]
        .iter()
        .map(|config| build_effect(config).name())
        .collect();
        assert_eq!(names, ["zoom", "mosaic", "bump"]);
    }
}
