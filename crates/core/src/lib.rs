//! Core library for pulsefx audio-reactive image effects.
//!
//! Each module owns one piece of the frame loop: beat and tempo estimation
//! from spectrum snapshots, frame-stepped parameter animation, and the
//! fixed-point pixel kernel every effect is built on. [`Pipeline`] wires them
//! together for a single audio stream.

pub mod analysis;
pub mod animate;
pub mod audio;
pub mod config;
pub mod effect;
pub mod error;
pub mod frame;
pub mod kernel;
pub mod pipeline;
pub mod timeline;

pub use analysis::{BeatEstimator, BeatState, SpectrumAnalyzer};
pub use animate::{AnimPhase, Animatable, AnimationMode, Easing, ParameterAnimator};
pub use audio::AudioFrame;
pub use config::{BeatConfig, EffectConfig, PipelineConfig};
pub use effect::{build_effect, BumpLight, Effect, Mosaic, ZoomFeedback};
pub use error::{FxError, Result};
pub use frame::{FrameBuffer, FramePool, Pixel};
pub use kernel::BlendMode;
pub use pipeline::Pipeline;
pub use timeline::PlaybackClock;
