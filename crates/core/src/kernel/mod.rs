//! Stateless per-pixel primitives shared by every effect.
//!
//! All functions are pure and reentrant. Out-of-range coordinates are clamped
//! to the buffer edges and zero-sized buffers produce empty (or zero-filled)
//! output instead of an error.

mod blend;
mod fixed;
mod lighting;
mod mosaic;
mod sample;

pub use blend::{additive, average, blend_into, BlendMode};
pub use fixed::{FixedStepper, Step, FIXED_ONE, FIXED_SHIFT};
pub use lighting::{apply_delta, bump_light, falloff, lighting_delta, LightingParams};
pub use mosaic::{block_average, edge_aware_sample, mosaic, DEFAULT_EDGE_THRESHOLD};
pub use sample::{
    bilinear, lerp, sample_bilinear, sample_fixed, scale_bilinear, scale_separable, zoom,
};
