use crate::frame::{FrameBuffer, Pixel};

/// Largest brightness change a single light can apply to a channel.
const MAX_DELTA: f32 = 127.0;

/// Knobs for [`bump_light`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingParams {
    /// Surface relief in `[0, 1]`.
    pub depth: f32,
    /// Signed light strength in `[-1, 1]`; negative values darken.
    pub intensity: f32,
    /// Treat dark pixels as raised instead of bright ones.
    pub invert: bool,
    /// Distance in pixels that normalizes to `1.0`. `None` uses the frame
    /// diagonal.
    pub radius: Option<f32>,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            depth: 1.0,
            intensity: 1.0,
            invert: false,
            radius: None,
        }
    }
}

/// Linear falloff reaching zero at half the normalizing distance.
pub fn falloff(normalized_distance: f32) -> f32 {
    if !normalized_distance.is_finite() {
        return 0.0;
    }
    (1.0 - 2.0 * normalized_distance).max(0.0)
}

/// Signed per-channel delta in `[-127, 127]` for a pixel of the given
/// height.
pub fn lighting_delta(
    height: u8,
    invert: bool,
    normalized_distance: f32,
    depth: f32,
    intensity: f32,
) -> i32 {
    let mut height = f32::from(height) / 255.0;
    if invert {
        height = 1.0 - height;
    }
    let depth = if depth.is_finite() { depth.clamp(0.0, 1.0) } else { 0.0 };
    let intensity = if intensity.is_finite() {
        intensity.clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let value = height * depth * falloff(normalized_distance) * intensity;
    (value * MAX_DELTA).round().clamp(-MAX_DELTA, MAX_DELTA) as i32
}

/// Adds `delta` to the colour channels with saturation. Alpha is kept.
pub fn apply_delta(pixel: Pixel, delta: i32) -> Pixel {
    let shift = |channel: u8| (i32::from(channel) + delta).clamp(0, 255) as u8;
    Pixel::from_argb(pixel.a(), shift(pixel.r()), shift(pixel.g()), shift(pixel.b()))
}

/// Lights `src` from a point light at `light` (pixel coordinates).
pub fn bump_light(src: &FrameBuffer, light: (f32, f32), params: LightingParams) -> FrameBuffer {
    if src.is_empty() {
        return src.clone();
    }
    let (width, height) = src.dimensions();
    let radius = params
        .radius
        .filter(|radius| radius.is_finite() && *radius > 0.0)
        .unwrap_or_else(|| (width as f32).hypot(height as f32));

    FrameBuffer::from_fn(width, height, |x, y| {
        let pixel = src.row(y)[x];
        let distance = (x as f32 - light.0).hypot(y as f32 - light.1) / radius;
        let delta = lighting_delta(
            pixel.height(),
            params.invert,
            distance,
            params.depth,
            params.intensity,
        );
        apply_delta(pixel, delta)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falloff_is_linear_to_half_distance() {
        assert_eq!(falloff(0.0), 1.0);
        assert!((falloff(0.25) - 0.5).abs() < 1e-6);
        assert_eq!(falloff(0.5), 0.0);
        assert_eq!(falloff(0.9), 0.0);
        assert_eq!(falloff(f32::NAN), 0.0);
    }

    #[test]
    fn delta_peaks_at_the_light() {
        assert_eq!(lighting_delta(255, false, 0.0, 1.0, 1.0), 127);
        assert_eq!(lighting_delta(255, false, 0.0, 1.0, -1.0), -127);
        assert_eq!(lighting_delta(0, true, 0.0, 1.0, 1.0), 127);
        assert_eq!(lighting_delta(0, false, 0.0, 1.0, 1.0), 0);
        assert_eq!(lighting_delta(255, false, 0.5, 1.0, 1.0), 0);
        assert_eq!(lighting_delta(255, false, 0.25, 1.0, 1.0), 64);
        assert_eq!(lighting_delta(255, false, 0.0, 4.0, 9.0), 127);
    }

    #[test]
    fn delta_saturates_and_keeps_alpha() {
        let pixel = Pixel::from_argb(40, 250, 10, 128);
        assert_eq!(apply_delta(pixel, 127), Pixel::from_argb(40, 255, 137, 255));
        assert_eq!(apply_delta(pixel, -127), Pixel::from_argb(40, 123, 0, 1));
    }

    #[test]
    fn far_pixels_are_untouched() {
        let frame = FrameBuffer::filled(20, 20, Pixel::rgb(200, 200, 200));
        let lit = bump_light(&frame, (0.0, 0.0), LightingParams::default());

        assert!(lit.get(0, 0).unwrap().r() > 200);
        // Diagonal is ~28.3px, so the falloff ends around 14.1px from the light.
        assert_eq!(lit.get(19, 19), Some(Pixel::rgb(200, 200, 200)));
        assert_eq!(lit.get(15, 0), Some(Pixel::rgb(200, 200, 200)));
    }

    #[test]
    fn explicit_radius_overrides_the_diagonal() {
        let frame = FrameBuffer::filled(10, 1, Pixel::WHITE);
        let params = LightingParams {
            intensity: -1.0,
            radius: Some(4.0),
            ..LightingParams::default()
        };
        let lit = bump_light(&frame, (0.0, 0.0), params);
        assert_eq!(lit.get(0, 0), Some(Pixel::rgb(128, 128, 128)));
        assert_eq!(lit.get(2, 0), Some(Pixel::WHITE));
    }
}
