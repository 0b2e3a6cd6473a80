use serde::{Deserialize, Serialize};

use crate::frame::{FrameBuffer, Pixel};

/// Channel combination operator selected per effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source overwrites destination.
    #[default]
    Replace,
    /// Per-channel saturating add.
    Additive,
    /// Per-channel average, rounding down.
    Average,
}

impl BlendMode {
    pub fn apply(self, dst: Pixel, src: Pixel) -> Pixel {
        match self {
            BlendMode::Replace => src,
            BlendMode::Additive => additive(dst, src),
            BlendMode::Average => average(dst, src),
        }
    }
}

pub fn additive(a: Pixel, b: Pixel) -> Pixel {
    combine(a, b, u8::saturating_add)
}

pub fn average(a: Pixel, b: Pixel) -> Pixel {
    combine(a, b, |x, y| ((u16::from(x) + u16::from(y)) >> 1) as u8)
}

/// Blends `src` over `dst` in place. Buffers of different dimensions leave
/// `dst` untouched and return `false`.
pub fn blend_into(dst: &mut FrameBuffer, src: &FrameBuffer, mode: BlendMode) -> bool {
    if !dst.same_dimensions(src) {
        return false;
    }

    for (out, incoming) in dst.pixels_mut().iter_mut().zip(src.pixels()) {
        *out = mode.apply(*out, *incoming);
    }
    true
}

fn combine(a: Pixel, b: Pixel, op: impl Fn(u8, u8) -> u8) -> Pixel {
    let (a, b) = (a.channels(), b.channels());
    Pixel::from_channels([
        op(a[0], b[0]),
        op(a[1], b[1]),
        op(a[2], b[2]),
        op(a[3], b[3]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_saturates_instead_of_wrapping() {
        for other in [
            Pixel::from_argb(1, 1, 1, 1),
            Pixel::from_argb(255, 0, 128, 7),
            Pixel::WHITE,
            Pixel::from_argb(0, 0, 0, 1),
        ] {
            assert_eq!(additive(Pixel::WHITE, other), Pixel::WHITE);
            assert_eq!(additive(other, Pixel::WHITE), Pixel::WHITE);
        }

        let (a, b) = (Pixel::from_argb(200, 100, 10, 0), Pixel::from_argb(100, 100, 10, 0));
        assert_eq!(additive(a, b), Pixel::from_argb(255, 200, 20, 0));
    }

    #[test]
    fn average_rounds_down() {
        let avg = average(Pixel::from_argb(255, 0, 3, 10), Pixel::from_argb(0, 255, 4, 10));
        assert_eq!(avg, Pixel::from_argb(127, 127, 3, 10));
    }

    #[test]
    fn replace_takes_the_source() {
        let src = Pixel::rgb(1, 2, 3);
        assert_eq!(BlendMode::Replace.apply(Pixel::WHITE, src), src);
    }

    #[test]
    fn mismatched_buffers_are_left_alone() {
        let mut dst = FrameBuffer::filled(2, 2, Pixel::BLACK);
        let src = FrameBuffer::filled(3, 2, Pixel::WHITE);
        assert!(!blend_into(&mut dst, &src, BlendMode::Replace));
        assert_eq!(dst, FrameBuffer::filled(2, 2, Pixel::BLACK));

        let src = FrameBuffer::filled(2, 2, Pixel::rgb(10, 10, 10));
        assert!(blend_into(&mut dst, &src, BlendMode::Additive));
        assert!(dst.pixels().iter().all(|p| *p == Pixel::rgb(10, 10, 10)));
    }

    #[test]
    fn parses_snake_case_names() {
        let mode: BlendMode = serde_json::from_str("\"average\"").unwrap();
        assert_eq!(mode, BlendMode::Average);
    }
}
