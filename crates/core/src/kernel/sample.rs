use super::fixed::{FixedStepper, FIXED_ONE, FIXED_SHIFT};
use crate::frame::{FrameBuffer, Pixel};

/// Bilinear blend of a 2x2 neighbourhood with 8-bit fractional weights.
///
/// `c10` is right of `c00`, `c01` below it and `c11` diagonal. Each channel
/// is `(c00*xw*yw + c10*xp*yw + c01*xw*yp + c11*xp*yp) >> 16` with
/// `xw = 256 - xp` and `yw = 256 - yp`.
pub fn bilinear(c00: Pixel, c10: Pixel, c01: Pixel, c11: Pixel, xp: u8, yp: u8) -> Pixel {
    let xp = u32::from(xp);
    let yp = u32::from(yp);
    let xw = 256 - xp;
    let yw = 256 - yp;

    let (p00, p10, p01, p11) = (c00.channels(), c10.channels(), c01.channels(), c11.channels());
    let mut out = [0u8; 4];
    for (channel, value) in out.iter_mut().enumerate() {
        let sum = u32::from(p00[channel]) * xw * yw
            + u32::from(p10[channel]) * xp * yw
            + u32::from(p01[channel]) * xw * yp
            + u32::from(p11[channel]) * xp * yp;
        *value = (sum >> 16).min(255) as u8;
    }
    Pixel::from_channels(out)
}

/// Linear blend of two pixels, `weight` of 0 returns `p0`.
pub fn lerp(p0: Pixel, p1: Pixel, weight: u8) -> Pixel {
    let w = u32::from(weight);
    let (a, b) = (p0.channels(), p1.channels());
    let mut out = [0u8; 4];
    for (channel, value) in out.iter_mut().enumerate() {
        let mixed = u32::from(a[channel]) * (256 - w) + u32::from(b[channel]) * w;
        *value = (mixed >> 8).min(255) as u8;
    }
    Pixel::from_channels(out)
}

/// Bilinear sample at `(x + xp/256, y + yp/256)`. Neighbours beyond the last
/// row or column replicate the edge pixel; `(x, y)` itself is clamped.
pub fn sample_bilinear(src: &FrameBuffer, x: usize, y: usize, xp: u8, yp: u8) -> Pixel {
    if src.is_empty() {
        return Pixel::TRANSPARENT;
    }

    let (width, height) = src.dimensions();
    let x0 = x.min(width - 1);
    let y0 = y.min(height - 1);
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let top = src.row(y0);
    let bottom = src.row(y1);
    bilinear(top[x0], top[x1], bottom[x0], bottom[x1], xp, yp)
}

/// Bilinear sample at 16.16 fixed-point coordinates. Negative coordinates
/// clamp to the first row/column.
pub fn sample_fixed(src: &FrameBuffer, fx: i64, fy: i64) -> Pixel {
    let fx = fx.max(0) as u64;
    let fy = fy.max(0) as u64;
    sample_bilinear(
        src,
        (fx >> FIXED_SHIFT) as usize,
        (fy >> FIXED_SHIFT) as usize,
        ((fx >> 8) & 0xFF) as u8,
        ((fy >> 8) & 0xFF) as u8,
    )
}

/// Resamples `src` to `width x height` with a horizontal then a vertical
/// fixed-point pass.
pub fn scale_separable(src: &FrameBuffer, width: usize, height: usize) -> FrameBuffer {
    if src.is_empty() {
        return FrameBuffer::new(width, height);
    }
    let (src_width, src_height) = src.dimensions();

    let mut rows = Vec::with_capacity(width * src_height);
    for y in 0..src_height {
        let row = src.row(y);
        for step in FixedStepper::new(src_width, width) {
            let next = (step.index + 1).min(src_width - 1);
            rows.push(lerp(row[step.index], row[next], step.weight));
        }
    }

    let mut out = vec![Pixel::TRANSPARENT; width * height];
    for (dy, step) in FixedStepper::new(src_height, height).enumerate() {
        let next = (step.index + 1).min(src_height - 1);
        let top = &rows[step.index * width..(step.index + 1) * width];
        let bottom = &rows[next * width..(next + 1) * width];
        for (dx, slot) in out[dy * width..(dy + 1) * width].iter_mut().enumerate() {
            *slot = lerp(top[dx], bottom[dx], step.weight);
        }
    }

    FrameBuffer::from_parts(width, height, out)
}

/// Resamples `src` to `width x height` with direct 2D bilinear sampling.
pub fn scale_bilinear(src: &FrameBuffer, width: usize, height: usize) -> FrameBuffer {
    if src.is_empty() {
        return FrameBuffer::new(width, height);
    }

    let columns: Vec<_> = FixedStepper::new(src.width(), width).collect();
    let rows: Vec<_> = FixedStepper::new(src.height(), height).collect();
    FrameBuffer::from_fn(width, height, |x, y| {
        let (sx, sy) = (columns[x], rows[y]);
        sample_bilinear(src, sx.index, sy.index, sx.weight, sy.weight)
    })
}

/// Magnifies the centre of `src` by `factor`, keeping its dimensions.
/// Factors below `1.0` shrink the image and replicate its edges. A
/// non-positive or non-finite factor returns an unscaled copy.
pub fn zoom(src: &FrameBuffer, factor: f32) -> FrameBuffer {
    if src.is_empty() || !factor.is_finite() || factor <= 0.0 || factor == 1.0 {
        return src.clone();
    }
    let (width, height) = src.dimensions();

    let axis = |len: usize| -> (i64, i64) {
        let full = (len as u64 * FIXED_ONE) as f64;
        let span = full / f64::from(factor);
        let increment = (span / len as f64) as i64;
        let origin = ((full - span) / 2.0) as i64;
        (origin, increment)
    };
    let (origin_x, step_x) = axis(width);
    let (origin_y, step_y) = axis(height);

    FrameBuffer::from_fn(width, height, |x, y| {
        sample_fixed(
            src,
            origin_x + x as i64 * step_x,
            origin_y + y as i64 * step_y,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> FrameBuffer {
        FrameBuffer::from_fn(width, height, |x, y| {
            Pixel::from_argb(
                255,
                (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8,
                (y * 255 / height.max(2).saturating_sub(1)).min(255) as u8,
                ((x * 37 + y * 91) % 256) as u8,
            )
        })
    }

    fn max_channel_difference(a: &FrameBuffer, b: &FrameBuffer) -> u8 {
        a.pixels()
            .iter()
            .zip(b.pixels())
            .flat_map(|(p, q)| {
                p.channels()
                    .into_iter()
                    .zip(q.channels())
                    .map(|(c, d)| c.abs_diff(d))
            })
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn bilinear_weights_corners() {
        let (a, b, c, d) = (
            Pixel::rgb(0, 0, 0),
            Pixel::rgb(255, 0, 0),
            Pixel::rgb(0, 255, 0),
            Pixel::rgb(0, 0, 255),
        );
        assert_eq!(bilinear(a, b, c, d, 0, 0), a);
        let centre = bilinear(a, b, c, d, 128, 128);
        assert_eq!(centre, Pixel::from_argb(255, 63, 63, 63));
    }

    #[test]
    fn bilinear_of_uniform_neighbourhood_is_exact() {
        let p = Pixel::from_argb(200, 255, 1, 77);
        for weight in [0u8, 1, 127, 255] {
            assert_eq!(bilinear(p, p, p, p, weight, 255 - weight), p);
        }
    }

    #[test]
    fn edge_samples_replicate_and_stay_in_bounds() {
        let frame = gradient(5, 4);
        let corner = frame.get(4, 3).unwrap();
        assert_eq!(sample_bilinear(&frame, 4, 3, 0, 0), corner);
        assert_eq!(sample_bilinear(&frame, 4, 3, 255, 255), corner);
        assert_eq!(sample_bilinear(&frame, 40, 30, 9, 9), corner);

        let last_column = frame.get(4, 1).unwrap();
        assert_eq!(sample_bilinear(&frame, 4, 1, 200, 0), last_column);
        let last_row = frame.get(2, 3).unwrap();
        assert_eq!(sample_bilinear(&frame, 2, 3, 0, 200), last_row);
    }

    #[test]
    fn fixed_coordinates_match_integer_sampling() {
        let frame = gradient(6, 6);
        let fx = (2 << 16) + (64 << 8);
        let fy = 3 << 16;
        assert_eq!(sample_fixed(&frame, fx, fy), sample_bilinear(&frame, 2, 3, 64, 0));
        assert_eq!(sample_fixed(&frame, -100, -100), frame.get(0, 0).unwrap());
    }

    #[test]
    fn separable_scaling_matches_direct_bilinear() {
        let src = gradient(13, 9);
        for (width, height) in [(13, 9), (31, 22), (5, 4), (20, 3)] {
            let separable = scale_separable(&src, width, height);
            let direct = scale_bilinear(&src, width, height);
            assert_eq!(separable.dimensions(), (width, height));
            assert!(
                max_channel_difference(&separable, &direct) <= 1,
                "{width}x{height} diverged"
            );
        }
    }

    #[test]
    fn identity_scale_is_lossless() {
        let src = gradient(8, 8);
        assert_eq!(scale_separable(&src, 8, 8), src);
        assert_eq!(scale_bilinear(&src, 8, 8), src);
    }

    #[test]
    fn zero_sized_buffers_are_noops() {
        let empty = FrameBuffer::new(0, 0);
        assert_eq!(scale_separable(&empty, 3, 2), FrameBuffer::new(3, 2));
        assert_eq!(scale_bilinear(&empty, 3, 2), FrameBuffer::new(3, 2));
        assert!(scale_separable(&gradient(4, 4), 0, 0).is_empty());
        assert!(zoom(&empty, 2.0).is_empty());
        assert_eq!(sample_bilinear(&empty, 0, 0, 0, 0), Pixel::TRANSPARENT);
    }

    #[test]
    fn zoom_magnifies_the_centre() {
        let src = FrameBuffer::from_fn(8, 8, |x, y| {
            if (2..6).contains(&x) && (2..6).contains(&y) {
                Pixel::WHITE
            } else {
                Pixel::BLACK
            }
        });

        let zoomed = zoom(&src, 2.0);
        assert_eq!(zoomed.dimensions(), (8, 8));
        assert_eq!(zoomed.get(0, 0), Some(Pixel::WHITE));
        assert_eq!(zoomed.get(6, 6), Some(Pixel::WHITE));
        assert_ne!(zoomed.get(7, 7), Some(Pixel::BLACK));

        assert_eq!(zoom(&src, 1.0), src);
        assert_eq!(zoom(&src, f32::NAN), src);
        assert_eq!(zoom(&src, 0.0), src);
    }
}
