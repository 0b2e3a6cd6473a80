use crate::frame::{FrameBuffer, Pixel};

/// Per-channel difference above which a neighbour counts as an edge.
pub const DEFAULT_EDGE_THRESHOLD: u8 = 30;

/// Mean of the `block x block` cell whose top-left corner is `(x0, y0)`,
/// truncated to the buffer.
pub fn block_average(src: &FrameBuffer, x0: usize, y0: usize, block: usize) -> Pixel {
    let (width, height) = src.dimensions();
    let x1 = x0.saturating_add(block.max(1)).min(width);
    let y1 = y0.saturating_add(block.max(1)).min(height);
    if x0 >= x1 || y0 >= y1 {
        return Pixel::TRANSPARENT;
    }

    let mut sums = [0u64; 4];
    for y in y0..y1 {
        for pixel in &src.row(y)[x0..x1] {
            for (sum, channel) in sums.iter_mut().zip(pixel.channels()) {
                *sum += u64::from(channel);
            }
        }
    }

    let count = ((x1 - x0) * (y1 - y0)) as u64;
    Pixel::from_channels(sums.map(|sum| (sum / count) as u8))
}

/// Returns `candidate` unless one of the 4-neighbours of `(x, y)` differs
/// from it by more than `threshold` on any colour channel, in which case the
/// true source pixel is returned. Alpha is not compared and neighbours
/// outside the buffer are skipped.
pub fn edge_aware_sample(
    src: &FrameBuffer,
    x: usize,
    y: usize,
    candidate: Pixel,
    threshold: u8,
) -> Pixel {
    let Some(original) = src.get(x, y) else {
        return candidate;
    };

    let neighbours = [
        x.checked_sub(1).and_then(|left| src.get(left, y)),
        src.get(x + 1, y),
        y.checked_sub(1).and_then(|up| src.get(x, up)),
        src.get(x, y + 1),
    ];
    let is_edge = neighbours.into_iter().flatten().any(|neighbour| {
        neighbour.r().abs_diff(candidate.r()) > threshold
            || neighbour.g().abs_diff(candidate.g()) > threshold
            || neighbour.b().abs_diff(candidate.b()) > threshold
    });

    if is_edge {
        original
    } else {
        candidate
    }
}

/// Replaces each `block_size` cell with its average colour. With an
/// `edge_threshold`, pixels sitting on a hard edge keep their source value.
pub fn mosaic(src: &FrameBuffer, block_size: usize, edge_threshold: Option<u8>) -> FrameBuffer {
    if block_size <= 1 || src.is_empty() {
        return src.clone();
    }
    let (width, height) = src.dimensions();
    let blocks_x = width.div_ceil(block_size);

    let mut averages = Vec::with_capacity(blocks_x * height.div_ceil(block_size));
    for by in (0..height).step_by(block_size) {
        for bx in (0..width).step_by(block_size) {
            averages.push(block_average(src, bx, by, block_size));
        }
    }

    FrameBuffer::from_fn(width, height, |x, y| {
        let average = averages[(y / block_size) * blocks_x + x / block_size];
        match edge_threshold {
            Some(threshold) => edge_aware_sample(src, x, y, average, threshold),
            None => average,
        }
    })
}
