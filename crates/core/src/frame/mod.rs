use crate::{FxError, Result};

/// Packed 32-bit ARGB colour sample (`0xAARRGGBB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Pixel(pub u32);

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel(0);
    pub const BLACK: Pixel = Pixel(0xFF00_0000);
    pub const WHITE: Pixel = Pixel(0xFFFF_FFFF);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    /// Channels in `[a, r, g, b]` order.
    pub const fn from_channels(channels: [u8; 4]) -> Self {
        Self::from_argb(channels[0], channels[1], channels[2], channels[3])
    }

    /// Channels in `[a, r, g, b]` order.
    pub const fn channels(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Brightest colour channel, used as the surface height by bump lighting.
    pub fn height(self) -> u8 {
        self.r().max(self.g()).max(self.b())
    }
}

impl From<u32> for Pixel {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Pixel> for u32 {
    fn from(value: Pixel) -> Self {
        value.0
    }
}

/// Row-major grid of packed pixels.
///
/// Buffers are moved between effects by value. An effect that needs to read
/// its input while writing an output allocates (or borrows from a
/// [`FramePool`]) a second buffer instead of aliasing the first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl FrameBuffer {
    /// Creates a transparent black buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Pixel::TRANSPARENT)
    }

    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width * height],
        }
    }

    /// Wraps caller-provided pixel data, which must hold exactly
    /// `width * height` samples.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self> {
        if width.checked_mul(height) != Some(pixels.len()) {
            return Err(FxError::Dimensions {
                width,
                height,
                len: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Callers guarantee `pixels.len() == width * height`.
    pub(crate) fn from_parts(width: usize, height: usize, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Pixel) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// True when the buffer has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn same_dimensions(&self, other: &FrameBuffer) -> bool {
        self.dimensions() == other.dimensions()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    pub fn row(&self, y: usize) -> &[Pixel] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Reads a pixel with coordinates clamped to the buffer edges. An empty
    /// buffer yields [`Pixel::TRANSPARENT`].
    pub fn get_clamped(&self, x: isize, y: isize) -> Pixel {
        if self.is_empty() {
            return Pixel::TRANSPARENT;
        }
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.pixels[y * self.width + x]
    }

    /// Writes a pixel; coordinates outside the buffer are ignored.
    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = pixel;
        }
    }

    pub fn fill(&mut self, pixel: Pixel) {
        self.pixels.fill(pixel);
    }
}

/// Recycles frame allocations between frames.
///
/// Ownership makes reuse safe: a buffer only comes back to the pool when its
/// consumer hands it over through [`FramePool::release`].
#[derive(Debug)]
pub struct FramePool {
    free: Vec<FrameBuffer>,
    max_buffers: usize,
}

impl Default for FramePool {
    fn default() -> Self {
        Self::new(8)
    }
}

impl FramePool {
    pub fn new(max_buffers: usize) -> Self {
        Self {
            free: Vec::with_capacity(max_buffers),
            max_buffers,
        }
    }

    /// Returns a transparent buffer of the requested size, reusing a released
    /// allocation when one matches.
    pub fn acquire(&mut self, width: usize, height: usize) -> FrameBuffer {
        match self
            .free
            .iter()
            .position(|buffer| buffer.dimensions() == (width, height))
        {
            Some(index) => {
                let mut buffer = self.free.swap_remove(index);
                buffer.fill(Pixel::TRANSPARENT);
                buffer
            }
            None => FrameBuffer::new(width, height),
        }
    }

    /// Hands a buffer back for reuse. Empty buffers and buffers beyond the
    /// pool capacity are dropped.
    pub fn release(&mut self, buffer: FrameBuffer) {
        if !buffer.is_empty() && self.free.len() < self.max_buffers {
            self.free.push(buffer);
        }
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }
}
