/// Fractional bits of the 16.16 accumulator.
pub const FIXED_SHIFT: u32 = 16;
/// `1.0` in 16.16 fixed point.
pub const FIXED_ONE: u64 = 1 << FIXED_SHIFT;

/// One destination sample: the source index and an 8-bit interpolation
/// weight towards `index + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub weight: u8,
}

/// Walks `dest_len` samples across `source_len` source samples with a 16.16
/// increment of `(source_len << 16) / dest_len`.
///
/// The integer part of the accumulator never reaches `source_len`, so every
/// yielded index is a valid source index. Either length being zero yields
/// nothing.
#[derive(Debug, Clone)]
pub struct FixedStepper {
    increment: u64,
    acc: u64,
    remaining: usize,
}

impl FixedStepper {
    pub fn new(source_len: usize, dest_len: usize) -> Self {
        if source_len == 0 || dest_len == 0 {
            return Self {
                increment: 0,
                acc: 0,
                remaining: 0,
            };
        }

        Self {
            increment: ((source_len as u64) << FIXED_SHIFT) / dest_len as u64,
            acc: 0,
            remaining: dest_len,
        }
    }

    /// Source distance between two destination samples in 16.16.
    pub fn increment(&self) -> u64 {
        self.increment
    }
}

impl Iterator for FixedStepper {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.remaining == 0 {
            return None;
        }

        let step = Step {
            index: (self.acc >> FIXED_SHIFT) as usize,
            weight: ((self.acc >> 8) & 0xFF) as u8,
        };
        self.acc += self.increment;
        self.remaining -= 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for FixedStepper {}
