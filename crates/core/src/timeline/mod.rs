/// Stream position accumulated from per-frame deltas.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlaybackClock {
    pub time_seconds: f64,
    pub frames: u64,
}

impl PlaybackClock {
    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
        self.frames = 0;
    }

    /// Counts one frame. Negative or non-finite deltas do not move time.
    pub fn advance(&mut self, delta: f32) {
        if delta.is_finite() && delta > 0.0 {
            self.time_seconds += f64::from(delta);
        }
        self.frames += 1;
    }
}
