use pulsefx_core::{AudioFrame, FrameBuffer, Pixel};

/// Spectrum level between onsets.
const FLOOR: f32 = 0.2;
/// Spectrum level on the onset frame.
const PEAK: f32 = 1.0;
/// Envelope decay per second after an onset.
const DECAY: f32 = 18.0;

/// Generates kick-like spectra at a fixed tempo.
#[derive(Debug, Clone)]
pub struct PulseSynth {
    bins: usize,
    period: f64,
    time: f64,
    since_onset: f64,
}

impl PulseSynth {
    pub fn new(bpm: f32, bins: usize) -> Self {
        let bpm = if bpm.is_finite() && bpm > 0.0 { bpm } else { 120.0 };
        let period = 60.0 / f64::from(bpm);
        Self {
            bins: bins.max(4),
            period,
            time: 0.0,
            // First call lands on an onset.
            since_onset: period,
        }
    }

    /// Spectrum for the next frame, `dt` seconds after the previous one.
    pub fn next_frame(&mut self, dt: f32) -> AudioFrame {
        let onset = self.since_onset >= self.period;
        if onset {
            self.since_onset -= self.period;
        }

        let level = if onset {
            PEAK
        } else {
            FLOOR + (PEAK - FLOOR) * 0.25 * (-DECAY * self.since_onset as f32).exp()
        };
        let bins = self.bins as f32;
        let spectrum = (0..self.bins)
            .map(|bin| level * (1.0 - 0.5 * bin as f32 / bins))
            .collect();

        let dt = f64::from(dt.max(0.0));
        self.time += dt;
        self.since_onset += dt;
        AudioFrame::from_spectrum(spectrum)
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

/// Diagonal RGB gradient used as the source image.
pub fn gradient(width: usize, height: usize) -> FrameBuffer {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    FrameBuffer::from_fn(width, height, |x, y| {
        Pixel::rgb(
            (x as f32 / w * 255.0) as u8,
            (y as f32 / h * 255.0) as u8,
            ((x + y) as f32 / (w + h) * 255.0) as u8,
        )
    })
}
