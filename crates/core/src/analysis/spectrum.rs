use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

/// Magnitude spectrum helper for hosts that only deliver waveform samples.
///
/// Plans are cached and rebuilt only when the block size changes.
pub struct SpectrumAnalyzer {
    planner: RealFftPlanner<f32>,
    fft: Option<FftResources>,
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::new(),
            fft: None,
        }
    }

    /// Hann-windowed magnitude spectrum of `samples`, `len / 2 + 1` bins
    /// scaled so a full-scale sine peaks near `1.0`.
    ///
    /// Blocks shorter than two samples produce an empty spectrum.
    pub fn magnitudes(&mut self, samples: &[f32]) -> Vec<f32> {
        let len = samples.len();
        if len < 2 {
            return Vec::new();
        }

        let fft = self.prepare_fft(len);
        for (index, (slot, sample)) in fft.input.iter_mut().zip(samples).enumerate() {
            let sample = if sample.is_finite() { *sample } else { 0.0 };
            *slot = sample * hann_value(index, len);
        }

        if let Err(err) = fft
            .plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)
        {
            tracing::warn!(%err, len, "spectrum analysis failed");
            return Vec::new();
        }

        // A Hann window halves the coherent gain.
        let scale = 4.0 / len as f32;
        fft.spectrum.iter().map(|bin| bin.norm() * scale).collect()
    }

    fn prepare_fft(&mut self, size: usize) -> &mut FftResources {
        let fft = match self.fft.take() {
            Some(fft) if fft.size == size => fft,
            _ => {
                let plan = self.planner.plan_fft_forward(size);
                FftResources {
                    size,
                    scratch: plan.make_scratch_vec(),
                    spectrum: plan.make_output_vec(),
                    input: plan.make_input_vec(),
                    plan,
                }
            }
        };

        self.fft.insert(fft)
    }
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
}

impl fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("fft", &self.fft)
            .finish()
    }
}

impl fmt::Debug for FftResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftResources")
            .field("size", &self.size)
            .finish()
    }
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}
