mod synth;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use pulsefx_core::{FramePool, Pipeline, PipelineConfig};
use tracing_subscriber::EnvFilter;

use synth::{gradient, PulseSynth};

/// Per-frame budget at 60 Hz.
const FRAME_BUDGET: Duration = Duration::from_micros(16_667);
/// Spectrum bins produced by the synthesizer.
const SPECTRUM_BINS: usize = 512;

fn main() -> pulsefx_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            config,
            bpm,
            seconds,
            fps,
        } => run_demo(config.as_deref(), bpm, seconds, fps),
        Commands::Bench {
            config,
            frames,
            width,
            height,
        } => run_bench(config.as_deref(), frames, width, height),
    }
}

fn load_config(path: Option<&Path>) -> pulsefx_core::Result<PipelineConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading pipeline configuration");
            PipelineConfig::load(path)
        }
        None => Ok(PipelineConfig::live_defaults()),
    }
}

fn run_demo(config: Option<&Path>, bpm: f32, seconds: f32, fps: u32) -> pulsefx_core::Result<()> {
    let config = load_config(config)?;
    let mut pipeline = Pipeline::from_config(&config);
    let effects: Vec<_> = pipeline.effect_names().collect();
    tracing::info!(bpm, seconds, fps, ?effects, "starting demo");

    let fps = fps.max(1);
    let dt = 1.0 / fps as f32;
    let total_frames = (seconds.max(0.0) * fps as f32).round() as u64;
    let source = gradient(320, 180);
    let mut synth = PulseSynth::new(bpm, SPECTRUM_BINS);
    let mut beats = 0u64;

    for frame in 0..total_frames {
        let audio = synth.next_frame(dt);
        let output = pipeline.process(source.clone(), &audio, dt);
        let state = pipeline.beat_state();
        if state.is_beat {
            beats += 1;
        }

        if frame % u64::from(fps) == 0 {
            tracing::info!(
                time = synth.time(),
                bpm = state.bpm,
                confidence = state.confidence,
                phase = state.beat_phase,
                width = output.width(),
                "tempo"
            );
        }
    }

    let state = pipeline.beat_state();
    tracing::info!(
        beats,
        bpm = state.bpm,
        confidence = state.confidence,
        "demo finished"
    );
    Ok(())
}

fn run_bench(
    config: Option<&Path>,
    frames: u32,
    width: usize,
    height: usize,
) -> pulsefx_core::Result<()> {
    let config = load_config(config)?;
    let mut pipeline = Pipeline::from_config(&config);
    tracing::info!(frames, width, height, effects = pipeline.len(), "starting benchmark");

    let dt = 1.0 / 60.0;
    let source = gradient(width, height);
    let mut synth = PulseSynth::new(128.0, SPECTRUM_BINS);
    let mut pool = FramePool::default();
    let mut total = Duration::ZERO;
    let mut worst = Duration::ZERO;
    let mut over_budget = 0u32;

    for _ in 0..frames {
        let audio = synth.next_frame(dt);
        let mut input = pool.acquire(width, height);
        input.pixels_mut().copy_from_slice(source.pixels());

        let started = Instant::now();
        let output = pipeline.process(input, &audio, dt);
        let elapsed = started.elapsed();

        pool.release(output);
        total += elapsed;
        worst = worst.max(elapsed);
        if elapsed > FRAME_BUDGET {
            over_budget += 1;
        }
    }

    let mean = total / frames.max(1);
    tracing::info!(
        mean_ms = mean.as_secs_f64() * 1e3,
        max_ms = worst.as_secs_f64() * 1e3,
        budget_ms = FRAME_BUDGET.as_secs_f64() * 1e3,
        over_budget,
        "benchmark finished"
    );
    if mean > FRAME_BUDGET {
        tracing::warn!("mean frame time exceeds the 60 Hz budget");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-reactive effect pipeline driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pipeline on a synthetic beat and log the tempo estimate.
    Demo {
        /// Pipeline configuration (JSON). Defaults to the live preset.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Tempo of the synthesized pulse.
        #[arg(long, default_value_t = 120.0)]
        bpm: f32,
        /// Length of the run in seconds.
        #[arg(long, default_value_t = 8.0)]
        seconds: f32,
        /// Frames per second.
        #[arg(long, default_value_t = 60)]
        fps: u32,
    },
    /// Measure per-frame processing time against the 60 Hz budget.
    Bench {
        /// Pipeline configuration (JSON). Defaults to the live preset.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to process.
        #[arg(long, default_value_t = 600)]
        frames: u32,
        #[arg(long, default_value_t = 640)]
        width: usize,
        #[arg(long, default_value_t = 360)]
        height: usize,
    },
}
