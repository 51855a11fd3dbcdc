use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader};
use serde::Serialize;
use std::path::{Path, PathBuf};
use transex::presets::DEFAULT_PRESET;
use transex::{MagnitudeAnalyzer, PresetManager, TransientExtractor};

const WIN_SIZE: usize = 1024;
const HOP_SIZE: usize = 256;
// Frames between trace queue drains
const DRAIN_EVERY: usize = 64;

#[derive(Serialize)]
struct ScanSummary {
    input: String,
    preset: String,
    sample_rate: u32,
    num_bins: usize,
    frames: usize,
    transient_frames: usize,
    peak_transient_bins: usize,
    transient_bins_per_frame: Vec<usize>,
}

fn read_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open WAV '{}'", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<Result<_, _>>()?,
        (SampleFormat::Float, 32) => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        (format, bits) => {
            anyhow::bail!("unsupported WAV format {:?} / {} bits", format, bits)
        }
    };

    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .context("usage: transient_scan <input.wav> [preset]")?;
    let preset = args.next().unwrap_or_else(|| DEFAULT_PRESET.to_string());

    let presets = PresetManager::new();
    let config = presets.get(&preset).with_context(|| {
        format!(
            "unknown preset '{}' (available: {})",
            preset,
            presets.names().join(", ")
        )
    })?;

    let (samples, sample_rate) = read_mono(&input)?;
    log::info!(
        "scanning '{}' ({} samples @ {} Hz) with preset '{}'",
        input.display(),
        samples.len(),
        sample_rate,
        preset
    );

    let mut analyzer = MagnitudeAnalyzer::new(WIN_SIZE, HOP_SIZE);
    let mut extractor = TransientExtractor::new(config)?;
    let mut trace = extractor
        .take_trace()
        .context("trace queue already taken")?;
    let mut per_frame = Vec::with_capacity(samples.len() / HOP_SIZE + 1);

    for &x in &samples {
        if let Some(report) = extractor.process_chain(analyzer.push_sample(x))? {
            per_frame.push(report.transient_bins);
            if per_frame.len() % DRAIN_EVERY == 0 {
                trace.drain_to_log();
            }
        }
    }
    trace.drain_to_log();

    let summary = ScanSummary {
        input: input.display().to_string(),
        preset,
        sample_rate,
        num_bins: analyzer.num_bins(),
        frames: per_frame.len(),
        transient_frames: per_frame.iter().filter(|&&n| n > 0).count(),
        peak_transient_bins: per_frame.iter().copied().max().unwrap_or(0),
        transient_bins_per_frame: per_frame,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
