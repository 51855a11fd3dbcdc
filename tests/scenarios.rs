//! End-to-end behaviour through the public API.

use transex::dsp::utils::FLOOR_EPSILON;
use transex::{
    ExtractorConfig, MagnitudeAnalyzer, RunEndPolicy, TransientError, TransientExtractor,
};

fn test_frames(count: usize, bins: usize) -> Vec<Vec<f32>> {
    // Deterministic pseudo-random magnitudes with occasional bursts and silent bins
    let mut state = 0x2545_f491u32;
    (0..count)
        .map(|f| {
            (0..bins)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 17;
                    state ^= state << 5;
                    let base = (state % 1000) as f32 / 1000.0;
                    if state % 11 == 0 {
                        0.0
                    } else if f % 7 == 3 {
                        base * 8.0
                    } else {
                        base
                    }
                })
                .collect()
        })
        .collect()
}

fn config(extract: bool) -> ExtractorConfig {
    ExtractorConfig::new()
        .with_history_depth(3)
        .with_omega_depth(5)
        .with_min_run_length(2)
        .with_threshold(1.5)
        .with_release_decay(0.8)
        .with_low_freq_cut_bin(3)
        .with_extract(extract)
}

#[test]
fn test_output_is_deterministic() {
    let frames = test_frames(40, 32);
    let run = || {
        let mut ex = TransientExtractor::new(config(true)).expect("valid config");
        frames
            .iter()
            .map(|f| {
                let mut f = f.clone();
                ex.process_frame(&mut f).expect("frame");
                f.iter().map(|v| v.to_bits()).collect::<Vec<u32>>()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_bins_below_cutoff() {
    let frames = test_frames(30, 16);
    let mut extract = TransientExtractor::new(config(true)).expect("valid config");
    let mut residual = TransientExtractor::new(config(false)).expect("valid config");
    for input in &frames {
        let mut a = input.clone();
        let mut b = input.clone();
        extract.process_frame(&mut a).expect("frame");
        residual.process_frame(&mut b).expect("frame");
        assert!(a[..3].iter().all(|&v| v == 0.0));
        assert_eq!(&b[..3], &input[..3]);
    }
}

#[test]
fn test_extract_and_residual_are_complementary() {
    let frames = test_frames(50, 24);
    let mut extract = TransientExtractor::new(config(true)).expect("valid config");
    let mut residual = TransientExtractor::new(config(false)).expect("valid config");
    let mut saw_transient = false;
    for input in &frames {
        let mut a = input.clone();
        let mut b = input.clone();
        let ra = extract.process_frame(&mut a).expect("frame");
        let rb = residual.process_frame(&mut b).expect("frame");
        // Mode does not feed back into detection
        assert_eq!(ra.transient_bins, rb.transient_bins);
        saw_transient |= ra.transient_bins > 0;
        for k in 3..input.len() {
            let tol = 1e-5 * input[k].max(1.0);
            assert!(
                (a[k] + b[k] - input[k]).abs() < tol,
                "bin {k}: {} + {} != {}",
                a[k],
                b[k],
                input[k]
            );
        }
    }
    assert!(saw_transient);
}

#[test]
fn test_envelope_bounds() {
    let cfg = config(true);
    let frames = test_frames(60, 20);
    let mut ex = TransientExtractor::new(cfg).expect("valid config");
    let mut prev = vec![1.0f32; 20];
    for input in &frames {
        let mut f = input.clone();
        ex.process_frame(&mut f).expect("frame");
        let env = ex.release_envelope();
        let flags = ex.transient_flags();
        for k in 3..20 {
            let released = (cfg.release_decay * prev[k]).max(FLOOR_EPSILON);
            assert!(env[k] >= FLOOR_EPSILON);
            if flags[k] {
                // Attack can only pull the envelope further down
                assert!(env[k] <= released);
            } else {
                assert_eq!(env[k], released);
            }
        }
        prev.copy_from_slice(env);
    }
}

#[test]
fn test_run_length_gating() {
    // I = 1 makes each average equal to its frame, so frame 2 is tested
    // against a flat baseline of 1.0.
    let cfg = ExtractorConfig::new()
        .with_history_depth(1)
        .with_omega_depth(2)
        .with_min_run_length(3)
        .with_threshold(1.0)
        .with_release_decay(0.5);
    let mut ex = TransientExtractor::new(cfg).expect("valid config");
    let mut first = [1.0f32; 8];
    ex.process_frame(&mut first).expect("frame");

    let mut frame = [1.0f32, 3.0, 3.0, 1.0, 3.0, 3.0, 3.0, 1.0];
    let report = ex.process_frame(&mut frame).expect("frame");
    assert_eq!(report.transient_bins, 3);
    assert_eq!(
        ex.transient_flags(),
        &[false, false, false, false, true, true, true, false]
    );
}

#[test]
fn test_warmup_scenario() {
    let cfg = ExtractorConfig::new()
        .with_history_depth(2)
        .with_omega_depth(2)
        .with_min_run_length(1)
        .with_threshold(1.0)
        .with_release_decay(0.5)
        .with_low_freq_cut_bin(0);

    let mut extract = TransientExtractor::new(cfg.with_extract(true)).expect("valid config");
    let mut residual = TransientExtractor::new(cfg.with_extract(false)).expect("valid config");
    let expected = [(0.5f32, 0.5f32), (0.75, 0.25), (0.875, 0.125)];
    for &(e, r) in &expected {
        let mut a = [1.0f32; 4];
        let mut b = [1.0f32; 4];
        extract.process_frame(&mut a).expect("frame");
        residual.process_frame(&mut b).expect("frame");
        assert!(a.iter().all(|&v| (v - e).abs() < 1e-6), "extract {a:?}");
        assert!(b.iter().all(|&v| (v - r).abs() < 1e-6), "residual {b:?}");
    }
}

#[test]
fn test_mismatch_scenario() {
    let mut ex = TransientExtractor::new(config(true).with_low_freq_cut_bin(0))
        .expect("valid config");
    let mut frame = [0.5f32; 4];
    ex.process_frame(&mut frame).expect("frame");
    let (h, o) = (ex.history_index(), ex.omega_index());

    let mut wrong = [0.25f32, 0.5, 0.75, 1.0, 1.25];
    let original = wrong;
    assert!(matches!(
        ex.process_frame(&mut wrong),
        Err(TransientError::FrameSizeMismatch {
            expected: 4,
            actual: 5
        })
    ));
    assert_eq!(wrong, original);
    assert_eq!((ex.history_index(), ex.omega_index()), (h, o));
}

#[test]
fn test_click_is_detected_through_analyzer() {
    const WIN: usize = 256;
    const HOP: usize = 64;
    const PERIOD: usize = 32;
    const CLICK_AT: usize = 2148;

    // One period reused verbatim so steady frames are bit-identical
    let period: Vec<f32> = (0..PERIOD)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * i as f32 / PERIOD as f32).sin())
        .collect();

    let cfg = ExtractorConfig::new()
        .with_history_depth(1)
        .with_omega_depth(4)
        .with_min_run_length(3)
        .with_threshold(2.0)
        .with_run_end_policy(RunEndPolicy::FlushAtEnd);
    let mut analyzer = MagnitudeAnalyzer::new(WIN, HOP);
    let mut ex = TransientExtractor::new(cfg).expect("valid config");

    let mut counts = Vec::new();
    for i in 0..(HOP * 40 + WIN) {
        let mut x = period[i % PERIOD];
        if i == CLICK_AT {
            x += 1.0;
        }
        if let Some(report) = ex
            .process_chain(analyzer.push_sample(x))
            .expect("frame")
        {
            counts.push(report.transient_bins);
        }
    }

    // Frames 30..=33 contain the click
    assert!(counts[5..30].iter().all(|&n| n == 0), "{counts:?}");
    let peak = counts[30..34].iter().copied().max().unwrap_or(0);
    assert!(peak > WIN / 4, "{counts:?}");
}
