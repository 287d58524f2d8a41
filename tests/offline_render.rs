//! Catalog sounds rendered to buffers through the offline host.

use rustfft::{num_complex::Complex, FftPlanner};
use sfx_synth::{
    host::{OfflineHost, OfflineRenderer},
    store::MemoryStore,
    SoundEngine, SoundEventId,
};

const SAMPLE_RATE: f32 = 48_000.0;
/// Upper bound for any catalog sound, in frames.
const MAX_FRAMES: usize = 48_000 * 3;

fn setup() -> (SoundEngine, OfflineRenderer) {
    let host = OfflineHost::new(SAMPLE_RATE);
    let renderer = host.renderer();
    let engine = SoundEngine::new(Box::new(host), Box::new(MemoryStore::new()));
    (engine, renderer)
}

fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

/// Magnitude spectrum of a Hann-windowed slice.
fn spectrum(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let window = 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / n as f32).cos();
            Complex::new(s * window, 0.0)
        })
        .collect();

    FftPlanner::<f32>::new()
        .plan_fft_forward(n)
        .process(&mut buffer);

    buffer[..n / 2].iter().map(|c| c.norm()).collect()
}

fn bin_hz(n: usize) -> f32 {
    SAMPLE_RATE / n as f32
}

fn centroid(magnitudes: &[f32], n: usize) -> f32 {
    let total: f32 = magnitudes.iter().map(|m| m * m).sum();
    let weighted: f32 = magnitudes
        .iter()
        .enumerate()
        .map(|(i, m)| i as f32 * bin_hz(n) * m * m)
        .sum();
    weighted / total
}

#[test]
fn every_sound_is_audible_and_cleans_up() {
    for id in SoundEventId::ALL {
        let (mut engine, renderer) = setup();
        let playback = engine.try_play(id).unwrap().unwrap();
        let end = playback.end().unwrap();

        let output = renderer.render_until_idle(MAX_FRAMES);

        // melodies end with their last note, which may be before the
        // recipe's nominal duration
        assert!(
            output.len() as f64 >= end * SAMPLE_RATE as f64,
            "{id}: rendered only {} frames, sound ends at {end} s",
            output.len()
        );
        assert!(peak(&output) > 0.01, "{id} is silent");
        assert!(peak(&output) <= 1.0, "{id} clips");
        assert!(output.iter().all(|s| s.is_finite()), "{id} produced NaN");

        // only the master gain is left
        assert_eq!(renderer.live_nodes(), 1, "{id} leaked nodes");
    }
}

#[test]
fn repeated_plays_do_not_accumulate_nodes() {
    let (mut engine, renderer) = setup();
    for _ in 0..20 {
        engine.play(SoundEventId::ButtonClick);
        engine.play(SoundEventId::Skip);
    }
    assert!(renderer.live_nodes() > 1);

    renderer.render_until_idle(MAX_FRAMES);
    assert_eq!(renderer.live_nodes(), 1);
}

#[test]
fn sounds_start_and_end_silent() {
    let (mut engine, renderer) = setup();
    engine.play(SoundEventId::WrongAnswer);

    let output = renderer.render_until_idle(MAX_FRAMES);
    assert_eq!(output[0], 0.0);

    let end = (0.3 * SAMPLE_RATE) as usize;
    assert!(output[end..].iter().all(|&s| s.abs() < 1e-3));
}

#[test]
fn letter_reveal_sounds_at_a4() {
    let (mut engine, renderer) = setup();
    engine.play(SoundEventId::LetterReveal);

    let output = renderer.render_until_idle(MAX_FRAMES);
    let n = 4096;
    let magnitudes = spectrum(&output[..n]);
    let (loudest, _) = magnitudes
        .iter()
        .enumerate()
        .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best });

    let frequency = loudest as f32 * bin_hz(n);
    assert!(
        (frequency - 440.0).abs() < 2.0 * bin_hz(n),
        "loudest partial at {frequency} Hz"
    );
}

#[test]
fn skip_darkens_over_time() {
    let (mut engine, renderer) = setup();
    engine.play(SoundEventId::Skip);
    let output = renderer.render_until_idle(MAX_FRAMES);

    // 2048-sample windows early in the sweep and near its end
    let n = 2048;
    let early = centroid(&spectrum(&output[480..480 + n]), n);
    let late = centroid(&spectrum(&output[7_000..7_000 + n]), n);

    assert!(
        early > 1.5 * late,
        "expected a falling sweep, centroid {early} Hz then {late} Hz"
    );
}

#[test]
fn lower_volume_is_quieter() {
    let (mut loud, loud_renderer) = setup();
    loud.set_volume(1.0);
    loud.play(SoundEventId::ButtonClick);
    let loud_peak = peak(&loud_renderer.render_until_idle(MAX_FRAMES));

    let (mut quiet, quiet_renderer) = setup();
    quiet.set_volume(0.5);
    quiet.play(SoundEventId::ButtonClick);
    let quiet_peak = peak(&quiet_renderer.render_until_idle(MAX_FRAMES));

    assert!(quiet_peak < loud_peak);
}

#[test]
fn muting_silences_sounds_already_playing() {
    let (mut engine, renderer) = setup();
    engine.play(SoundEventId::Win);

    let before = renderer.render(4_800);
    assert!(peak(&before) > 0.01);

    engine.set_muted(true);
    let after = renderer.render_until_idle(MAX_FRAMES);
    assert!(after.iter().all(|&s| s == 0.0));
    assert_eq!(renderer.live_nodes(), 1);
}

#[test]
fn muted_engine_renders_nothing() {
    let (mut engine, renderer) = setup();
    engine.set_muted(true);
    for id in SoundEventId::ALL {
        engine.play(id);
    }

    assert!(!engine.is_initialized());
    assert_eq!(renderer.counts().total(), 0);
    assert!(renderer.render(1_024).iter().all(|&s| s == 0.0));
}
