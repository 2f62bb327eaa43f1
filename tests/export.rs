// Integration test: Offline bounce to WAV

use drumloop::audio::export::{AudioExporter, ExportSettings};
use drumloop::audio::mixer::{Bus, MixBus};
use drumloop::sequencer::{
    Instrument, Meter, Pattern, SchedulerConfig, Subdivision, Tempo, TimeSignature,
};
use tempfile::tempdir;

fn read_samples(path: &std::path::Path) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

#[test]
fn test_bounce_three_four_eighths() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("waltz.wav");

    let meter = Meter::new(Tempo::new(90.0), TimeSignature::three_four(), Subdivision::Eighths);
    let mut pattern = Pattern::new(meter.steps_per_bar());
    pattern.apply_preset(
        meter.steps_per_bar(),
        meter.time_signature.numerator(),
        meter.subdivision.steps_per_beat(),
    );

    let settings = ExportSettings {
        sample_rate: 22050,
        channels: 1,
        bars: 2,
        tail_seconds: 0.2,
        seed: Some(99),
    };
    let exporter = AudioExporter::new(settings, SchedulerConfig::default());
    let summary = exporter
        .export(&path, &pattern, &meter, &MixBus::default(), None)
        .unwrap();

    // 6 hats + 2 kicks + 1 snare per bar
    assert_eq!(summary.voices, 18);

    let (spec, samples) = read_samples(&path);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 22050);
    assert_eq!(samples.len(), summary.frames);

    let expected_seconds = meter.bar_duration_seconds() * 2.0 + 0.2;
    assert!((summary.duration_seconds - expected_seconds).abs() < 1.0 / 22050.0);
    assert!(samples.iter().any(|s| *s != 0));
}

#[test]
fn test_muted_bus_is_silent_in_bounce() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kick_only.wav");

    let meter = Meter::default();
    let mut pattern = Pattern::new(meter.steps_per_bar());
    pattern.set(Instrument::Kick, 0, true);

    let mix = MixBus::default();
    mix.set_volume(Bus::Kick, 0.0);

    let settings = ExportSettings {
        sample_rate: 22050,
        channels: 2,
        bars: 1,
        tail_seconds: 0.0,
        seed: Some(1),
    };
    let exporter = AudioExporter::new(settings, SchedulerConfig::default());
    let summary = exporter
        .export(&path, &pattern, &meter, &mix, None)
        .unwrap();
    assert_eq!(summary.voices, 1);

    let (spec, samples) = read_samples(&path);
    assert_eq!(spec.channels, 2);
    assert_eq!(samples.len(), summary.frames * 2);
    assert!(samples.iter().all(|s| *s == 0));
}

#[test]
fn test_hits_land_on_step_boundaries() {
    let meter = Meter::new(Tempo::new(120.0), TimeSignature::four_four(), Subdivision::Sixteenths);
    let mut pattern = Pattern::new(meter.steps_per_bar());
    pattern.set(Instrument::Kick, 0, true);
    pattern.set(Instrument::Kick, 8, true);

    let settings = ExportSettings {
        sample_rate: 48000,
        channels: 1,
        bars: 1,
        tail_seconds: 0.2,
        seed: Some(5),
    };
    let exporter = AudioExporter::new(settings, SchedulerConfig::default());
    let (samples, voices) = exporter
        .render(&pattern, &meter, &MixBus::default(), None)
        .unwrap();
    assert_eq!(voices, 2);

    // Step 8 at 120 BPM sixteenths = 1.0s = sample 48000
    let kick_two = 48000;
    assert!(samples[kick_two - 100..kick_two].iter().all(|s| *s == 0.0));
    assert!(samples[kick_two + 1..kick_two + 100].iter().any(|s| *s != 0.0));
}
