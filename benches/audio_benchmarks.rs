use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use drumloop::audio::export::{AudioExporter, ExportSettings};
use drumloop::audio::mixer::{MixBus, MixBusProcessor};
use drumloop::sequencer::{
    Instrument, LookaheadScheduler, Meter, Pattern, SchedulerConfig, Subdivision, Tempo,
    TimeSignature,
};
use drumloop::synth::oscillator::NoiseBuffer;
use drumloop::synth::voice_manager::VoiceManager;
use drumloop::synth::{DrumKit, VoiceEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;

const SAMPLE_RATE: f32 = 48000.0;
const BUFFER_SIZE: usize = 512;

fn preset(meter: &Meter) -> Pattern {
    let mut pattern = Pattern::new(meter.steps_per_bar());
    pattern.apply_preset(
        meter.steps_per_bar(),
        meter.time_signature.numerator(),
        meter.subdivision.steps_per_beat(),
    );
    pattern
}

/// Noise bursts are drawn on the scheduler thread for every snare and hat
fn bench_noise_generation(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("noise_burst_250ms", |b| {
        b.iter(|| black_box(NoiseBuffer::generate(&mut rng, SAMPLE_RATE, 0.25)));
    });
}

/// Benchmark VoiceManager with overlapping hits
fn bench_voice_manager(c: &mut Criterion) {
    let mut group = c.benchmark_group("voice_manager");

    for num_voices in [1, 3, 8, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_voices),
            &num_voices,
            |b, &count| {
                let mut kit = DrumKit::with_seed(SAMPLE_RATE, 1);
                b.iter_batched(
                    || {
                        let mut vm = VoiceManager::new(SAMPLE_RATE);
                        for i in 0..count {
                            let instrument = Instrument::ALL[i % Instrument::ALL.len()];
                            vm.add(kit.trigger(instrument, 0.0));
                        }
                        vm
                    },
                    |mut vm| {
                        for i in 0..BUFFER_SIZE as u64 {
                            black_box(vm.render(i, drop));
                        }
                        vm
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

/// Per-bus smoothing, master gain and soft clip for one buffer
fn bench_mixer(c: &mut Criterion) {
    let mut mixer = MixBusProcessor::new(MixBus::default(), SAMPLE_RATE);
    let frame = [0.3f32, -0.5, 0.8];

    c.bench_function("mix_bus_buffer", |b| {
        b.iter(|| {
            for _ in 0..BUFFER_SIZE {
                black_box(mixer.process(black_box(frame)));
            }
        });
    });
}

/// One bar of ticks at the densest grid
fn bench_scheduler_tick(c: &mut Criterion) {
    let meter = Meter::new(
        Tempo::new(Tempo::MAX_BPM),
        TimeSignature::new(15, 8),
        Subdivision::Sixteenths,
    );
    let pattern = preset(&meter);
    let config = SchedulerConfig::default();

    c.bench_function("scheduler_bar_240bpm_15_8", |b| {
        let mut scheduler = LookaheadScheduler::new(DrumKit::with_seed(SAMPLE_RATE, 2), &config);
        let mut sink: Vec<VoiceEvent> = Vec::with_capacity(256);
        b.iter(|| {
            sink.clear();
            scheduler.reset(0.0);
            let mut now = 0.0;
            while now < meter.bar_duration_seconds() {
                black_box(scheduler.tick(now, &pattern, &meter, &mut sink));
                now += 0.025;
            }
        });
    });
}

fn bench_export_render(c: &mut Criterion) {
    let meter = Meter::default();
    let pattern = preset(&meter);
    let settings = ExportSettings {
        bars: 1,
        seed: Some(3),
        ..ExportSettings::default()
    };
    let exporter = AudioExporter::new(settings, SchedulerConfig::default());
    let mix = MixBus::default();

    let mut group = c.benchmark_group("export");
    group.sample_size(20);
    group.bench_function("render_one_bar", |b| {
        b.iter(|| black_box(exporter.render(&pattern, &meter, &mix, None)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_noise_generation,
    bench_voice_manager,
    bench_mixer,
    bench_scheduler_tick,
    bench_export_render
);
criterion_main!(benches);
