use clap::{Args, Parser, Subcommand};
use drumloop::audio::device::AudioDeviceManager;
use drumloop::audio::engine::CpalDevice;
use drumloop::audio::export::{AudioExporter, ExportSettings};
use drumloop::config::{DrumConfig, MeterConfig};
use drumloop::sequencer::{Instrument, Pattern, Tempo, TimeSignature};
use drumloop::session::DrumSession;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Step-sequenced drum machine
#[derive(Parser)]
#[command(name = "drumloop", version)]
#[command(about = "Lookahead step-sequenced drum machine (kick, snare, hi-hat)")]
struct Cli {
    /// Config file, defaults to <config_dir>/drumloop/config.ron
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the loop on the sound card
    Play {
        #[command(flatten)]
        meter: MeterArgs,

        #[command(flatten)]
        pattern: PatternArgs,

        /// Stop after this many seconds instead of waiting for Enter
        #[arg(long)]
        seconds: Option<f64>,

        /// Output device name (see `drumloop devices`)
        #[arg(long)]
        device: Option<String>,
    },

    /// Bounce bars of the loop to a 16-bit WAV file
    Export {
        /// Output path
        output: PathBuf,

        #[arg(long, default_value_t = 4)]
        bars: u32,

        #[arg(long, default_value_t = 44100)]
        sample_rate: u32,

        /// 1 = mono, 2 = stereo
        #[arg(long, default_value_t = 2)]
        channels: u16,

        /// Noise seed, for reproducible files
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        meter: MeterArgs,

        #[command(flatten)]
        pattern: PatternArgs,
    },

    /// List output devices
    Devices,

    /// Print the effective configuration as RON
    Config,
}

/// Tempo and meter overrides; malformed values fall back like the UI fields do
#[derive(Args)]
struct MeterArgs {
    /// Tempo, clamped to 40..240
    #[arg(long)]
    bpm: Option<String>,

    /// Beats per bar, clamped to 1..15
    #[arg(long)]
    numerator: Option<String>,

    /// 4 or 8
    #[arg(long)]
    denominator: Option<u8>,

    /// Steps per beat: 2 (eighths) or 4 (sixteenths)
    #[arg(long)]
    subdivision: Option<u8>,
}

impl MeterArgs {
    fn apply(&self, config: &mut MeterConfig) {
        if let Some(bpm) = &self.bpm {
            config.bpm = Tempo::parse(bpm).bpm();
        }
        if let Some(numerator) = &self.numerator {
            config.numerator = TimeSignature::parse_numerator(numerator);
        }
        if let Some(denominator) = self.denominator {
            config.denominator = denominator;
        }
        if let Some(subdivision) = self.subdivision {
            config.subdivision = subdivision;
        }
    }
}

/// Explicit step lists; giving any of them replaces the preset
#[derive(Args)]
struct PatternArgs {
    /// Hi-hat steps, e.g. 0,2,4,6
    #[arg(long, value_delimiter = ',')]
    hihat: Option<Vec<usize>>,

    /// Snare steps
    #[arg(long, value_delimiter = ',')]
    snare: Option<Vec<usize>>,

    /// Kick steps
    #[arg(long, value_delimiter = ',')]
    kick: Option<Vec<usize>>,
}

impl PatternArgs {
    fn rows(&self) -> [(Instrument, Option<&Vec<usize>>); 3] {
        [
            (Instrument::HiHat, self.hihat.as_ref()),
            (Instrument::Snare, self.snare.as_ref()),
            (Instrument::Kick, self.kick.as_ref()),
        ]
    }

    fn is_set(&self) -> bool {
        self.rows().iter().any(|(_, steps)| steps.is_some())
    }

    /// Check every index against the bar length before touching a pattern
    fn validate(&self, steps_per_bar: usize) -> Result<(), String> {
        for (instrument, steps) in self.rows() {
            if let Some(&bad) = steps.into_iter().flatten().find(|i| **i >= steps_per_bar) {
                return Err(format!(
                    "{} step {} is outside the {}-step bar",
                    instrument, bad, steps_per_bar
                ));
            }
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match DrumConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Play {
            meter,
            pattern,
            seconds,
            device,
        } => {
            meter.apply(&mut config.meter);
            if device.is_some() {
                config.device = device;
            }
            play(&config, &pattern, seconds)
        }
        Commands::Export {
            output,
            bars,
            sample_rate,
            channels,
            seed,
            meter,
            pattern,
        } => {
            meter.apply(&mut config.meter);
            let settings = ExportSettings {
                sample_rate,
                channels,
                bars,
                seed,
                ..ExportSettings::default()
            };
            export(&config, &pattern, settings, output)
        }
        Commands::Devices => {
            list_devices();
            Ok(())
        }
        Commands::Config => config
            .to_ron()
            .map(|ron| println!("{}", ron))
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn play(config: &DrumConfig, pattern: &PatternArgs, seconds: Option<f64>) -> Result<(), String> {
    let device = CpalDevice::new(config.device.clone(), config.scheduler.queue_capacity);
    let mut session = DrumSession::with_config(device, config);

    let steps_per_bar = session.meter().steps_per_bar();
    pattern.validate(steps_per_bar)?;
    if pattern.is_set() {
        session.clear_pattern();
        for (instrument, steps) in pattern.rows() {
            for &step in steps.into_iter().flatten() {
                session.set_step(instrument, step, true);
            }
        }
    }

    print_pattern(&session.pattern());
    session.start().map_err(|e| e.to_string())?;
    println!("{} at {} - {}", session.state(), session.meter().tempo, session.meter());

    match seconds {
        Some(seconds) => std::thread::sleep(Duration::from_secs_f64(seconds.max(0.0))),
        None => {
            println!("Press Enter to stop");
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|e| e.to_string())?;
        }
    }

    session.stop();
    // Let the last scheduled hits ring out
    std::thread::sleep(Duration::from_millis(250));

    let transport = session.transport();
    println!(
        "{} after {} ticks: {} steps, {} hits",
        session.state(),
        transport.ticks(),
        transport.steps_scheduled(),
        transport.voices_scheduled()
    );
    Ok(())
}

fn export(
    config: &DrumConfig,
    pattern_args: &PatternArgs,
    settings: ExportSettings,
    output: PathBuf,
) -> Result<(), String> {
    let meter = config.meter.meter();
    let steps_per_bar = meter.steps_per_bar();
    pattern_args.validate(steps_per_bar)?;

    let mut pattern = Pattern::new(steps_per_bar);
    if pattern_args.is_set() {
        for (instrument, steps) in pattern_args.rows() {
            for &step in steps.into_iter().flatten() {
                pattern.set(instrument, step, true);
            }
        }
    } else {
        pattern.apply_preset(
            steps_per_bar,
            meter.time_signature.numerator(),
            meter.subdivision.steps_per_beat(),
        );
    }

    print_pattern(&pattern);
    let exporter = AudioExporter::new(settings, config.scheduler.clone());
    let summary = exporter
        .export(&output, &pattern, &meter, &config.volumes.mix_bus(), None)
        .map_err(|e| e.to_string())?;

    println!(
        "Wrote {} ({:.2}s, {} hits)",
        output.display(),
        summary.duration_seconds,
        summary.voices
    );
    Ok(())
}

fn list_devices() {
    let devices = AudioDeviceManager::new().list_output_devices();
    if devices.is_empty() {
        println!("No output device found");
    }
    for device in devices {
        let marker = if device.is_default { "*" } else { " " };
        println!("{} {}", marker, device.name);
    }
}

fn print_pattern(pattern: &Pattern) {
    for instrument in Instrument::ALL {
        let row: String = pattern
            .steps(instrument)
            .iter()
            .map(|on| if *on { 'x' } else { '.' })
            .collect();
        println!("{:>7} {}", instrument.label(), row);
    }
}
