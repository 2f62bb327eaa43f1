// Timeline - Meter and tempo arithmetic
// Converts BPM, time signature and subdivision into step counts and step durations

use crate::audio::parameters::{AtomicF64, AtomicU8Param};
use std::fmt;

/// Time signature (numerator/denominator)
///
/// The numerator is kept in [1, 15] and the denominator is either 4 or 8.
/// Out-of-range input is coerced rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    numerator: u8,
    denominator: u8,
}

impl TimeSignature {
    pub const MIN_NUMERATOR: u8 = 1;
    pub const MAX_NUMERATOR: u8 = 15;
    pub const DEFAULT_NUMERATOR: u8 = 4;

    /// Creates a time signature, coercing invalid values
    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator: Self::sanitize_numerator(numerator),
            denominator: Self::sanitize_denominator(denominator),
        }
    }

    /// Common 4/4 time signature
    pub fn four_four() -> Self {
        Self::new(4, 4)
    }

    /// Common 3/4 time signature (waltz)
    pub fn three_four() -> Self {
        Self::new(3, 4)
    }

    /// Common 6/8 time signature
    pub fn six_eight() -> Self {
        Self::new(6, 8)
    }

    /// Zero means "no value" and falls back to 4, anything else is clamped to [1, 15]
    pub fn sanitize_numerator(numerator: u8) -> u8 {
        if numerator == 0 {
            Self::DEFAULT_NUMERATOR
        } else {
            numerator.clamp(Self::MIN_NUMERATOR, Self::MAX_NUMERATOR)
        }
    }

    /// Only quarter (4) and eighth (8) beat units exist; everything else becomes 4
    pub fn sanitize_denominator(denominator: u8) -> u8 {
        if denominator == 8 { 8 } else { 4 }
    }

    /// Parse a numerator typed by the user
    ///
    /// Non-numeric text yields the default of 4, numbers are clamped to [1, 15].
    pub fn parse_numerator(input: &str) -> u8 {
        match input.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value != 0.0 => {
                value.clamp(Self::MIN_NUMERATOR as f64, Self::MAX_NUMERATOR as f64) as u8
            }
            _ => Self::DEFAULT_NUMERATOR,
        }
    }

    pub fn numerator(&self) -> u8 {
        self.numerator
    }

    pub fn denominator(&self) -> u8 {
        self.denominator
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::four_four()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Number of grid steps per beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subdivision {
    /// Two steps per beat
    Eighths,
    /// Four steps per beat
    #[default]
    Sixteenths,
}

impl Subdivision {
    /// Steps per beat
    pub fn steps_per_beat(&self) -> usize {
        match self {
            Subdivision::Eighths => 2,
            Subdivision::Sixteenths => 4,
        }
    }

    /// 2 maps to eighths, every other value to sixteenths
    pub fn from_steps(steps: u8) -> Self {
        if steps == 2 {
            Subdivision::Eighths
        } else {
            Subdivision::Sixteenths
        }
    }
}

impl fmt::Display for Subdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subdivision::Eighths => write!(f, "8ths"),
            Subdivision::Sixteenths => write!(f, "16ths"),
        }
    }
}

/// Tempo in BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    pub const MIN_BPM: f64 = 40.0;
    pub const MAX_BPM: f64 = 240.0;
    pub const DEFAULT_BPM: f64 = 110.0;

    /// Creates a tempo clamped to [40, 240]
    ///
    /// Zero, NaN and infinities are treated as "no value" and give 110 BPM.
    pub fn new(bpm: f64) -> Self {
        let bpm = if bpm.is_finite() && bpm != 0.0 {
            bpm.clamp(Self::MIN_BPM, Self::MAX_BPM)
        } else {
            Self::DEFAULT_BPM
        };
        Self { bpm }
    }

    /// Parse a BPM value typed by the user
    pub fn parse(input: &str) -> Self {
        Self::new(input.trim().parse::<f64>().unwrap_or(f64::NAN))
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one quarter note in seconds
    pub fn quarter_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BPM)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}

/// Number of steps in one bar
pub fn steps_per_bar(numerator: u8, subdivision: Subdivision) -> usize {
    TimeSignature::sanitize_numerator(numerator) as usize * subdivision.steps_per_beat()
}

/// Duration of one step in seconds
///
/// `(60 / bpm) * (4 / denominator) / subdivision`, with BPM clamped to [40, 240].
pub fn seconds_per_step(bpm: f64, denominator: u8, subdivision: Subdivision) -> f64 {
    let quarter = Tempo::new(bpm).quarter_duration_seconds();
    let beat = quarter * (4.0 / TimeSignature::sanitize_denominator(denominator) as f64);
    beat / subdivision.steps_per_beat() as f64
}

/// Everything that governs the step grid: tempo, time signature, subdivision
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Meter {
    pub tempo: Tempo,
    pub time_signature: TimeSignature,
    pub subdivision: Subdivision,
}

impl Meter {
    pub fn new(tempo: Tempo, time_signature: TimeSignature, subdivision: Subdivision) -> Self {
        Self {
            tempo,
            time_signature,
            subdivision,
        }
    }

    pub fn steps_per_bar(&self) -> usize {
        steps_per_bar(self.time_signature.numerator(), self.subdivision)
    }

    pub fn seconds_per_step(&self) -> f64 {
        seconds_per_step(
            self.tempo.bpm(),
            self.time_signature.denominator(),
            self.subdivision,
        )
    }

    /// Duration of one full bar in seconds
    pub fn bar_duration_seconds(&self) -> f64 {
        self.seconds_per_step() * self.steps_per_bar() as f64
    }
}

impl fmt::Display for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} • {} steps", self.time_signature, self.steps_per_bar())
    }
}

/// Meter values shared between the editing surface and the scheduler thread
///
/// Every field is an atomic so edits never block a tick; the scheduler takes a
/// fresh snapshot with [`SharedMeter::meter`] each time it runs.
#[derive(Clone)]
pub struct SharedMeter {
    bpm: AtomicF64,
    numerator: AtomicU8Param,
    denominator: AtomicU8Param,
    subdivision: AtomicU8Param,
}

impl SharedMeter {
    pub fn new(meter: Meter) -> Self {
        Self {
            bpm: AtomicF64::new(meter.tempo.bpm()),
            numerator: AtomicU8Param::new(meter.time_signature.numerator()),
            denominator: AtomicU8Param::new(meter.time_signature.denominator()),
            subdivision: AtomicU8Param::new(meter.subdivision.steps_per_beat() as u8),
        }
    }

    /// Current values as a coherent [`Meter`]
    pub fn meter(&self) -> Meter {
        Meter::new(
            Tempo::new(self.bpm.get()),
            TimeSignature::new(self.numerator.get(), self.denominator.get()),
            Subdivision::from_steps(self.subdivision.get()),
        )
    }

    pub fn set_tempo(&self, tempo: Tempo) {
        self.bpm.set(tempo.bpm());
    }

    pub fn set_time_signature(&self, time_signature: TimeSignature) {
        self.numerator.set(time_signature.numerator());
        self.denominator.set(time_signature.denominator());
    }

    pub fn set_subdivision(&self, subdivision: Subdivision) {
        self.subdivision.set(subdivision.steps_per_beat() as u8);
    }
}

impl Default for SharedMeter {
    fn default() -> Self {
        Self::new(Meter::default())
    }
}
