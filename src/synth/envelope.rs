// Envelope - Exponential parameter ramps
//
// Drum voices shape both amplitude and pitch with a single exponential segment:
// hold `from` until `start`, glide geometrically to `to` at `end`, then hold `to`.
// Exponential curves can never reach zero, so decays aim at a small floor instead.

/// Lowest level a decay ramps towards
pub const DECAY_FLOOR: f32 = 0.001;

/// One exponential automation segment, evaluated against absolute clock time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialRamp {
    /// Value at (and before) `start`
    pub from: f32,
    /// Value at (and after) `end`
    pub to: f32,
    /// Segment start in seconds
    pub start: f64,
    /// Segment end in seconds
    pub end: f64,
}

impl ExponentialRamp {
    /// Create a ramp from `from` at `start` to `to` after `duration` seconds
    ///
    /// Both values must be strictly positive and share a sign; a zero target
    /// would make the curve degenerate, use [`DECAY_FLOOR`] instead.
    pub fn new(from: f32, to: f32, start: f64, duration: f64) -> Self {
        debug_assert!(from > 0.0 && to > 0.0, "exponential ramps need positive values");
        Self {
            from,
            to,
            start,
            end: start + duration.max(0.0),
        }
    }

    /// Decay from `from` down to [`DECAY_FLOOR`]
    pub fn decay(from: f32, start: f64, duration: f64) -> Self {
        Self::new(from, DECAY_FLOOR, start, duration)
    }

    /// Value at absolute time `t` (seconds)
    #[inline]
    pub fn value_at(&self, t: f64) -> f32 {
        if t <= self.start {
            return self.from;
        }
        if t >= self.end {
            return self.to;
        }
        let progress = ((t - self.start) / (self.end - self.start)) as f32;
        self.from * (self.to / self.from).powf(progress)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}
