// Pattern - One repeating bar of on/off steps per drum instrument
// Every row always has the same length: the bar's step count

use std::fmt;

/// The drum voices of the machine
///
/// Declaration order is the submission order within one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    HiHat,
    Snare,
    Kick,
}

impl Instrument {
    /// All instruments in submission order
    pub const ALL: [Instrument; 3] = [Instrument::HiHat, Instrument::Snare, Instrument::Kick];

    /// Row index inside a pattern / bus frame
    pub fn index(&self) -> usize {
        match self {
            Instrument::HiHat => 0,
            Instrument::Snare => 1,
            Instrument::Kick => 2,
        }
    }

    /// Upper-case label used by grid editors
    pub fn label(&self) -> &'static str {
        match self {
            Instrument::HiHat => "HI-HAT",
            Instrument::Snare => "SNARE",
            Instrument::Kick => "KICK",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Step pattern for one bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    rows: [Vec<bool>; 3],
}

impl Pattern {
    /// Create an empty pattern with the given number of steps
    pub fn new(steps_per_bar: usize) -> Self {
        Self {
            rows: std::array::from_fn(|_| vec![false; steps_per_bar]),
        }
    }

    /// Resize every row to `steps_per_bar` and switch all steps off
    ///
    /// Destructive: whatever was programmed before is discarded.
    pub fn rebuild(&mut self, steps_per_bar: usize) {
        for row in self.rows.iter_mut() {
            row.clear();
            row.resize(steps_per_bar, false);
        }
    }

    /// Switch every step off, keeping the current length
    pub fn clear(&mut self) {
        for row in self.rows.iter_mut() {
            row.fill(false);
        }
    }

    /// Flip one step and return its new state
    ///
    /// # Panics
    /// If `index` is not below [`Pattern::steps_per_bar`]. Editors only emit
    /// indices for cells they created, so this is a caller bug.
    pub fn toggle(&mut self, instrument: Instrument, index: usize) -> bool {
        let steps = self.steps_per_bar();
        assert!(
            index < steps,
            "step index {} out of range for a {}-step pattern",
            index,
            steps
        );
        let row = &mut self.rows[instrument.index()];
        row[index] = !row[index];
        row[index]
    }

    /// Set a step explicitly
    ///
    /// # Panics
    /// Same contract as [`Pattern::toggle`].
    pub fn set(&mut self, instrument: Instrument, index: usize, active: bool) {
        let steps = self.steps_per_bar();
        assert!(
            index < steps,
            "step index {} out of range for a {}-step pattern",
            index,
            steps
        );
        self.rows[instrument.index()][index] = active;
    }

    /// Whether `instrument` fires on `index`; indices past the end read as off
    pub fn is_active(&self, instrument: Instrument, index: usize) -> bool {
        self.rows[instrument.index()]
            .get(index)
            .copied()
            .unwrap_or(false)
    }

    /// Instruments firing on `index`, in submission order
    pub fn active_at(&self, index: usize) -> impl Iterator<Item = Instrument> + '_ {
        Instrument::ALL
            .into_iter()
            .filter(move |instrument| self.is_active(*instrument, index))
    }

    /// The row of one instrument
    pub fn steps(&self, instrument: Instrument) -> &[bool] {
        &self.rows[instrument.index()]
    }

    pub fn steps_per_bar(&self) -> usize {
        self.rows[0].len()
    }

    /// Check if no step is active
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|step| !step))
    }

    /// Rebuild and fill with the rock backbeat
    ///
    /// Hi-hat every `max(1, subdivision / 2)` steps, kick on beats 1 and 3,
    /// snare on beats 2 and 4, dropping the beats the bar is too short for.
    pub fn apply_preset(&mut self, steps_per_bar: usize, numerator: u8, subdivision: usize) {
        self.rebuild(steps_per_bar);

        let hat_interval = (subdivision / 2).max(1);
        for index in (0..steps_per_bar).step_by(hat_interval) {
            self.rows[Instrument::HiHat.index()][index] = true;
        }

        self.set_if_fits(Instrument::Kick, 0);
        if numerator >= 3 {
            self.set_if_fits(Instrument::Kick, 2 * subdivision);
        }

        if numerator >= 2 {
            self.set_if_fits(Instrument::Snare, subdivision);
        }
        if numerator >= 4 {
            self.set_if_fits(Instrument::Snare, 3 * subdivision);
        }
    }

    fn set_if_fits(&mut self, instrument: Instrument, index: usize) {
        if let Some(step) = self.rows[instrument.index()].get_mut(index) {
            *step = true;
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new(16)
    }
}
