// Sequencer module
// Meter math, step patterns, lookahead scheduling and the ticker thread

pub mod pattern;
pub mod player;
pub mod scheduler;
pub mod timeline;
pub mod transport;

pub use pattern::{Instrument, Pattern};
pub use player::{PlaybackContext, PlaybackThread};
pub use scheduler::{LookaheadScheduler, SchedulerConfig, TickReport};
pub use timeline::{Meter, SharedMeter, Subdivision, Tempo, TimeSignature};
pub use transport::{SharedTransportState, TransportState};
