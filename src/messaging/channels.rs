// Communication channels lock-free

use crate::messaging::command::{Command, Recycled};
use ringbuf::{HeapRb, traits::Split};

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}

pub type RecycleProducer = ringbuf::HeapProd<Recycled>;
pub type RecycleConsumer = ringbuf::HeapCons<Recycled>;

/// Render side → scheduling side, for buffers that must not be freed on the audio thread
pub fn create_recycle_channel(capacity: usize) -> (RecycleProducer, RecycleConsumer) {
    let rb = HeapRb::<Recycled>::new(capacity);
    rb.split()
}
