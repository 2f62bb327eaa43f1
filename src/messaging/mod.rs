// Messaging - Lock-free queues between the scheduler and the audio thread

pub mod channels;
pub mod command;
