// Sequencer Player - Ticker thread driving the lookahead scheduler

use super::pattern::Pattern;
use super::scheduler::LookaheadScheduler;
use super::timeline::SharedMeter;
use super::transport::SharedTransportState;
use crate::audio::backend::{AudioClock, VoiceSink};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Name of the ticker thread
pub const THREAD_NAME: &str = "drumloop-scheduler";

/// Everything the ticker thread reads on each tick
pub struct PlaybackContext {
    pub pattern: Arc<Mutex<Pattern>>,
    pub meter: SharedMeter,
    pub transport: Arc<SharedTransportState>,
    pub interval: Duration,
}

/// Running ticker thread
///
/// Ticks once right away, then once per interval until stopped. Dropping the
/// handle stops and joins the thread.
pub struct PlaybackThread {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PlaybackThread {
    pub fn spawn<P>(
        mut scheduler: LookaheadScheduler,
        mut port: P,
        context: PlaybackContext,
    ) -> io::Result<Self>
    where
        P: AudioClock + VoiceSink + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                let PlaybackContext {
                    pattern,
                    meter,
                    transport,
                    interval,
                } = context;

                while thread_running.load(Ordering::Acquire) {
                    // Snapshot so the editor is never blocked by voice generation
                    let snapshot = match pattern.lock() {
                        Ok(guard) => guard.clone(),
                        Err(poisoned) => poisoned.into_inner().clone(),
                    };
                    let now = port.current_time();
                    let report = scheduler.tick(now, &snapshot, &meter.meter(), &mut port);
                    transport.record_tick(scheduler.current_step(), report);

                    thread::park_timeout(interval);
                }
            })?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop ticking and wait for the thread to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                log::error!("Scheduler thread panicked");
            }
        }
    }
}

impl Drop for PlaybackThread {
    fn drop(&mut self) {
        self.stop();
    }
}
