// src/core/indicator.rs

//! Animated busy indicator. A background thread cycles the frames while the
//! busy gate reports work in flight and shows the idle frame otherwise.

use crate::{CancellationToken, constants::INDICATOR_FRAMES, core::busy::BusyGate};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long an idle indicator sleeps before re-checking the stop flag.
const IDLE_POLL: Duration = Duration::from_millis(200);

const IDLE_FRAME: &str = match INDICATOR_FRAMES.first() {
    Some(frame) => *frame,
    None => " ",
};

#[derive(Debug)]
pub struct BusyIndicator {
    stop: CancellationToken,
    /// Held while a frame is drawn; `true` while a prompt owns the terminal.
    paused: Arc<Mutex<bool>>,
    worker: Option<JoinHandle<()>>,
}

/// Keeps the indicator from drawing until dropped.
#[derive(Debug)]
pub struct IndicatorPause<'a> {
    paused: &'a Mutex<bool>,
}

impl Drop for IndicatorPause<'_> {
    fn drop(&mut self) {
        *lock(self.paused) = false;
    }
}

fn lock(paused: &Mutex<bool>) -> MutexGuard<'_, bool> {
    paused.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Draws `frame` unless paused. Returns whether it was drawn.
fn show<F: FnMut(&'static str)>(paused: &Mutex<bool>, on_frame: &mut F, frame: &'static str) -> bool {
    let paused = lock(paused);
    if *paused {
        return false;
    }
    on_frame(frame);
    true
}

impl BusyIndicator {
    /// Starts the animation thread. `on_frame` receives every frame change and
    /// runs on that thread.
    pub fn start<F>(gate: Arc<BusyGate>, frame_interval: Duration, mut on_frame: F) -> std::io::Result<Self>
    where
        F: FnMut(&'static str) + Send + 'static,
    {
        let stop: CancellationToken = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let paused = Arc::new(Mutex::new(false));
        let thread_paused = Arc::clone(&paused);
        let worker = thread::Builder::new()
            .name("shogun-indicator".to_string())
            .spawn(move || {
                let mut shown = IDLE_FRAME;
                let mut next = 1;
                show(&thread_paused, &mut on_frame, shown);
                while !thread_stop.load(Ordering::Relaxed) {
                    if !gate.is_busy() {
                        if shown != IDLE_FRAME && show(&thread_paused, &mut on_frame, IDLE_FRAME) {
                            shown = IDLE_FRAME;
                            next = 1;
                        }
                        gate.await_busy(IDLE_POLL);
                        continue;
                    }
                    let frame = INDICATOR_FRAMES.get(next).copied().unwrap_or(IDLE_FRAME);
                    if show(&thread_paused, &mut on_frame, frame) {
                        next = if next + 1 >= INDICATOR_FRAMES.len() { 1 } else { next + 1 };
                        shown = frame;
                    }
                    thread::sleep(frame_interval);
                }
                if shown != IDLE_FRAME {
                    show(&thread_paused, &mut on_frame, IDLE_FRAME);
                }
            })?;
        Ok(Self {
            stop,
            paused,
            worker: Some(worker),
        })
    }

    /// Stops drawing until the returned guard is dropped. Returns once any
    /// frame being drawn is finished, so a prompt can take the terminal.
    pub fn pause(&self) -> IndicatorPause<'_> {
        *lock(&self.paused) = true;
        IndicatorPause {
            paused: &self.paused,
        }
    }

    pub fn idle_frame() -> &'static str {
        IDLE_FRAME
    }

    /// Stops the animation and waits for the thread to restore the idle frame.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Busy indicator thread panicked.");
            }
        }
    }
}

impl Drop for BusyIndicator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
