//! # Chord Detector Session
//!
//! Owns an [`AudioSource`] and wires it to a fresh [`Pipeline`] on every
//! `start()`. Results are published on a latest-value channel, failures on
//! an error channel of human-readable messages.
//!
//! ## Threading
//! - The pipeline lives inside the chunk callback; the audio thread never
//!   takes a lock.
//! - `start()` and `stop()` are serialized by a mutex around the session.
//! - An asynchronous stream failure clears the running flag and silences
//!   the callback; the source itself is detached by the next `start()` or
//!   `stop()`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam_channel::{Receiver, Sender};

use crate::channel::{self, LatestReceiver, LatestSender};
use crate::config::{ConfigError, PipelineConfig};
use crate::pipeline::Pipeline;
use crate::source::{AudioSource, SourceError};
use crate::DetectionResult;

struct Session<S> {
    source: S,
    attached: bool,
    /// Shared with the callbacks of the current attachment.
    alive: Arc<AtomicBool>,
}

pub struct ChordDetector<S: AudioSource> {
    config: PipelineConfig,
    session: Mutex<Session<S>>,
    results_tx: LatestSender<DetectionResult>,
    results_rx: LatestReceiver<DetectionResult>,
    errors_tx: Sender<String>,
    errors_rx: Receiver<String>,
}

impl<S: AudioSource> ChordDetector<S> {
    pub fn new(source: S, config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (results_tx, results_rx) = channel::latest();
        let (errors_tx, errors_rx) = crossbeam_channel::unbounded();
        Ok(Self {
            config,
            session: Mutex::new(Session {
                source,
                attached: false,
                alive: Arc::new(AtomicBool::new(false)),
            }),
            results_tx,
            results_rx,
            errors_tx,
            errors_rx,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Latest stabilized results, at most one pending at a time.
    pub fn results(&self) -> LatestReceiver<DetectionResult> {
        self.results_rx.clone()
    }

    /// Human-readable failure messages, in order.
    pub fn errors(&self) -> Receiver<String> {
        self.errors_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        let session = self.lock();
        session.attached && session.alive.load(Ordering::Acquire)
    }

    /// Starts a new session from a clean analysis state.
    ///
    /// A session that is already attached is detached first. On failure
    /// the error is also pushed to the error channel and nothing stays
    /// attached.
    pub fn start(&self) -> Result<(), SourceError> {
        let mut session = self.lock();
        Self::detach(&mut session);

        let alive = Arc::new(AtomicBool::new(true));
        let mut pipeline = Pipeline::new(&self.config, self.results_tx.clone());

        let chunk_alive = alive.clone();
        let on_chunk = Box::new(move |samples: &[f32]| {
            if chunk_alive.load(Ordering::Acquire) {
                pipeline.push(samples);
            }
        });

        let error_alive = alive.clone();
        let errors_tx = self.errors_tx.clone();
        let on_error = Box::new(move |err: SourceError| {
            log::warn!("Audio source reported an error: {}", err);
            error_alive.store(false, Ordering::Release);
            let _ = errors_tx.send(err.to_string());
        });

        match session.source.start(self.config.sample_rate, on_chunk, on_error) {
            Ok(()) => {
                session.attached = true;
                session.alive = alive;
                log::info!(
                    "Chord detection started ({} Hz, frame {}, hop {})",
                    self.config.sample_rate,
                    self.config.frame_size,
                    self.config.hop_size
                );
                Ok(())
            }
            Err(err) => {
                alive.store(false, Ordering::Release);
                log::warn!("Failed to start audio source: {}", err);
                let _ = self.errors_tx.send(err.to_string());
                Err(err)
            }
        }
    }

    /// Stops the current session, if any.
    pub fn stop(&self) {
        let mut session = self.lock();
        if session.attached {
            Self::detach(&mut session);
            log::info!("Chord detection stopped");
        }
    }

    fn detach(session: &mut Session<S>) {
        if session.attached {
            session.alive.store(false, Ordering::Release);
            session.source.stop();
            session.attached = false;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session<S>> {
        // A panic inside a previous start/stop leaves the session usable.
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: AudioSource> Drop for ChordDetector<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
