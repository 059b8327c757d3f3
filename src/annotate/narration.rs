//! Narration sinks
//!
//! The sync controller speaks each new cue aloud through a [`NarrationSink`].
//! Requests are fire-and-forget: a sink never reports completion back, and
//! at most one request is outstanding because every new one is preceded by
//! a cancel.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One utterance with its voice parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrationRequest {
    pub text: String,
    pub rate: f64,
    pub pitch: f64,
    pub volume: f64,
    /// Key of the cue being narrated
    pub cue_key: String,
}

/// Destination for narration requests
pub trait NarrationSink {
    /// Start speaking. Callers cancel first; sinks may assume nothing else
    /// is in flight.
    fn speak(&mut self, request: NarrationRequest);

    /// Stop any in-flight utterance. No-op when idle.
    fn cancel(&mut self);
}

/// What a [`RecordingNarrator`] saw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NarrationEvent {
    Spoke(NarrationRequest),
    Cancelled,
}

/// Keeps every call in memory. Used by tests and the report command.
#[derive(Debug, Default)]
pub struct RecordingNarrator {
    events: Vec<NarrationEvent>,
}

impl RecordingNarrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[NarrationEvent] {
        &self.events
    }

    /// Requests in the order they were issued
    pub fn spoken(&self) -> impl Iterator<Item = &NarrationRequest> {
        self.events.iter().filter_map(|e| match e {
            NarrationEvent::Spoke(request) => Some(request),
            NarrationEvent::Cancelled => None,
        })
    }
}

impl NarrationSink for RecordingNarrator {
    fn speak(&mut self, request: NarrationRequest) {
        self.events.push(NarrationEvent::Spoke(request));
    }

    fn cancel(&mut self) {
        self.events.push(NarrationEvent::Cancelled);
    }
}

/// Command forwarded by a [`ChannelNarrator`]
#[derive(Debug, Clone, PartialEq)]
pub enum NarrationCommand {
    Speak(NarrationRequest),
    Cancel,
}

/// Forwards requests to a presentation layer that owns the speech engine
#[derive(Debug, Clone)]
pub struct ChannelNarrator {
    tx: mpsc::UnboundedSender<NarrationCommand>,
}

impl ChannelNarrator {
    /// Create a narrator and the receiving end for the speech engine
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NarrationCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, command: NarrationCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("Narration receiver dropped, command discarded");
        }
    }
}

impl NarrationSink for ChannelNarrator {
    fn speak(&mut self, request: NarrationRequest) {
        self.send(NarrationCommand::Speak(request));
    }

    fn cancel(&mut self) {
        self.send(NarrationCommand::Cancel);
    }
}

/// Speaks on a tokio task per request
///
/// Speech is simulated: the task holds for a pace per word (scaled by the
/// request rate), logs the utterance, and records it as finished. Cancel
/// aborts the running task, so an interrupted utterance never finishes.
#[derive(Debug)]
pub struct TaskNarrator {
    runtime: Option<Handle>,
    pace: Duration,
    current: Option<JoinHandle<()>>,
    finished: Arc<Mutex<Vec<String>>>,
}

impl TaskNarrator {
    /// Narrator on the current runtime. Outside a runtime, requests are
    /// dropped with a warning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pace(Duration::from_millis(350))
    }

    /// Narrator holding `pace` per word at rate 1.0
    #[must_use]
    pub fn with_pace(pace: Duration) -> Self {
        Self {
            runtime: Handle::try_current().ok(),
            pace,
            current: None,
            finished: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Whether an utterance is still running
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Texts of utterances that ran to completion
    #[must_use]
    pub fn finished(&self) -> Vec<String> {
        self.finished
            .lock()
            .map(|done| done.clone())
            .unwrap_or_default()
    }

    /// Wait for the in-flight utterance, if any
    pub async fn wait(&mut self) {
        if let Some(handle) = self.current.take() {
            // Cancelled tasks resolve with a JoinError; nothing to report
            let _ = handle.await;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn speech_time(&self, request: &NarrationRequest) -> Duration {
        let words = request.text.split_whitespace().count().max(1) as f64;
        let rate = if request.rate > 0.0 { request.rate } else { 1.0 };
        self.pace.mul_f64(words / rate)
    }
}

impl Default for TaskNarrator {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrationSink for TaskNarrator {
    fn speak(&mut self, request: NarrationRequest) {
        let Some(runtime) = &self.runtime else {
            tracing::warn!("No async runtime, narration dropped: {}", request.text);
            return;
        };

        let hold = self.speech_time(&request);
        let finished = Arc::clone(&self.finished);
        self.current = Some(runtime.spawn(async move {
            tracing::info!("🔊 {}", request.text);
            tokio::time::sleep(hold).await;
            if let Ok(mut done) = finished.lock() {
                done.push(request.text);
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            if !handle.is_finished() {
                tracing::debug!("Narration interrupted");
            }
            handle.abort();
        }
    }
}

impl Drop for TaskNarrator {
    fn drop(&mut self) {
        self.cancel();
    }
}
