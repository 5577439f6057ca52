//! Notification bus: value-typed events fanned out to attached observers.
//!
//! The transport is the only publisher. Subscribers (UI, MPRIS, logging)
//! only consume; nothing they do feeds back into orchestration.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cartridge::Track;

/// A state-change notification published by the transport.
#[derive(Debug, Clone)]
pub enum Event {
    /// The queue was replaced wholesale.
    QueueLoaded { count: usize },
    /// Intent to play: published as soon as a track is selected for
    /// playback, before any audio is audible. The start may still be
    /// deferred or rejected; watch `PlaybackStarted` for the stronger
    /// guarantee.
    TrackStarted { track: Track },
    /// The deck actually entered `Playing` for the current track.
    PlaybackStarted { track: Track },
    TrackPaused { track: Track },
    /// Manual stop; carries the track that was current before stopping.
    TrackStopped { track: Option<Track> },
    /// Playback ran off the end of the queue.
    QueueEnded,
    Seeked { position: Duration, track: Option<Track> },
    /// Carries the applied (clamped) volume.
    VolumeChanged { value: f32 },
}

impl Event {
    /// Stable name for logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Event::QueueLoaded { .. } => "queue_loaded",
            Event::TrackStarted { .. } => "track_started",
            Event::PlaybackStarted { .. } => "playback_started",
            Event::TrackPaused { .. } => "track_paused",
            Event::TrackStopped { .. } => "track_stopped",
            Event::QueueEnded => "queue_ended",
            Event::Seeked { .. } => "seeked",
            Event::VolumeChanged { .. } => "volume_changed",
        }
    }
}

pub trait Observer {
    fn update(&mut self, event: &Event);
}

pub type SharedObserver = Arc<Mutex<dyn Observer + Send>>;

/// Fan-out of events to subscribers, delivered synchronously in
/// attachment order on the publisher's thread.
#[derive(Default)]
pub struct Bus {
    observers: Vec<SharedObserver>,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Attach a subscriber. Attaching the same subscriber twice has no
    /// additional effect.
    pub fn attach(&mut self, observer: SharedObserver) {
        if self.observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            return;
        }
        self.observers.push(observer);
    }

    /// Remove a subscriber if present; no-op otherwise.
    pub fn detach(&mut self, observer: &SharedObserver) {
        self.observers.retain(|o| !Arc::ptr_eq(o, observer));
    }

    /// Deliver `event` to every subscriber. A subscriber that panics does
    /// not prevent delivery to the ones after it.
    pub fn notify(&self, event: &Event) {
        for observer in &self.observers {
            let delivery = catch_unwind(AssertUnwindSafe(|| {
                if let Ok(mut o) = observer.lock() {
                    o.update(event);
                }
            }));
            if delivery.is_err() {
                log::warn!("observer panicked while handling {}", event.name());
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }
}

/// Logs every event at info level.
pub struct LogObserver;

impl Observer for LogObserver {
    fn update(&mut self, event: &Event) {
        match event {
            Event::TrackStarted { track } => {
                log::info!("track_started: {} - {}", track.artist, track.title)
            }
            Event::QueueLoaded { count } => log::info!("queue_loaded: {count} tracks"),
            Event::VolumeChanged { value } => log::info!("volume_changed: {value:.2}"),
            other => log::info!("{}", other.name()),
        }
    }
}
