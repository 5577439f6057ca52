//! Deck state machine: binds one track at a time and turns the
//! renderer's racy readiness signaling into clean state transitions.

use std::time::{Duration, Instant};

use crate::cartridge::SourceHandle;

use super::renderer::Renderer;
use super::types::{DeckState, Readiness, StartRejection};

/// Minimum buffered readiness required before a start is actually issued.
/// Triggers that fire below this level defer; a later trigger retries.
const MIN_START_READINESS: Readiness = Readiness::SomeData;

pub struct Deck<R: Renderer> {
    renderer: R,
    state: DeckState,
    /// Source currently bound to the renderer.
    current: Option<SourceHandle>,
    /// Last bound source; survives a discarded binding so resume can
    /// rebuild it.
    remembered: Option<SourceHandle>,
    /// Requested volume, clamped; applied on every bind.
    volume: f32,
    /// When the current load began; the fallback deadline keys off this.
    loading_since: Option<Instant>,
    ready_fallback: Duration,
    /// A start has been issued for this load; later triggers are no-ops.
    start_issued: bool,
    /// One-shot trigger: first sight of decoded data.
    saw_some_data: bool,
    /// Whether the current pause came from an autoplay rejection rather
    /// than the user.
    parked_by_policy: bool,
    position: Duration,
    duration: Option<Duration>,
}

impl<R: Renderer> Deck<R> {
    /// `ready_fallback` is the deadline after which a start is attempted
    /// even if the renderer never signaled readiness cleanly.
    pub fn new(renderer: R, ready_fallback: Duration) -> Self {
        Self {
            renderer,
            state: DeckState::Idle,
            current: None,
            remembered: None,
            volume: 1.0,
            loading_since: None,
            ready_fallback,
            start_issued: false,
            saw_some_data: false,
            parked_by_policy: false,
            position: Duration::ZERO,
            duration: None,
        }
    }

    /// Bind `source` and arm the start triggers. Binding the source that
    /// is already playing is a no-op; anything else tears down the
    /// existing binding first.
    pub fn load(&mut self, source: &SourceHandle) {
        if self.state == DeckState::Playing && self.current.as_ref() == Some(source) {
            return;
        }
        self.renderer.release();
        self.position = Duration::ZERO;
        self.duration = None;
        self.current = Some(source.clone());
        self.remembered = Some(source.clone());
        self.start_issued = false;
        self.saw_some_data = false;
        self.parked_by_policy = false;
        self.loading_since = Some(Instant::now());
        self.state = DeckState::Loading;
        self.renderer.begin_load(source);
        self.renderer.set_volume(self.volume);
    }

    /// Valid only while `Playing`.
    pub fn pause(&mut self) {
        if self.state != DeckState::Playing {
            return;
        }
        self.renderer.pause();
        self.parked_by_policy = false;
        self.state = DeckState::Paused;
    }

    /// Re-issue the start request from `Paused`. If the underlying
    /// binding was discarded in the meantime, reload the remembered
    /// source instead.
    pub fn resume(&mut self) {
        if self.state != DeckState::Paused {
            return;
        }
        if !self.renderer.is_bound() {
            let Some(source) = self.remembered.clone() else {
                return;
            };
            self.current = None; // force a rebind
            self.load(&source);
            return;
        }
        self.parked_by_policy = false;
        self.apply_start_outcome();
    }

    /// Release everything and return to `Idle`. Never produces a
    /// track-ended signal.
    pub fn stop(&mut self) {
        self.renderer.release();
        self.current = None;
        self.loading_since = None;
        self.parked_by_policy = false;
        self.position = Duration::ZERO;
        self.duration = None;
        self.state = DeckState::Idle;
    }

    /// Set position on the bound renderer; the playback state is
    /// unchanged.
    pub fn seek(&mut self, position: Duration) {
        if self.renderer.is_bound() {
            self.renderer.seek(position);
            self.position = position;
        }
    }

    /// Clamp to [0.0, 1.0]; applied immediately when bound, otherwise
    /// remembered for the next bind. Returns the applied value.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        if self.renderer.is_bound() {
            self.renderer.set_volume(volume);
        }
        volume
    }

    /// Advance the machine. While `Loading`, checks the armed triggers;
    /// while `Playing`, samples position and watches for end-of-media.
    /// Returns the finished source exactly once per natural completion.
    pub fn tick(&mut self, now: Instant) -> Option<SourceHandle> {
        match self.state {
            DeckState::Loading => {
                let readiness = self.renderer.readiness();
                let deadline_hit = self
                    .loading_since
                    .is_some_and(|since| now.duration_since(since) >= self.ready_fallback);
                let first_data = readiness >= Readiness::SomeData && !self.saw_some_data;
                if readiness >= Readiness::SomeData {
                    self.saw_some_data = true;
                }
                if readiness == Readiness::Enough || deadline_hit || first_data {
                    self.attempt_start();
                }
                None
            }
            DeckState::Playing => {
                self.position = self.renderer.position();
                if self.duration.is_none() {
                    self.duration = self.renderer.duration();
                }
                if self.renderer.finished() {
                    self.state = DeckState::Ended;
                    let ended = self.current.take();
                    self.renderer.release();
                    self.position = Duration::ZERO;
                    self.duration = None;
                    self.state = DeckState::Idle;
                    return ended;
                }
                None
            }
            _ => None,
        }
    }

    /// Issue the start request at most once per load; defers while the
    /// renderer is below the minimum readiness.
    fn attempt_start(&mut self) {
        if self.start_issued {
            return;
        }
        if self.renderer.readiness() < MIN_START_READINESS {
            return;
        }
        self.start_issued = true;
        self.apply_start_outcome();
    }

    fn apply_start_outcome(&mut self) {
        match self.renderer.request_start() {
            Ok(()) => {
                self.loading_since = None;
                if self.duration.is_none() {
                    self.duration = self.renderer.duration();
                }
                self.state = DeckState::Playing;
            }
            Err(StartRejection::AutoplayBlocked) => {
                // Loaded and ready; a user-initiated start is expected next.
                log::info!("playback start blocked by policy; waiting for the user");
                self.loading_since = None;
                self.parked_by_policy = true;
                self.state = DeckState::Paused;
            }
            Err(StartRejection::Unsupported(reason)) => {
                log::error!("unsupported media: {reason}");
                self.loading_since = None;
                self.state = DeckState::Error;
            }
        }
    }

    pub fn state(&self) -> DeckState {
        self.state
    }

    pub fn current(&self) -> Option<&SourceHandle> {
        self.current.as_ref()
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// True when the deck is paused because the environment rejected an
    /// automatic start, not because the user paused.
    pub fn awaiting_user_start(&self) -> bool {
        self.parked_by_policy
    }
}
