//! Transport: the queue orchestrator.
//!
//! Owns the ordered track list and the cursor, translates transport
//! commands into deck calls, auto-advances on natural completion and is
//! the sole publisher on the notification bus.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::bus::{Bus, Event, SharedObserver};
use crate::cartridge::{Album, SourceHandle, Track};
use crate::deck::{Deck, DeckState, Renderer};

pub struct Transport<R: Renderer> {
    /// Keeps the extracted byte sources alive while the queue uses them.
    album: Option<Album>,
    queue: Vec<Track>,
    /// `None`, or a valid index into `queue`.
    cursor: Option<usize>,
    current: Option<Track>,
    deck: Deck<R>,
    bus: Bus,
    /// Skip past tracks that error out instead of parking on them.
    advance_on_error: bool,
    /// Deck observed `Playing` since the last start intent; used to
    /// edge-detect the audible-start signal. Re-armed on every rebind.
    was_playing: bool,
}

impl<R: Renderer> Transport<R> {
    pub fn new(deck: Deck<R>, advance_on_error: bool) -> Self {
        Self {
            album: None,
            queue: Vec::new(),
            cursor: None,
            current: None,
            deck,
            bus: Bus::new(),
            advance_on_error,
            was_playing: false,
        }
    }

    pub fn attach_observer(&mut self, observer: SharedObserver) {
        self.bus.attach(observer);
    }

    /// Replace the queue with an album's tracks in playback order. The
    /// previous album is dropped, revoking its byte sources. The deck is
    /// not touched; call `stop` first if something is playing.
    pub fn load_album(&mut self, album: Album) {
        let tracks = album.ordered_tracks();
        self.album = Some(album);
        self.load_queue(tracks);
    }

    /// Replace the queue wholesale and clear the cursor.
    pub fn load_queue(&mut self, tracks: Vec<Track>) {
        self.queue = tracks;
        self.cursor = None;
        self.current = None;
        self.bus.notify(&Event::QueueLoaded {
            count: self.queue.len(),
        });
    }

    /// Start or resume playback. With no current track the cursor seeds
    /// at the head of the queue. On an empty queue this is a silent
    /// no-op. `TrackStarted` is published immediately as intent to play;
    /// the actual audio start may still be deferred or rejected.
    pub fn play(&mut self) {
        if self.current.is_none() {
            if self.queue.is_empty() {
                log::debug!("play requested with an empty queue");
                return;
            }
            self.cursor = Some(0);
            self.current = Some(self.queue[0].clone());
        }
        let Some(track) = self.current.clone() else {
            return;
        };
        let resumable = self.deck.state() == DeckState::Paused
            && self.deck.current() == Some(&track.source);
        if resumable {
            self.deck.resume();
        } else {
            self.deck.load(&track.source);
        }
        // Re-arm the audible-start edge for this intent.
        self.was_playing = false;
        self.bus.notify(&Event::TrackStarted { track });
    }

    /// Pause if the deck is actually playing; otherwise do nothing.
    pub fn pause(&mut self) {
        if self.deck.state() != DeckState::Playing {
            return;
        }
        self.deck.pause();
        if let Some(track) = self.current.clone() {
            self.bus.notify(&Event::TrackPaused { track });
        }
    }

    /// Unconditional stop. Publishes `TrackStopped` with the previously
    /// current track, then clears the queue position. The cleared current
    /// track is what lets the auto-advance handler tell a manual stop
    /// from a natural end.
    pub fn stop(&mut self) {
        self.deck.stop();
        let previous = self.current.take();
        self.cursor = None;
        self.was_playing = false;
        self.bus.notify(&Event::TrackStopped { track: previous });
    }

    /// Advance the cursor, or finish the queue when already at the tail.
    pub fn next(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let next_index = match self.cursor {
            Some(c) => c + 1,
            None => 0,
        };
        if next_index < self.queue.len() {
            self.cursor = Some(next_index);
            self.current = Some(self.queue[next_index].clone());
            self.start_current();
        } else {
            self.stop();
            self.bus.notify(&Event::QueueEnded);
        }
    }

    /// Step back, or restart the current track at the head of the queue.
    /// There is no wraparound in either direction.
    pub fn previous(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.current = Some(self.queue[c - 1].clone());
                self.start_current();
            }
            _ => self.start_current(),
        }
    }

    pub fn seek(&mut self, position: Duration) {
        self.deck.seek(position);
        self.bus.notify(&Event::Seeked {
            position,
            track: self.current.clone(),
        });
    }

    pub fn set_volume(&mut self, volume: f32) {
        let value = self.deck.set_volume(volume);
        self.bus.notify(&Event::VolumeChanged { value });
    }

    /// Drive the deck and react to what it reports: auto-advance on
    /// natural completion, duration backfill, the audible-start signal,
    /// and (when configured) skipping errored tracks.
    pub fn tick(&mut self, now: Instant) {
        if let Some(ended) = self.deck.tick(now) {
            self.handle_track_ended(ended);
        }

        // The first successful load fills in the lazily-known duration.
        if let Some(duration) = self.deck.duration() {
            if let (Some(current), Some(cursor)) = (self.current.as_mut(), self.cursor) {
                if current.duration.is_none() {
                    current.duration = Some(duration);
                    if let Some(track) = self.queue.get_mut(cursor) {
                        track.duration = Some(duration);
                    }
                }
            }
        }

        let playing = self.deck.state() == DeckState::Playing;
        if playing && !self.was_playing {
            if let Some(track) = self.current.clone() {
                self.bus.notify(&Event::PlaybackStarted { track });
            }
        }
        self.was_playing = playing;

        if self.advance_on_error
            && self.deck.state() == DeckState::Error
            && self.current.is_some()
        {
            log::warn!("skipping unplayable track");
            self.next();
        }
    }

    /// Auto-advance handler for the deck's track-ended signal. A cleared
    /// current track means a manual stop raced ahead of a late ended
    /// signal; in that case playback must not restart.
    pub fn handle_track_ended(&mut self, _source: SourceHandle) {
        if self.current.is_none() {
            return;
        }
        let has_next = self.cursor.is_some_and(|c| c + 1 < self.queue.len());
        if has_next {
            self.next();
        } else {
            self.stop();
            self.bus.notify(&Event::QueueEnded);
        }
    }

    fn start_current(&mut self) {
        if let Some(track) = self.current.clone() {
            self.deck.load(&track.source);
            self.was_playing = false;
            self.bus.notify(&Event::TrackStarted { track });
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    /// Defensive copy of the queue.
    pub fn queue(&self) -> Vec<Track> {
        self.queue.clone()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn state(&self) -> DeckState {
        self.deck.state()
    }

    pub fn position(&self) -> Duration {
        self.deck.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.deck.duration()
    }

    pub fn volume(&self) -> f32 {
        self.deck.volume()
    }

    pub fn awaiting_user_start(&self) -> bool {
        self.deck.awaiting_user_start()
    }

    pub fn album_title(&self) -> Option<&str> {
        self.album.as_ref().map(|a| a.title.as_str())
    }

    pub fn cover_art(&self) -> Option<&Path> {
        self.album.as_ref().and_then(|a| a.cover_art.as_deref())
    }
}
