//! Engine command surface and the shared now-playing snapshot.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cartridge::Track;
use crate::deck::DeckState;

#[derive(Debug)]
pub enum EngineCmd {
    /// Ingest the cartridge at the given path, then replace the queue
    /// and start playing it.
    Load(PathBuf),
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Absolute position in seconds.
    SeekTo(f64),
    /// Clamped to [0.0, 1.0] by the deck.
    SetVolume(f32),
    /// Stop playback and shut the engine thread down.
    Quit,
}

/// Snapshot of playback state shared with the UI thread.
#[derive(Debug, Clone, Default)]
pub struct NowPlaying {
    pub track: Option<Track>,
    pub cursor: Option<usize>,
    pub queue: Vec<Track>,
    pub state: DeckState,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub album_title: Option<String>,
    pub cover_art: Option<PathBuf>,
    /// Playback is parked waiting for an explicit user start.
    pub awaiting_user_start: bool,
    /// One-line status for the UI (load failures and the like).
    pub message: Option<String>,
}

pub type NowPlayingHandle = Arc<Mutex<NowPlaying>>;
