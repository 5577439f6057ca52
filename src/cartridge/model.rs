//! Album and track model produced by cartridge ingestion.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

/// Artist used when the cartridge carries no artist information.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Cheap, comparable reference to one extracted byte source.
///
/// Holds a locator, not bytes; the file behind it lives in the owning
/// album's temp store and disappears when that album is dropped.
#[derive(Debug, Clone)]
pub struct SourceHandle(Arc<PathBuf>);

impl SourceHandle {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(Arc::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl PartialEq for SourceHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for SourceHandle {}

/// One playable unit within an album.
///
/// Immutable once constructed, except `duration`, which is filled in
/// lazily the first time the renderer reports it.
#[derive(Debug, Clone)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// 1-based position within the album; `None` sorts last.
    pub number: Option<u32>,
    pub duration: Option<Duration>,
    pub source: SourceHandle,
}

/// One ingested cartridge: ordered tracks plus optional cover art.
///
/// The album owns the temp directory its byte sources were extracted
/// into. Dropping it (queue replacement or teardown) revokes every
/// source it handed out.
#[derive(Debug)]
pub struct Album {
    pub title: String,
    pub artist: String,
    pub tracks: Vec<Track>,
    pub cover_art: Option<PathBuf>,
    _store: TempDir,
}

impl Album {
    pub(crate) fn from_parts(
        title: String,
        tracks: Vec<Track>,
        cover_art: Option<PathBuf>,
        store: TempDir,
    ) -> Self {
        Self {
            title,
            artist: UNKNOWN_ARTIST.to_string(),
            tracks,
            cover_art,
            _store: store,
        }
    }

    /// Tracks in playback order: by track number (unknown numbers last),
    /// then by title.
    pub fn ordered_tracks(&self) -> Vec<Track> {
        let mut tracks = self.tracks.clone();
        tracks.sort_by(|a, b| {
            let ka = a.number.unwrap_or(u32::MAX);
            let kb = b.number.unwrap_or(u32::MAX);
            ka.cmp(&kb).then_with(|| a.title.cmp(&b.title))
        });
        tracks
    }

    /// Total running time, or `None` while any track's duration is still
    /// unknown. An empty album totals zero.
    pub fn total_duration(&self) -> Option<Duration> {
        let mut total = Duration::ZERO;
        for track in &self.tracks {
            total += track.duration?;
        }
        Some(total)
    }
}
