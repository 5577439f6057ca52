//! Deck-related small types shared across the playback subsystem.

/// Lifecycle of the deck's single binding.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum DeckState {
    /// Nothing bound.
    #[default]
    Idle,
    /// A source is bound and buffering; start triggers are armed.
    Loading,
    Playing,
    Paused,
    /// Natural end of media; passed through on the way back to `Idle`.
    Ended,
    /// The bound source cannot be rendered. Terminal for that track.
    Error,
}

/// How much of the bound source the renderer has decoded so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Readiness {
    Nothing,
    /// Some data decoded; enough to risk a start.
    SomeData,
    /// The renderer reports sufficient buffered data.
    Enough,
}

/// Why a start request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartRejection {
    /// The environment refuses playback that was not user-initiated.
    /// Recoverable: the track stays bound, an explicit play resumes it.
    AutoplayBlocked,
    /// The bound source cannot be rendered at all.
    Unsupported(String),
}
