//! Engine: the thread that owns the transport and drives its ticking.
//!
//! Commands arrive over a channel; the receive timeout doubles as the
//! tick that advances the deck state machine and refreshes the shared
//! now-playing snapshot for the UI and MPRIS.

mod handle;
mod thread;
mod types;

pub use handle::Engine;
pub use types::{EngineCmd, NowPlaying, NowPlayingHandle};
