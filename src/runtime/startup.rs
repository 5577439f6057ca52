//! Startup helpers: resolving the CLI target and initial playback.

use std::path::{Path, PathBuf};

use crate::engine::{Engine, EngineCmd};
use crate::library::CartridgeFile;

/// Split the CLI argument into a shelf directory plus an optional
/// cartridge to load right away. A file argument plays at once with its
/// parent directory as the shelf; a directory just becomes the shelf.
pub fn split_target(arg: &Path) -> (PathBuf, Option<PathBuf>) {
    if arg.is_file() {
        let dir = arg
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        (dir, Some(arg.to_path_buf()))
    } else {
        (arg.to_path_buf(), None)
    }
}

/// Kick off initial playback: an explicit cartridge argument wins; a
/// shelf holding exactly one cartridge starts it right away.
pub fn autoload_cartridge(engine: &Engine, autoload: Option<&Path>, shelf: &[CartridgeFile]) {
    if let Some(path) = autoload {
        let _ = engine.send(EngineCmd::Load(path.to_path_buf()));
    } else if let [only] = shelf {
        let _ = engine.send(EngineCmd::Load(only.path.clone()));
    }
}
