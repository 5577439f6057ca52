//! Cartridge handling: the `.cart` archive format and its ingestion.
//!
//! A cartridge is a zip bundle holding one album's audio files and
//! optionally a cover image. `ingest` turns one into an `Album` whose
//! tracks reference byte sources extracted into a scoped temp directory.

mod ingest;
mod model;

pub use ingest::{CARTRIDGE_EXT, CartridgeError, ingest, ingest_bytes};
pub use model::{Album, SourceHandle, Track, UNKNOWN_ARTIST};

#[cfg(test)]
mod tests;
