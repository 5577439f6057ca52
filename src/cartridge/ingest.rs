//! Cartridge ingestion: enumerate, classify, extract, order.
//!
//! Runs once per load. Two passes over the archive: the first classifies
//! every entry without materializing bytes, the second extracts only the
//! selected entries into the album's temp store.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

use super::model::{Album, SourceHandle, Track, UNKNOWN_ARTIST};

/// File extension of a cartridge bundle.
pub const CARTRIDGE_EXT: &str = "cart";

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "m4a", "aac", "ogg", "opus"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
/// macOS resource-fork directory shipped inside Finder-made zips.
const JUNK_PREFIX: &str = "__MACOSX";

#[derive(Debug, Error)]
pub enum CartridgeError {
    /// The file name does not carry the cartridge extension.
    #[error("not a cartridge file: {0}")]
    Format(String),
    /// The archive cannot be opened, parsed or extracted.
    #[error("corrupt cartridge: {0}")]
    Corrupt(String),
    /// The archive contains no recognized audio entries.
    #[error("cartridge contains no audio tracks")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Audio,
    CoverArt,
    Ignored,
}

/// Classify one archive entry path. Pure and order-independent.
pub(crate) fn classify(entry_path: &str) -> EntryKind {
    if entry_path.ends_with('/') || entry_path.starts_with(JUNK_PREFIX) {
        return EntryKind::Ignored;
    }
    let base = base_name(entry_path);
    let lower = base.to_ascii_lowercase();
    let Some((stem, ext)) = lower.rsplit_once('.') else {
        return EntryKind::Ignored;
    };
    if stem.is_empty() {
        // Dotfiles like `.DS_Store` carry no real extension.
        return EntryKind::Ignored;
    }
    if AUDIO_EXTENSIONS.contains(&ext) {
        return EntryKind::Audio;
    }
    if IMAGE_EXTENSIONS.contains(&ext) && (lower.contains("cover") || lower.contains("folder")) {
        return EntryKind::CoverArt;
    }
    EntryKind::Ignored
}

fn base_name(entry_path: &str) -> &str {
    entry_path.rsplit('/').next().unwrap_or(entry_path)
}

/// Track title: everything before the last dot, or the whole name when
/// there is none.
fn title_of(base: &str) -> &str {
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    }
}

fn is_cartridge_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(CARTRIDGE_EXT))
}

/// Read and ingest a cartridge from disk.
pub fn ingest(path: &Path) -> Result<Album, CartridgeError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CartridgeError::Format(path.display().to_string()))?
        .to_string();
    if !is_cartridge_name(&name) {
        return Err(CartridgeError::Format(name));
    }
    let bytes = std::fs::read(path)
        .map_err(|e| CartridgeError::Corrupt(format!("read {}: {e}", path.display())))?;
    ingest_bytes(&bytes, &name)
}

/// Ingest a cartridge already held in memory. `archive_name` must carry
/// the cartridge extension; its stem becomes the album title.
pub fn ingest_bytes(bytes: &[u8], archive_name: &str) -> Result<Album, CartridgeError> {
    if !is_cartridge_name(archive_name) {
        return Err(CartridgeError::Format(archive_name.to_string()));
    }
    let album_title = Path::new(archive_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(archive_name)
        .to_string();

    let archive = rawzip::ZipArchive::from_slice(bytes)
        .map_err(|e| CartridgeError::Corrupt(format!("invalid zip archive: {e:?}")))?;

    // First pass: classify everything.
    let mut audio: Vec<(String, String)> = Vec::new(); // (base name, full path)
    let mut cover: Option<(String, String)> = None;
    for entry in archive.entries() {
        let entry =
            entry.map_err(|e| CartridgeError::Corrupt(format!("zip entry error: {e:?}")))?;
        if entry.is_dir() {
            continue;
        }
        let entry_path = entry
            .file_path()
            .try_normalize()
            .map_err(|e| CartridgeError::Corrupt(format!("bad entry path: {e:?}")))?
            .as_ref()
            .to_string();
        check_entry_path(&entry_path)?;
        match classify(&entry_path) {
            EntryKind::Audio => audio.push((base_name(&entry_path).to_string(), entry_path)),
            EntryKind::CoverArt => {
                // Deterministic pick: the lexicographically smallest
                // matching path wins.
                let replace = match &cover {
                    Some((_, kept)) => entry_path < *kept,
                    None => true,
                };
                if replace {
                    cover = Some((base_name(&entry_path).to_string(), entry_path));
                }
            }
            EntryKind::Ignored => {}
        }
    }

    if audio.is_empty() {
        return Err(CartridgeError::Empty);
    }

    // Playback order: ascending by case-preserved file name, ties broken
    // by full path so the sort stays total.
    audio.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let store = TempDir::with_prefix("attacca-")
        .map_err(|e| CartridgeError::Corrupt(format!("create temp store: {e}")))?;

    // Assign output paths up front so the second pass can extract in
    // whatever order the archive enumerates.
    let mut wanted: HashMap<String, PathBuf> = HashMap::new();
    for (i, (base, full)) in audio.iter().enumerate() {
        wanted.insert(
            full.clone(),
            store.path().join(format!("{:03}_{base}", i + 1)),
        );
    }
    if let Some((base, full)) = &cover {
        wanted.insert(full.clone(), store.path().join(base));
    }

    // Second pass: materialize the selected entries.
    for entry in archive.entries() {
        let entry =
            entry.map_err(|e| CartridgeError::Corrupt(format!("zip entry error: {e:?}")))?;
        if entry.is_dir() {
            continue;
        }
        let entry_path = entry
            .file_path()
            .try_normalize()
            .map_err(|e| CartridgeError::Corrupt(format!("bad entry path: {e:?}")))?
            .as_ref()
            .to_string();
        let Some(out_path) = wanted.get(&entry_path) else {
            continue;
        };
        let mut out = File::create(out_path)
            .map_err(|e| CartridgeError::Corrupt(format!("create {}: {e}", out_path.display())))?;
        let wayfinder = entry.wayfinder();
        let slice_entry = archive
            .get_entry(wayfinder)
            .map_err(|e| CartridgeError::Corrupt(format!("failed to get entry data: {e:?}")))?;
        let data = slice_entry.data();
        match entry.compression_method() {
            rawzip::CompressionMethod::Store => {
                io::copy(&mut &*data, &mut out)
                    .map_err(|e| CartridgeError::Corrupt(format!("extract {entry_path}: {e}")))?;
            }
            rawzip::CompressionMethod::Deflate => {
                let mut decoder = flate2::read::DeflateDecoder::new(data);
                io::copy(&mut decoder, &mut out).map_err(|e| {
                    CartridgeError::Corrupt(format!("extract (deflate) {entry_path}: {e}"))
                })?;
            }
            method => {
                return Err(CartridgeError::Corrupt(format!(
                    "unsupported compression method: {method:?}"
                )));
            }
        }
    }

    let tracks = audio
        .iter()
        .enumerate()
        .map(|(i, (base, full))| Track {
            title: title_of(base).to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            album: album_title.clone(),
            number: Some(i as u32 + 1),
            duration: None,
            source: SourceHandle::new(wanted[full].clone()),
        })
        .collect();

    let cover_art = cover.as_ref().map(|(_, full)| wanted[full].clone());
    Ok(Album::from_parts(album_title, tracks, cover_art, store))
}

/// Reject absolute and parent-escaping entry paths.
fn check_entry_path(entry_path: &str) -> Result<(), CartridgeError> {
    let raw = Path::new(entry_path);
    if raw.is_absolute() || raw.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(CartridgeError::Corrupt(format!(
            "unsupported path in archive: {entry_path}"
        )));
    }
    Ok(())
}
