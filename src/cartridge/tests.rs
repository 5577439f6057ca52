use super::ingest::{CartridgeError, EntryKind, classify, ingest, ingest_bytes};
use super::model::UNKNOWN_ARTIST;

use std::io::Write;
use std::time::Duration;

/// Minimal zip writer for fixtures: stored and deflated entries with a
/// proper central directory, enough for the reader we ship.
struct ZipBuilder {
    data: Vec<u8>,
    central: Vec<u8>,
    count: u16,
}

impl ZipBuilder {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            central: Vec::new(),
            count: 0,
        }
    }

    fn add_stored(&mut self, name: &str, contents: &[u8]) -> &mut Self {
        self.add_raw(name, contents, contents, 0)
    }

    fn add_deflated(&mut self, name: &str, contents: &[u8]) -> &mut Self {
        let mut encoder =
            flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(contents).unwrap();
        let compressed = encoder.finish().unwrap();
        self.add_raw(name, contents, &compressed, 8)
    }

    /// Directory entry; `name` must end with a slash.
    fn add_dir(&mut self, name: &str) -> &mut Self {
        assert!(name.ends_with('/'));
        self.add_raw(name, &[], &[], 0)
    }

    fn add_raw(&mut self, name: &str, raw: &[u8], stored: &[u8], method: u16) -> &mut Self {
        let offset = self.data.len() as u32;
        let crc = {
            let mut crc = flate2::Crc::new();
            crc.update(raw);
            crc.sum()
        };

        self.data.extend_from_slice(&0x04034b50u32.to_le_bytes());
        self.data.extend_from_slice(&20u16.to_le_bytes()); // version needed
        self.data.extend_from_slice(&0u16.to_le_bytes()); // flags
        self.data.extend_from_slice(&method.to_le_bytes());
        self.data.extend_from_slice(&0u16.to_le_bytes()); // mod time
        self.data.extend_from_slice(&0u16.to_le_bytes()); // mod date
        self.data.extend_from_slice(&crc.to_le_bytes());
        self.data
            .extend_from_slice(&(stored.len() as u32).to_le_bytes());
        self.data
            .extend_from_slice(&(raw.len() as u32).to_le_bytes());
        self.data
            .extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.data.extend_from_slice(&0u16.to_le_bytes()); // extra len
        self.data.extend_from_slice(name.as_bytes());
        self.data.extend_from_slice(stored);

        self.central.extend_from_slice(&0x02014b50u32.to_le_bytes());
        self.central.extend_from_slice(&20u16.to_le_bytes()); // version made by
        self.central.extend_from_slice(&20u16.to_le_bytes()); // version needed
        self.central.extend_from_slice(&0u16.to_le_bytes()); // flags
        self.central.extend_from_slice(&method.to_le_bytes());
        self.central.extend_from_slice(&0u16.to_le_bytes()); // mod time
        self.central.extend_from_slice(&0u16.to_le_bytes()); // mod date
        self.central.extend_from_slice(&crc.to_le_bytes());
        self.central
            .extend_from_slice(&(stored.len() as u32).to_le_bytes());
        self.central
            .extend_from_slice(&(raw.len() as u32).to_le_bytes());
        self.central
            .extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.central.extend_from_slice(&0u16.to_le_bytes()); // extra len
        self.central.extend_from_slice(&0u16.to_le_bytes()); // comment len
        self.central.extend_from_slice(&0u16.to_le_bytes()); // disk start
        self.central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        self.central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        self.central.extend_from_slice(&offset.to_le_bytes());
        self.central.extend_from_slice(name.as_bytes());
        self.count += 1;
        self
    }

    fn finish(self) -> Vec<u8> {
        let ZipBuilder {
            data: mut out,
            central,
            count,
        } = self;
        let cd_offset = out.len() as u32;
        let cd_size = central.len() as u32;
        out.extend_from_slice(&central);
        out.extend_from_slice(&0x06054b50u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // this disk
        out.extend_from_slice(&0u16.to_le_bytes()); // cd disk
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // comment len
        out
    }
}

#[test]
fn classify_recognizes_audio_extensions() {
    for name in [
        "a.mp3", "b.FLAC", "c.wav", "d.m4a", "e.aac", "f.ogg", "g.opus",
    ] {
        assert_eq!(classify(name), EntryKind::Audio, "{name}");
    }
    assert_eq!(classify("notes.txt"), EntryKind::Ignored);
    assert_eq!(classify("noext"), EntryKind::Ignored);
}

#[test]
fn classify_skips_directories_and_platform_junk() {
    assert_eq!(classify("music/"), EntryKind::Ignored);
    assert_eq!(classify("__MACOSX/.hidden"), EntryKind::Ignored);
    assert_eq!(classify("__MACOSX/track.mp3"), EntryKind::Ignored);
    assert_eq!(classify(".DS_Store"), EntryKind::Ignored);
}

#[test]
fn classify_cover_art_requires_name_heuristic() {
    assert_eq!(classify("cover.jpg"), EntryKind::CoverArt);
    assert_eq!(classify("Folder.PNG"), EntryKind::CoverArt);
    assert_eq!(classify("art/album-cover.jpeg"), EntryKind::CoverArt);
    // An image without "cover"/"folder" in its name is not cover art.
    assert_eq!(classify("photo.jpg"), EntryKind::Ignored);
    // The heuristic applies to the base name only.
    assert_eq!(classify("covers/photo.jpg"), EntryKind::Ignored);
}

#[test]
fn ingest_demo_cartridge_orders_tracks_and_attaches_cover() {
    let mut zip = ZipBuilder::new();
    zip.add_stored("02_b.mp3", b"bytes-b")
        .add_stored("01_a.mp3", b"bytes-a")
        .add_stored("cover.jpg", b"jpeg-bytes")
        .add_stored("__MACOSX/.hidden", b"junk")
        .add_dir("art/");
    let album = ingest_bytes(&zip.finish(), "Demo.cart").unwrap();

    assert_eq!(album.title, "Demo");
    assert_eq!(album.tracks.len(), 2);
    assert_eq!(album.tracks[0].title, "01_a");
    assert_eq!(album.tracks[1].title, "02_b");
    assert_eq!(album.tracks[0].number, Some(1));
    assert_eq!(album.tracks[1].number, Some(2));
    assert_eq!(album.tracks[0].artist, UNKNOWN_ARTIST);
    assert_eq!(album.tracks[0].album, "Demo");
    assert!(album.tracks[0].duration.is_none());

    // Byte sources were materialized with the entry contents intact.
    let a = std::fs::read(album.tracks[0].source.path()).unwrap();
    let b = std::fs::read(album.tracks[1].source.path()).unwrap();
    assert_eq!(a, b"bytes-a");
    assert_eq!(b, b"bytes-b");

    let cover = album.cover_art.as_ref().expect("cover attached");
    assert_eq!(std::fs::read(cover).unwrap(), b"jpeg-bytes");
}

#[test]
fn ingest_track_count_matches_recognized_entries() {
    let mut zip = ZipBuilder::new();
    zip.add_stored("one.mp3", b"1")
        .add_stored("two.ogg", b"2")
        .add_stored("three.flac", b"3")
        .add_stored("readme.txt", b"skip")
        .add_stored("photo.jpg", b"skip")
        .add_dir("sub/");
    let album = ingest_bytes(&zip.finish(), "Mix.cart").unwrap();
    assert_eq!(album.tracks.len(), 3);
    let titles: Vec<&str> = album.tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["one", "three", "two"]);
}

#[test]
fn ingest_deflated_entries_decompress() {
    let payload = b"compressible payload ".repeat(64);
    let mut zip = ZipBuilder::new();
    zip.add_deflated("song.mp3", &payload);
    let album = ingest_bytes(&zip.finish(), "Zipped.cart").unwrap();
    assert_eq!(
        std::fs::read(album.tracks[0].source.path()).unwrap(),
        payload
    );
}

#[test]
fn ingest_rejects_wrong_extension() {
    let mut zip = ZipBuilder::new();
    zip.add_stored("one.mp3", b"1");
    let err = ingest_bytes(&zip.finish(), "Demo.zip").unwrap_err();
    assert!(matches!(err, CartridgeError::Format(_)));
}

#[test]
fn ingest_rejects_archives_without_audio() {
    let mut zip = ZipBuilder::new();
    zip.add_stored("cover.jpg", b"jpeg").add_stored("a.txt", b"x");
    let err = ingest_bytes(&zip.finish(), "Empty.cart").unwrap_err();
    assert!(matches!(err, CartridgeError::Empty));
}

#[test]
fn ingest_rejects_garbage_bytes() {
    let err = ingest_bytes(b"this is not a zip archive", "Bad.cart").unwrap_err();
    assert!(matches!(err, CartridgeError::Corrupt(_)));
}

#[test]
fn cover_pick_is_deterministic_smallest_path() {
    let mut zip = ZipBuilder::new();
    zip.add_stored("z_cover.png", b"zzz")
        .add_stored("a_cover.png", b"aaa")
        .add_stored("track.mp3", b"t");
    let album = ingest_bytes(&zip.finish(), "Art.cart").unwrap();
    let cover = album.cover_art.as_ref().unwrap();
    assert_eq!(std::fs::read(cover).unwrap(), b"aaa");
}

#[test]
fn nested_audio_sorts_by_base_file_name() {
    let mut zip = ZipBuilder::new();
    zip.add_stored("disc2/01.mp3", b"d2")
        .add_stored("disc1/02.mp3", b"d1");
    let album = ingest_bytes(&zip.finish(), "Nested.cart").unwrap();
    assert_eq!(album.tracks[0].title, "01");
    assert_eq!(album.tracks[1].title, "02");
}

#[test]
fn ingest_from_disk_and_sources_revoked_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let mut zip = ZipBuilder::new();
    zip.add_stored("song.mp3", b"abc");
    let cart = dir.path().join("Shelfed.cart");
    std::fs::write(&cart, zip.finish()).unwrap();

    let album = ingest(&cart).unwrap();
    let source_path = album.tracks[0].source.path().to_path_buf();
    assert!(source_path.exists());

    drop(album);
    assert!(!source_path.exists(), "dropping the album revokes sources");
}

#[test]
fn ingest_from_disk_rejects_non_cartridge_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("album.zip");
    std::fs::write(&path, b"irrelevant").unwrap();
    assert!(matches!(
        ingest(&path).unwrap_err(),
        CartridgeError::Format(_)
    ));
}

#[test]
fn ordered_tracks_sorts_unknown_numbers_last() {
    let mut zip = ZipBuilder::new();
    zip.add_stored("b.mp3", b"b").add_stored("a.mp3", b"a");
    let mut album = ingest_bytes(&zip.finish(), "Order.cart").unwrap();
    album.tracks[0].number = None; // "a" loses its ordinal

    let ordered = album.ordered_tracks();
    assert_eq!(ordered[0].title, "b");
    assert_eq!(ordered[1].title, "a");
}

#[test]
fn total_duration_requires_every_track() {
    let mut zip = ZipBuilder::new();
    zip.add_stored("a.mp3", b"a").add_stored("b.mp3", b"b");
    let mut album = ingest_bytes(&zip.finish(), "Sum.cart").unwrap();
    assert_eq!(album.total_duration(), None);

    album.tracks[0].duration = Some(Duration::from_secs(90));
    assert_eq!(album.total_duration(), None);

    album.tracks[1].duration = Some(Duration::from_secs(30));
    assert_eq!(album.total_duration(), Some(Duration::from_secs(120)));
}
