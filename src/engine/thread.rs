use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::bus::LogObserver;
use crate::cartridge;
use crate::config::Settings;
use crate::deck::{Deck, DeckState, RodioRenderer};
use crate::transport::Transport;

use super::types::{EngineCmd, NowPlayingHandle};

/// Position sampling / trigger cadence while the thread is otherwise idle.
const TICK: Duration = Duration::from_millis(100);

pub(super) fn spawn_engine_thread(
    rx: Receiver<EngineCmd>,
    snapshot: NowPlayingHandle,
    settings: Settings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // The output stream must be created on the thread that owns it.
        let renderer = RodioRenderer::new();
        let deck = Deck::new(
            renderer,
            Duration::from_millis(settings.deck.ready_fallback_ms),
        );
        let mut transport = Transport::new(deck, settings.playback.advance_on_error);
        transport.attach_observer(Arc::new(Mutex::new(LogObserver)));
        transport.set_volume(settings.playback.volume);

        let mut message: Option<String> = None;

        loop {
            match rx.recv_timeout(TICK) {
                Ok(cmd) => match cmd {
                    EngineCmd::Load(path) => {
                        load_cartridge(&mut transport, &path, &mut message);
                    }
                    EngineCmd::Play => transport.play(),
                    EngineCmd::Pause => transport.pause(),
                    EngineCmd::PlayPause => {
                        if transport.state() == DeckState::Playing {
                            transport.pause();
                        } else {
                            transport.play();
                        }
                    }
                    EngineCmd::Stop => transport.stop(),
                    EngineCmd::Next => transport.next(),
                    EngineCmd::Prev => transport.previous(),
                    EngineCmd::SeekTo(secs) => {
                        transport.seek(Duration::from_secs_f64(secs.max(0.0)));
                    }
                    EngineCmd::SetVolume(v) => transport.set_volume(v),
                    EngineCmd::Quit => {
                        transport.stop();
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    transport.tick(Instant::now());
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }

            publish_snapshot(&snapshot, &transport, &message);
        }
    })
}

fn load_cartridge(
    transport: &mut Transport<RodioRenderer>,
    path: &Path,
    message: &mut Option<String>,
) {
    match cartridge::ingest(path) {
        Ok(album) => {
            log::info!("loaded cartridge {} ({} tracks)", album.title, album.tracks.len());
            *message = None;
            // Replace the queue only after stopping whatever is bound.
            transport.stop();
            transport.load_album(album);
            transport.play();
        }
        Err(e) => {
            // Non-fatal: surface one line, leave the queue untouched.
            log::error!("failed to load {}: {e}", path.display());
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("cartridge");
            *message = Some(format!("cannot load {name}: {e}"));
        }
    }
}

fn publish_snapshot(
    snapshot: &NowPlayingHandle,
    transport: &Transport<RodioRenderer>,
    message: &Option<String>,
) {
    if let Ok(mut snap) = snapshot.lock() {
        snap.track = transport.current_track().cloned();
        snap.cursor = transport.cursor();
        snap.queue = transport.queue();
        snap.state = transport.state();
        snap.position = transport.position();
        snap.duration = transport.duration();
        snap.volume = transport.volume();
        snap.album_title = transport.album_title().map(str::to_string);
        snap.cover_art = transport.cover_art().map(Path::to_path_buf);
        snap.awaiting_user_start = transport.awaiting_user_start();
        snap.message = message.clone();
    }
}
