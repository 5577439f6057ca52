use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config;
use crate::deck::DeckState;
use crate::engine::{Engine, EngineCmd, NowPlaying};
use crate::library::CartridgeFile;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui::{self, UiView};

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Shelf cursor.
    pub selected: usize,
    /// Last-known track title as emitted to MPRIS.
    last_mpris_title: Option<String>,
    /// Last-known playback state as emitted to MPRIS.
    last_mpris_state: DeckState,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            selected: 0,
            last_mpris_title: None,
            last_mpris_state: DeckState::Idle,
        }
    }
}

/// Main terminal event loop: handles input, UI drawing and sync with the
/// engine thread and MPRIS. Returns `Ok(())` when shutdown is requested.
#[allow(clippy::too_many_arguments)]
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    shelf: &[CartridgeFile],
    shelf_dir: &str,
    engine: &Engine,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = engine.snapshot_handle();

    loop {
        let now: NowPlaying = snapshot
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();

        // Keep MPRIS in sync even when changes come from media keys or
        // auto-advance.
        let title = now.track.as_ref().map(|t| t.title.clone());
        if title != state.last_mpris_title || now.state != state.last_mpris_state {
            update_mpris(mpris, &now);
            state.last_mpris_title = title;
            state.last_mpris_state = now.state;
        }

        let view = UiView {
            shelf,
            selected: state.selected,
            shelf_dir,
            now: &now,
        };
        terminal.draw(|f| ui::draw(f, &view, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            let forwarded = match cmd {
                ControlCmd::Quit => return Ok(()),
                ControlCmd::Play => EngineCmd::Play,
                ControlCmd::Pause => EngineCmd::Pause,
                ControlCmd::PlayPause => EngineCmd::PlayPause,
                ControlCmd::Stop => EngineCmd::Stop,
                ControlCmd::Next => EngineCmd::Next,
                ControlCmd::Prev => EngineCmd::Prev,
            };
            let _ = engine.send(forwarded);
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, shelf, engine, &now, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns `true` when the loop should exit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    shelf: &[CartridgeFile],
    engine: &Engine,
    now: &NowPlaying,
    state: &mut EventLoopState,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            if !shelf.is_empty() {
                state.selected = (state.selected + 1).min(shelf.len() - 1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.selected = state.selected.saturating_sub(1);
        }
        KeyCode::Enter => {
            if let Some(cartridge) = shelf.get(state.selected) {
                let _ = engine.send(EngineCmd::Load(cartridge.path.clone()));
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            let _ = engine.send(EngineCmd::PlayPause);
        }
        KeyCode::Char('s') => {
            let _ = engine.send(EngineCmd::Stop);
        }
        KeyCode::Char('l') => {
            let _ = engine.send(EngineCmd::Next);
        }
        KeyCode::Char('h') => {
            let _ = engine.send(EngineCmd::Prev);
        }
        KeyCode::Char('L') | KeyCode::Right => {
            let target = now.position.as_secs_f64() + settings.controls.scrub_seconds as f64;
            let _ = engine.send(EngineCmd::SeekTo(target));
        }
        KeyCode::Char('H') | KeyCode::Left => {
            let target = now.position.as_secs_f64() - settings.controls.scrub_seconds as f64;
            let _ = engine.send(EngineCmd::SeekTo(target.max(0.0)));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let _ = engine.send(EngineCmd::SetVolume(
                now.volume + settings.controls.volume_step,
            ));
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            let _ = engine.send(EngineCmd::SetVolume(
                now.volume - settings.controls.volume_step,
            ));
        }
        _ => {}
    }
    false
}
