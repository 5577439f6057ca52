use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::cartridge::SourceHandle;

use super::player::Deck;
use super::testing::ScriptedRenderer;
use super::types::{DeckState, Readiness, StartRejection};

fn src(name: &str) -> SourceHandle {
    SourceHandle::new(PathBuf::from(format!("/tmp/deck-tests/{name}")))
}

fn ready_deck() -> (Deck<ScriptedRenderer>, ScriptedRenderer) {
    let renderer = ScriptedRenderer::new();
    let handle = renderer.clone();
    (Deck::new(renderer, Duration::from_millis(2000)), handle)
}

#[test]
fn load_then_tick_starts_when_renderer_is_ready() {
    let (mut deck, handle) = ready_deck();
    let source = src("a.mp3");

    deck.load(&source);
    assert_eq!(deck.state(), DeckState::Loading);
    assert_eq!(deck.current(), Some(&source));

    deck.tick(Instant::now());
    assert_eq!(deck.state(), DeckState::Playing);
    assert_eq!(handle.script().start_calls, 1);

    // Later triggers are no-ops once the state moved on.
    deck.tick(Instant::now());
    deck.tick(Instant::now());
    assert_eq!(handle.script().start_calls, 1);
}

#[test]
fn start_defers_below_minimum_readiness_even_past_deadline() {
    let renderer = ScriptedRenderer::new();
    let handle = renderer.clone();
    handle.script().readiness = Readiness::Nothing;
    // Deadline of zero: the fallback trigger fires on the first tick.
    let mut deck = Deck::new(renderer, Duration::ZERO);

    deck.load(&src("slow.mp3"));
    deck.tick(Instant::now());
    deck.tick(Instant::now());
    assert_eq!(deck.state(), DeckState::Loading);
    assert_eq!(handle.script().start_calls, 0);

    // First sight of decoded data retries the deferred start.
    handle.script().readiness = Readiness::SomeData;
    deck.tick(Instant::now());
    assert_eq!(deck.state(), DeckState::Playing);
    assert_eq!(handle.script().start_calls, 1);
}

#[test]
fn autoplay_rejection_parks_paused_with_track_bound() {
    let (mut deck, handle) = ready_deck();
    handle.script().start_response = Err(StartRejection::AutoplayBlocked);

    let source = src("blocked.mp3");
    deck.load(&source);
    deck.tick(Instant::now());

    assert_eq!(deck.state(), DeckState::Paused);
    assert!(deck.awaiting_user_start());
    assert_eq!(deck.current(), Some(&source));
    assert!(handle.script().bound.is_some());

    // An explicit user start succeeds from here.
    handle.script().start_response = Ok(());
    deck.resume();
    assert_eq!(deck.state(), DeckState::Playing);
    assert!(!deck.awaiting_user_start());
}

#[test]
fn unsupported_rejection_is_terminal_for_the_track() {
    let (mut deck, handle) = ready_deck();
    handle.script().start_response = Err(StartRejection::Unsupported("bad codec".into()));

    deck.load(&src("broken.mp3"));
    deck.tick(Instant::now());
    assert_eq!(deck.state(), DeckState::Error);

    // Error is not Paused; resume does nothing.
    deck.resume();
    assert_eq!(deck.state(), DeckState::Error);
}

#[test]
fn pause_is_valid_only_while_playing() {
    let (mut deck, handle) = ready_deck();
    deck.load(&src("a.mp3"));
    // Still loading: pause must not transition.
    deck.pause();
    assert_eq!(deck.state(), DeckState::Loading);

    deck.tick(Instant::now());
    deck.pause();
    assert_eq!(deck.state(), DeckState::Paused);
    assert!(!handle.script().playing);
}

#[test]
fn resume_reloads_when_the_binding_was_discarded() {
    let (mut deck, handle) = ready_deck();
    deck.load(&src("a.mp3"));
    deck.tick(Instant::now());
    deck.pause();

    handle.drop_binding();
    deck.resume();

    // The remembered source was re-bound from scratch.
    assert_eq!(deck.state(), DeckState::Loading);
    assert_eq!(handle.script().load_calls, 2);
    deck.tick(Instant::now());
    assert_eq!(deck.state(), DeckState::Playing);
}

#[test]
fn stop_releases_from_any_state() {
    let (mut deck, handle) = ready_deck();

    deck.load(&src("a.mp3"));
    deck.stop();
    assert_eq!(deck.state(), DeckState::Idle);
    assert!(deck.current().is_none());

    deck.load(&src("b.mp3"));
    deck.tick(Instant::now());
    handle.script().position = Duration::from_secs(42);
    deck.tick(Instant::now());
    deck.stop();
    assert_eq!(deck.state(), DeckState::Idle);
    assert_eq!(deck.position(), Duration::ZERO);
    assert!(handle.script().bound.is_none());
}

#[test]
fn natural_completion_reports_the_source_exactly_once() {
    let (mut deck, handle) = ready_deck();
    let source = src("a.mp3");
    deck.load(&source);
    deck.tick(Instant::now());

    handle.script().finished = true;
    let ended = deck.tick(Instant::now());
    assert_eq!(ended.as_ref(), Some(&source));
    assert_eq!(deck.state(), DeckState::Idle);
    assert_eq!(deck.position(), Duration::ZERO);

    assert_eq!(deck.tick(Instant::now()), None);
}

#[test]
fn manual_stop_never_reports_an_ended_source() {
    let (mut deck, _handle) = ready_deck();
    deck.load(&src("a.mp3"));
    deck.tick(Instant::now());
    deck.stop();
    assert_eq!(deck.tick(Instant::now()), None);
}

#[test]
fn loading_the_playing_source_is_a_no_op() {
    let (mut deck, handle) = ready_deck();
    let source = src("a.mp3");
    deck.load(&source);
    deck.tick(Instant::now());
    assert_eq!(deck.state(), DeckState::Playing);

    deck.load(&source);
    assert_eq!(deck.state(), DeckState::Playing);
    assert_eq!(handle.script().load_calls, 1);
}

#[test]
fn loading_a_different_source_tears_down_the_old_binding() {
    let (mut deck, handle) = ready_deck();
    deck.load(&src("a.mp3"));
    deck.tick(Instant::now());

    let releases_before = handle.script().release_calls;
    deck.load(&src("b.mp3"));
    assert_eq!(deck.state(), DeckState::Loading);
    assert!(handle.script().release_calls > releases_before);
}

#[test]
fn volume_clamps_and_applies_on_next_bind_when_unbound() {
    let (mut deck, handle) = ready_deck();

    assert_eq!(deck.set_volume(1.7), 1.0);
    assert_eq!(deck.set_volume(-0.3), 0.0);
    assert_eq!(deck.set_volume(0.3), 0.3);
    // Nothing bound yet: the renderer has not been touched.
    assert_eq!(handle.script().volume, None);

    deck.load(&src("a.mp3"));
    assert_eq!(handle.script().volume, Some(0.3));
}

#[test]
fn seek_delegates_without_changing_state() {
    let (mut deck, handle) = ready_deck();
    deck.load(&src("a.mp3"));
    deck.tick(Instant::now());

    deck.seek(Duration::from_secs(30));
    assert_eq!(deck.state(), DeckState::Playing);
    assert_eq!(handle.script().seeks, vec![Duration::from_secs(30)]);
    assert_eq!(deck.position(), Duration::from_secs(30));

    // Unbound: seek is ignored.
    deck.stop();
    deck.seek(Duration::from_secs(5));
    assert_eq!(handle.script().seeks.len(), 1);
}

#[test]
fn position_and_duration_are_sampled_while_playing() {
    let (mut deck, handle) = ready_deck();
    handle.script().duration = Some(Duration::from_secs(180));
    deck.load(&src("a.mp3"));
    deck.tick(Instant::now());

    handle.script().position = Duration::from_secs(7);
    deck.tick(Instant::now());
    assert_eq!(deck.position(), Duration::from_secs(7));
    assert_eq!(deck.duration(), Some(Duration::from_secs(180)));
}
