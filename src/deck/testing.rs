//! Scripted renderer: a fully controllable `Renderer` for state-machine
//! tests. The deck owns the renderer, so tests keep a cloned handle to
//! the shared script and steer it from outside.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::cartridge::SourceHandle;

use super::renderer::Renderer;
use super::types::{Readiness, StartRejection};

#[derive(Debug)]
pub(crate) struct Script {
    pub readiness: Readiness,
    pub start_response: Result<(), StartRejection>,
    pub bound: Option<SourceHandle>,
    pub playing: bool,
    pub finished: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: Option<f32>,
    pub load_calls: usize,
    pub start_calls: usize,
    pub release_calls: usize,
    pub seeks: Vec<Duration>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            readiness: Readiness::Enough,
            start_response: Ok(()),
            bound: None,
            playing: false,
            finished: false,
            position: Duration::ZERO,
            duration: None,
            volume: None,
            load_calls: 0,
            start_calls: 0,
            release_calls: 0,
            seeks: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedRenderer {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self) -> MutexGuard<'_, Script> {
        self.inner.lock().unwrap()
    }

    /// Simulate the underlying resource being discarded behind the
    /// deck's back.
    pub fn drop_binding(&self) {
        let mut script = self.script();
        script.bound = None;
        script.playing = false;
    }
}

impl Renderer for ScriptedRenderer {
    fn begin_load(&mut self, source: &SourceHandle) {
        let mut script = self.script();
        script.load_calls += 1;
        script.bound = Some(source.clone());
        script.playing = false;
        script.finished = false;
        script.position = Duration::ZERO;
    }

    fn readiness(&self) -> Readiness {
        self.script().readiness
    }

    fn request_start(&mut self) -> Result<(), StartRejection> {
        let mut script = self.script();
        script.start_calls += 1;
        let response = script.start_response.clone();
        if response.is_ok() {
            script.playing = true;
        }
        response
    }

    fn pause(&mut self) {
        self.script().playing = false;
    }

    fn release(&mut self) {
        let mut script = self.script();
        script.release_calls += 1;
        script.bound = None;
        script.playing = false;
        script.finished = false;
    }

    fn seek(&mut self, position: Duration) {
        let mut script = self.script();
        script.seeks.push(position);
        script.position = position;
    }

    fn set_volume(&mut self, volume: f32) {
        self.script().volume = Some(volume);
    }

    fn position(&self) -> Duration {
        self.script().position
    }

    fn duration(&self) -> Option<Duration> {
        self.script().duration
    }

    fn finished(&self) -> bool {
        self.script().finished
    }

    fn is_bound(&self) -> bool {
        self.script().bound.is_some()
    }
}
