use std::sync::mpsc::{self, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::Settings;

use super::thread::spawn_engine_thread;
use super::types::{EngineCmd, NowPlaying, NowPlayingHandle};

pub struct Engine {
    tx: Sender<EngineCmd>,
    snapshot: NowPlayingHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    pub fn new(settings: &Settings) -> Self {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let snapshot: NowPlayingHandle = Arc::new(Mutex::new(NowPlaying::default()));

        let join = spawn_engine_thread(rx, snapshot.clone(), settings.clone());

        Self {
            tx,
            snapshot,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn snapshot_handle(&self) -> NowPlayingHandle {
        self.snapshot.clone()
    }

    pub fn send(&self, cmd: EngineCmd) -> Result<(), SendError<EngineCmd>> {
        self.tx.send(cmd)
    }

    /// Ask the engine thread to stop and wait for it to finish.
    pub fn quit(&self) {
        let _ = self.send(EngineCmd::Quit);
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}
