//! Rodio-backed renderer: one paused `Sink` per bound track.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use crate::cartridge::SourceHandle;

use super::renderer::Renderer;
use super::types::{Readiness, StartRejection};

pub struct RodioRenderer {
    stream: OutputStream,
    sink: Option<Sink>,
    /// Bind failure, reported when a start is requested.
    failure: Option<String>,
    duration: Option<Duration>,
    volume: f32,
}

impl RodioRenderer {
    pub fn new() -> Self {
        let mut stream =
            OutputStreamBuilder::open_default_stream().expect("ERR: No audio output device");
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        stream.log_on_drop(false);
        Self {
            stream,
            sink: None,
            failure: None,
            duration: None,
            volume: 1.0,
        }
    }
}

impl Renderer for RodioRenderer {
    fn begin_load(&mut self, source: &SourceHandle) {
        self.release();

        // The container usually knows the duration before decoding does.
        self.duration = lofty::read_from_path(source.path())
            .ok()
            .map(|tagged| tagged.properties().duration());

        let file = match File::open(source.path()) {
            Ok(f) => f,
            Err(e) => {
                self.failure = Some(format!("open {:?}: {e}", source.path()));
                return;
            }
        };
        let decoder = match Decoder::new(BufReader::new(file)) {
            Ok(d) => d,
            Err(e) => {
                self.failure = Some(format!("decode {:?}: {e}", source.path()));
                return;
            }
        };

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(decoder);
        sink.pause();
        sink.set_volume(self.volume);
        self.sink = Some(sink);
    }

    fn readiness(&self) -> Readiness {
        // rodio decodes on append, so a successful bind is ready at once.
        // A failed bind also reports ready: the start attempt surfaces it.
        if self.sink.is_some() || self.failure.is_some() {
            Readiness::Enough
        } else {
            Readiness::Nothing
        }
    }

    fn request_start(&mut self) -> Result<(), StartRejection> {
        if let Some(reason) = &self.failure {
            return Err(StartRejection::Unsupported(reason.clone()));
        }
        match &self.sink {
            Some(sink) => {
                sink.play();
                Ok(())
            }
            None => Err(StartRejection::Unsupported("no source bound".into())),
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn release(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.failure = None;
        self.duration = None;
    }

    fn seek(&mut self, position: Duration) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.try_seek(position) {
                log::warn!("seek to {position:?} failed: {e}");
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(|sink| sink.get_pos())
            .unwrap_or(Duration::ZERO)
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn finished(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| sink.empty())
    }

    fn is_bound(&self) -> bool {
        self.sink.is_some()
    }
}
