//! The seam between the deck and the underlying audio resource.

use std::time::Duration;

use crate::cartridge::SourceHandle;

use super::types::{Readiness, StartRejection};

/// One single-track audio rendering resource.
///
/// The deck owns exactly one renderer and is its only caller. Loading is
/// asynchronous from the deck's point of view: `begin_load` returns
/// immediately, progress is observed by polling `readiness`, and failures
/// surface when a start is requested, never as panics.
pub trait Renderer {
    /// Begin binding `source`. Any previous binding is torn down first.
    fn begin_load(&mut self, source: &SourceHandle);
    fn readiness(&self) -> Readiness;
    /// Ask the resource to start producing audio.
    fn request_start(&mut self) -> Result<(), StartRejection>;
    fn pause(&mut self);
    /// Stop and drop the current binding, if any.
    fn release(&mut self);
    fn seek(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    /// End-of-media signal for the current binding.
    fn finished(&self) -> bool;
    fn is_bound(&self) -> bool;
}
