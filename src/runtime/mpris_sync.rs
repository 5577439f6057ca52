use crate::engine::NowPlaying;
use crate::mpris::MprisHandle;

pub fn update_mpris(mpris: &MprisHandle, now: &NowPlaying) {
    mpris.sync(now);
}
