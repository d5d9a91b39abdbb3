//! Timed auto-advance through a recorded trace.

use banker_core::{PlaybackController, Transition};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Default delay between steps.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(1000);

/// Plays `playback` from its current step to the end, one step per `delay`.
///
/// `on_frame` sees the controller after each move, together with the
/// transition produced by that move (if any). The first call shows the
/// current step with no transition. Returns the number of frames shown.
pub async fn autoplay<F>(playback: &mut PlaybackController, delay: Duration, mut on_frame: F) -> usize
where
    F: FnMut(&PlaybackController, Option<&Transition>),
{
    if playback.total() == 0 {
        return 0;
    }

    let mut ticker = interval(delay.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // first tick completes immediately
    ticker.tick().await;
    on_frame(playback, None);
    let mut frames = 1;

    while !playback.is_at_end() {
        ticker.tick().await;
        let transition = playback.next();
        on_frame(playback, transition.as_ref());
        frames += 1;
    }

    frames
}
