//! Play/stop and loop control for an edit

use crate::audio::SharedPlayhead;
use crate::clip::TimeRange;
use crate::listeners::{ListenerList, Subscription};

/// Something about the transport changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// Playback started (`true`) or stopped (`false`)
    PlayStateChanged(bool),
    /// Looping was switched on or off
    LoopingChanged(bool),
    /// The loop range moved
    LoopRangeChanged(TimeRange),
    /// The playhead was repositioned by the user
    PositionChanged(f64),
}

/// Controls playback of an edit. Lives on the UI thread; the audio thread
/// only sees the shared playhead.
pub struct TransportControl {
    playhead: SharedPlayhead,
    listeners: ListenerList<TransportEvent>,
}

impl TransportControl {
    /// Control the given playhead
    pub fn new(playhead: SharedPlayhead) -> Self {
        Self {
            playhead,
            listeners: ListenerList::new(),
        }
    }

    /// The playhead shared with the output
    pub fn playhead(&self) -> SharedPlayhead {
        self.playhead.clone()
    }

    /// Listen for transport changes
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&TransportEvent) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    fn update<R>(&self, f: impl FnOnce(&mut crate::audio::Playhead) -> R) -> Option<R> {
        match self.playhead.lock() {
            Ok(mut playhead) => Some(f(&mut playhead)),
            Err(_) => {
                log::warn!("Playhead lock poisoned");
                None
            }
        }
    }

    /// Start playback
    pub fn play(&self) {
        if self.update(|p| p.replace_playing(true)) == Some(false) {
            log::debug!("Transport playing");
            self.listeners.emit(&TransportEvent::PlayStateChanged(true));
        }
    }

    /// Stop playback
    pub fn stop(&self) {
        if self.update(|p| p.replace_playing(false)) == Some(true) {
            log::debug!("Transport stopped");
            self.listeners.emit(&TransportEvent::PlayStateChanged(false));
        }
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.update(|p| p.is_playing()).unwrap_or(false)
    }

    /// Switch looping on or off
    pub fn set_looping(&self, looping: bool) {
        if self.update(|p| p.set_looping(looping)).is_some() {
            self.listeners.emit(&TransportEvent::LoopingChanged(looping));
        }
    }

    /// Whether playback wraps around the loop range
    pub fn is_looping(&self) -> bool {
        self.update(|p| p.is_looping()).unwrap_or(false)
    }

    /// Move the loop range
    pub fn set_loop_range(&self, range: TimeRange) {
        if self.update(|p| p.set_loop_range(range)).is_some() {
            self.listeners.emit(&TransportEvent::LoopRangeChanged(range));
        }
    }

    /// The loop range
    pub fn loop_range(&self) -> TimeRange {
        self.update(|p| p.loop_range()).unwrap_or_default()
    }

    /// Move the playhead
    pub fn set_position(&self, seconds: f64) {
        if self.update(|p| p.set_position(seconds)).is_some() {
            self.listeners.emit(&TransportEvent::PositionChanged(seconds.max(0.0)));
        }
    }

    /// Playhead position in seconds
    pub fn position(&self) -> f64 {
        self.update(|p| p.position()).unwrap_or(0.0)
    }
}
