//! Timed scroll progress.
//!
//! `PlaybackSession` holds the anchor pair (`start_progress`, `start_time_ms`)
//! and `advance` is the only place progress moves forward. `TickQueue` is the
//! scheduling primitive the controller uses to drive it one frame at a time.

/// Seconds needed to read `word_count` words at `words_per_minute`.
pub fn total_seconds(word_count: usize, words_per_minute: f64) -> f64 {
    word_count as f64 / (words_per_minute / 60.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSession {
    pub progress: f64,
    pub is_playing: bool,
    pub start_progress: f64,
    pub start_time_ms: Option<u64>,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            progress: 0.0,
            is_playing: false,
            start_progress: 0.0,
            start_time_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// First tick of a play interval; the anchor was set, progress unchanged.
    Anchored,
    Running,
    Completed,
}

impl PlaybackSession {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Begins a play interval from the current progress. The next tick
    /// re-anchors.
    pub fn begin(&mut self) {
        self.start_progress = self.progress;
        self.start_time_ms = None;
        self.is_playing = true;
    }

    /// Returns false when there was nothing to pause.
    pub fn pause(&mut self) -> bool {
        if !self.is_playing {
            return false;
        }
        self.is_playing = false;
        self.start_progress = self.progress;
        true
    }

    /// Moves the anchor to `now_ms` at the current progress, keeping what has
    /// already been read and measuring future ticks from here.
    pub fn reanchor(&mut self, now_ms: u64) {
        self.start_progress = self.progress;
        self.start_time_ms = Some(now_ms);
    }

    pub fn advance(&mut self, now_ms: u64, total_seconds: f64) -> Advance {
        debug_assert!(total_seconds > 0.0, "duration must be positive");

        let Some(start_time_ms) = self.start_time_ms else {
            self.start_time_ms = Some(now_ms);
            return Advance::Anchored;
        };

        let elapsed = now_ms.saturating_sub(start_time_ms) as f64 / 1000.0;
        let candidate = self.start_progress + elapsed / total_seconds;
        if candidate >= 1.0 {
            self.progress = 1.0;
            self.start_progress = 1.0;
            self.is_playing = false;
            return Advance::Completed;
        }

        self.progress = candidate;
        Advance::Running
    }

    pub fn remaining_seconds(&self, total_seconds: f64) -> f64 {
        ((1.0 - self.progress) * total_seconds).max(0.0)
    }
}

/// Identifies one scheduled tick. Ids grow monotonically, so a handle from a
/// superseded chain never matches the pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle(u64);

/// Holds at most one pending tick.
///
/// `schedule` supersedes whatever was pending and `cancel` drops it; a tick
/// that was cancelled or superseded can never be fired.
#[derive(Debug, Default)]
pub struct TickQueue {
    next_id: u64,
    pending: Option<TickHandle>,
}

impl TickQueue {
    pub fn schedule(&mut self) -> TickHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = TickHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the pending tick, if any.
    pub fn fire(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }
}
