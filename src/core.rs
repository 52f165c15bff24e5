use crate::autostart::UnsupportedAutostart;
use crate::config::MemoryStore;
use crate::model::{Mode, Script, Settings, SettingsPatch};
use crate::playback::{Advance, PlaybackSession, TickQueue, total_seconds};
use crate::settings::SettingsStore;
use crate::window::{DetachedWindow, WindowHost};
use tracing::{debug, info, warn};

/// Single owner of the script, the playback session, the current mode and the
/// settings. Every state transition goes through here.
pub struct PrompterCore {
    script: Script,
    session: PlaybackSession,
    mode: Mode,
    settings: SettingsStore,
    ticks: TickQueue,
    window: Box<dyn WindowHost>,
    last_tick_ms: Option<u64>,
    pub settings_cursor: usize,
    pub dirty: bool,
    pub status: String,
}

impl PrompterCore {
    pub fn new(settings: SettingsStore, window: Box<dyn WindowHost>) -> Self {
        Self {
            script: Script::default(),
            session: PlaybackSession::default(),
            mode: Mode::default(),
            settings,
            ticks: TickQueue::default(),
            window,
            last_tick_ms: None,
            settings_cursor: 0,
            dirty: true,
            status: String::from("Ready"),
        }
    }

    /// Core with in-memory settings, no autostart service and no host window.
    pub fn ephemeral() -> Self {
        let settings = SettingsStore::load(
            Box::new(MemoryStore::default()),
            Box::new(UnsupportedAutostart),
        );
        Self::new(settings, Box::new(DetachedWindow))
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    pub fn settings_store(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn is_tick_pending(&self) -> bool {
        self.ticks.is_pending()
    }

    pub fn total_seconds(&self) -> f64 {
        total_seconds(self.script.word_count(), self.settings().words_per_minute)
    }

    pub fn remaining_seconds(&self) -> f64 {
        self.session.remaining_seconds(self.total_seconds())
    }

    /// Replaces the script. Any playback session is discarded; mode is kept.
    pub fn set_script(&mut self, content: impl Into<String>) {
        self.script = Script::new(content);
        self.reset_session();
        self.dirty = true;
    }

    pub fn edit_script(&mut self, edit: impl FnOnce(&mut String)) {
        let mut content = self.script.content().to_string();
        edit(&mut content);
        self.set_script(content);
    }

    pub fn start(&mut self) {
        if self.mode.is_settings() {
            debug!("start ignored while settings are open");
            return;
        }
        if self.mode == Mode::Input {
            self.session.reset();
            self.mode = Mode::Prompter;
            if let Err(err) = self.window.set_always_on_top(true) {
                warn!("failed to pin window on top: {err:#}");
            }
            info!(words = self.script.word_count(), "prompting started");
        }

        self.session.begin();
        self.last_tick_ms = None;
        self.ticks.schedule();
        self.set_status("Playing");
    }

    pub fn pause(&mut self) {
        if !self.session.pause() {
            return;
        }
        self.ticks.cancel();
        self.last_tick_ms = None;
        debug!(progress = self.session.progress, "paused");
        self.set_status("Paused");
    }

    pub fn stop(&mut self) {
        self.reset_session();
        self.mode = Mode::Input;
        self.set_status("Stopped");
    }

    pub fn open_settings(&mut self) {
        let Some(return_to) = self.mode.base() else {
            return;
        };
        self.pause();
        self.mode = Mode::Settings { return_to };
        self.settings_cursor = 0;
        self.set_status("Settings");
    }

    pub fn close_settings(&mut self) {
        let Mode::Settings { return_to } = self.mode else {
            return;
        };
        self.mode = return_to.into();
        self.set_status(self.mode.label());
    }

    pub fn toggle_settings(&mut self) {
        if self.mode.is_settings() {
            self.close_settings();
        } else {
            self.open_settings();
        }
    }

    /// Frame callback. Only advances progress when it consumes the pending
    /// tick of the live chain; returns true if the session changed.
    pub fn on_frame(&mut self, now_ms: u64) -> bool {
        if !self.session.is_playing || self.ticks.fire().is_none() {
            return false;
        }

        let outcome = self.session.advance(now_ms, self.total_seconds());
        self.last_tick_ms = Some(now_ms);
        match outcome {
            Advance::Anchored => {
                self.ticks.schedule();
                return false;
            }
            Advance::Running => {
                self.ticks.schedule();
            }
            Advance::Completed => {
                info!("script finished");
                self.set_status("Finished");
            }
        }
        self.dirty = true;
        true
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        if patch.changes_words_per_minute() {
            self.reanchor_for_speed_change();
        }
        self.settings.update(patch);
        self.dirty = true;
    }

    pub fn adjust_speed(&mut self, delta: f64) {
        let next = self.settings().words_per_minute + delta;
        self.update_settings(SettingsPatch::default().words_per_minute(next));
        let wpm = self.settings().words_per_minute;
        self.set_status(&format!("Speed: {wpm:.0} wpm"));
    }

    pub fn toggle_auto_start(&mut self) {
        self.settings.toggle_auto_start();
        self.dirty = true;
    }

    pub fn restore_defaults(&mut self) {
        self.reanchor_for_speed_change();
        self.settings.restore_defaults();
        self.set_status("Defaults restored");
    }

    /// Completes queued autostart calls.
    pub fn settle(&mut self) {
        if self.settings.settle() {
            self.set_status("Autostart change failed");
        }
    }

    pub fn shutdown(&mut self) {
        self.pause();
        self.ticks.cancel();
        self.settle();
    }

    fn reanchor_for_speed_change(&mut self) {
        if !self.session.is_playing || self.session.start_time_ms.is_none() {
            return;
        }
        if let Some(last_tick_ms) = self.last_tick_ms {
            self.session.reanchor(last_tick_ms);
        }
    }

    fn reset_session(&mut self) {
        self.session.reset();
        self.ticks.cancel();
        self.last_tick_ms = None;
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        self.dirty = true;
    }
}
