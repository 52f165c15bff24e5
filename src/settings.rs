use crate::autostart::AutostartBridge;
use crate::config::KeyValueStore;
use crate::model::{Settings, SettingsPatch};
use std::collections::VecDeque;
use tracing::{debug, warn};

pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutostartCall {
    Toggle {
        request: u64,
        previous: bool,
        enable: bool,
    },
    Disable,
}

/// Tunable parameters, persisted on every change and reconciled with the OS
/// autostart service.
///
/// Autostart calls are queued and run by `settle`, which the event loop calls
/// once per iteration. Until then the in-memory flag is optimistic.
pub struct SettingsStore {
    settings: Settings,
    backend: Box<dyn KeyValueStore>,
    autostart: Box<dyn AutostartBridge>,
    pending: VecDeque<AutostartCall>,
    latest_toggle: u64,
}

impl SettingsStore {
    pub fn load(backend: Box<dyn KeyValueStore>, autostart: Box<dyn AutostartBridge>) -> Self {
        let persisted = read_persisted(backend.as_ref()).unwrap_or_default();
        let auto_start = autostart.is_enabled().unwrap_or_else(|err| {
            warn!("autostart query failed: {err:#}");
            false
        });

        let settings = Settings {
            auto_start,
            ..persisted
        }
        .clamped();
        debug!(?settings, "settings loaded");

        Self {
            settings,
            backend,
            autostart,
            pending: VecDeque::new(),
            latest_toggle: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    pub fn autostart(&self) -> &dyn AutostartBridge {
        self.autostart.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn update(&mut self, patch: SettingsPatch) {
        self.settings.merge(patch);
        self.persist();
    }

    pub fn toggle_auto_start(&mut self) {
        let previous = self.settings.auto_start;
        self.latest_toggle += 1;
        self.pending.push_back(AutostartCall::Toggle {
            request: self.latest_toggle,
            previous,
            enable: !previous,
        });
        self.update(SettingsPatch::default().auto_start(!previous));
    }

    pub fn restore_defaults(&mut self) {
        self.settings = Settings::default().clamped();
        // Any queued toggle rollback would now fight the defaults.
        self.latest_toggle += 1;
        self.pending.push_back(AutostartCall::Disable);
        self.persist();
    }

    /// Runs queued autostart calls. Returns true if settings changed as a result.
    pub fn settle(&mut self) -> bool {
        let mut changed = false;
        while let Some(call) = self.pending.pop_front() {
            match call {
                AutostartCall::Toggle {
                    request,
                    previous,
                    enable,
                } => {
                    let result = if enable {
                        self.autostart.enable()
                    } else {
                        self.autostart.disable()
                    };
                    let Err(err) = result else {
                        continue;
                    };
                    warn!(enable, "autostart toggle failed: {err:#}");
                    if request == self.latest_toggle {
                        self.update(SettingsPatch::default().auto_start(previous));
                        changed = true;
                    }
                }
                AutostartCall::Disable => {
                    if let Err(err) = self.autostart.disable() {
                        warn!("autostart disable failed: {err:#}");
                    }
                }
            }
        }
        changed
    }

    fn persist(&mut self) {
        let value = match serde_json::to_value(self.settings) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "failed to encode settings");
                return;
            }
        };
        if let Err(err) = self.backend.set(SETTINGS_KEY, value) {
            warn!("failed to persist settings: {err:#}");
        }
    }
}

fn read_persisted(backend: &dyn KeyValueStore) -> Option<Settings> {
    let value = match backend.get(SETTINGS_KEY) {
        Ok(value) => value?,
        Err(err) => {
            warn!("settings unreadable, using defaults: {err:#}");
            return None;
        }
    };
    match serde_json::from_value(value) {
        Ok(settings) => Some(settings),
        Err(err) => {
            warn!(error = %err, "malformed settings record, using defaults");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;
    use anyhow::Result;
    use serde_json::json;

    #[derive(Default)]
    struct FakeAutostart {
        enabled: bool,
        fail_query: bool,
        fail_enable: bool,
        fail_disable: bool,
    }

    impl AutostartBridge for FakeAutostart {
        fn is_enabled(&self) -> Result<bool> {
            if self.fail_query {
                anyhow::bail!("query failed");
            }
            Ok(self.enabled)
        }

        fn enable(&mut self) -> Result<()> {
            if self.fail_enable {
                anyhow::bail!("enable failed");
            }
            self.enabled = true;
            Ok(())
        }

        fn disable(&mut self) -> Result<()> {
            if self.fail_disable {
                anyhow::bail!("disable failed");
            }
            self.enabled = false;
            Ok(())
        }
    }

    fn store_with(record: serde_json::Value) -> MemoryStore {
        let mut store = MemoryStore::default();
        store.entries.insert(SETTINGS_KEY.to_string(), record);
        store
    }

    #[test]
    fn load_clamps_persisted_values() {
        let backend = store_with(json!({
            "wordsPerMinute": 500,
            "fontSize": 10,
            "lineHeight": 200,
        }));
        let store = SettingsStore::load(Box::new(backend), Box::new(FakeAutostart::default()));

        assert_eq!(store.settings().words_per_minute, 240.0);
        assert_eq!(store.settings().font_size, 20.0);
        assert_eq!(store.settings().line_height, 96.0);
    }

    #[test]
    fn live_autostart_state_wins_over_persisted_flag() {
        let backend = store_with(json!({"autoStart": true}));
        let store = SettingsStore::load(Box::new(backend), Box::new(FakeAutostart::default()));
        assert!(!store.settings().auto_start);

        let backend = store_with(json!({"autoStart": false}));
        let autostart = FakeAutostart {
            enabled: true,
            ..FakeAutostart::default()
        };
        let store = SettingsStore::load(Box::new(backend), Box::new(autostart));
        assert!(store.settings().auto_start);
    }

    #[test]
    fn failures_and_malformed_records_fall_back_to_defaults() {
        let backend = store_with(json!({"wordsPerMinute": "fast"}));
        let autostart = FakeAutostart {
            enabled: true,
            fail_query: true,
            ..FakeAutostart::default()
        };
        let store = SettingsStore::load(Box::new(backend), Box::new(autostart));
        assert_eq!(*store.settings(), Settings::default());

        let backend = MemoryStore {
            fail_reads: true,
            ..MemoryStore::default()
        };
        let store = SettingsStore::load(Box::new(backend), Box::new(FakeAutostart::default()));
        assert_eq!(*store.settings(), Settings::default());
    }

    #[test]
    fn update_persists_full_record() {
        let mut store = SettingsStore::load(
            Box::new(MemoryStore::default()),
            Box::new(FakeAutostart::default()),
        );
        store.update(SettingsPatch::default().font_size(40.0));

        let saved = store.backend().get(SETTINGS_KEY).expect("get").expect("saved");
        assert_eq!(saved["fontSize"], 40.0);
        assert_eq!(saved["wordsPerMinute"], 60.0);
        assert_eq!(saved["autoStart"], false);
    }

    #[test]
    fn write_failure_keeps_in_memory_value() {
        let backend = MemoryStore {
            fail_writes: true,
            ..MemoryStore::default()
        };
        let mut store = SettingsStore::load(Box::new(backend), Box::new(FakeAutostart::default()));
        store.update(SettingsPatch::default().words_per_minute(120.0));
        assert_eq!(store.settings().words_per_minute, 120.0);
    }

    #[test]
    fn failed_enable_rolls_back_toggle() {
        let autostart = FakeAutostart {
            fail_enable: true,
            ..FakeAutostart::default()
        };
        let mut store =
            SettingsStore::load(Box::new(MemoryStore::default()), Box::new(autostart));

        store.toggle_auto_start();
        assert!(store.settings().auto_start);
        assert!(store.has_pending());

        assert!(store.settle());
        assert!(!store.settings().auto_start);
        let saved = store.backend().get(SETTINGS_KEY).expect("get").expect("saved");
        assert_eq!(saved["autoStart"], false);
    }

    #[test]
    fn successful_toggle_reaches_the_service() {
        let mut store = SettingsStore::load(
            Box::new(MemoryStore::default()),
            Box::new(FakeAutostart::default()),
        );
        store.toggle_auto_start();
        assert!(!store.settle());
        assert!(store.settings().auto_start);
        assert!(store.autostart().is_enabled().expect("query"));
    }

    #[test]
    fn superseded_toggle_failure_does_not_roll_back() {
        let autostart = FakeAutostart {
            fail_enable: true,
            ..FakeAutostart::default()
        };
        let mut store =
            SettingsStore::load(Box::new(MemoryStore::default()), Box::new(autostart));

        store.toggle_auto_start();
        store.toggle_auto_start();
        assert!(!store.settings().auto_start);

        assert!(!store.settle());
        assert!(!store.settings().auto_start);
    }

    #[test]
    fn restore_defaults_survives_disable_failure() {
        let autostart = FakeAutostart {
            enabled: true,
            fail_disable: true,
            ..FakeAutostart::default()
        };
        let mut store =
            SettingsStore::load(Box::new(MemoryStore::default()), Box::new(autostart));
        store.update(SettingsPatch::default().words_per_minute(200.0));
        assert!(store.settings().auto_start);

        store.restore_defaults();
        store.settle();

        assert_eq!(*store.settings(), Settings::default());
    }
}
