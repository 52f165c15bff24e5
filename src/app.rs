use crate::autostart::{AutostartBridge, LaunchEntryAutostart, UnsupportedAutostart};
use crate::config::{JsonFileStore, KeyValueStore, MemoryStore};
use crate::core::PrompterCore;
use crate::input::{self, Action};
use crate::model::Mode;
use crate::settings::SettingsStore;
use crate::window;
use anyhow::Result;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const IDLE_POLL: Duration = Duration::from_millis(100);
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Default)]
pub struct AppStartupOptions {
    pub script: Option<String>,
}

pub fn run_with_startup(options: AppStartupOptions) -> Result<()> {
    let mut core = build_core();
    if let Some(script) = options.script {
        core.set_script(script);
    }
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|err| warn!("clipboard unavailable: {err}"))
        .ok();

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let origin = Instant::now();
    let mut last_draw = Instant::now();

    let result: Result<()> = loop {
        core.settle();
        core.on_frame(origin.elapsed().as_millis() as u64);

        if core.dirty || last_draw.elapsed() > REDRAW_INTERVAL {
            terminal.draw(|frame| crate::ui::draw(frame, &core))?;
            core.dirty = false;
            last_draw = Instant::now();
        }

        let timeout = if core.is_tick_pending() {
            FRAME_INTERVAL
        } else {
            IDLE_POLL
        };
        if !event::poll(timeout)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let quit = handle_key(&mut core, key, || {
                    clipboard
                        .as_mut()
                        .and_then(|clipboard| clipboard.get_text().ok())
                });
                if quit {
                    break Ok(());
                }
            }
            Event::Paste(text) => paste_into_script(&mut core, &text),
            Event::Resize(..) => core.dirty = true,
            _ => {}
        }
    };

    core.shutdown();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    info!("exited");
    result
}

fn build_core() -> PrompterCore {
    let backend: Box<dyn KeyValueStore> = match JsonFileStore::open_default() {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!("settings will not persist: {err:#}");
            Box::new(MemoryStore::default())
        }
    };
    let autostart: Box<dyn AutostartBridge> = match LaunchEntryAutostart::for_current_exe() {
        Ok(bridge) => Box::new(bridge),
        Err(err) => {
            warn!("autostart unavailable: {err:#}");
            Box::new(UnsupportedAutostart)
        }
    };

    let mut host = window::native_host();
    if let Err(err) = host.exclude_from_capture() {
        warn!("failed to exclude window from capture: {err:#}");
    }

    PrompterCore::new(SettingsStore::load(backend, autostart), host)
}

/// Returns true when the user asked to quit.
fn handle_key(
    core: &mut PrompterCore,
    key: KeyEvent,
    clipboard_text: impl FnOnce() -> Option<String>,
) -> bool {
    let Some(action) = input::action_for_key(core.mode(), key) else {
        return false;
    };

    match action {
        Action::Quit => return true,
        Action::Paste => match clipboard_text() {
            Some(text) => paste_into_script(core, &text),
            None => {
                core.status = String::from("Clipboard is empty");
                core.dirty = true;
            }
        },
        other => input::apply(core, other),
    }
    false
}

fn paste_into_script(core: &mut PrompterCore, text: &str) {
    if core.mode() != Mode::Input {
        return;
    }
    let normalized = text.replace("\r\n", "\n");
    core.edit_script(|content| content.push_str(&normalized));
}
