use crate::core::PrompterCore;
use crate::model::{Mode, SettingsPatch};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const SPEED_STEP: f64 = 10.0;
const FONT_SIZE_STEP: f64 = 2.0;
const LINE_HEIGHT_STEP: f64 = 4.0;

/// External signals the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Toggle,
}

/// Routes a signal by mode: start from Input, pause/resume in Prompter,
/// nothing while Settings is open.
pub fn dispatch(core: &mut PrompterCore, signal: Signal) {
    match (signal, core.mode()) {
        (Signal::Toggle, Mode::Input) => core.start(),
        (Signal::Toggle, Mode::Prompter) if core.session().is_playing => core.pause(),
        (Signal::Toggle, Mode::Prompter) => core.start(),
        (Signal::Toggle, Mode::Settings { .. }) => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    WordsPerMinute,
    FontSize,
    LineHeight,
    AutoStart,
    RestoreDefaults,
    Back,
}

impl SettingsRow {
    pub const ALL: [Self; 6] = [
        Self::WordsPerMinute,
        Self::FontSize,
        Self::LineHeight,
        Self::AutoStart,
        Self::RestoreDefaults,
        Self::Back,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::WordsPerMinute => "Speed (wpm)",
            Self::FontSize => "Font size",
            Self::LineHeight => "Line height",
            Self::AutoStart => "Launch at login",
            Self::RestoreDefaults => "Restore defaults",
            Self::Back => "Back",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Signal(Signal),
    Stop,
    ToggleSettings,
    CloseSettings,
    AdjustSpeed(f64),
    Insert(char),
    DeleteBack,
    ClearScript,
    Paste,
    SelectRow(isize),
    AdjustRow(f64),
    ActivateRow,
    Quit,
}

/// Maps a key press to an action for the given mode.
pub fn action_for_key(mode: Mode, key: KeyEvent) -> Option<Action> {
    // AltGr arrives as Ctrl+Alt on Windows and still types characters.
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL)
        && !key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('c') if ctrl => return Some(Action::Quit),
        KeyCode::F(5) => return Some(Action::Signal(Signal::Toggle)),
        KeyCode::F(2) => return Some(Action::ToggleSettings),
        _ => {}
    }

    match mode {
        Mode::Input => match key.code {
            KeyCode::Char('v') if ctrl => Some(Action::Paste),
            KeyCode::Char('u') if ctrl => Some(Action::ClearScript),
            KeyCode::Char(ch) if !ctrl => Some(Action::Insert(ch)),
            KeyCode::Tab => Some(Action::Insert('\t')),
            KeyCode::Enter => Some(Action::Insert('\n')),
            KeyCode::Backspace => Some(Action::DeleteBack),
            _ => None,
        },
        Mode::Prompter => match key.code {
            KeyCode::Char(' ') => Some(Action::Signal(Signal::Toggle)),
            KeyCode::Esc | KeyCode::Char('s') => Some(Action::Stop),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => {
                Some(Action::AdjustSpeed(SPEED_STEP))
            }
            KeyCode::Char('-') | KeyCode::Down => Some(Action::AdjustSpeed(-SPEED_STEP)),
            _ => None,
        },
        Mode::Settings { .. } => match key.code {
            KeyCode::Esc => Some(Action::CloseSettings),
            KeyCode::Up => Some(Action::SelectRow(-1)),
            KeyCode::Down => Some(Action::SelectRow(1)),
            KeyCode::Left => Some(Action::AdjustRow(-1.0)),
            KeyCode::Right => Some(Action::AdjustRow(1.0)),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::ActivateRow),
            _ => None,
        },
    }
}

/// Applies everything except `Paste` and `Quit`, which need the host.
pub fn apply(core: &mut PrompterCore, action: Action) {
    match action {
        Action::Signal(signal) => dispatch(core, signal),
        Action::Stop => core.stop(),
        Action::ToggleSettings => core.toggle_settings(),
        Action::CloseSettings => core.close_settings(),
        Action::AdjustSpeed(delta) => core.adjust_speed(delta),
        Action::Insert(ch) => core.edit_script(|text| text.push(ch)),
        Action::DeleteBack => core.edit_script(|text| {
            text.pop();
        }),
        Action::ClearScript => core.set_script(String::new()),
        Action::SelectRow(delta) => {
            let last = SettingsRow::ALL.len() as isize - 1;
            let next = (core.settings_cursor as isize + delta).clamp(0, last);
            core.settings_cursor = next as usize;
            core.dirty = true;
        }
        Action::AdjustRow(direction) => adjust_row(core, direction),
        Action::ActivateRow => activate_row(core),
        Action::Paste | Action::Quit => {}
    }
}

fn adjust_row(core: &mut PrompterCore, direction: f64) {
    let settings = *core.settings();
    let patch = match SettingsRow::from_index(core.settings_cursor) {
        SettingsRow::WordsPerMinute => SettingsPatch::default()
            .words_per_minute(settings.words_per_minute + direction * SPEED_STEP),
        SettingsRow::FontSize => {
            SettingsPatch::default().font_size(settings.font_size + direction * FONT_SIZE_STEP)
        }
        SettingsRow::LineHeight => SettingsPatch::default()
            .line_height(settings.line_height + direction * LINE_HEIGHT_STEP),
        SettingsRow::AutoStart => {
            core.toggle_auto_start();
            return;
        }
        SettingsRow::RestoreDefaults | SettingsRow::Back => return,
    };
    core.update_settings(patch);
}

fn activate_row(core: &mut PrompterCore) {
    match SettingsRow::from_index(core.settings_cursor) {
        SettingsRow::AutoStart => core.toggle_auto_start(),
        SettingsRow::RestoreDefaults => core.restore_defaults(),
        SettingsRow::Back => core.close_settings(),
        SettingsRow::WordsPerMinute | SettingsRow::FontSize | SettingsRow::LineHeight => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn toggle_starts_pauses_and_resumes() {
        let mut core = PrompterCore::ephemeral();
        core.set_script("one two three");

        dispatch(&mut core, Signal::Toggle);
        assert_eq!(core.mode(), Mode::Prompter);
        assert!(core.session().is_playing);

        dispatch(&mut core, Signal::Toggle);
        assert!(!core.session().is_playing);

        dispatch(&mut core, Signal::Toggle);
        assert!(core.session().is_playing);
        assert_eq!(core.mode(), Mode::Prompter);
    }

    #[test]
    fn toggle_is_ignored_in_settings() {
        let mut core = PrompterCore::ephemeral();
        core.open_settings();
        let before = *core.session();

        dispatch(&mut core, Signal::Toggle);
        assert!(core.mode().is_settings());
        assert_eq!(*core.session(), before);
    }

    #[test]
    fn space_types_in_input_but_toggles_elsewhere() {
        assert_eq!(
            action_for_key(Mode::Input, key(KeyCode::Char(' '))),
            Some(Action::Insert(' '))
        );
        assert_eq!(
            action_for_key(Mode::Prompter, key(KeyCode::Char(' '))),
            Some(Action::Signal(Signal::Toggle))
        );
        assert_eq!(
            action_for_key(Mode::Input, key(KeyCode::F(5))),
            Some(Action::Signal(Signal::Toggle))
        );
    }

    #[test]
    fn control_keys_are_not_typed() {
        assert_eq!(action_for_key(Mode::Input, ctrl('c')), Some(Action::Quit));
        assert_eq!(action_for_key(Mode::Input, ctrl('v')), Some(Action::Paste));
        assert_eq!(action_for_key(Mode::Input, ctrl('x')), None);
    }

    #[test]
    fn typing_rebuilds_the_script() {
        let mut core = PrompterCore::ephemeral();
        for ch in "hi there".chars() {
            apply(&mut core, Action::Insert(ch));
        }
        apply(&mut core, Action::DeleteBack);
        assert_eq!(core.script().content(), "hi ther");
        assert_eq!(core.script().word_count(), 2);

        apply(&mut core, Action::ClearScript);
        assert_eq!(core.script().content(), "");
    }

    #[test]
    fn settings_rows_adjust_within_bounds() {
        let mut core = PrompterCore::ephemeral();
        apply(&mut core, Action::ToggleSettings);
        assert!(core.mode().is_settings());

        for _ in 0..30 {
            apply(&mut core, Action::AdjustRow(1.0));
        }
        assert_eq!(core.settings().words_per_minute, 240.0);

        apply(&mut core, Action::SelectRow(1));
        apply(&mut core, Action::AdjustRow(-1.0));
        assert_eq!(core.settings().font_size, 32.0);

        apply(&mut core, Action::SelectRow(10));
        assert_eq!(SettingsRow::from_index(core.settings_cursor), SettingsRow::Back);
        apply(&mut core, Action::ActivateRow);
        assert_eq!(core.mode(), Mode::Input);
    }

    #[test]
    fn restore_defaults_row_resets_values() {
        let mut core = PrompterCore::ephemeral();
        core.open_settings();
        apply(&mut core, Action::AdjustRow(1.0));
        assert_eq!(core.settings().words_per_minute, 70.0);

        core.settings_cursor = 4;
        apply(&mut core, Action::ActivateRow);
        assert_eq!(core.settings().words_per_minute, 60.0);
    }
}
