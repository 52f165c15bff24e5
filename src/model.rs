use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const WPM_RANGE: RangeInclusive<f64> = 20.0..=240.0;
pub const FONT_SIZE_RANGE: RangeInclusive<f64> = 20.0..=64.0;
pub const LINE_HEIGHT_RANGE: RangeInclusive<f64> = 28.0..=96.0;

/// Text being prompted. Replaced wholesale on every edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    content: String,
    word_count: usize,
}

impl Script {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let word_count = count_words(&content);
        Self {
            content,
            word_count,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whitespace-delimited tokens, never less than one.
    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

fn count_words(content: &str) -> usize {
    content.split_whitespace().count().max(1)
}

/// Screen that Settings can return to. Settings itself is unrepresentable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseMode {
    Input,
    Prompter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Input,
    Prompter,
    Settings { return_to: BaseMode },
}

impl From<BaseMode> for Mode {
    fn from(mode: BaseMode) -> Self {
        match mode {
            BaseMode::Input => Self::Input,
            BaseMode::Prompter => Self::Prompter,
        }
    }
}

impl Mode {
    /// The non-settings screen this mode is, or `None` while in Settings.
    pub fn base(self) -> Option<BaseMode> {
        match self {
            Self::Input => Some(BaseMode::Input),
            Self::Prompter => Some(BaseMode::Prompter),
            Self::Settings { .. } => None,
        }
    }

    pub fn is_settings(self) -> bool {
        matches!(self, Self::Settings { .. })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Prompter => "Prompter",
            Self::Settings { .. } => "Settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default)]
    pub auto_start: bool,
}

fn default_words_per_minute() -> f64 {
    60.0
}

fn default_font_size() -> f64 {
    34.0
}

fn default_line_height() -> f64 {
    48.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            words_per_minute: default_words_per_minute(),
            font_size: default_font_size(),
            line_height: default_line_height(),
            auto_start: false,
        }
    }
}

impl Settings {
    pub fn clamped(self) -> Self {
        Self {
            words_per_minute: clamp_to(self.words_per_minute, &WPM_RANGE),
            font_size: clamp_to(self.font_size, &FONT_SIZE_RANGE),
            line_height: clamp_to(self.line_height, &LINE_HEIGHT_RANGE),
            auto_start: self.auto_start,
        }
    }

    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(value) = patch.words_per_minute {
            self.words_per_minute = value;
        }
        if let Some(value) = patch.font_size {
            self.font_size = value;
        }
        if let Some(value) = patch.line_height {
            self.line_height = value;
        }
        if let Some(value) = patch.auto_start {
            self.auto_start = value;
        }
    }
}

/// Partial settings update. Numeric setters clamp, so a patch never carries
/// an out-of-range value into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsPatch {
    words_per_minute: Option<f64>,
    font_size: Option<f64>,
    line_height: Option<f64>,
    auto_start: Option<bool>,
}

impl SettingsPatch {
    pub fn words_per_minute(mut self, value: f64) -> Self {
        self.words_per_minute = Some(clamp_to(value, &WPM_RANGE));
        self
    }

    pub fn font_size(mut self, value: f64) -> Self {
        self.font_size = Some(clamp_to(value, &FONT_SIZE_RANGE));
        self
    }

    pub fn line_height(mut self, value: f64) -> Self {
        self.line_height = Some(clamp_to(value, &LINE_HEIGHT_RANGE));
        self
    }

    pub fn auto_start(mut self, value: bool) -> Self {
        self.auto_start = Some(value);
        self
    }

    pub fn changes_words_per_minute(&self) -> bool {
        self.words_per_minute.is_some()
    }
}

fn clamp_to(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}
