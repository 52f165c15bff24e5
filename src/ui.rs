use crate::core::PrompterCore;
use crate::input::SettingsRow;
use crate::model::{Mode, Settings};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use std::time::Duration;

const APP_TITLE_WITH_VERSION: &str = "Teleprompt v0.1.0  ";

#[derive(Clone, Copy)]
struct ThemePalette {
    bg: Color,
    panel_bg: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    selected_bg: Color,
}

fn palette() -> ThemePalette {
    ThemePalette {
        bg: Color::Rgb(10, 15, 24),
        panel_bg: Color::Rgb(16, 23, 36),
        border: Color::Rgb(54, 72, 102),
        text: Color::Rgb(226, 232, 240),
        muted: Color::Rgb(120, 136, 160),
        accent: Color::Rgb(96, 196, 255),
        alert: Color::Rgb(255, 184, 92),
        selected_bg: Color::Rgb(36, 58, 94),
    }
}

pub fn draw(frame: &mut Frame, core: &PrompterCore) {
    let colors = palette();
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, core, vertical[0], &colors);
    match core.mode() {
        Mode::Input => draw_input(frame, core, vertical[1], &colors),
        Mode::Prompter => draw_prompter(frame, core, vertical[1], &colors),
        Mode::Settings { .. } => draw_settings(frame, core, vertical[1], &colors),
    }
    draw_footer(frame, core, vertical[2], &colors);
}

fn draw_header(frame: &mut Frame, core: &PrompterCore, area: Rect, colors: &ThemePalette) {
    frame.render_widget(
        panel_block("Status", colors.panel_bg, colors.text, colors.border),
        area,
    );
    let inner = area.inner(Margin {
        vertical: 1,
        horizontal: 2,
    });

    let line = Line::from(vec![
        Span::styled(
            APP_TITLE_WITH_VERSION,
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("Mode {}", core.mode().label()),
            Style::default().fg(colors.alert),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(
            format!(
                "{} words @ {:.0} wpm",
                core.script().word_count(),
                core.settings().words_per_minute
            ),
            Style::default().fg(colors.text),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(core.status.as_str(), Style::default().fg(colors.muted)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn draw_input(frame: &mut Frame, core: &PrompterCore, area: Rect, colors: &ThemePalette) {
    let estimate = format_duration(Duration::from_secs_f64(core.total_seconds()));
    let title = format!("Script  (reads in {estimate})");
    let mut text = core.script().content().to_string();
    text.push('_');

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(colors.text))
        .wrap(Wrap { trim: false })
        .block(panel_block(&title, colors.panel_bg, colors.text, colors.border));
    frame.render_widget(paragraph, area);
}

fn draw_prompter(frame: &mut Frame, core: &PrompterCore, area: Rect, colors: &ThemePalette) {
    let block = panel_block("Prompter", colors.panel_bg, colors.text, colors.border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let settings = core.settings();
    let column = column_rect(inner, settings);
    let rows = layout_rows(core.script().content(), column.width as usize, settings);
    let offset = scroll_offset(core.session().progress, rows.len(), column.height as usize);

    let visible: Vec<Line> = rows
        .iter()
        .skip(offset)
        .take(column.height as usize)
        .map(|row| Line::from(Span::styled(row.as_str(), Style::default().fg(colors.text))))
        .collect();
    frame.render_widget(
        Paragraph::new(visible).alignment(Alignment::Center),
        column,
    );
}

fn draw_settings(frame: &mut Frame, core: &PrompterCore, area: Rect, colors: &ThemePalette) {
    let settings = core.settings();
    let items: Vec<ListItem> = SettingsRow::ALL
        .iter()
        .map(|row| {
            let value = setting_value(*row, settings);
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<20}", row.label()), Style::default().fg(colors.text)),
                Span::styled(value, Style::default().fg(colors.accent)),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(core.settings_cursor.min(SettingsRow::ALL.len() - 1)));

    let list = List::new(items)
        .block(panel_block(
            "Settings",
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .highlight_style(
            Style::default()
                .bg(colors.selected_bg)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("-> ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn setting_value(row: SettingsRow, settings: &Settings) -> String {
    match row {
        SettingsRow::WordsPerMinute => format!("< {:.0} >", settings.words_per_minute),
        SettingsRow::FontSize => format!("< {:.0} >", settings.font_size),
        SettingsRow::LineHeight => format!("< {:.0} >", settings.line_height),
        SettingsRow::AutoStart => String::from(if settings.auto_start { "[on]" } else { "[off]" }),
        SettingsRow::RestoreDefaults | SettingsRow::Back => String::new(),
    }
}

fn draw_footer(frame: &mut Frame, core: &PrompterCore, area: Rect, colors: &ThemePalette) {
    let text = match core.mode() {
        Mode::Input => String::from(
            "F5 start  |  F2 settings  |  Ctrl+V paste  |  Ctrl+U clear  |  Ctrl+C quit",
        ),
        Mode::Prompter => {
            let remaining =
                format_duration(Duration::from_secs_f64(core.remaining_seconds()));
            format!(
                "{} {remaining} left  |  Space/F5 play-pause  +/- speed  Esc stop  F2 settings",
                progress_bar(core.session().progress, 24)
            )
        }
        Mode::Settings { .. } => {
            String::from("Up/Down select  |  Left/Right adjust  |  Enter toggle  |  Esc back")
        }
    };
    let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(colors.muted)))
        .block(panel_block("Keys", colors.panel_bg, colors.text, colors.border));
    frame.render_widget(paragraph, area);
}

fn panel_block(title: &str, bg: Color, text: Color, border: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg))
}

/// Larger fonts read as a narrower column, centered in the panel.
fn column_rect(area: Rect, settings: &Settings) -> Rect {
    let percent = (2400.0 / settings.font_size).clamp(35.0, 100.0) as u16;
    let width = (u32::from(area.width) * u32::from(percent) / 100).max(1) as u16;
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}

/// Blank rows inserted after every text row.
fn line_gap(settings: &Settings) -> usize {
    let ratio = settings.line_height / settings.font_size;
    (ratio - 1.0).round().max(0.0) as usize
}

fn layout_rows(content: &str, width: usize, settings: &Settings) -> Vec<String> {
    let gap = line_gap(settings);
    let mut rows = Vec::new();
    for row in wrap_text(content, width) {
        rows.push(row);
        rows.extend(std::iter::repeat_n(String::new(), gap));
    }
    rows
}

/// Greedy word wrap. Blank source lines are kept; words longer than `width`
/// are split.
fn wrap_text(content: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for source_line in content.lines() {
        let mut current = String::new();
        let mut current_len = 0;
        for word in source_line.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > width {
                if current_len > 0 {
                    rows.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                rows.push(chars.drain(..width).collect());
            }
            let word_len = chars.len();
            if word_len == 0 {
                continue;
            }
            if current_len > 0 && current_len + 1 + word_len > width {
                rows.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chars);
            current_len += word_len;
        }
        rows.push(current);
    }
    rows
}

/// First visible row for `progress` through `total_rows` rows in a viewport
/// of `viewport` rows.
fn scroll_offset(progress: f64, total_rows: usize, viewport: usize) -> usize {
    let scrollable = total_rows.saturating_sub(viewport);
    (progress.clamp(0.0, 1.0) * scrollable as f64).round() as usize
}

fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

fn progress_bar(ratio: f64, width: usize) -> String {
    let clamped = ratio.clamp(0.0, 1.0);
    let filled = (clamped * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.push_str(&"#".repeat(filled));
    bar.push_str(&"-".repeat(width.saturating_sub(filled)));
    bar.push(']');
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width_and_blank_lines() {
        let rows = wrap_text("the quick brown fox\n\njumps", 10);
        assert_eq!(rows, vec!["the quick", "brown fox", "", "jumps"]);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let rows = wrap_text("abcdefghij xy", 4);
        assert_eq!(rows, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn scroll_offset_spans_scrollable_rows() {
        assert_eq!(scroll_offset(0.0, 100, 20), 0);
        assert_eq!(scroll_offset(0.5, 100, 20), 40);
        assert_eq!(scroll_offset(1.0, 100, 20), 80);
        assert_eq!(scroll_offset(1.0, 10, 20), 0);
    }

    #[test]
    fn tall_lines_add_blank_rows() {
        let mut settings = Settings::default();
        assert_eq!(line_gap(&settings), 0);

        settings.font_size = 20.0;
        settings.line_height = 96.0;
        assert_eq!(line_gap(&settings), 4);
        assert_eq!(layout_rows("a b", 1, &settings).len(), 10);
    }

    #[test]
    fn bigger_font_narrows_column() {
        let area = Rect::new(0, 0, 100, 10);
        let mut settings = Settings::default();
        settings.font_size = 20.0;
        assert_eq!(column_rect(area, &settings).width, 100);

        settings.font_size = 64.0;
        let column = column_rect(area, &settings);
        assert_eq!(column.width, 37);
        assert_eq!(column.x, 31);
    }

    #[test]
    fn progress_bar_renders_ratio() {
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(format_duration(Duration::from_secs(75)), "01:15");
    }
}
