use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use personal_diary::diary_entry::{DiaryEntry, MOODS};
use personal_diary::diary_state::EntryStore;
use personal_diary::draft::{DraftEditor, Notice, NoticeKind};
use personal_diary::grammar::GrammarChecker;
use personal_diary::storage::SnapshotStorage;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use std::{
    io::{stdout, Stdout},
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::runtime::Handle;
use unicode_width::UnicodeWidthChar;

const TICK: Duration = Duration::from_millis(100);
const PREVIEW_WIDTH: usize = 60;

pub enum Action {
    Write,
    View,
    Edit,
    Delete,
    Search,
    Quit,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Content,
    Date,
    Mood,
    MusicLink,
    Image,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Content => Field::Date,
            Field::Date => Field::Mood,
            Field::Mood => Field::MusicLink,
            Field::MusicLink => Field::Image,
            Field::Image => Field::Content,
        }
    }
}

/// Text typed into the single-line fields, copied into the draft on save.
struct FormBuffers {
    date: String,
    music_link: String,
    image_path: String,
}

impl FormBuffers {
    fn from_editor(editor: &DraftEditor) -> Self {
        FormBuffers {
            date: editor.draft.date.format("%Y-%m-%d").to_string(),
            music_link: editor.draft.music_link.clone().unwrap_or_default(),
            image_path: String::new(),
        }
    }
}

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: Option<Notice>,
    /// Char index into the content being edited.
    cursor_position: usize,
    cursor_visible: bool,
    last_cursor_update: Instant,
}

fn title_bar(text: impl Into<String>) -> Paragraph<'static> {
    Paragraph::new(text.into())
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
}

fn instructions(text: &'static str) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
}

fn notice_line(notice: &Notice) -> Paragraph<'static> {
    let color = match notice.kind {
        NoticeKind::Success => Color::Green,
        NoticeKind::Error => Color::Red,
    };
    Paragraph::new(notice.text.clone())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
}

fn screen(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area)
}

/// Cuts `text` to at most `max` terminal columns, marking the cut with an ellipsis.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max.saturating_sub(1) {
            let rest: usize = text[out.len()..].chars().map(|c| c.width().unwrap_or(0)).sum();
            if width + rest <= max {
                out.push_str(&text[out.len()..]);
            } else {
                out.push('…');
            }
            return out;
        }
        width += w;
        out.push(c);
    }
    out
}

fn entry_item(entry: &DiaryEntry) -> ListItem<'static> {
    let mut extras = Vec::new();
    if entry.image.is_some() {
        extras.push("photo");
    }
    if entry.music_link.is_some() {
        extras.push("music");
    }
    let extras = if extras.is_empty() {
        String::new()
    } else {
        format!("  [{}]", extras.join(", "))
    };
    ListItem::new(vec![
        Line::from(Span::raw(format!(
            "[{}] {}",
            entry.date.format("%Y-%m-%d"),
            truncate_to_width(entry.headline(), PREVIEW_WIDTH)
        ))),
        Line::from(Span::styled(
            format!("Mood: {}{}", entry.mood, extras),
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

fn entry_list(entries: &[DiaryEntry], title: &str) -> List<'static> {
    List::new(entries.iter().map(entry_item).collect::<Vec<_>>())
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ")
}

fn key_press() -> Result<Option<KeyEvent>> {
    if !event::poll(TICK)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI {
            terminal,
            status: None,
            cursor_position: 0,
            cursor_visible: true,
            last_cursor_update: Instant::now(),
        })
    }

    /// Shows a message on the main screen until it expires.
    pub fn set_status(&mut self, notice: Notice) {
        self.status = Some(notice);
    }

    pub fn display<S: SnapshotStorage>(&mut self, store: &EntryStore<S>) -> Result<()> {
        if self
            .status
            .as_ref()
            .is_some_and(|n| n.is_expired(Instant::now()))
        {
            self.status = None;
        }
        let status = self.status.clone();

        self.terminal.draw(|f| {
            let chunks = screen(f.area());
            f.render_widget(title_bar("📘 My Diary"), chunks[0]);

            if store.is_empty() {
                let empty = Paragraph::new("No entries yet. Start writing your first diary entry!")
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title("Entries"));
                f.render_widget(empty, chunks[1]);
            } else {
                f.render_widget(entry_list(store.entries(), "Entries"), chunks[1]);
            }

            if let Some(notice) = &status {
                f.render_widget(notice_line(notice), chunks[2]);
            }

            let mut keys = vec![Span::raw("Press ")];
            let bindings: &[(&str, &str)] = if store.is_empty() {
                &[("w", " to write, "), ("q", " to quit")]
            } else {
                &[
                    ("w", " to write, "),
                    ("v", " to view, "),
                    ("e", " to edit, "),
                    ("d", " to delete, "),
                    ("s", " to search, "),
                    ("q", " to quit"),
                ]
            };
            for (key, label) in bindings {
                keys.push(Span::styled(
                    *key,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                keys.push(Span::raw(*label));
            }
            let controls = Paragraph::new(Line::from(keys))
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center);
            f.render_widget(controls, chunks[3]);
        })?;

        Ok(())
    }

    pub fn handle_input<S: SnapshotStorage>(
        &self,
        store: &EntryStore<S>,
    ) -> Result<Option<Action>> {
        let Some(key) = key_press()? else {
            return Ok(None);
        };
        let has_entries = !store.is_empty();
        Ok(match key.code {
            KeyCode::Char('w') => Some(Action::Write),
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('v') if has_entries => Some(Action::View),
            KeyCode::Char('e') if has_entries => Some(Action::Edit),
            KeyCode::Char('d') if has_entries => Some(Action::Delete),
            KeyCode::Char('s') if has_entries => Some(Action::Search),
            _ => None,
        })
    }

    /// Runs the editor until the user leaves it. New entries keep the editor
    /// open with a fresh form; an edit returns once it has been saved.
    pub fn compose<S: SnapshotStorage>(
        &mut self,
        mut editor: DraftEditor,
        store: &mut EntryStore<S>,
        checker: Option<&Arc<GrammarChecker>>,
        runtime: &Handle,
    ) -> Result<()> {
        let mut buffers = FormBuffers::from_editor(&editor);
        let mut focus = Field::Content;
        self.cursor_position = editor.draft.content.chars().count();

        loop {
            editor.tick();
            if self.last_cursor_update.elapsed() >= Duration::from_millis(500) {
                self.cursor_visible = !self.cursor_visible;
                self.last_cursor_update = Instant::now();
            }
            self.draw_editor(&editor, &buffers, focus)?;

            let Some(key) = key_press()? else {
                continue;
            };

            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match key.code {
                    KeyCode::Char('g') => {
                        editor.request_check(checker, runtime);
                    }
                    KeyCode::Char('a') => {
                        if editor.apply_correction() {
                            self.cursor_position = editor.draft.content.chars().count();
                        }
                    }
                    KeyCode::Char('d') => editor.discard_correction(),
                    KeyCode::Char('s') => {
                        let was_edit = editor.editing().is_some();
                        if self.save(&mut editor, &buffers, store).is_ok() {
                            if was_edit {
                                self.status = editor.notice().cloned();
                                return Ok(());
                            }
                            buffers = FormBuffers::from_editor(&editor);
                            focus = Field::Content;
                            self.cursor_position = 0;
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match (key.code, focus) {
                (KeyCode::Esc, _) => return Ok(()),
                (KeyCode::Tab, _) => focus = focus.next(),
                (KeyCode::Left, Field::Mood) => editor.draft.mood = cycle_mood(&editor.draft.mood, -1),
                (KeyCode::Right, Field::Mood) => editor.draft.mood = cycle_mood(&editor.draft.mood, 1),
                (KeyCode::Left, Field::Content) => {
                    self.cursor_position = self.cursor_position.saturating_sub(1);
                }
                (KeyCode::Right, Field::Content) => {
                    if self.cursor_position < editor.draft.content.chars().count() {
                        self.cursor_position += 1;
                    }
                }
                (KeyCode::Delete, Field::Content) => {
                    remove_at(&mut editor.draft.content, self.cursor_position);
                }
                (KeyCode::Enter, Field::Content) => {
                    insert_at(&mut editor.draft.content, &mut self.cursor_position, '\n');
                }
                (KeyCode::Char(c), field) => match field {
                    Field::Content => insert_at(&mut editor.draft.content, &mut self.cursor_position, c),
                    Field::Date => buffers.date.push(c),
                    Field::MusicLink => buffers.music_link.push(c),
                    Field::Image => buffers.image_path.push(c),
                    Field::Mood => {}
                },
                (KeyCode::Backspace, field) => {
                    match field {
                        Field::Content => remove_before(&mut editor.draft.content, &mut self.cursor_position),
                        Field::Date => buffers.date.pop(),
                        Field::MusicLink => buffers.music_link.pop(),
                        Field::Image => buffers.image_path.pop(),
                        Field::Mood => None,
                    };
                }
                _ => {}
            }
        }
    }

    fn save<S: SnapshotStorage>(
        &mut self,
        editor: &mut DraftEditor,
        buffers: &FormBuffers,
        store: &mut EntryStore<S>,
    ) -> personal_diary::DiaryResult<DiaryEntry> {
        editor.set_date(&buffers.date)?;
        editor.set_music_link(&buffers.music_link);
        let image_path = buffers.image_path.trim();
        if !image_path.is_empty() {
            editor.set_image_path(Path::new(image_path))?;
        }
        editor.save(store)
    }

    fn draw_editor(&mut self, editor: &DraftEditor, buffers: &FormBuffers, focus: Field) -> Result<()> {
        let cursor = if self.cursor_visible { "|" } else { " " };
        let cursor_position = self.cursor_position;
        let heading = if editor.editing().is_some() {
            "Edit Diary Entry"
        } else {
            "📝 Today's Diary"
        };
        let grammar = editor.grammar_result().cloned();
        let checking = editor.is_checking();
        let notice = editor.notice().cloned();
        let has_image = editor.draft.image.is_some();

        self.terminal.draw(|f| {
            let has_result = grammar.is_some();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Min(8),
                    Constraint::Length(if has_result { 8 } else { 0 }),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(3),
                ])
                .split(f.area());

            f.render_widget(title_bar(heading), chunks[0]);

            if let Some(notice) = &notice {
                f.render_widget(notice_line(notice), chunks[1]);
            } else if checking {
                f.render_widget(
                    Paragraph::new("🔄 Checking...").alignment(Alignment::Center),
                    chunks[1],
                );
            }

            let focused = |field: Field| {
                if focus == field {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                }
            };
            let with_cursor = |text: &str, field: Field| {
                if focus == field {
                    format!("{text}{cursor}")
                } else {
                    text.to_string()
                }
            };

            let content_text = if focus == Field::Content {
                let mut text = editor.draft.content.clone();
                text.insert_str(byte_offset(&text, cursor_position), cursor);
                text
            } else {
                editor.draft.content.clone()
            };
            let content = Paragraph::new(content_text)
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(focused(Field::Content))
                        .title("Content"),
                );
            f.render_widget(content, chunks[2]);

            if let Some(result) = &grammar {
                let mut lines = vec![Line::from(Span::styled(
                    result.corrected_text.clone(),
                    Style::default().fg(Color::Green),
                ))];
                lines.extend(
                    result
                        .explanations
                        .iter()
                        .map(|e| Line::from(format!("• {e}"))),
                );
                let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Grammar Check Results (Ctrl+A apply, Ctrl+D discard)"),
                );
                f.render_widget(panel, chunks[3]);
            }

            let date = Paragraph::new(with_cursor(&buffers.date, Field::Date)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(focused(Field::Date))
                    .title("Date (YYYY-MM-DD)"),
            );
            f.render_widget(date, chunks[4]);

            let mood = Paragraph::new(format!("◀ {} ▶", editor.draft.mood)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(focused(Field::Mood))
                    .title("Mood (Left/Right)"),
            );
            f.render_widget(mood, chunks[5]);

            let music = Paragraph::new(with_cursor(&buffers.music_link, Field::MusicLink)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(focused(Field::MusicLink))
                    .title("🎵 Music Link"),
            );
            f.render_widget(music, chunks[6]);

            let image_title = if has_image {
                "📸 Photo (attached; type a path to replace)"
            } else {
                "📸 Photo (path to image file)"
            };
            let image = Paragraph::new(with_cursor(&buffers.image_path, Field::Image)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(focused(Field::Image))
                    .title(image_title),
            );
            f.render_widget(image, chunks[7]);
        })?;

        Ok(())
    }

    /// Lets the user pick an entry. Returns its id, or `None` on Esc.
    pub fn select_entry<S: SnapshotStorage>(
        &mut self,
        store: &EntryStore<S>,
        heading: &str,
    ) -> Result<Option<String>> {
        let entries = store.entries();
        let mut selected_index = 0;

        loop {
            self.terminal.draw(|f| {
                let chunks = screen(f.area());
                f.render_widget(title_bar(heading), chunks[0]);
                f.render_stateful_widget(
                    entry_list(entries, "Entries"),
                    chunks[1],
                    &mut ListState::default().with_selected(Some(selected_index)),
                );
                f.render_widget(
                    instructions("Up/Down: Navigate, Enter: Select, Esc: Cancel"),
                    chunks[3],
                );
            })?;

            if let Some(key) = key_press()? {
                match key.code {
                    KeyCode::Up => selected_index = selected_index.saturating_sub(1),
                    KeyCode::Down => {
                        if selected_index + 1 < entries.len() {
                            selected_index += 1;
                        }
                    }
                    KeyCode::Enter => {
                        return Ok(entries.get(selected_index).map(|e| e.id.clone()));
                    }
                    KeyCode::Esc => return Ok(None),
                    _ => {}
                }
            }
        }
    }

    pub fn view_entries(&mut self, entries: &[DiaryEntry], heading: &str) -> Result<()> {
        let mut selected_index = 0;

        loop {
            self.terminal.draw(|f| {
                let chunks = screen(f.area());
                f.render_widget(title_bar(heading), chunks[0]);
                f.render_stateful_widget(
                    entry_list(entries, "Entries"),
                    chunks[1],
                    &mut ListState::default().with_selected(Some(selected_index)),
                );
                f.render_widget(
                    instructions("Up/Down: Navigate, Enter: View full entry, Esc: Back"),
                    chunks[3],
                );
            })?;

            if let Some(key) = key_press()? {
                match key.code {
                    KeyCode::Up => selected_index = selected_index.saturating_sub(1),
                    KeyCode::Down => {
                        if selected_index + 1 < entries.len() {
                            selected_index += 1;
                        }
                    }
                    KeyCode::Enter => {
                        if let Some(entry) = entries.get(selected_index) {
                            self.view_full_entry(entry)?;
                        }
                    }
                    KeyCode::Esc => break,
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn view_full_entry(&mut self, entry: &DiaryEntry) -> Result<()> {
        let mut details = vec![Line::from(format!("Mood: {}", entry.mood))];
        if let Some(link) = &entry.music_link {
            details.push(Line::from(format!("🎵 {link}")));
        }
        if let Some(image) = &entry.image {
            details.push(Line::from(format!("📸 photo attached ({} KB)", image.len() / 1024)));
        }
        details.push(Line::from(format!(
            "Written {}, last changed {}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.updated_at.format("%Y-%m-%d %H:%M")
        )));
        details.push(Line::from(""));
        details.extend(entry.content.lines().map(|l| Line::from(l.to_string())));

        loop {
            self.terminal.draw(|f| {
                let chunks = screen(f.area());
                let heading = match &entry.title {
                    Some(title) if !title.is_empty() => {
                        format!("{} · {}", entry.date.format("%Y-%m-%d"), title)
                    }
                    _ => format!("Entry from {}", entry.date.format("%Y-%m-%d")),
                };
                f.render_widget(title_bar(heading), chunks[0]);

                let content = Paragraph::new(details.clone())
                    .wrap(Wrap { trim: false })
                    .block(Block::default().borders(Borders::ALL).title("Content"));
                f.render_widget(content, chunks[1]);
                f.render_widget(instructions("Any key: Back"), chunks[3]);
            })?;

            if key_press()?.is_some() {
                break;
            }
        }

        Ok(())
    }

    /// Delete screen. Enter arms the highlighted entry, a second Enter on the
    /// same entry deletes it; moving the selection disarms.
    pub fn delete_entries<S: SnapshotStorage>(&mut self, store: &mut EntryStore<S>) -> Result<()> {
        let mut selected_index = 0;
        let mut armed: Option<String> = None;
        let mut notice: Option<Notice> = None;

        loop {
            if store.is_empty() {
                return Ok(());
            }
            selected_index = selected_index.min(store.len() - 1);
            let selected_id = store.entries()[selected_index].id.clone();
            let confirming = armed.as_deref() == Some(selected_id.as_str());

            self.terminal.draw(|f| {
                let chunks = screen(f.area());
                f.render_widget(title_bar("Select Entry to Delete"), chunks[0]);
                f.render_stateful_widget(
                    entry_list(store.entries(), "Entries"),
                    chunks[1],
                    &mut ListState::default().with_selected(Some(selected_index)),
                );
                if confirming {
                    f.render_widget(
                        Paragraph::new("Press Enter again to confirm")
                            .style(Style::default().fg(Color::Red))
                            .alignment(Alignment::Center),
                        chunks[2],
                    );
                } else if let Some(notice) = &notice {
                    f.render_widget(notice_line(notice), chunks[2]);
                }
                f.render_widget(
                    instructions("Up/Down: Navigate, Enter: Delete (twice to confirm), Esc: Back"),
                    chunks[3],
                );
            })?;

            if let Some(key) = key_press()? {
                match key.code {
                    KeyCode::Up => {
                        selected_index = selected_index.saturating_sub(1);
                        armed = None;
                    }
                    KeyCode::Down => {
                        if selected_index + 1 < store.len() {
                            selected_index += 1;
                        }
                        armed = None;
                    }
                    KeyCode::Enter if confirming => {
                        armed = None;
                        notice = Some(match store.delete(&selected_id) {
                            Ok(_) => Notice::new("Entry deleted", NoticeKind::Success),
                            Err(e) => Notice::new(e.to_string(), NoticeKind::Error),
                        });
                    }
                    KeyCode::Enter => armed = Some(selected_id),
                    KeyCode::Esc => return Ok(()),
                    _ => {}
                }
            }
        }
    }

    pub fn get_search_query(&mut self) -> Result<String> {
        let mut query = String::new();

        loop {
            self.terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Min(1),
                    ])
                    .split(f.area());

                f.render_widget(title_bar("Search Entries"), chunks[0]);

                let search_input = Paragraph::new(query.clone()).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Content, mood or title"),
                );
                f.render_widget(search_input, chunks[1]);
                f.render_widget(instructions("Enter: Submit, Esc: Cancel"), chunks[2]);
            })?;

            if let Some(key) = key_press()? {
                match key.code {
                    KeyCode::Enter => break,
                    KeyCode::Char(c) => query.push(c),
                    KeyCode::Backspace => {
                        query.pop();
                    }
                    KeyCode::Esc => return Ok(String::new()),
                    _ => {}
                }
            }
        }

        Ok(query)
    }
}

fn cycle_mood(current: &str, step: isize) -> String {
    let index = MOODS.iter().position(|m| *m == current).unwrap_or(0) as isize;
    let next = (index + step).rem_euclid(MOODS.len() as isize) as usize;
    MOODS[next].to_string()
}

/// Byte index of the `pos`-th char, or the end of `text`.
fn byte_offset(text: &str, pos: usize) -> usize {
    text.char_indices().nth(pos).map_or(text.len(), |(i, _)| i)
}

fn insert_at(text: &mut String, pos: &mut usize, c: char) {
    text.insert(byte_offset(text, *pos), c);
    *pos += 1;
}

fn remove_before(text: &mut String, pos: &mut usize) -> Option<char> {
    if *pos == 0 {
        return None;
    }
    *pos -= 1;
    remove_at(text, *pos)
}

fn remove_at(text: &mut String, pos: usize) -> Option<char> {
    let at = byte_offset(text, pos);
    (at < text.len()).then(|| text.remove(at))
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn truncate_counts_columns_not_bytes() {
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語の日記", 7), "日本語…");
    }

    #[test]
    fn moods_cycle_both_ways() {
        assert_eq!(cycle_mood("happy", 1), "calm");
        assert_eq!(cycle_mood("happy", -1), "angry");
        assert_eq!(cycle_mood("custom", 1), "calm");
    }

    #[test]
    fn typing_inserts_at_the_cursor() {
        let mut text = "héllo".to_string();
        let mut pos = 2;
        insert_at(&mut text, &mut pos, 'X');
        assert_eq!(text, "héXllo");
        assert_eq!(pos, 3);

        let mut pos = text.chars().count();
        insert_at(&mut text, &mut pos, '\n');
        assert_eq!(text, "héXllo\n");
    }

    #[test]
    fn backspace_and_delete_respect_multibyte_chars() {
        let mut text = "日本語".to_string();
        let mut pos = 2;
        assert_eq!(remove_before(&mut text, &mut pos), Some('本'));
        assert_eq!((text.as_str(), pos), ("日語", 1));

        assert_eq!(remove_at(&mut text, 1), Some('語'));
        assert_eq!(remove_at(&mut text, 1), None);

        let mut pos = 0;
        assert_eq!(remove_before(&mut text, &mut pos), None);
        assert_eq!(text, "日");
    }

    #[test]
    fn byte_offset_clamps_to_the_end() {
        assert_eq!(byte_offset("aé", 1), 1);
        assert_eq!(byte_offset("aé", 2), 3);
        assert_eq!(byte_offset("aé", 10), 3);
    }
}
