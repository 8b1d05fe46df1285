//! The interactive cluster prompt.
//!
//! A single input line with the matching catalog entries listed below it.
//! The list is refiltered on every keystroke. Down/Tab and Up/Shift+Tab walk
//! the list and put the highlighted key into the input, Enter submits the
//! input line to the [`Session`].

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::debug;

use crate::Theme;
use crate::catalog::Suggestion;
use crate::config::PromptConfig;
use crate::connector::{Dispatch, ProcessDispatcher};
use crate::error::DispatchError;
use crate::model::Cluster;
use crate::session::{EXIT_COMMAND, SelectorState, Session, Submission};
use crate::tui::{Event, Tui};

/// Input line plus the filtered suggestion list.
pub struct PromptView {
    prefix: String,
    title: String,
    input: String,
    /// Byte offset into `input`, always on a char boundary.
    cursor: usize,
    suggestions: Vec<Suggestion>,
    state: ListState,
}

impl PromptView {
    pub fn new(config: &PromptConfig, session: &Session) -> Self {
        let mut view = Self {
            prefix: config.prefix.clone(),
            title: config.title.clone(),
            input: String::new(),
            cursor: 0,
            suggestions: Vec::new(),
            state: ListState::default(),
        };
        view.refresh(session);
        view
    }

    #[cfg(test)]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[cfg(test)]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    #[cfg(test)]
    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    /// Handle a key press. Returns the line when the operator submits one.
    pub fn handle_key(&mut self, key: KeyEvent, session: &Session) -> Option<String> {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => return Some(self.input.clone()),
            (KeyCode::Esc, _) => return Some(EXIT_COMMAND.to_string()),

            (KeyCode::Down | KeyCode::Tab, _) => self.select_next(),
            (KeyCode::Up | KeyCode::BackTab, _) => self.select_previous(),

            (KeyCode::Backspace, KeyModifiers::ALT) | (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                self.delete_word_before_cursor();
                self.refresh(session);
            }
            (KeyCode::Backspace, _) => {
                self.delete_char_before_cursor();
                self.refresh(session);
            }
            (KeyCode::Delete, _) => {
                self.delete_char_at_cursor();
                self.refresh(session);
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.input.clear();
                self.cursor = 0;
                self.refresh(session);
            }

            (KeyCode::Left, _) => self.cursor = self.prev_boundary(),
            (KeyCode::Right, _) => self.cursor = self.next_boundary(),
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => self.cursor = 0,
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.input.len();
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.input.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                self.refresh(session);
            }

            _ => {}
        }
        None
    }

    /// Insert pasted text at the cursor. Only the first line is kept.
    pub fn handle_paste(&mut self, text: &str, session: &Session) {
        let line = text.lines().next().unwrap_or_default();
        self.input.insert_str(self.cursor, line);
        self.cursor += line.len();
        self.refresh(session);
    }

    fn refresh(&mut self, session: &Session) {
        self.suggestions = session
            .suggestions(&self.input)
            .into_iter()
            .cloned()
            .collect();
        self.state.select(None);
    }

    fn select_next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        let next = self
            .state
            .selected()
            .map_or(0, |i| (i + 1) % self.suggestions.len());
        self.complete(next);
    }

    fn select_previous(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        let last = self.suggestions.len() - 1;
        let previous = self
            .state
            .selected()
            .map_or(last, |i| if i == 0 { last } else { i - 1 });
        self.complete(previous);
    }

    /// Highlight a suggestion and copy its key into the input without
    /// refiltering, so the list stays put while walking it.
    fn complete(&mut self, index: usize) {
        self.state.select(Some(index));
        self.input.clone_from(&self.suggestions[index].key);
        self.cursor = self.input.len();
    }

    fn prev_boundary(&self) -> usize {
        self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.input[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            let start = self.prev_boundary();
            self.input.drain(start..self.cursor);
            self.cursor = start;
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.input.len() {
            let end = self.next_boundary();
            self.input.drain(self.cursor..end);
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let before = &self.input[..self.cursor];
        let trimmed = before.trim_end_matches(' ');
        let start = trimmed.rfind(' ').map_or(0, |i| i + 1);
        self.input.drain(start..self.cursor);
        self.cursor = start;
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [title_area, input_area, list_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .areas(area);

        let title = Line::from(vec![
            Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "Enter connect · Tab/↓ complete · Esc exit",
                Style::default().fg(theme.muted()),
            ),
        ]);
        frame.render_widget(Paragraph::new(title), title_area);

        let (before, after) = self.input.split_at(self.cursor);
        let mut rest = after.chars();
        let cursor_char = rest.next().unwrap_or(' ');
        let input = Line::from(vec![
            Span::styled(self.prefix.clone(), Style::default().fg(theme.accent())),
            Span::styled(before.to_string(), Style::default().fg(theme.text)),
            Span::styled(
                cursor_char.to_string(),
                Style::default().fg(theme.base).bg(theme.text),
            ),
            Span::styled(rest.as_str().to_string(), Style::default().fg(theme.text)),
        ]);
        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.lavender));
        frame.render_widget(Paragraph::new(input).block(input_block), input_area);

        let key_width = self
            .suggestions
            .iter()
            .map(|s| s.key.chars().count())
            .max()
            .unwrap_or_default();
        let items: Vec<ListItem> = self
            .suggestions
            .iter()
            .map(|s| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<key_width$}  ", s.key),
                        Style::default().fg(theme.text),
                    ),
                    Span::styled(s.description.clone(), Style::default().fg(theme.muted())),
                ]))
            })
            .collect();

        let count = format!(" {} clusters ", self.suggestions.len());
        let list_block = Block::default()
            .title(count)
            .title_style(Style::default().fg(theme.peach))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.overlay0));

        if items.is_empty() {
            let empty = Paragraph::new(Span::styled(
                "no matching clusters",
                Style::default().fg(theme.muted()),
            ))
            .block(list_block);
            frame.render_widget(empty, list_area);
            return;
        }

        let list = List::new(items)
            .block(list_block)
            .highlight_style(
                Style::default()
                    .bg(theme.selection())
                    .fg(theme.green)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut self.state);
    }
}

/// Restores the terminal before handing it to the connect command.
struct TerminalDispatcher<'a> {
    tui: &'a mut Tui,
}

#[async_trait]
impl Dispatch for TerminalDispatcher<'_> {
    async fn connect(&mut self, cluster: &Cluster) -> Result<(), DispatchError> {
        self.tui
            .exit()
            .map_err(|err| DispatchError::Terminal(err.to_string()))?;
        ProcessDispatcher.connect(cluster).await
    }
}

/// Run the prompt until the session terminates.
pub async fn run(
    mut session: Session,
    config: &PromptConfig,
    theme: Theme,
) -> color_eyre::Result<Submission> {
    let mut view = PromptView::new(config, &session);
    let mut tui = Tui::new(30.0, 4.0)?;
    tui.enter()?;

    let mut outcome = Submission::Ignored;
    while session.state() == SelectorState::AwaitingInput {
        let Some(event) = tui.next_event().await else {
            break;
        };

        let line = match event {
            Event::Quit => Some(EXIT_COMMAND.to_string()),
            Event::Key(key) => view.handle_key(key, &session),
            Event::Paste(text) => {
                view.handle_paste(&text, &session);
                None
            }
            Event::Suspend => {
                tui.suspend()?;
                tui.resume()?;
                None
            }
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                None
            }
            Event::Init | Event::Render => {
                tui.draw(|frame| {
                    let area = frame.area();
                    view.render(frame, area, &theme);
                })?;
                None
            }
            Event::Error(err) => {
                debug!(%err, "Terminal event error");
                None
            }
            Event::Tick => None,
        };

        if let Some(line) = line {
            debug!(line = %line, "Submitted");
            outcome = session
                .submit(&line, &mut TerminalDispatcher { tui: &mut tui })
                .await?;
        }
    }

    tui.exit()?;
    Ok(outcome)
}
