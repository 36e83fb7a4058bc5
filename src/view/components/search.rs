use crossterm::event::KeyCode;
use tui::{
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

/// Outcome of a key press handled by the search box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchInput {
    /// The query text changed
    Changed,
    /// Editing ended, query unchanged
    Done,
    Ignored,
}

/// Search box filtering the listing by display name
#[derive(Default)]
pub struct SearchBox {
    query: String,
    editing: bool,
}

impl SearchBox {
    pub fn new() -> SearchBox {
        SearchBox::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.editing = false;
    }

    /// Feeds a key to the box while it's being edited
    ///
    /// Enter keeps the query, Esc clears it.
    pub fn handle_key(&mut self, code: KeyCode) -> SearchInput {
        if !self.editing {
            return SearchInput::Ignored;
        }
        match code {
            KeyCode::Char(c) => {
                self.query.push(c);
                SearchInput::Changed
            }
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    SearchInput::Changed
                } else {
                    SearchInput::Ignored
                }
            }
            KeyCode::Enter => {
                self.editing = false;
                SearchInput::Done
            }
            KeyCode::Esc => {
                let had_query = !self.query.is_empty();
                self.clear();
                if had_query {
                    SearchInput::Changed
                } else {
                    SearchInput::Done
                }
            }
            _ => SearchInput::Ignored,
        }
    }

    pub fn make_paragraph(&self) -> Paragraph<'static> {
        let (text, style) = if self.editing {
            (format!("{}_", self.query), Style::default().fg(Color::Yellow))
        } else if self.query.is_empty() {
            (
                String::from("Press / to search"),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (self.query.clone(), Style::default())
        };
        Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title("Search"))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;

    use super::{SearchBox, SearchInput};

    #[test]
    fn keys_are_ignored_until_editing() {
        let mut search = SearchBox::new();
        assert_eq!(search.handle_key(KeyCode::Char('a')), SearchInput::Ignored);
        assert_eq!(search.query(), "");
    }

    #[test]
    fn typing_builds_query() {
        let mut search = SearchBox::new();
        search.start_editing();
        search.handle_key(KeyCode::Char('r'));
        search.handle_key(KeyCode::Char('e'));
        search.handle_key(KeyCode::Char('x'));
        assert_eq!(search.handle_key(KeyCode::Backspace), SearchInput::Changed);
        assert_eq!(search.query(), "re");
        assert_eq!(search.handle_key(KeyCode::Enter), SearchInput::Done);
        assert!(!search.is_editing());
        assert_eq!(search.query(), "re");
    }

    #[test]
    fn escape_clears_query() {
        let mut search = SearchBox::new();
        search.start_editing();
        search.handle_key(KeyCode::Char('q'));
        assert_eq!(search.handle_key(KeyCode::Esc), SearchInput::Changed);
        assert_eq!(search.query(), "");
        assert!(!search.is_editing());
    }
}
