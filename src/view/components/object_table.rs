use tui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use super::StatefulContainer;
use crate::{
    providers::s3::ListingEntry,
    utils::{format_last_modified, format_size},
};

static WIDTHS: [Constraint; 3] = [
    Constraint::Percentage(60),
    Constraint::Length(20),
    Constraint::Length(12),
];

/// Interactive table showing the visible window of a listing
#[derive(Default)]
pub struct ObjectTable {
    len: usize,
    state: TableState,
}

impl ObjectTable {
    pub fn new() -> ObjectTable {
        ObjectTable::default()
    }

    /// Replaces the number of rows and moves the cursor to the first one
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.state.select(if len > 0 { Some(0) } else { None });
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected().filter(|i| *i < self.len)
    }

    fn make_row(entry: &ListingEntry) -> Row<'static> {
        if entry.is_folder() {
            Row::new(vec![
                Cell::from(format!("{}/", entry.name())),
                Cell::from(""),
                Cell::from(""),
            ])
            .style(Style::default().fg(Color::Blue))
        } else {
            Row::new(vec![
                Cell::from(entry.name().to_owned()),
                Cell::from(format_last_modified(entry.last_modified)),
                Cell::from(format_size(entry.size_bytes)),
            ])
        }
    }

    /// Builds the widget for `rows`, as many as were passed to `set_len`
    pub fn make_table(&self, rows: &[&ListingEntry], title: String, loading: bool) -> Table<'static> {
        let title = if loading {
            format!("{} (loading...)", title)
        } else {
            title
        };
        let rows: Vec<Row<'static>> = if rows.is_empty() && !loading {
            vec![Row::new(vec![Cell::from("No objects found")])
                .style(Style::default().add_modifier(Modifier::ITALIC))]
        } else {
            rows.iter().map(|entry| Self::make_row(entry)).collect()
        };
        Table::new(rows)
            .header(
                Row::new(vec!["Name", "Last modified", "Size"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::ALL).title(title))
            .widths(&WIDTHS)
            .column_spacing(1)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ")
    }
}

impl StatefulContainer for ObjectTable {
    fn get_current(&self) -> TableState {
        self.state.clone()
    }

    fn next(&mut self) {
        if self.len > 0 {
            let i = match self.state.selected() {
                Some(i) => {
                    if i >= self.len - 1 {
                        0
                    } else {
                        i + 1
                    }
                }
                None => 0,
            };

            self.state.select(Some(i));
        }
    }

    fn previous(&mut self) {
        if self.len > 0 {
            let i = match self.state.selected() {
                Some(i) => {
                    if i == 0 {
                        self.len - 1
                    } else {
                        i - 1
                    }
                }
                None => 0,
            };

            self.state.select(Some(i));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ObjectTable;
    use crate::view::components::StatefulContainer;

    #[test]
    fn cursor_wraps_around() {
        let mut table = ObjectTable::new();
        table.set_len(3);
        assert_eq!(table.selected(), Some(0));
        table.previous();
        assert_eq!(table.selected(), Some(2));
        table.next();
        assert_eq!(table.selected(), Some(0));
        table.next();
        assert_eq!(table.selected(), Some(1));
    }

    #[test]
    fn empty_table_has_no_selection() {
        let mut table = ObjectTable::new();
        table.set_len(0);
        table.next();
        assert_eq!(table.selected(), None);
        table.previous();
        assert_eq!(table.selected(), None);
    }
}
