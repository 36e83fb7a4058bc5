use crossterm::{
    event::{DisableMouseCapture, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};
use std::{error::Error, io::Stdout, sync::Arc};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use tui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Terminal,
};

use super::{Event, Flow, Listed};
use crate::{
    config::BucketConfig,
    navigation::{NavigationState, NavigationTicket},
    paging::{filter, window},
    providers::{
        http::ListingTransport,
        s3::{ListingEntry, ListingResult, S3Provider},
    },
    utils::parent_prefix,
    view::components::{
        err::ComponentError, Breadcrumb, ObjectTable, SearchBox, SearchInput, StatefulContainer,
    },
};

fn get_err_list(errs: &[ComponentError]) -> List<'static> {
    let mut items: Vec<ListItem> = errs
        .iter()
        .map(|e| ListItem::new(e.to_string()))
        .collect();
    items.push(ListItem::new("Press ENTER to continue"));
    List::new(items).block(Block::default().borders(Borders::ALL).title("Errors"))
}

/// Breadcrumb, search box, paginated object table and footer of one bucket
pub struct BrowserScreen<B: Backend, T> {
    term: Terminal<B>,
    config: BucketConfig,
    provider: Arc<S3Provider<T>>,
    events: UnboundedSender<Event>,
    nav: NavigationState,
    listing: Option<ListingResult>,
    loading: bool,
    search: SearchBox,
    table: ObjectTable,
    err_stack: Vec<ComponentError>,
}

impl<B, T> BrowserScreen<B, T>
where
    B: Backend,
    T: ListingTransport + 'static,
{
    pub fn new(
        term: Terminal<B>,
        config: BucketConfig,
        provider: Arc<S3Provider<T>>,
        events: UnboundedSender<Event>,
        start_path: &str,
    ) -> BrowserScreen<B, T> {
        let nav = NavigationState::new(start_path, config.page_size);
        BrowserScreen {
            term,
            config,
            provider,
            events,
            nav,
            listing: None,
            loading: false,
            search: SearchBox::new(),
            table: ObjectTable::new(),
            err_stack: Vec::new(),
        }
    }

    pub fn current_path(&self) -> &str {
        self.nav.path()
    }

    pub fn listing(&self) -> Option<&ListingResult> {
        self.listing.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn errors(&self) -> &[ComponentError] {
        &self.err_stack
    }

    /// Lists `path` from its first page, dropping the current listing
    pub fn navigate_to(&mut self, path: &str) {
        let ticket = self.nav.navigate_to(path);
        self.listing = None;
        self.search.clear();
        self.update_window();
        self.start_listing(ticket);
    }

    /// Lists the current path again; the old rows stay until the new ones arrive
    pub fn refresh(&mut self) {
        let ticket = self.nav.refresh();
        self.start_listing(ticket);
    }

    fn start_listing(&mut self, ticket: NavigationTicket) {
        debug!(
            path = ticket.path(),
            generation = ticket.generation(),
            "starting listing"
        );
        self.loading = true;
        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = provider.fetch_all(ticket.path()).await;
            // Receiver is gone once the main loop stopped
            let _ = events.send(Event::Listed(Listed { ticket, outcome }));
        });
    }

    /// Takes in a finished listing unless a newer navigation superseded it
    pub fn apply_listing(&mut self, listed: Listed) {
        if !self.nav.is_current(&listed.ticket) {
            debug!(
                path = listed.ticket.path(),
                generation = listed.ticket.generation(),
                "discarding stale listing"
            );
            return;
        }
        self.loading = false;
        match listed.outcome {
            Ok(result) => self.listing = Some(result),
            Err(err) => {
                self.err_stack
                    .push(ComponentError::from_listing(&err, listed.ticket.path()));
                self.listing = None;
            }
        }
        self.update_window();
    }

    fn filtered(&self) -> Vec<&ListingEntry> {
        match &self.listing {
            None => Vec::new(),
            Some(listing) => filter(listing.entries(), self.search.query()),
        }
    }

    /// Entries on the current page, after the search filter
    pub fn visible_entries(&self) -> Vec<&ListingEntry> {
        let filtered = self.filtered();
        let pagination = self.nav.pagination();
        let (visible, _) = window(&filtered, pagination.current_page(), pagination.page_size());
        visible.to_vec()
    }

    pub fn selected_entry(&self) -> Option<&ListingEntry> {
        self.table
            .selected()
            .and_then(|i| self.visible_entries().get(i).copied())
    }

    /// Recomputes the page count and the rows of the table
    fn update_window(&mut self) {
        let count = self.filtered().len();
        self.nav.pagination_mut().update(count);
        self.reset_rows();
    }

    fn reset_rows(&mut self) {
        let len = self.visible_entries().len();
        self.table.set_len(len);
    }

    fn open_selected(&mut self) {
        let target = match self.selected_entry() {
            Some(entry) if entry.is_folder() => entry.key.clone(),
            _ => return,
        };
        self.navigate_to(&target);
    }

    fn navigate_up(&mut self) {
        if self.nav.path().is_empty() {
            return;
        }
        let parent = parent_prefix(self.nav.path()).to_owned();
        self.navigate_to(&parent);
    }

    pub fn handle_event(&mut self, event: KeyEvent) -> Flow {
        if !self.err_stack.is_empty() {
            if event.code == KeyCode::Enter {
                self.err_stack.clear();
            }
            return Flow::Continue;
        }

        if self.search.is_editing() {
            if self.search.handle_key(event.code) == SearchInput::Changed {
                self.nav.pagination_mut().reset();
                self.update_window();
            }
            return Flow::Continue;
        }

        match event.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Down | KeyCode::Char('j') => self.table.next(),
            KeyCode::Up | KeyCode::Char('k') => self.table.previous(),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => {
                if self.nav.pagination_mut().next_page() {
                    self.reset_rows();
                }
            }
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => {
                if self.nav.pagination_mut().previous_page() {
                    self.reset_rows();
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.open_selected(),
            KeyCode::Backspace | KeyCode::Char('h') => self.navigate_up(),
            KeyCode::Home | KeyCode::Char('g') => {
                if !self.nav.path().is_empty() {
                    self.navigate_to("");
                }
            }
            KeyCode::Char('/') => self.search.start_editing(),
            KeyCode::Esc => {
                if !self.search.query().is_empty() {
                    self.search.clear();
                    self.nav.pagination_mut().reset();
                    self.update_window();
                }
            }
            KeyCode::Char('r') => self.refresh(),
            _ => (),
        }
        Flow::Continue
    }

    fn make_footer(&self, selected: Option<&ListingEntry>) -> Paragraph<'static> {
        let pagination = self.nav.pagination();
        let mut spans = vec![Span::styled(
            format!(
                "Page {} of {}",
                pagination.current_page(),
                pagination.total_pages()
            ),
            Style::default().fg(Color::Cyan),
        )];
        match selected {
            Some(entry) if !entry.is_folder() => {
                spans.push(Span::raw("  "));
                spans.push(Span::raw(self.config.object_url(&entry.key)));
            }
            _ => spans.push(Span::styled(
                "  ←/→ page  ↵ open  ⌫ up  / search  r refresh  q quit",
                Style::default().fg(Color::DarkGray),
            )),
        }
        Paragraph::new(Spans::from(spans))
    }

    pub fn render(&mut self) -> Result<(), Box<dyn Error>> {
        let term_size = self.term.size()?;
        if self.err_stack.is_empty() {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Length(3),
                    Constraint::Min(3),
                    Constraint::Length(1),
                ])
                .split(term_size);

            let (breadcrumb, search, table, footer) = {
                let visible = self.visible_entries();
                let title = format!("Objects ({})", self.filtered().len());
                let selected = self.table.selected().and_then(|i| visible.get(i).copied());
                (
                    Breadcrumb::make_paragraph(&self.provider.bucket_name, self.nav.path()),
                    self.search.make_paragraph(),
                    self.table.make_table(&visible, title, self.loading),
                    self.make_footer(selected),
                )
            };
            let mut state = self.table.get_current();

            self.term.draw(|f| {
                f.render_widget(breadcrumb, chunks[0]);
                f.render_widget(search, chunks[1]);
                f.render_stateful_widget(table, chunks[2], &mut state);
                f.render_widget(footer, chunks[3]);
            })?;
        } else {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .margin(1)
                .constraints([Constraint::Percentage(100)])
                .split(term_size);

            let err_list = get_err_list(&self.err_stack);
            self.term.draw(|f| {
                f.render_widget(err_list, chunks[0]);
            })?;
        }
        Ok(())
    }
}

impl<T> BrowserScreen<CrosstermBackend<Stdout>, T> {
    pub fn shutdown(&mut self) -> Result<(), Box<dyn Error>> {
        disable_raw_mode()?;
        execute!(
            self.term.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.term.show_cursor()?;
        self.term.clear()?;
        Ok(())
    }
}
