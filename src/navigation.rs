//! Navigation state threaded between the listing provider and the screen
use crate::paging::PaginationState;

/// Identifies one navigation; completions holding an outdated ticket are stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTicket {
    generation: u64,
    path: String,
}

impl NavigationTicket {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct NavigationState {
    path: String,
    generation: u64,
    pagination: PaginationState,
}

impl NavigationState {
    pub fn new(path: &str, page_size: usize) -> NavigationState {
        NavigationState {
            path: path.to_owned(),
            generation: 0,
            pagination: PaginationState::new(page_size),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn pagination_mut(&mut self) -> &mut PaginationState {
        &mut self.pagination
    }

    /// Moves to `path` and starts over from its first page
    pub fn navigate_to(&mut self, path: &str) -> NavigationTicket {
        self.path = path.to_owned();
        self.pagination.reset();
        self.begin()
    }

    /// Lists the current path again, keeping the current page
    pub fn refresh(&mut self) -> NavigationTicket {
        self.begin()
    }

    pub fn is_current(&self, ticket: &NavigationTicket) -> bool {
        ticket.generation == self.generation
    }

    fn begin(&mut self) -> NavigationTicket {
        self.generation += 1;
        NavigationTicket {
            generation: self.generation,
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NavigationState;

    #[test]
    fn only_latest_navigation_is_current() {
        let mut state = NavigationState::new("", 10);
        let first = state.navigate_to("docs/");
        let second = state.navigate_to("media/");

        assert!(!state.is_current(&first));
        assert!(state.is_current(&second));
        assert_eq!(second.path(), "media/");
        assert_eq!(state.path(), "media/");
    }

    #[test]
    fn refresh_supersedes_same_path() {
        let mut state = NavigationState::new("docs/", 10);
        let first = state.refresh();
        let second = state.refresh();

        assert_eq!(first.path(), second.path());
        assert!(second.generation() > first.generation());
        assert!(!state.is_current(&first));
    }

    #[test]
    fn navigating_resets_page_but_refresh_keeps_it() {
        let mut state = NavigationState::new("", 10);
        state.pagination_mut().update(30);
        state.pagination_mut().next_page();
        state.refresh();
        assert_eq!(state.pagination().current_page(), 2);

        state.navigate_to("docs/");
        assert_eq!(state.pagination().current_page(), 1);
    }
}
