use crossterm::event::KeyEvent;

use crate::{
    navigation::NavigationTicket,
    providers::s3::{ListingError, ListingResult},
};

mod browser;

pub use browser::BrowserScreen;

/// Completion of a listing started by a navigation
#[derive(Debug)]
pub struct Listed {
    pub ticket: NavigationTicket,
    pub outcome: Result<ListingResult, ListingError>,
}

/// Everything the main loop reacts to
#[derive(Debug)]
pub enum Event {
    Input(KeyEvent),
    Shutdown,
    Tick,
    Listed(Listed),
}

/// Whether the main loop should keep going after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}
