use tui::widgets::TableState;

mod breadcrumb;
pub mod err;
mod object_table;
mod search;

pub use breadcrumb::Breadcrumb;
pub use object_table::ObjectTable;
pub use search::{SearchBox, SearchInput};

pub trait StatefulContainer {
    fn previous(&mut self);
    fn next(&mut self);
    fn get_current(&self) -> TableState;
}
