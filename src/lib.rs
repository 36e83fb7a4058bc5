pub mod config;
pub mod logging;
pub mod navigation;
pub mod paging;
pub mod providers;
pub mod report;
pub mod utils;
mod view;

pub use view::{components, screens};
