//! Output formatting for the menu bar host.

mod json;
mod menu;

pub use json::JsonFormatter;
pub use menu::MenuFormatter;
