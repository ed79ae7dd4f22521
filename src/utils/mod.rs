pub mod date;
pub mod formatting;
pub mod path;
pub mod table;
pub mod time;

pub use formatting::{dash, truncate};
pub use time::format_seconds;
