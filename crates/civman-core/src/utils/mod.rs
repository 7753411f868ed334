//! Small text helpers shared by the client, catalog and CLI.

mod format;
mod text;
mod time;

pub use format::format_size;
pub use text::{extract_model_urls, strip_html};
pub use time::{TIMESTAMP_FORMAT, timestamp_now};
