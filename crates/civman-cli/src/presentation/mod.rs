//! Terminal output helpers.
//!
//! Keep this module format-only; handlers decide what to show.

pub mod model_display;
pub mod progress;
pub mod tables;

pub use model_display::{display_model_details, display_search_results, print_model_table};
pub use progress::QueueProgressRenderer;
pub use tables::{format_optional, print_separator, truncate_string};
