//! Progress throttling.
//!
//! The worker reports every percentage step; the bridge forwards only as
//! many as observers can use.

mod throttle;

pub use throttle::{DEFAULT_PROGRESS_INTERVAL, ProgressThrottle};
