//! Utility functions and helpers
//!
//! Atomic snapshot writes and date/time parsing.

pub mod atomic;
pub mod time;

pub use time::{parse_date, parse_optional_date, parse_optional_time, parse_time};
