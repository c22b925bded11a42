//! Coursecal Core Library
//!
//! This library turns structured course data extracted from a syllabus
//! into a timezone-aware ICS calendar feed.

pub mod days;
pub mod error;
pub mod extract;
pub mod ics;
pub mod schedule;
pub mod times;
pub mod types;
pub mod tz;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{days::*, extract::*, ics::*, schedule::*, times::*, types::*, tz::*};
}
