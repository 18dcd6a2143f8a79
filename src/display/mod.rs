//! Output rendering.
//!
//! Pure functions that turn an inspection into text. Nothing here
//! writes to the terminal or depends on process-wide state.

pub mod json_printer;
pub mod report;
pub mod timestamps;
