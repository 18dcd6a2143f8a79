//! Command handlers.
//!
//! The CLI has a single action, implemented in [`inspect`].

pub mod inspect;
