//! Command-line front end for the order matcher.
//!
//! The binary lives in `main.rs`; CSV intake and logging setup are exposed
//! here so they can be tested without a process boundary.

pub mod import;
pub mod logging;
