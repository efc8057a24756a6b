//! Clockify API capability for clocksync.
//!
//! Everything the migration engine and the webhook subsystem need from the
//! remote time-tracking service goes through the [`ports::ClockifyApi`]
//! port. The module follows hexagonal architecture:
//!
//! - Wire-format entities and identifiers in [`domain`]
//! - The API port and paging helpers in [`ports`]
//! - HTTP and in-memory implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
