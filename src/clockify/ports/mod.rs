//! Port contracts for the Clockify API.
//!
//! [`api::ClockifyApi`] is the raw capability; [`lookup::ClockifyApiExt`]
//! layers paging and name lookups on top of any implementation.

pub mod api;
pub mod lookup;

pub use api::{ClockifyApi, ClockifyApiError, ClockifyApiResult, Page};
pub use lookup::ClockifyApiExt;

#[cfg(test)]
pub use api::MockClockifyApi;
