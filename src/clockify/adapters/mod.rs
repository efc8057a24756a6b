//! Adapter implementations for the Clockify API port.

pub mod http;
pub mod memory;

pub use self::http::{ClockifyApiSettings, HttpClockifyApi};
pub use memory::{ApiCall, ApiOperation, InMemoryClockifyApi};
