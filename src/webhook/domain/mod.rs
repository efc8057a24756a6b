//! Domain model for webhook deliveries and registrations.

mod name;
mod payload;

pub use name::{MAX_WEBHOOK_NAME_LENGTH, make_webhook_name};
pub use payload::{EventPayload, PayloadKind, PayloadRegistry, ReceivedEvent};
