//! Server-assigned identifier types.
//!
//! Clockify identifiers are opaque strings. Each entity kind gets its own
//! newtype so a project identifier can never be passed where a task
//! identifier is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier carried by placeholder entities synthesized during a dry run.
pub const DRY_RUN_ID: &str = "dry-run";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a service-assigned identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the dry-run sentinel identifier.
            #[must_use]
            pub fn dry_run() -> Self {
                Self(DRY_RUN_ID.to_owned())
            }

            /// Returns whether this is the dry-run sentinel identifier.
            #[must_use]
            pub fn is_dry_run(&self) -> bool {
                self.0 == DRY_RUN_ID
            }

            /// Returns the identifier as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a workspace.
    WorkspaceId
);
string_id!(
    /// Identifier of a user.
    UserId
);
string_id!(
    /// Identifier of a client.
    ClientId
);
string_id!(
    /// Identifier of a project.
    ProjectId
);
string_id!(
    /// Identifier of a task within a project.
    TaskId
);
string_id!(
    /// Identifier of a tag.
    TagId
);
string_id!(
    /// Identifier of a time entry.
    TimeEntryId
);
string_id!(
    /// Identifier of a registered webhook.
    WebhookId
);
