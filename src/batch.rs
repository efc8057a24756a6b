//! Aggregate error for operations applied to many items at once.
//!
//! A [`BatchError`] keeps every `(identifier, cause)` pair instead of
//! collapsing them into one message, so callers can tell which items failed
//! and retry or report them individually.

use std::error::Error;
use std::fmt;

/// One failed item of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure<K, E> {
    /// Identifier of the failed item.
    pub id: K,
    /// Why the item failed.
    pub cause: E,
}

impl<K, E> BatchFailure<K, E> {
    /// Pairs an item identifier with its failure cause.
    pub const fn new(id: K, cause: E) -> Self {
        Self { id, cause }
    }
}

/// Non-empty, ordered collection of per-item failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError<K, E> {
    failures: Vec<BatchFailure<K, E>>,
}

impl<K, E> BatchError<K, E> {
    /// Wraps `failures`, returning `None` when there are none.
    #[must_use]
    pub fn from_failures(failures: Vec<BatchFailure<K, E>>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// Returns the failures in the order they occurred.
    #[must_use]
    pub fn failures(&self) -> &[BatchFailure<K, E>] {
        &self.failures
    }

    /// Returns the identifiers of the failed items.
    pub fn ids(&self) -> impl Iterator<Item = &K> {
        self.failures.iter().map(|failure| &failure.id)
    }

    /// Returns the number of failed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Always `false`; an empty batch error cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Consumes the error and returns the failures.
    #[must_use]
    pub fn into_failures(self) -> Vec<BatchFailure<K, E>> {
        self.failures
    }
}

impl<K: fmt::Display, E: fmt::Display> fmt::Display for BatchError<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.failures.len() == 1 { "item" } else { "items" };
        write!(f, "{} {noun} failed", self.failures.len())?;
        for (position, failure) in self.failures.iter().enumerate() {
            let separator = if position == 0 { ": " } else { "; " };
            write!(f, "{separator}{}: {}", failure.id, failure.cause)?;
        }
        Ok(())
    }
}

impl<K, E> Error for BatchError<K, E>
where
    K: fmt::Debug + fmt::Display,
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.failures
            .first()
            .map(|failure| &failure.cause as &(dyn Error + 'static))
    }
}
