//! Unit tests for the Clockify capability.
