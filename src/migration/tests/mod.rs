//! Unit tests for the migration module.

mod service_tests;
