//! Unit tests for the webhook module.

mod lifecycle_tests;
mod name_tests;
