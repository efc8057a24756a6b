//! Clocksync: Clockify workspace migration and webhook sessions.
//!
//! This crate re-homes time entries recorded under legacy
//! `<project>/TASK<number>` task names into a client, project and task
//! hierarchy in another workspace. It also manages the webhooks through
//! which a workspace reports its events, and dispatches signed
//! deliveries to typed handlers.
//!
//! # Architecture
//!
//! Clocksync follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (HTTP, in-memory, axum)
//!
//! # Modules
//!
//! - [`clockify`]: Clockify REST API entities, port and adapters
//! - [`migration`]: Workspace migration engine
//! - [`webhook`]: Webhook session lifecycle and delivery dispatch
//! - [`batch`]: Aggregated per-item failures
//! - [`config`]: Process configuration
//! - [`telemetry`]: Logging setup

pub mod batch;
pub mod clockify;
pub mod config;
pub mod migration;
pub mod telemetry;
pub mod webhook;
