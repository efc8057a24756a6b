//! Workspace migration: re-homes time entries filed under legacy
//! `<project>/TASK<number>` task names into a client, project and task
//! hierarchy in a target workspace.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
