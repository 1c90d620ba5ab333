//! Subcommand implementations

pub mod chat;
pub mod health;
pub mod tasks;
