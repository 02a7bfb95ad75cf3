//! CLI commands

pub mod ask;
pub mod chat;
pub mod config;
pub mod health;
pub mod topics;
