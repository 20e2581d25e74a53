//! IPC command handlers.

pub mod feed;
