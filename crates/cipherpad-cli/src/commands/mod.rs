//! Command handlers, one module per area.

pub mod account;
pub mod init;
pub mod misc;
pub mod notes;
