//! Application-level utilities for the Cipherpad CLI.
//!
//! This module provides:
//! - Path resolution for the config file
//! - The per-invocation application context
//! - Password prompting with retry logic

mod context;
mod resolver;
mod unlock;

// Re-export public API
pub use context::AppContext;
pub use resolver::resolve_config_path;
pub use unlock::unlock_session;
