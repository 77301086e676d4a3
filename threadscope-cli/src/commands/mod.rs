//! CLI command implementations.

pub mod diagnose;
pub mod post;
pub mod search;
pub mod strategies;
pub mod thread;
