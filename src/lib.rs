//! wa-contact-export library
//!
//! Exposes modules for the export binary and integration tests.
//!
//! CHANGELOG:
//! - 08/23/2026 - Initial library structure

// Core modules
pub mod config;
pub mod export;
pub mod jid;
pub mod roster;
pub mod runner;
pub mod session;
pub mod sync;
