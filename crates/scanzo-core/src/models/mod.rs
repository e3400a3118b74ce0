//! Data models.

pub mod config;
pub mod receipt;
pub mod tax;
