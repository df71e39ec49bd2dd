//! Data models for invoice records, reconciliation issues and configuration.

pub mod config;
pub mod issue;
pub mod record;
