//! Data models for parsed receipts and configuration.

pub mod config;
pub mod receipt;
