//! # Domain Models
//!
//! This crate contains pure domain types with a single dependency (`serde`).
//! Keep it lean: no I/O or registry logic, just declarations, configuration and simple helpers.

pub mod config;
pub mod constants;
pub mod script;
