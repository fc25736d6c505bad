//! Command handlers
//!
//! One module per command group: user entry points, admin operations,
//! coach operations.

pub mod admin;
pub mod coach;
pub mod start;
