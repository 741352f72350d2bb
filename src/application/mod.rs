//! # Application Layer
//!
//! Use cases and the error type they report.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
