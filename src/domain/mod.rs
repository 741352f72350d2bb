//! # Domain Layer
//!
//! Entities, value objects and pure services of the freight quoting and
//! booking workflow. Nothing in this layer performs I/O.

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;
