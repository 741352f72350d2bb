//! # Infrastructure Layer
//!
//! Adapters behind the application ports: rate providers, repositories and
//! outbound e-mail.

pub mod notifications;
pub mod persistence;
pub mod rates;
