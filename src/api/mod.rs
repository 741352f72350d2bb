//! # API Layer
//!
//! Inbound HTTP surface over the application services.

pub mod rest;
