//! # freight-quote
//!
//! Freight rate aggregation, quote persistence and booking approval.
//!
//! A shipment request is resolved to a lane of location codes, priced by a
//! synthetic estimator and every registered rate provider in parallel, and
//! the normalized rates are stored as a quote. One rate of a quote can then
//! be booked; bookings move through admin approval and payment with audit
//! entries, in-app notifications and outbox-delivered e-mails along the way.
//!
//! ## Layers
//!
//! - [`domain`]: entities, value objects and pure services
//! - [`application`]: use cases ([`application::services`])
//! - [`infrastructure`]: rate providers, repositories, e-mail outbox
//! - [`api`]: axum REST surface
//!
//! [`config`], [`telemetry`] and [`bootstrap`] assemble the service binary.

pub mod api;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;
