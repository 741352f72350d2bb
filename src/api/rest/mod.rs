//! # REST API
//!
//! JSON endpoints using axum.
//!
//! # Endpoints
//!
//! ## Health
//! - `GET /api/v1/health` - Liveness check
//!
//! ## Locations
//! - `GET /api/v1/locations/resolve?q=` - Free text to location code
//!
//! ## Quotes
//! - `POST /api/v1/quotes` - Price a shipment and store the quote
//! - `GET /api/v1/quotes` - List the caller's quotes (`?organizationId=`)
//! - `GET /api/v1/quotes/{id}` - Get a quote
//!
//! ## Bookings
//! - `POST /api/v1/bookings` - Book one rate of a quote
//! - `GET /api/v1/bookings` - List the caller's bookings (`?organizationId=`)
//! - `GET /api/v1/bookings/pending` - Bookings awaiting review (admin)
//! - `GET /api/v1/bookings/{id}` - Get a booking
//! - `POST /api/v1/bookings/{id}/approve` - Approve (admin)
//! - `POST /api/v1/bookings/{id}/reject` - Reject with a reason (admin)
//! - `POST /api/v1/bookings/{id}/confirm-payment` - Record payment
//! - `PUT /api/v1/bookings/{id}/status` - Overwrite status (admin)
//!
//! ## Notifications
//! - `GET /api/v1/notifications` - Inbox and unread count
//! - `POST /api/v1/notifications/{id}/read` - Mark one read
//! - `POST /api/v1/notifications/read-all` - Mark all read
//!
//! ## Audit
//! - `GET /api/v1/audit` - Audit entries (admin)
//!
//! Callers are identified by the `x-subject-id` and `x-organization-id`
//! headers set by the upstream auth gateway; a request without a subject is
//! a guest. Errors are returned as `{ "code": ..., "message": ... }`.
//!
//! # Usage
//!
//! ```ignore
//! use freight_quote::api::rest::{AppState, create_router};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState { /* services */ });
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod error;
pub mod handlers;
pub mod identity;
pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use handlers::AppState;
pub use identity::{ORGANIZATION_HEADER, RequestIdentity, SUBJECT_HEADER};
pub use routes::create_router;
